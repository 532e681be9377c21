//! Core game logic: board, piece catalog, scoring, events, and the session
//! state machine.
//!
//! This crate has no dependency on UI, input devices, or I/O. Everything is
//! driven through the command interface ([`GameSession::handle_command`]) and
//! observed through the event interface ([`EventBus`]), so frontends stay
//! thin collaborators.

pub mod board;
pub mod catalog;
pub mod error;
pub mod events;
pub mod piece;
pub mod rng;
pub mod scoring;
pub mod session;
pub mod snapshot;

pub use board::Board;
pub use error::CoreError;
pub use events::{EventBus, EventKind, GameEvent};
pub use piece::ActivePiece;
pub use rng::{RandomSource, SimpleRng};
pub use scoring::{LevelChange, LineClearResult, ScoreState};
pub use session::{FinalStats, GameConfig, GameSession};
pub use snapshot::ScoreSnapshot;
