//! Outbound notification interface: a publish/subscribe event bus.
//!
//! The session emits [`GameEvent`]s; presentation collaborators subscribe by
//! [`EventKind`]. Dispatch walks subscribers in registration order with each
//! call supervised behind a panic boundary, so one faulty subscriber cannot
//! block delivery to the rest or corrupt core state.

use std::collections::HashMap;
use std::panic::{catch_unwind, AssertUnwindSafe};

use crate::piece::ActivePiece;
use crate::session::FinalStats;

/// A domain event with its payload.
#[derive(Debug, Clone, PartialEq)]
pub enum GameEvent {
    GameStarted,
    GameReset,
    PauseToggled { paused: bool },
    PieceSpawned { piece: ActivePiece },
    PieceMoved { piece: ActivePiece, dx: i32, dy: i32 },
    PieceRotated { piece: ActivePiece },
    HardDropped { piece: ActivePiece, distance: u32 },
    PiecePlaced { piece: ActivePiece },
    LinesCleared { count: usize, rows: Vec<usize> },
    ScoreChanged { score: u64, points: u64, level: u32, lines: u32 },
    LevelUp { old_level: u32, new_level: u32, fall_speed_ms: u32, total_lines: u32 },
    ComboReset,
    GameOver { stats: FinalStats },
}

/// Subscription key: the event's variant without its payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    GameStarted,
    GameReset,
    PauseToggled,
    PieceSpawned,
    PieceMoved,
    PieceRotated,
    HardDropped,
    PiecePlaced,
    LinesCleared,
    ScoreChanged,
    LevelUp,
    ComboReset,
    GameOver,
}

impl GameEvent {
    pub fn kind(&self) -> EventKind {
        match self {
            GameEvent::GameStarted => EventKind::GameStarted,
            GameEvent::GameReset => EventKind::GameReset,
            GameEvent::PauseToggled { .. } => EventKind::PauseToggled,
            GameEvent::PieceSpawned { .. } => EventKind::PieceSpawned,
            GameEvent::PieceMoved { .. } => EventKind::PieceMoved,
            GameEvent::PieceRotated { .. } => EventKind::PieceRotated,
            GameEvent::HardDropped { .. } => EventKind::HardDropped,
            GameEvent::PiecePlaced { .. } => EventKind::PiecePlaced,
            GameEvent::LinesCleared { .. } => EventKind::LinesCleared,
            GameEvent::ScoreChanged { .. } => EventKind::ScoreChanged,
            GameEvent::LevelUp { .. } => EventKind::LevelUp,
            GameEvent::ComboReset => EventKind::ComboReset,
            GameEvent::GameOver { .. } => EventKind::GameOver,
        }
    }
}

type Listener = Box<dyn FnMut(&GameEvent)>;

/// Event name -> ordered list of subscriber callbacks.
#[derive(Default)]
pub struct EventBus {
    listeners: HashMap<EventKind, Vec<Listener>>,
    failed_deliveries: u64,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Subscribe to one event kind. Subscribers for a kind are invoked in
    /// registration order.
    pub fn on<F>(&mut self, kind: EventKind, listener: F)
    where
        F: FnMut(&GameEvent) + 'static,
    {
        self.listeners
            .entry(kind)
            .or_default()
            .push(Box::new(listener));
    }

    /// Deliver an event to every subscriber of its kind. A panicking
    /// subscriber is counted as a failed delivery and the remaining
    /// subscribers still run. Returns the number of successful deliveries.
    pub fn emit(&mut self, event: &GameEvent) -> usize {
        let Some(listeners) = self.listeners.get_mut(&event.kind()) else {
            return 0;
        };

        let mut delivered = 0;
        for listener in listeners.iter_mut() {
            match catch_unwind(AssertUnwindSafe(|| listener(event))) {
                Ok(()) => delivered += 1,
                Err(_) => self.failed_deliveries += 1,
            }
        }
        delivered
    }

    pub fn listener_count(&self, kind: EventKind) -> usize {
        self.listeners.get(&kind).map_or(0, Vec::len)
    }

    /// Deliveries that panicked since the bus was created.
    pub fn failed_deliveries(&self) -> u64 {
        self.failed_deliveries
    }
}

impl std::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventBus")
            .field("kinds", &self.listeners.len())
            .field("failed_deliveries", &self.failed_deliveries)
            .finish()
    }
}
