//! Core types shared across the workspace.
//!
//! Pure data types and constants with no external dependencies, usable from
//! any context (game logic, input mapping, rendering).
//!
//! # Board Dimensions
//!
//! Standard playfield dimensions:
//!
//! - **Width**: 10 columns (indexed 0-9, left to right)
//! - **Height**: 20 rows (indexed 0-19, top to bottom)
//! - **Depth**: 1 (carried for the dimensions query; the grid itself is 2D)
//! - **Spawn anchor**: horizontally centered (`width / 2 - 1`), top row
//!
//! # Timing
//!
//! All timing values are in milliseconds. The session is driven by a
//! cooperative fixed tick (`TICK_MS`); automatic falling is gated by
//! elapsed-time accumulation against the current fall speed, which starts at
//! `BASE_FALL_MS` and follows `FALL_SPEEDS_MS` as the level rises.

/// Default board dimensions.
pub const BOARD_WIDTH: usize = 10;
pub const BOARD_HEIGHT: usize = 20;
pub const BOARD_DEPTH: usize = 1;

/// Fixed timestep of the cooperative game loop (~60 ticks per second).
pub const TICK_MS: u32 = 16;

/// Minimum interval between accepted inputs (anti-spam debounce).
pub const INPUT_DEBOUNCE_MS: u32 = 100;

/// Fall speed at level 1 and the hard floor any override clamps to.
pub const BASE_FALL_MS: u32 = 1000;
pub const MIN_FALL_MS: u32 = 50;

/// Level progression: one level per 10 cleared lines, capped at 20.
pub const LINES_PER_LEVEL: u32 = 10;
pub const MAX_LEVEL: u32 = 20;

/// Fall speed per level (index = level - 1).
pub const FALL_SPEEDS_MS: [u32; MAX_LEVEL as usize] = [
    1000, 900, 800, 700, 600, // levels 1-5
    500, 450, 400, 350, 300, // levels 6-10
    250, 200, 180, 160, 140, // levels 11-15
    120, 100, 90, 80, 70, // levels 16-20
];

/// Base points for 1/2/3/4 simultaneous line clears, before the level
/// multiplier and combo bonus.
pub const LINE_CLEAR_SCORES: [u64; 4] = [100, 300, 500, 800];

/// Drop scoring: points per cell descended.
pub const SOFT_DROP_POINTS: u64 = 1;
pub const HARD_DROP_POINTS: u64 = 2;

/// Horizontal nudges tried, in order, when an in-place rotation is blocked.
pub const WALL_KICK_OFFSETS: [i32; 4] = [-1, 1, -2, 2];

/// The seven piece kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PieceKind {
    I,
    O,
    T,
    S,
    Z,
    J,
    L,
}

impl PieceKind {
    /// All kinds, in catalog order.
    pub const ALL: [PieceKind; 7] = [
        PieceKind::I,
        PieceKind::O,
        PieceKind::T,
        PieceKind::S,
        PieceKind::Z,
        PieceKind::J,
        PieceKind::L,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            PieceKind::I => "I",
            PieceKind::O => "O",
            PieceKind::T => "T",
            PieceKind::S => "S",
            PieceKind::Z => "Z",
            PieceKind::J => "J",
            PieceKind::L => "L",
        }
    }
}

/// Cell on the board (`None` = empty, `Some` = filled with a piece kind).
///
/// Out-of-bounds is distinguished one level up: `Board::get` returns
/// `Option<Cell>`, where the outer `None` is the out-of-bounds sentinel.
pub type Cell = Option<PieceKind>;

/// Rotation direction for the rotate command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RotateDirection {
    Clockwise,
    CounterClockwise,
}

/// Inbound command interface (collaborators -> core).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    StartGame,
    ResetGame,
    TogglePause,
    MoveLeft,
    MoveRight,
    SoftDrop,
    RotateCw,
    RotateCcw,
    HardDrop,
}

impl Command {
    /// Parse a command from its wire name (case-insensitive).
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "startgame" => Some(Command::StartGame),
            "resetgame" => Some(Command::ResetGame),
            "togglepause" => Some(Command::TogglePause),
            "moveleft" => Some(Command::MoveLeft),
            "moveright" => Some(Command::MoveRight),
            "softdrop" => Some(Command::SoftDrop),
            "rotatecw" => Some(Command::RotateCw),
            "rotateccw" => Some(Command::RotateCcw),
            "harddrop" => Some(Command::HardDrop),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Command::StartGame => "startGame",
            Command::ResetGame => "resetGame",
            Command::TogglePause => "togglePause",
            Command::MoveLeft => "moveLeft",
            Command::MoveRight => "moveRight",
            Command::SoftDrop => "softDrop",
            Command::RotateCw => "rotateCw",
            Command::RotateCcw => "rotateCcw",
            Command::HardDrop => "hardDrop",
        }
    }
}

/// Session lifecycle.
///
/// Transitions: Idle->Running (start), Running<->Paused (pause toggle),
/// Running->GameOver (board overflow after a lock), GameOver->Idle (reset).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    Idle,
    Running,
    Paused,
    GameOver,
}

impl SessionPhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            SessionPhase::Idle => "idle",
            SessionPhase::Running => "running",
            SessionPhase::Paused => "paused",
            SessionPhase::GameOver => "gameOver",
        }
    }
}
