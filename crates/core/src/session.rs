//! Game session: the state machine and cooperative game loop.
//!
//! Orchestrates spawn -> fall -> move/rotate/drop -> lock -> clear ->
//! respawn. The session is single-threaded by design: it is advanced once
//! per host tick via [`GameSession::tick`] and mutated only through the
//! command interface, so no locking is involved anywhere in the core.
//!
//! Nothing here returns an error during play. Illegal moves are `false`
//! no-ops and the only terminal condition is the GameOver transition,
//! surfaced as an event.

use crate::board::Board;
use crate::catalog;
use crate::error::CoreError;
use crate::events::{EventBus, EventKind, GameEvent};
use crate::piece::ActivePiece;
use crate::rng::{RandomSource, SimpleRng};
use crate::scoring::ScoreState;
use blockfall_types::{
    Command, PieceKind, RotateDirection, SessionPhase, BOARD_DEPTH, BOARD_HEIGHT, BOARD_WIDTH,
    MIN_FALL_MS, WALL_KICK_OFFSETS,
};

/// Construction-time session configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GameConfig {
    pub width: usize,
    pub height: usize,
    pub depth: usize,
    pub seed: u32,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            width: BOARD_WIDTH,
            height: BOARD_HEIGHT,
            depth: BOARD_DEPTH,
            seed: 1,
        }
    }
}

/// End-of-game statistics carried by the GameOver notification.
#[derive(Debug, Clone, PartialEq)]
pub struct FinalStats {
    pub score: u64,
    pub level: u32,
    pub total_lines_cleared: u32,
    pub total_pieces_placed: u32,
    pub max_combo: u32,
    pub game_time_ms: u64,
    pub pieces_per_minute: f64,
    pub lines_per_minute: f64,
}

pub struct GameSession {
    board: Board,
    active: Option<ActivePiece>,
    next: Option<PieceKind>,
    scoring: ScoreState,
    events: EventBus,
    rng: Box<dyn RandomSource>,
    phase: SessionPhase,
    fall_speed_ms: u32,
    fall_timer_ms: u32,
    game_time_ms: u64,
    total_pieces_placed: u32,
}

impl GameSession {
    /// Create an idle session with a seeded default RNG.
    pub fn new(config: GameConfig) -> Result<Self, CoreError> {
        let seed = config.seed;
        Self::with_rng(config, Box::new(SimpleRng::new(seed)))
    }

    /// Create an idle session drawing randomness from the given source.
    pub fn with_rng(config: GameConfig, rng: Box<dyn RandomSource>) -> Result<Self, CoreError> {
        let board = Board::new(config.width, config.height, config.depth)?;
        let scoring = ScoreState::new();
        let fall_speed_ms = scoring.fall_speed_ms();
        Ok(Self {
            board,
            active: None,
            next: None,
            scoring,
            events: EventBus::new(),
            rng,
            phase: SessionPhase::Idle,
            fall_speed_ms,
            fall_timer_ms: 0,
            game_time_ms: 0,
            total_pieces_placed: 0,
        })
    }

    // ----- observation -----

    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    pub fn is_running(&self) -> bool {
        self.phase == SessionPhase::Running
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn active(&self) -> Option<ActivePiece> {
        self.active
    }

    pub fn next_kind(&self) -> Option<PieceKind> {
        self.next
    }

    pub fn score_state(&self) -> &ScoreState {
        &self.scoring
    }

    pub fn fall_speed_ms(&self) -> u32 {
        self.fall_speed_ms
    }

    pub fn total_pieces_placed(&self) -> u32 {
        self.total_pieces_placed
    }

    pub fn game_time_ms(&self) -> u64 {
        self.game_time_ms
    }

    pub fn events(&self) -> &EventBus {
        &self.events
    }

    /// Subscribe a collaborator callback to one event kind.
    pub fn on<F>(&mut self, kind: EventKind, listener: F)
    where
        F: FnMut(&GameEvent) + 'static,
    {
        self.events.on(kind, listener);
    }

    /// Advisory landing row for the active piece: the result of simulated
    /// one-row falls from its current position until blocked. Never mutates
    /// the board.
    pub fn ghost_y(&self) -> Option<i32> {
        let piece = self.active?;
        let mut y = piece.y;
        while self
            .board
            .is_valid_position(&piece, piece.x, y + 1, piece.rotation)
        {
            y += 1;
        }
        Some(y)
    }

    // ----- command interface -----

    /// Apply an inbound command. Returns whether it had any effect; commands
    /// that are illegal in the current phase are silent no-ops.
    pub fn handle_command(&mut self, command: Command) -> bool {
        match command {
            Command::StartGame => self.start(),
            Command::ResetGame => self.reset(),
            Command::TogglePause => self.toggle_pause(),
            Command::MoveLeft => self.is_running() && self.move_piece(-1, 0),
            Command::MoveRight => self.is_running() && self.move_piece(1, 0),
            Command::SoftDrop => self.is_running() && self.soft_drop(),
            Command::RotateCw => self.is_running() && self.rotate(RotateDirection::Clockwise),
            Command::RotateCcw => {
                self.is_running() && self.rotate(RotateDirection::CounterClockwise)
            }
            Command::HardDrop => self.is_running() && self.hard_drop(),
        }
    }

    /// Idle -> Running. Reinitializes board, scoring, and statistics, then
    /// spawns the first piece.
    pub fn start(&mut self) -> bool {
        if self.phase != SessionPhase::Idle {
            return false;
        }

        self.board.reset();
        self.scoring.reset();
        self.fall_speed_ms = self.scoring.fall_speed_ms();
        self.fall_timer_ms = 0;
        self.game_time_ms = 0;
        self.total_pieces_placed = 0;
        self.phase = SessionPhase::Running;

        self.next = Some(catalog::random_kind(self.rng.as_mut()));
        self.events.emit(&GameEvent::GameStarted);
        self.spawn_piece();
        true
    }

    /// Back to Idle from any other phase, dropping all in-game state. The
    /// only transition out of GameOver.
    pub fn reset(&mut self) -> bool {
        if self.phase == SessionPhase::Idle {
            return false;
        }

        self.board.reset();
        self.scoring.reset();
        self.active = None;
        self.next = None;
        self.fall_speed_ms = self.scoring.fall_speed_ms();
        self.fall_timer_ms = 0;
        self.game_time_ms = 0;
        self.total_pieces_placed = 0;
        self.phase = SessionPhase::Idle;

        self.events.emit(&GameEvent::GameReset);
        true
    }

    /// Running <-> Paused. Pausing skips the update step; it does not unwind
    /// anything because nothing in the core is long-running.
    pub fn toggle_pause(&mut self) -> bool {
        let next = match self.phase {
            SessionPhase::Running => SessionPhase::Paused,
            SessionPhase::Paused => SessionPhase::Running,
            _ => return false,
        };
        self.phase = next;
        let paused = self.phase == SessionPhase::Paused;
        self.events.emit(&GameEvent::PauseToggled { paused });
        true
    }

    /// Advance game time by one host tick. Gravity applies once the
    /// accumulated time crosses the current fall speed; a blocked fall locks
    /// the active piece. Returns whether the piece fell or locked.
    pub fn tick(&mut self, elapsed_ms: u32) -> bool {
        if self.phase != SessionPhase::Running {
            return false;
        }

        self.game_time_ms += u64::from(elapsed_ms);
        self.fall_timer_ms += elapsed_ms;
        if self.fall_timer_ms < self.fall_speed_ms {
            return false;
        }
        self.fall_timer_ms = 0;

        if self.active.is_some() && !self.move_piece(0, 1) {
            self.lock_active();
        }
        true
    }

    /// Override the automatic fall interval, clamped to the floor.
    pub fn set_fall_speed(&mut self, ms: u32) {
        self.fall_speed_ms = ms.max(MIN_FALL_MS);
    }

    // ----- piece operations -----

    fn move_piece(&mut self, dx: i32, dy: i32) -> bool {
        let Some(piece) = self.active else {
            return false;
        };

        if !self
            .board
            .is_valid_position(&piece, piece.x + dx, piece.y + dy, piece.rotation)
        {
            return false;
        }

        let mut moved = piece;
        moved.move_by(dx, dy);
        self.active = Some(moved);
        self.events.emit(&GameEvent::PieceMoved {
            piece: moved,
            dx,
            dy,
        });
        true
    }

    /// Rotate in place, falling back to a fixed sequence of horizontal
    /// nudges near walls and stacks. Deliberately a simplified kick set, not
    /// the SRS tables.
    fn rotate(&mut self, direction: RotateDirection) -> bool {
        let Some(piece) = self.active else {
            return false;
        };

        let rotation = piece.rotated(direction);
        let mut landed: Option<ActivePiece> = None;

        if self
            .board
            .is_valid_position(&piece, piece.x, piece.y, rotation)
        {
            landed = Some(ActivePiece { rotation, ..piece });
        } else {
            for kick in WALL_KICK_OFFSETS {
                if self
                    .board
                    .is_valid_position(&piece, piece.x + kick, piece.y, rotation)
                {
                    landed = Some(ActivePiece {
                        rotation,
                        x: piece.x + kick,
                        ..piece
                    });
                    break;
                }
            }
        }

        match landed {
            Some(rotated) => {
                self.active = Some(rotated);
                self.events.emit(&GameEvent::PieceRotated { piece: rotated });
                true
            }
            None => false,
        }
    }

    fn soft_drop(&mut self) -> bool {
        if !self.move_piece(0, 1) {
            return false;
        }
        let points = self.scoring.add_soft_drop(1);
        self.emit_score_changed(points);
        true
    }

    /// Repeat the one-row fall until blocked, then lock immediately instead
    /// of waiting for the next timed fall.
    fn hard_drop(&mut self) -> bool {
        if self.active.is_none() {
            return false;
        }

        let mut distance: u32 = 0;
        while self.move_piece(0, 1) {
            distance += 1;
        }

        if distance > 0 {
            let points = self.scoring.add_hard_drop(distance);
            self.emit_score_changed(points);
        }
        if let Some(piece) = self.active {
            self.events.emit(&GameEvent::HardDropped { piece, distance });
        }

        self.lock_active();
        true
    }

    // ----- lock / clear / spawn -----

    fn lock_active(&mut self) {
        let Some(piece) = self.active.take() else {
            return;
        };

        self.board.place(&piece, piece.x, piece.y);
        self.total_pieces_placed += 1;
        self.events.emit(&GameEvent::PiecePlaced { piece });

        let completed = self.board.find_completed_lines();
        if completed.is_empty() {
            if self.scoring.reset_combo() {
                self.events.emit(&GameEvent::ComboReset);
            }
        } else {
            let count = self.board.clear_lines(&completed);
            self.events.emit(&GameEvent::LinesCleared {
                count,
                rows: completed,
            });

            let result = self.scoring.add_lines(count as u32);
            self.emit_score_changed(result.points);
            if let Some(change) = result.level_up {
                self.fall_speed_ms = change.fall_speed_ms;
                self.events.emit(&GameEvent::LevelUp {
                    old_level: change.old_level,
                    new_level: change.new_level,
                    fall_speed_ms: change.fall_speed_ms,
                    total_lines: change.total_lines,
                });
            }
        }

        if self.board.is_game_over() {
            self.end_game();
            return;
        }
        self.spawn_piece();
    }

    fn spawn_piece(&mut self) -> bool {
        let kind = match self.next.take() {
            Some(kind) => kind,
            None => catalog::random_kind(self.rng.as_mut()),
        };
        self.next = Some(catalog::random_kind(self.rng.as_mut()));

        let piece = ActivePiece::spawn(kind, self.board.width());
        if !self
            .board
            .is_valid_position(&piece, piece.x, piece.y, piece.rotation)
        {
            self.end_game();
            return false;
        }

        self.active = Some(piece);
        self.fall_timer_ms = 0;
        self.events.emit(&GameEvent::PieceSpawned { piece });
        true
    }

    fn end_game(&mut self) {
        self.phase = SessionPhase::GameOver;
        let stats = self.final_stats();
        self.events.emit(&GameEvent::GameOver { stats });
    }

    /// Statistics as of now; carried by the GameOver notification.
    pub fn final_stats(&self) -> FinalStats {
        let per_minute = |count: u32| {
            if self.game_time_ms == 0 {
                0.0
            } else {
                f64::from(count) / self.game_time_ms as f64 * 60_000.0
            }
        };
        FinalStats {
            score: self.scoring.score(),
            level: self.scoring.level(),
            total_lines_cleared: self.scoring.total_lines(),
            total_pieces_placed: self.total_pieces_placed,
            max_combo: self.scoring.max_combo(),
            game_time_ms: self.game_time_ms,
            pieces_per_minute: per_minute(self.total_pieces_placed),
            lines_per_minute: per_minute(self.scoring.total_lines()),
        }
    }

    fn emit_score_changed(&mut self, points: u64) {
        self.events.emit(&GameEvent::ScoreChanged {
            score: self.scoring.score(),
            points,
            level: self.scoring.level(),
            lines: self.scoring.total_lines(),
        });
    }
}

impl std::fmt::Debug for GameSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GameSession")
            .field("phase", &self.phase)
            .field("active", &self.active)
            .field("next", &self.next)
            .field("scoring", &self.scoring)
            .field("fall_speed_ms", &self.fall_speed_ms)
            .field("total_pieces_placed", &self.total_pieces_placed)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn running_session(seed: u32) -> GameSession {
        let mut session = GameSession::new(GameConfig {
            seed,
            ..GameConfig::default()
        })
        .unwrap();
        session.start();
        session
    }

    #[test]
    fn test_new_session_is_idle() {
        let session = GameSession::new(GameConfig::default()).unwrap();
        assert_eq!(session.phase(), SessionPhase::Idle);
        assert!(session.active().is_none());
        assert!(session.next_kind().is_none());
        assert_eq!(session.score_state().score(), 0);
        assert_eq!(session.total_pieces_placed(), 0);
    }

    #[test]
    fn test_start_spawns_and_runs() {
        let mut session = GameSession::new(GameConfig::default()).unwrap();
        assert!(session.start());
        assert_eq!(session.phase(), SessionPhase::Running);
        assert!(session.active().is_some());
        assert!(session.next_kind().is_some());
        assert_eq!(session.fall_speed_ms(), 1000);

        // Only valid from Idle.
        assert!(!session.start());
    }

    #[test]
    fn test_same_seed_same_piece_sequence() {
        let mut a = running_session(777);
        let mut b = running_session(777);
        for _ in 0..10 {
            assert_eq!(
                a.active().map(|p| p.kind),
                b.active().map(|p| p.kind)
            );
            a.handle_command(Command::HardDrop);
            b.handle_command(Command::HardDrop);
        }
    }

    #[test]
    fn test_move_commands_shift_active() {
        let mut session = running_session(1);
        let x0 = session.active().unwrap().x;

        assert!(session.handle_command(Command::MoveRight));
        assert_eq!(session.active().unwrap().x, x0 + 1);
        assert!(session.handle_command(Command::MoveLeft));
        assert_eq!(session.active().unwrap().x, x0);
    }

    #[test]
    fn test_move_stops_at_wall() {
        let mut session = running_session(1);
        let mut moves = 0;
        for _ in 0..20 {
            if session.handle_command(Command::MoveLeft) {
                moves += 1;
            }
        }
        // Spawn anchor is centered; the wall arrives within the board width.
        assert!(moves < session.board().width() as u32);
        assert!(!session.handle_command(Command::MoveLeft));
    }

    #[test]
    fn test_soft_drop_scores_one_point_per_row() {
        let mut session = running_session(1);
        let y0 = session.active().unwrap().y;
        assert!(session.handle_command(Command::SoftDrop));
        assert_eq!(session.active().unwrap().y, y0 + 1);
        assert_eq!(session.score_state().score(), 1);
    }

    #[test]
    fn test_rotation_cycles_index() {
        let mut session = running_session(1);
        // Land on a kind with more than one rotation state.
        while session.active().unwrap().rotation_count() == 1 {
            session.handle_command(Command::HardDrop);
        }
        let piece = session.active().unwrap();
        let expected = piece.rotated(RotateDirection::Clockwise);

        assert!(session.handle_command(Command::RotateCw));
        assert_eq!(session.active().unwrap().rotation, expected);
        assert!(session.handle_command(Command::RotateCcw));
        assert_eq!(session.active().unwrap().rotation, piece.rotation);
    }

    #[test]
    fn test_rotation_wall_kick_near_left_wall() {
        let mut session = running_session(1);
        // Vertical I hugging the left wall: occupied column is 2 of its
        // matrix, so the anchor sits at x = -2.
        session.active = Some(ActivePiece {
            kind: PieceKind::I,
            rotation: 1,
            x: -2,
            y: 5,
        });

        assert!(session.rotate(RotateDirection::Clockwise));
        let piece = session.active().unwrap();
        assert_eq!(piece.rotation, 0);
        // The +2 nudge was needed to fit the horizontal bar.
        assert_eq!(piece.x, 0);
    }

    #[test]
    fn test_rotation_blocked_is_noop() {
        let mut session = running_session(1);
        session.active = Some(ActivePiece {
            kind: PieceKind::I,
            rotation: 0,
            x: 3,
            y: 5,
        });
        // Box the bar in so neither the in-place rotation nor any kick fits:
        // fill everything, then open exactly the bar's own four cells.
        for x in 0..session.board.width() as i32 {
            for y in 0..session.board.height() as i32 {
                session.board.set(x, y, Some(PieceKind::J));
            }
        }
        for x in [3, 4, 5, 6] {
            session.board.set(x, 6, None);
        }

        let before = session.active().unwrap();
        assert!(!session.handle_command(Command::RotateCw));
        assert_eq!(session.active().unwrap(), before);
    }

    #[test]
    fn test_hard_drop_locks_and_respawns() {
        let mut session = running_session(1);
        assert!(session.handle_command(Command::HardDrop));
        assert_eq!(session.total_pieces_placed(), 1);
        assert!(session.is_running());
        assert!(session.active().is_some(), "next piece should spawn");
        // +2 per cell descended.
        assert!(session.score_state().score() >= 2);
    }

    #[test]
    fn test_tick_applies_gravity_at_fall_speed() {
        let mut session = running_session(1);
        let y0 = session.active().unwrap().y;

        assert!(!session.tick(999));
        assert_eq!(session.active().unwrap().y, y0);

        assert!(session.tick(1));
        assert_eq!(session.active().unwrap().y, y0 + 1);
    }

    #[test]
    fn test_tick_ignored_while_paused() {
        let mut session = running_session(1);
        let y0 = session.active().unwrap().y;
        assert!(session.toggle_pause());
        for _ in 0..200 {
            session.tick(16);
        }
        assert_eq!(session.active().unwrap().y, y0);
        assert_eq!(session.phase(), SessionPhase::Paused);

        assert!(session.toggle_pause());
        assert!(session.is_running());
    }

    #[test]
    fn test_pause_gates_movement_commands() {
        let mut session = running_session(1);
        session.toggle_pause();
        assert!(!session.handle_command(Command::MoveLeft));
        assert!(!session.handle_command(Command::HardDrop));
        assert!(!session.handle_command(Command::RotateCw));
    }

    #[test]
    fn test_blocked_spawn_transitions_to_game_over() {
        let mut session = running_session(1);
        // Occupy the spawn rows without completing them (column 0 stays
        // open), then lock.
        for x in 1..session.board.width() as i32 {
            session.board.set(x, 0, Some(PieceKind::I));
            session.board.set(x, 1, Some(PieceKind::I));
        }
        session.lock_active();

        assert_eq!(session.phase(), SessionPhase::GameOver);
        // Everything except reset is now a no-op.
        assert!(!session.handle_command(Command::MoveLeft));
        assert!(!session.handle_command(Command::TogglePause));
        assert!(!session.handle_command(Command::StartGame));
        assert!(session.handle_command(Command::ResetGame));
        assert_eq!(session.phase(), SessionPhase::Idle);
    }

    #[test]
    fn test_game_over_emits_final_stats() {
        let stats: Rc<RefCell<Option<FinalStats>>> = Rc::new(RefCell::new(None));
        let mut session = running_session(3);
        {
            let stats = Rc::clone(&stats);
            session.on(EventKind::GameOver, move |event| {
                if let GameEvent::GameOver { stats: s } = event {
                    *stats.borrow_mut() = Some(s.clone());
                }
            });
        }

        // Stack pieces straight down until the board overflows.
        let mut guard = 0;
        while session.is_running() && guard < 500 {
            session.handle_command(Command::HardDrop);
            session.tick(16);
            guard += 1;
        }

        assert_eq!(session.phase(), SessionPhase::GameOver);
        let stats = stats.borrow().clone().expect("gameOver payload");
        assert_eq!(stats.total_pieces_placed, session.total_pieces_placed());
        assert!(stats.total_pieces_placed > 0);
    }

    #[test]
    fn test_reset_returns_to_initial_state() {
        let mut session = running_session(1);
        session.handle_command(Command::HardDrop);
        assert!(session.reset());
        assert_eq!(session.phase(), SessionPhase::Idle);
        assert!(session.active().is_none());
        assert_eq!(session.score_state().score(), 0);
        assert_eq!(session.total_pieces_placed(), 0);
        assert!(session.board().find_completed_lines().is_empty());
        // Reset from Idle is a no-op.
        assert!(!session.reset());
    }

    #[test]
    fn test_ghost_is_at_or_below_active() {
        let session = running_session(1);
        let piece = session.active().unwrap();
        let ghost = session.ghost_y().unwrap();
        assert!(ghost >= piece.y);
        // Dropping to the ghost row must still be a valid position.
        assert!(session
            .board()
            .is_valid_position(&piece, piece.x, ghost, piece.rotation));
        assert!(!session
            .board()
            .is_valid_position(&piece, piece.x, ghost + 1, piece.rotation));
    }

    #[test]
    fn test_set_fall_speed_clamps_to_floor() {
        let mut session = running_session(1);
        session.set_fall_speed(10);
        assert_eq!(session.fall_speed_ms(), MIN_FALL_MS);
        session.set_fall_speed(400);
        assert_eq!(session.fall_speed_ms(), 400);
    }

    #[test]
    fn test_clearing_a_line_scores_and_emits() {
        let seen: Rc<RefCell<Vec<EventKind>>> = Rc::new(RefCell::new(Vec::new()));
        let mut session = running_session(1);
        for kind in [
            EventKind::LinesCleared,
            EventKind::ScoreChanged,
            EventKind::PiecePlaced,
        ] {
            let seen = Rc::clone(&seen);
            session.on(kind, move |event| {
                seen.borrow_mut().push(event.kind());
            });
        }

        // Bottom row fully filled except where the O piece will land.
        let bottom = session.board.height() as i32 - 1;
        for x in 0..session.board.width() as i32 {
            if x != 4 && x != 5 {
                session.board.set(x, bottom, Some(PieceKind::I));
                session.board.set(x, bottom - 1, Some(PieceKind::I));
            }
        }
        session.active = Some(ActivePiece::new(PieceKind::O, 4, 0));
        session.hard_drop();

        assert_eq!(session.score_state().total_lines(), 2);
        assert!(seen.borrow().contains(&EventKind::LinesCleared));
        assert!(seen.borrow().contains(&EventKind::PiecePlaced));
        assert!(seen.borrow().contains(&EventKind::ScoreChanged));
    }
}
