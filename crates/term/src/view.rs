//! GameView: maps a `GameSession` into printable lines.
//!
//! Pure (no I/O), so it can be unit-tested without a terminal.

use blockfall_core::catalog;
use blockfall_core::GameSession;
use blockfall_types::{PieceKind, SessionPhase};
use crossterm::style::{Color, Stylize};

/// Renders the board, the ghost projection, and a side panel.
#[derive(Debug, Clone, Copy, Default)]
pub struct GameView;

fn kind_color(kind: PieceKind) -> Color {
    let rgb = catalog::color_of(kind);
    Color::Rgb {
        r: (rgb >> 16) as u8,
        g: (rgb >> 8) as u8,
        b: rgb as u8,
    }
}

impl GameView {
    pub fn new() -> Self {
        Self
    }

    /// Render one frame. `status` lines (the event feed) are appended below
    /// the board.
    pub fn render(&self, session: &GameSession, status: &[String]) -> Vec<String> {
        let board = session.board();
        let width = board.width();
        let height = board.height();

        let active = session.active();
        let ghost_y = session.ghost_y();

        let mut lines = Vec::with_capacity(height + status.len() + 4);
        lines.push(format!("┌{}┐", "──".repeat(width)));

        for y in 0..height as i32 {
            let mut row = String::from("│");
            for x in 0..width as i32 {
                row.push_str(&self.cell_text(session, &active, ghost_y, x, y));
            }
            row.push('│');
            row.push_str(&self.panel_text(session, y));
            lines.push(row);
        }

        lines.push(format!("└{}┘", "──".repeat(width)));
        if let Some(overlay) = self.overlay(session.phase()) {
            lines.push(overlay.to_string());
        }
        lines.extend(status.iter().cloned());
        lines
    }

    fn cell_text(
        &self,
        session: &GameSession,
        active: &Option<blockfall_core::ActivePiece>,
        ghost_y: Option<i32>,
        x: i32,
        y: i32,
    ) -> String {
        if let Some(piece) = active {
            if piece.cells().any(|(px, py)| px == x && py == y) {
                return "██".with(kind_color(piece.kind)).to_string();
            }
            if let Some(gy) = ghost_y {
                let ghost = blockfall_core::ActivePiece {
                    y: gy,
                    ..*piece
                };
                if gy != piece.y && ghost.cells().any(|(px, py)| px == x && py == y) {
                    return "░░".dim().to_string();
                }
            }
        }

        match session.board().get(x, y) {
            Some(Some(kind)) => "██".with(kind_color(kind)).to_string(),
            _ => " ·".dim().to_string(),
        }
    }

    fn panel_text(&self, session: &GameSession, y: i32) -> String {
        let scoring = session.score_state();
        match y {
            1 => format!("  SCORE  {}", scoring.score()),
            2 => format!("  LEVEL  {}", scoring.level()),
            3 => format!("  LINES  {}", scoring.total_lines()),
            4 => format!("  COMBO  {}", scoring.combo()),
            6 => match session.next_kind() {
                Some(kind) => format!("  NEXT   {}", kind.as_str()),
                None => String::from("  NEXT   -"),
            },
            8 => format!("  SPEED  {}ms", session.fall_speed_ms()),
            _ => String::new(),
        }
    }

    fn overlay(&self, phase: SessionPhase) -> Option<&'static str> {
        match phase {
            SessionPhase::Idle => Some("  ENTER to start, Q to quit"),
            SessionPhase::Paused => Some("  PAUSED (P to resume)"),
            SessionPhase::GameOver => Some("  GAME OVER (R to reset, Q to quit)"),
            SessionPhase::Running => None,
        }
    }
}
