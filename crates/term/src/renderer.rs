//! Terminal lifecycle and frame drawing.

use std::io::{self, Write};

use anyhow::Result;
use crossterm::{
    cursor,
    terminal::{self, ClearType},
    QueueableCommand,
};

/// Owns raw mode and the alternate screen; restores both on `exit`.
pub struct TerminalRenderer {
    out: io::Stdout,
}

impl TerminalRenderer {
    pub fn new() -> Self {
        Self { out: io::stdout() }
    }

    pub fn enter(&mut self) -> Result<()> {
        terminal::enable_raw_mode()?;
        self.out
            .queue(terminal::EnterAlternateScreen)?
            .queue(cursor::Hide)?;
        self.out.flush()?;
        Ok(())
    }

    pub fn exit(&mut self) -> Result<()> {
        self.out
            .queue(cursor::Show)?
            .queue(terminal::LeaveAlternateScreen)?;
        self.out.flush()?;
        terminal::disable_raw_mode()?;
        Ok(())
    }

    /// Draw a full frame, one line per row.
    pub fn draw(&mut self, lines: &[String]) -> Result<()> {
        self.out.queue(cursor::MoveTo(0, 0))?;
        for (row, line) in lines.iter().enumerate() {
            self.out
                .queue(cursor::MoveTo(0, row as u16))?
                .queue(terminal::Clear(ClearType::UntilNewLine))?;
            self.out.write_all(line.as_bytes())?;
        }
        self.out
            .queue(terminal::Clear(ClearType::FromCursorDown))?;
        self.out.flush()?;
        Ok(())
    }
}

impl Default for TerminalRenderer {
    fn default() -> Self {
        Self::new()
    }
}
