//! Terminal runner (default binary).
//!
//! Drives the cooperative loop: poll input with a tick-bounded timeout,
//! feed debounced commands into the session, advance the fixed tick, and
//! redraw. Notifications from the event bus feed a small status line, and
//! the final score snapshot is written to disk when a game ends.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

use anyhow::Result;
use chrono::Utc;
use crossterm::event::{self, Event, KeyEventKind};

use blockfall::core::{EventKind, GameConfig, GameEvent, GameSession};
use blockfall::input::{should_quit, InputHandler};
use blockfall::term::{GameView, TerminalRenderer};
use blockfall::types::{SessionPhase, TICK_MS};

const STATUS_LINES: usize = 4;
const SCORE_FILE: &str = "blockfall_score.json";

fn main() -> Result<()> {
    let mut term = TerminalRenderer::new();
    term.enter()?;

    let result = run(&mut term);

    // Always try to restore terminal state.
    let _ = term.exit();
    result
}

fn clock_seed() -> u32 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.subsec_nanos() ^ d.as_secs() as u32)
        .unwrap_or(1)
}

fn run(term: &mut TerminalRenderer) -> Result<()> {
    let mut session = GameSession::new(GameConfig {
        seed: clock_seed(),
        ..GameConfig::default()
    })?;

    let status: Rc<RefCell<VecDeque<String>>> = Rc::new(RefCell::new(VecDeque::new()));
    subscribe_status(&mut session, &status);

    let view = GameView::new();
    let mut input = InputHandler::new();

    let tick_duration = Duration::from_millis(u64::from(TICK_MS));
    let mut last_tick = Instant::now();
    let mut score_saved = false;

    loop {
        let feed: Vec<String> = status.borrow().iter().cloned().collect();
        term.draw(&view.render(&session, &feed))?;

        // Input with timeout until the next tick.
        let timeout = tick_duration
            .checked_sub(last_tick.elapsed())
            .unwrap_or_default();
        if event::poll(timeout)? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    if should_quit(key) {
                        return Ok(());
                    }
                    if let Some(command) = input.handle_key(key) {
                        session.handle_command(command);
                    }
                }
            }
        }

        if last_tick.elapsed() >= tick_duration {
            last_tick = Instant::now();
            input.advance(TICK_MS);
            session.tick(TICK_MS);
        }

        // Persist the score snapshot once per finished game.
        match session.phase() {
            SessionPhase::GameOver if !score_saved => {
                score_saved = true;
                let snapshot = session.score_state().snapshot(Utc::now());
                if let Ok(json) = snapshot.to_json() {
                    let _ = std::fs::write(SCORE_FILE, json);
                }
            }
            SessionPhase::Idle => score_saved = false,
            _ => {}
        }
    }
}

/// Wire the notification feed shown under the board.
fn subscribe_status(session: &mut GameSession, status: &Rc<RefCell<VecDeque<String>>>) {
    let push = |status: &Rc<RefCell<VecDeque<String>>>, line: String| {
        let mut feed = status.borrow_mut();
        feed.push_back(line);
        while feed.len() > STATUS_LINES {
            feed.pop_front();
        }
    };

    {
        let status = Rc::clone(status);
        session.on(EventKind::LinesCleared, move |event| {
            if let GameEvent::LinesCleared { count, .. } = event {
                push(&status, format!("Cleared {count} line(s)"));
            }
        });
    }
    {
        let status = Rc::clone(status);
        session.on(EventKind::LevelUp, move |event| {
            if let GameEvent::LevelUp {
                new_level,
                fall_speed_ms,
                ..
            } = event
            {
                push(
                    &status,
                    format!("Level {new_level}! fall interval {fall_speed_ms}ms"),
                );
            }
        });
    }
    {
        let status = Rc::clone(status);
        session.on(EventKind::ComboReset, move |_| {
            push(&status, String::from("Combo broken"));
        });
    }
    {
        let status = Rc::clone(status);
        session.on(EventKind::GameOver, move |event| {
            if let GameEvent::GameOver { stats } = event {
                push(
                    &status,
                    format!(
                        "Game over: {} points, {} pieces, {} lines",
                        stats.score, stats.total_pieces_placed, stats.total_lines_cleared
                    ),
                );
            }
        });
    }
}
