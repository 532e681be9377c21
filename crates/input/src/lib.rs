//! Input handling: key mapping plus an anti-spam debounce gate.
//!
//! The gate is driven by the host's tick clock (`advance` with elapsed
//! milliseconds) rather than wall-clock reads, so behavior is deterministic
//! under test.

mod map;

pub use map::{map_key, should_quit};

use blockfall_types::{Command, INPUT_DEBOUNCE_MS};
use crossterm::event::KeyEvent;

/// Minimum-interval gate between accepted inputs.
///
/// An input arriving before the delay has elapsed since the last accepted
/// input is dropped silently, not queued.
#[derive(Debug, Clone)]
pub struct InputGate {
    delay_ms: u32,
    since_accept_ms: u32,
}

impl InputGate {
    pub fn new() -> Self {
        Self::with_delay(INPUT_DEBOUNCE_MS)
    }

    pub fn with_delay(delay_ms: u32) -> Self {
        // Start open so the very first input passes.
        Self {
            delay_ms,
            since_accept_ms: delay_ms,
        }
    }

    /// Advance the gate's clock by one host tick.
    pub fn advance(&mut self, elapsed_ms: u32) {
        self.since_accept_ms = self.since_accept_ms.saturating_add(elapsed_ms);
    }

    /// Try to pass one input through the gate.
    pub fn try_accept(&mut self) -> bool {
        if self.since_accept_ms >= self.delay_ms {
            self.since_accept_ms = 0;
            true
        } else {
            false
        }
    }
}

impl Default for InputGate {
    fn default() -> Self {
        Self::new()
    }
}

/// Key mapping composed with the debounce gate.
#[derive(Debug, Clone, Default)]
pub struct InputHandler {
    gate: InputGate,
}

impl InputHandler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_debounce(delay_ms: u32) -> Self {
        Self {
            gate: InputGate::with_delay(delay_ms),
        }
    }

    /// Advance the debounce clock; call once per host tick.
    pub fn advance(&mut self, elapsed_ms: u32) {
        self.gate.advance(elapsed_ms);
    }

    /// Map a key press to a command, subject to the debounce policy.
    pub fn handle_key(&mut self, key: KeyEvent) -> Option<Command> {
        let command = map_key(key.code)?;
        self.gate.try_accept().then_some(command)
    }
}
