//! Persisted scoring snapshot (the optional save/load collaborator
//! contract).
//!
//! Only progression state is persisted; the board and active piece are not,
//! so mid-game save/resume is out of scope by design.

use crate::error::CoreError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreSnapshot {
    pub score: u64,
    pub level: u32,
    pub total_lines_cleared: u32,
    pub combo: u32,
    pub max_combo: u32,
    pub timestamp: DateTime<Utc>,
}

impl ScoreSnapshot {
    pub fn to_json(&self) -> Result<String, CoreError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self, CoreError> {
        Ok(serde_json::from_str(json)?)
    }
}
