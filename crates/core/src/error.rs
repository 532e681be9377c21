//! Typed construction and serialization errors.
//!
//! Only invalid configuration is an error. Illegal moves are `false` returns
//! and the terminal game condition is a state transition; neither goes
//! through this type.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoreError {
    /// An external caller named a piece kind that is not one of the seven.
    #[error("invalid piece kind: {0:?}")]
    InvalidPieceKind(String),

    /// Board dimensions must all be positive and are fixed at construction.
    #[error("invalid board dimensions {width}x{height}x{depth}: all dimensions must be positive")]
    InvalidDimensions {
        width: usize,
        height: usize,
        depth: usize,
    },

    /// A score snapshot failed to serialize or deserialize.
    #[error("score snapshot error: {0}")]
    Snapshot(#[from] serde_json::Error),
}
