//! The active falling piece.

use crate::catalog::{self, ShapeGrid};
use blockfall_types::{PieceKind, RotateDirection};

/// A piece instance currently falling on the board.
///
/// Created at spawn with the queued kind, mutated by move/rotate while it
/// falls, and consumed when it locks into the board grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ActivePiece {
    pub kind: PieceKind,
    /// Index into the kind's rotation states (always kept in range).
    pub rotation: usize,
    /// Board-relative anchor column of the shape matrix's top-left corner.
    pub x: i32,
    /// Board-relative anchor row of the shape matrix's top-left corner.
    pub y: i32,
}

impl ActivePiece {
    pub fn new(kind: PieceKind, x: i32, y: i32) -> Self {
        Self {
            kind,
            rotation: 0,
            x,
            y,
        }
    }

    /// Spawn anchor: horizontally centered, top row.
    pub fn spawn(kind: PieceKind, board_width: usize) -> Self {
        Self::new(kind, board_width as i32 / 2 - 1, 0)
    }

    /// Occupancy matrix for the current rotation.
    pub fn shape(&self) -> ShapeGrid {
        catalog::shape_at(self.kind, self.rotation)
    }

    /// Number of rotation states for this piece's kind.
    pub fn rotation_count(&self) -> usize {
        catalog::shapes_of(self.kind).len()
    }

    /// Cyclic successor rotation index in the given direction.
    pub fn rotated(&self, direction: RotateDirection) -> usize {
        let count = self.rotation_count();
        match direction {
            RotateDirection::Clockwise => (self.rotation + 1) % count,
            RotateDirection::CounterClockwise => (self.rotation + count - 1) % count,
        }
    }

    /// Absolute board coordinates of every occupied cell at the current
    /// rotation.
    pub fn cells(&self) -> impl Iterator<Item = (i32, i32)> + '_ {
        let grid = self.shape();
        grid.iter().enumerate().flat_map(move |(row, cols)| {
            cols.iter()
                .enumerate()
                .filter(|&(_, &v)| v != 0)
                .map(move |(col, _)| (self.x + col as i32, self.y + row as i32))
        })
    }

    pub fn move_by(&mut self, dx: i32, dy: i32) {
        self.x += dx;
        self.y += dy;
    }

    pub fn color(&self) -> u32 {
        catalog::color_of(self.kind)
    }
}
