//! Piece catalog: the seven kinds, their rotation states, and colors.
//!
//! Rotation states are precomputed occupancy matrices rather than being
//! generated by rotating a base shape, so each orientation matches the
//! canonical layout cell for cell. Matrices are indexed `[row][col]` and a
//! piece anchored at `(x, y)` occupies board cell `(x + col, y + row)` for
//! every non-zero entry.

use crate::error::CoreError;
use crate::rng::RandomSource;
use blockfall_types::PieceKind;

/// One rotation state: an occupancy matrix, row-major.
pub type ShapeGrid = &'static [&'static [u8]];

/// Number of occupied cells in every rotation state of every kind.
pub const CELLS_PER_PIECE: usize = 4;

const I_SHAPES: &[ShapeGrid] = &[
    &[
        &[0, 0, 0, 0],
        &[1, 1, 1, 1],
        &[0, 0, 0, 0],
        &[0, 0, 0, 0],
    ],
    &[
        &[0, 0, 1, 0],
        &[0, 0, 1, 0],
        &[0, 0, 1, 0],
        &[0, 0, 1, 0],
    ],
];

const O_SHAPES: &[ShapeGrid] = &[&[&[1, 1], &[1, 1]]];

const T_SHAPES: &[ShapeGrid] = &[
    &[&[0, 1, 0], &[1, 1, 1], &[0, 0, 0]],
    &[&[0, 1, 0], &[0, 1, 1], &[0, 1, 0]],
    &[&[0, 0, 0], &[1, 1, 1], &[0, 1, 0]],
    &[&[0, 1, 0], &[1, 1, 0], &[0, 1, 0]],
];

const S_SHAPES: &[ShapeGrid] = &[
    &[&[0, 1, 1], &[1, 1, 0], &[0, 0, 0]],
    &[&[0, 1, 0], &[0, 1, 1], &[0, 0, 1]],
];

const Z_SHAPES: &[ShapeGrid] = &[
    &[&[1, 1, 0], &[0, 1, 1], &[0, 0, 0]],
    &[&[0, 0, 1], &[0, 1, 1], &[0, 1, 0]],
];

const J_SHAPES: &[ShapeGrid] = &[
    &[&[1, 0, 0], &[1, 1, 1], &[0, 0, 0]],
    &[&[0, 1, 1], &[0, 1, 0], &[0, 1, 0]],
    &[&[0, 0, 0], &[1, 1, 1], &[0, 0, 1]],
    &[&[0, 1, 0], &[0, 1, 0], &[1, 1, 0]],
];

const L_SHAPES: &[ShapeGrid] = &[
    &[&[0, 0, 1], &[1, 1, 1], &[0, 0, 0]],
    &[&[0, 1, 0], &[0, 1, 0], &[0, 1, 1]],
    &[&[0, 0, 0], &[1, 1, 1], &[1, 0, 0]],
    &[&[1, 1, 0], &[0, 1, 0], &[0, 1, 0]],
];

/// Ordered rotation states for a kind.
pub fn shapes_of(kind: PieceKind) -> &'static [ShapeGrid] {
    match kind {
        PieceKind::I => I_SHAPES,
        PieceKind::O => O_SHAPES,
        PieceKind::T => T_SHAPES,
        PieceKind::S => S_SHAPES,
        PieceKind::Z => Z_SHAPES,
        PieceKind::J => J_SHAPES,
        PieceKind::L => L_SHAPES,
    }
}

/// Rotation state at a cyclic index (rotating past the last state wraps to
/// the first).
pub fn shape_at(kind: PieceKind, rotation: usize) -> ShapeGrid {
    let shapes = shapes_of(kind);
    shapes[rotation % shapes.len()]
}

/// Display color as packed RGB.
pub fn color_of(kind: PieceKind) -> u32 {
    match kind {
        PieceKind::I => 0x00FFFF, // cyan
        PieceKind::O => 0xFFFF00, // yellow
        PieceKind::T => 0x800080, // purple
        PieceKind::S => 0x00FF00, // green
        PieceKind::Z => 0xFF0000, // red
        PieceKind::J => 0x0000FF, // blue
        PieceKind::L => 0xFFA500, // orange
    }
}

/// Display name.
pub fn name_of(kind: PieceKind) -> &'static str {
    kind.as_str()
}

/// Draw a kind uniformly at random from the seven.
pub fn random_kind(rng: &mut dyn RandomSource) -> PieceKind {
    let idx = rng.next_range(PieceKind::ALL.len() as u32) as usize;
    PieceKind::ALL[idx]
}

/// Resolve an externally supplied kind identifier.
///
/// Internal callers always hold a valid [`PieceKind`]; this is the boundary
/// for names arriving from outside (saved data, test fixtures).
pub fn kind_from_name(name: &str) -> Result<PieceKind, CoreError> {
    PieceKind::ALL
        .iter()
        .copied()
        .find(|k| k.as_str().eq_ignore_ascii_case(name))
        .ok_or_else(|| CoreError::InvalidPieceKind(name.to_string()))
}
