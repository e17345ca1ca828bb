//! Construction-time errors.
//!
//! Gameplay itself never fails: rejected moves are silent and game over is
//! state. The only fallible step is building a piece catalog.

use thiserror::Error;

use crate::types::PieceKind;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CatalogError {
    #[error("piece catalog is empty")]
    Empty,

    #[error("piece {kind:?}: unsupported grid size {size} (expected 3 or 4)")]
    UnsupportedSize { kind: PieceKind, size: usize },

    #[error("piece {kind:?}: row {row} has {len} cells, expected {expected}")]
    RaggedRow {
        kind: PieceKind,
        row: usize,
        len: usize,
        expected: usize,
    },

    #[error("piece {kind:?}: invalid glyph {glyph:?} (use '#' or '.')")]
    InvalidGlyph { kind: PieceKind, glyph: char },

    #[error("piece {kind:?}: shape has no occupied cells")]
    EmptyShape { kind: PieceKind },
}
