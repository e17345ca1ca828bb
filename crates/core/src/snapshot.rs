//! Per-frame read-only view of a session for renderers.
//!
//! Everything is `Copy` and fixed-size, so the shell can refill one snapshot
//! every frame with `snapshot_into` without allocating.

use crate::catalog::ShapeGrid;
use crate::controller::ActivePiece;
use crate::types::{PieceKind, GRID_HEIGHT, GRID_WIDTH};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ActiveSnapshot {
    pub kind: PieceKind,
    pub shape: ShapeGrid,
    /// Continuous position of the local grid origin
    pub x: f32,
    pub y: f32,
    /// Visual clockwise rotation, degrees
    pub angle: f32,
    pub target_col: i8,
    pub target_row: i8,
}

impl From<&ActivePiece> for ActiveSnapshot {
    fn from(value: &ActivePiece) -> Self {
        Self {
            kind: value.kind,
            shape: *value.shape(),
            x: value.x,
            y: value.y,
            angle: value.angle(),
            target_col: value.target_col,
            target_row: value.target_row,
        }
    }
}

/// Read-only view of a session for renderers, one value per frame
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct GameSnapshot {
    /// Piece codes indexed `[row][col]`, row 0 at the bottom (0 = empty)
    pub board: [[u8; GRID_WIDTH as usize]; GRID_HEIGHT as usize],
    pub active: Option<ActiveSnapshot>,
    pub held: Option<PieceKind>,
    pub next: Option<PieceKind>,
    pub can_swap: bool,
    pub score: u32,
    pub lines: u32,
    pub level: u32,
    pub game_over: bool,
}

impl GameSnapshot {
    pub fn playable(&self) -> bool {
        !self.game_over
    }

    /// Locked cells as (col, row, kind)
    pub fn locked_cells(&self) -> impl Iterator<Item = (i8, i8, PieceKind)> + '_ {
        self.board.iter().enumerate().flat_map(|(row, line)| {
            line.iter().enumerate().filter_map(move |(col, &code)| {
                PieceKind::from_code(code).map(|kind| (col as i8, row as i8, kind))
            })
        })
    }
}
