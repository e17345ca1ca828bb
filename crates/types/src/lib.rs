//! Core types module - shared data structures and constants
//!
//! This crate defines the plain data used across the workspace: board
//! dimensions, movement and rotation speeds, the piece identity token and the
//! per-tick input snapshot. Nothing here has behavior beyond small conversions,
//! so it can be used by the core, the terminal shell and tests alike.
//!
//! # Board Dimensions
//!
//! - **Width**: 10 columns (indexed 0-9, left to right)
//! - **Height**: 20 rows (indexed 0-19, **row 0 is the bottom**)
//! - **Spawn anchor**: column 3, row 20 (just above the visible board)
//!
//! # Speeds
//!
//! All speeds are per second and are scaled by the frame delta:
//!
//! | Constant | Value | Description |
//! |----------|-------|-------------|
//! | `SIDE_SPEED` | 10.0 | Horizontal tween, cells/s |
//! | `SLOW_FALL_SPEED` | 2.0 | Default gravity, cells/s |
//! | `FAST_FALL_SPEED` | 8.0 | Gravity while soft drop is held, cells/s |
//! | `ROTATION_SPEED` | 720.0 | Rotation animation, degrees/s |
//! | `SPEED_INCREASE` | 0.01 | Speed multiplier gained per lock |
//!
//! # Examples
//!
//! ```
//! use blockfall_types::{PieceKind, InputFrame, GRID_WIDTH, GRID_HEIGHT};
//!
//! let kind = PieceKind::T;
//! assert_eq!(kind.code(), 3);
//! assert_eq!(PieceKind::from_code(kind.code()), Some(kind));
//!
//! let input = InputFrame { left: true, ..InputFrame::default() };
//! assert!(input.left && !input.rotate);
//!
//! assert_eq!(GRID_WIDTH, 10);
//! assert_eq!(GRID_HEIGHT, 20);
//! ```

use serde::{Deserialize, Serialize};

/// Board width in cells
pub const GRID_WIDTH: u8 = 10;
/// Board height in cells
pub const GRID_HEIGHT: u8 = 20;

/// Largest local shape grid (4x4 for the long and square pieces)
pub const MAX_SHAPE_SIZE: usize = 4;

/// Spawn anchor: horizontally centered for a 4-wide grid, at the top boundary row
pub const SPAWN_COL: i8 = (GRID_WIDTH as i8 - MAX_SHAPE_SIZE as i8) / 2;
pub const SPAWN_ROW: i8 = GRID_HEIGHT as i8;

/// Fixed timestep used by the terminal shell (~60 FPS)
pub const TICK_MS: u32 = 16;

pub const SIDE_SPEED: f32 = 10.0;
pub const SLOW_FALL_SPEED: f32 = 2.0;
pub const FAST_FALL_SPEED: f32 = 8.0;
pub const ROTATION_SPEED: f32 = 720.0;
pub const SPEED_INCREASE: f32 = 0.01;

/// Angle queued for the rotation animation of one clockwise turn
pub const QUARTER_TURN_DEGREES: f32 = 90.0;

/// Line clear scoring (Classic rules), indexed by rows cleared
pub const LINE_SCORES: [u32; 5] = [0, 40, 100, 300, 1200];

/// Lines needed per level
pub const LINES_PER_LEVEL: u32 = 10;

/// Piece identities. Doubles as the opaque visual token stored in locked cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PieceKind {
    I,
    O,
    T,
    S,
    Z,
    J,
    L,
}

impl PieceKind {
    pub const ALL: [PieceKind; 7] = [
        PieceKind::I,
        PieceKind::O,
        PieceKind::T,
        PieceKind::S,
        PieceKind::Z,
        PieceKind::J,
        PieceKind::L,
    ];

    /// Non-zero cell code used by `u8` board snapshots (0 means empty)
    pub fn code(&self) -> u8 {
        match self {
            PieceKind::I => 1,
            PieceKind::O => 2,
            PieceKind::T => 3,
            PieceKind::S => 4,
            PieceKind::Z => 5,
            PieceKind::J => 6,
            PieceKind::L => 7,
        }
    }

    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            1 => Some(PieceKind::I),
            2 => Some(PieceKind::O),
            3 => Some(PieceKind::T),
            4 => Some(PieceKind::S),
            5 => Some(PieceKind::Z),
            6 => Some(PieceKind::J),
            7 => Some(PieceKind::L),
            _ => None,
        }
    }
}

/// Cell on the board (None = empty, Some = locked block with its visual token)
pub type Cell = Option<PieceKind>;

/// Horizontal move request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveDirection {
    Left,
    Right,
}

impl MoveDirection {
    pub fn dx(&self) -> i8 {
        match self {
            MoveDirection::Left => -1,
            MoveDirection::Right => 1,
        }
    }
}

/// Input sampled once per tick and handed to the session.
///
/// `left`, `right` and `soft_drop` are levels (true while held). `rotate` and
/// `hold` are edges (true only on the tick the key was pressed).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct InputFrame {
    pub left: bool,
    pub right: bool,
    pub soft_drop: bool,
    pub rotate: bool,
    pub hold: bool,
}

impl InputFrame {
    pub fn is_idle(&self) -> bool {
        *self == InputFrame::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_piece_codes_roundtrip_and_are_nonzero() {
        for kind in PieceKind::ALL {
            assert_ne!(kind.code(), 0);
            assert_eq!(PieceKind::from_code(kind.code()), Some(kind));
        }
        assert_eq!(PieceKind::from_code(0), None);
        assert_eq!(PieceKind::from_code(8), None);
    }

    #[test]
    fn test_spawn_anchor() {
        assert_eq!(SPAWN_COL, 3);
        assert_eq!(SPAWN_ROW, 20);
    }

    #[test]
    fn test_input_frame_idle() {
        assert!(InputFrame::default().is_idle());
        let frame = InputFrame {
            hold: true,
            ..InputFrame::default()
        };
        assert!(!frame.is_idle());
    }
}
