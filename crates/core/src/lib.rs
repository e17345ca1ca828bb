//! Core game logic - pure, deterministic, and testable
//!
//! This crate contains the falling-block rules and simulation. It has no
//! dependency on terminals or I/O, so the same session runs headless in tests,
//! benches and the terminal shell.
//!
//! # Module Structure
//!
//! - [`catalog`]: piece shape templates and clockwise rotation
//! - [`rng`]: bag sequencer over catalog indices with an injectable generator
//! - [`grid`]: 10x20 playfield, row 0 at the bottom, with row clearing
//! - [`controller`]: the falling piece: tweens, gravity, kicks, hold
//! - [`session`]: per-frame update, merge, scoring and game over
//! - [`scoring`]: classic line-clear points and levels
//! - [`snapshot`]: copyable per-frame view for renderers
//! - [`config`]: tuning with environment overrides
//!
//! # Game Rules
//!
//! - Pieces spawn at column 3, row 20 (just above the visible field)
//! - Horizontal moves and gravity retarget an integer cell; the continuous
//!   position tweens toward it at a per-second speed
//! - Rotation is clockwise only, with a one-column kick (right, then left)
//! - A piece locks as soon as it rests on its target with nothing below
//! - Hold is allowed once per lock
//! - Locking any cell at or above the top row ends the game
//!
//! # Example
//!
//! ```
//! use blockfall_core::GameSession;
//! use blockfall_types::InputFrame;
//!
//! let mut session = GameSession::new(12345);
//! session.start();
//!
//! let input = InputFrame { soft_drop: true, ..InputFrame::default() };
//! while !session.update(1.0 / 60.0, &input) {}
//!
//! assert_eq!(session.grid().occupied_count(), 4);
//! assert_eq!(session.pieces_locked(), 1);
//! ```

pub mod catalog;
pub mod config;
pub mod controller;
pub mod error;
pub mod grid;
pub mod rng;
pub mod scoring;
pub mod session;
pub mod snapshot;

pub use blockfall_types as types;

pub use catalog::{PieceCatalog, PieceTemplate, ShapeGrid};
pub use config::SessionConfig;
pub use controller::{ActivePiece, ActivePieceController, Advance, HeldPiece, MotionSpeeds};
pub use error::CatalogError;
pub use grid::PlayfieldGrid;
pub use rng::{RandomSource, SimpleRng, SpawnSequencer};
pub use scoring::{calculate_level, calculate_line_score};
pub use session::{GameSession, LockEvent};
pub use snapshot::{ActiveSnapshot, GameSnapshot};
