//! Terminal rendering for the block-fall game.
//!
//! A small, game-oriented rendering layer: the session snapshot is drawn into
//! a framebuffer of styled cells, which is then flushed to the terminal as a
//! diff against the previous frame. Each board cell is 2 characters wide to
//! compensate for terminal glyph aspect ratio.

pub mod fb;
pub mod game_view;
pub mod renderer;

pub use blockfall_core as core;
pub use blockfall_types as types;

pub use fb::{Cell, CellStyle, FrameBuffer, Rgb};
pub use game_view::{GameView, Viewport};
pub use renderer::TerminalRenderer;
