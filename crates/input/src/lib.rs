//! Terminal input module (session-facing).
//!
//! This crate is independent of any UI framework. It maps `crossterm` key
//! events onto game bindings and tracks held keys so the shell can hand the
//! session one [`crate::types::InputFrame`] per tick (including on terminals
//! without key-release events).

pub mod handler;
pub mod map;

pub use blockfall_types as types;

pub use handler::{HorizontalDirection, InputState};
pub use map::{binding_for, handle_key_event, should_quit, Binding};
