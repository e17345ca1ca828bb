//! Blockfall (workspace facade crate).
//!
//! Re-exports the workspace crates under one name so the binary, benches and
//! integration tests can use `blockfall::{core,input,term,types}`.

pub mod lock_log;

pub use blockfall_core as core;
pub use blockfall_input as input;
pub use blockfall_term as term;
pub use blockfall_types as types;
