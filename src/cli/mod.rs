//! Command definitions and per-command handlers.

pub mod args;
pub mod create;
pub mod mix;
pub mod play;
pub mod probe;
pub mod render;
