//! Injected diagnostic hook.
//!
//! The manager never writes to a process-wide callback of its own. It is
//! handed a [`LogHook`] at construction; the default hook forwards into the
//! `log` facade so an application-installed logger sees every message.

use std::sync::Arc;

use log::Level;

/// Callback receiving diagnostic messages from the engine.
pub type LogHook = Arc<dyn Fn(Level, &str) + Send + Sync>;

/// Hook that forwards messages to the `log` facade.
pub fn log_facade() -> LogHook {
    Arc::new(|level, message| log::log!(target: "osm", level, "{}", message))
}

/// Hook that drops every message.
pub fn silent() -> LogHook {
    Arc::new(|_, _| {})
}
