//! Stderr logger for the `osm` binary.

use std::sync::OnceLock;

use log::{LevelFilter, Log, Metadata, Record};

struct StderrLogger {
    level: LevelFilter,
}

impl Log for StderrLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        eprintln!("[{}] {}", record.level(), record.args());
    }

    fn flush(&self) {}
}

static LOGGER: OnceLock<StderrLogger> = OnceLock::new();

fn level_from_env() -> LevelFilter {
    match std::env::var("RUST_LOG") {
        Ok(level) => match level.to_lowercase().as_str() {
            "off" => LevelFilter::Off,
            "error" => LevelFilter::Error,
            "info" => LevelFilter::Info,
            "debug" => LevelFilter::Debug,
            "trace" => LevelFilter::Trace,
            _ => LevelFilter::Warn,
        },
        Err(_) => LevelFilter::Warn,
    }
}

/// Install the logger. `debug` forces debug level regardless of `RUST_LOG`.
pub fn init(debug: bool) {
    let level = if debug {
        LevelFilter::Debug
    } else {
        level_from_env()
    };
    let logger = LOGGER.get_or_init(|| StderrLogger { level });
    if log::set_logger(logger).is_ok() {
        log::set_max_level(level);
    }
}
