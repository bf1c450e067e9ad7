//! Errors surfaced by the `osm` commands.

use std::fmt::{Display, Formatter};

#[derive(Debug)]
pub enum CliError {
    Io(std::io::Error),
    Wav(hound::Error),
    Json(serde_json::Error),
    /// A command-line value could not be parsed.
    Argument(String),
    /// An input file could not be loaded as a sound.
    Load(String),
    /// The audio backend failed to start.
    Backend,
}

impl Display for CliError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(err) => write!(f, "i/o error: {}", err),
            Self::Wav(err) => write!(f, "wave writer error: {}", err),
            Self::Json(err) => write!(f, "json error: {}", err),
            Self::Argument(message) => write!(f, "invalid argument: {}", message),
            Self::Load(path) => write!(f, "could not load {}", path),
            Self::Backend => write!(f, "audio backend failed to start"),
        }
    }
}

impl std::error::Error for CliError {}

impl From<std::io::Error> for CliError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<hound::Error> for CliError {
    fn from(value: hound::Error) -> Self {
        Self::Wav(value)
    }
}

impl From<serde_json::Error> for CliError {
    fn from(value: serde_json::Error) -> Self {
        Self::Json(value)
    }
}

pub type Result<T> = std::result::Result<T, CliError>;
