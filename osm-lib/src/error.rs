//! Error types for resource loading and backend setup.

use std::fmt::{Display, Formatter};

/// Error raised while loading a sound resource.
#[derive(Debug, Clone, PartialEq)]
pub enum SoundError {
    /// The input buffer was empty.
    EmptyInput,
    /// No decoder recognizes the data.
    UnsupportedFormat,
    /// The format was recognized but its header could not be parsed.
    HeaderInvalid(String),
    /// The decoded buffer could not be allocated.
    AllocationFailure,
    /// The stream failed while decoding samples.
    Decode(String),
}

impl Display for SoundError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyInput => write!(f, "empty input"),
            Self::UnsupportedFormat => write!(f, "unsupported format"),
            Self::HeaderInvalid(err) => write!(f, "invalid header: {}", err),
            Self::AllocationFailure => write!(f, "failed to allocate sample buffer"),
            Self::Decode(err) => write!(f, "decode error: {}", err),
        }
    }
}

impl std::error::Error for SoundError {}

/// Error raised while starting an output backend.
#[derive(Debug)]
pub enum BackendError {
    /// The output device or stream could not be opened.
    StreamOpen(String),
    /// The backend worker thread could not be started.
    Thread(std::io::Error),
}

impl Display for BackendError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::StreamOpen(err) => write!(f, "failed to open output stream: {}", err),
            Self::Thread(err) => write!(f, "failed to spawn backend thread: {}", err),
        }
    }
}

impl std::error::Error for BackendError {}

impl From<std::io::Error> for BackendError {
    fn from(value: std::io::Error) -> Self {
        Self::Thread(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sound_error_display() {
        assert_eq!(SoundError::EmptyInput.to_string(), "empty input");
        assert_eq!(
            SoundError::HeaderInvalid("missing fmt chunk".to_string()).to_string(),
            "invalid header: missing fmt chunk"
        );
    }

    #[test]
    fn backend_error_from_io() {
        let err: BackendError = std::io::Error::new(std::io::ErrorKind::Other, "boom").into();
        assert!(matches!(err, BackendError::Thread(_)));
    }
}
