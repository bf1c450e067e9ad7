//! Sample frame type and PCM conversion helpers.

pub mod sample;

pub use sample::Sample;
