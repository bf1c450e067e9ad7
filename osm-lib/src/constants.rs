//! Shared constants for mixing and playback defaults.

/// Default output sample rate used by the engine (Hz).
///
/// Resources are assumed to share this rate unless their decoder reports
/// otherwise.
pub const SAMPLE_RATE: u32 = 44100;

/// Default number of frames pulled per backend callback.
pub const DEFAULT_BLOCK_FRAMES: usize = 1024;
