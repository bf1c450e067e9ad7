//! Per-voice signal processing used by the mixing pull.

pub mod pan;
pub mod resampler;
pub mod spectrum;

pub use pan::pan_gains;
pub use resampler::Resampler;
pub use spectrum::{magnitude_spectrum, FftWindow};
