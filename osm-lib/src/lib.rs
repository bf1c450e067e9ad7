//! # OSM Audio Library
//!
//! Real-time voice mixing for in-memory sound assets. Load WAVE or Ogg Vorbis
//! data into a [`Sound`], play it any number of times as voices through a
//! [`Manager`], and shape each voice with volume, fades, pan and playback
//! speed. The manager mixes every live voice into a stereo `f32` stream that
//! a [`Backend`] sends to the output device.

pub mod audio;
pub mod backend;
pub mod config;
pub mod constants;
pub mod decode;
pub mod dsp;
pub mod error;
pub mod logging;
pub mod playback;
pub mod sound;
mod tools;

pub use audio::Sample;
pub use backend::{Backend, BlockReader, MixSource, NullBackend};
pub use config::{BackendKind, MixerSettings, PanLaw};
pub use dsp::FftWindow;
pub use error::{BackendError, SoundError};
pub use logging::LogHook;
pub use playback::{Manager, VoiceId};
pub use sound::{Sound, SoundMode};

#[cfg(feature = "rodio-backend")]
pub use backend::RodioBackend;
