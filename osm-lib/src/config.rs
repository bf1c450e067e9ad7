//! Mixer configuration.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::constants::{DEFAULT_BLOCK_FRAMES, SAMPLE_RATE};

/// Stereo pan law used when splitting a voice into left/right gains.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum PanLaw {
    /// Balance law: the far channel is attenuated linearly, the near channel
    /// stays at unity. Centered pan gives unity on both sides.
    #[default]
    Linear,
    /// Sine/cosine law: equal power across the field, `-3 dB` at center.
    ConstantPower,
}

/// Output backend selected when the manager initializes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BackendKind {
    /// Default output device through `rodio`.
    Rodio,
    /// Headless real-time pull that discards output.
    Null,
}

impl Default for BackendKind {
    fn default() -> Self {
        if cfg!(feature = "rodio-backend") {
            BackendKind::Rodio
        } else {
            BackendKind::Null
        }
    }
}

/// Runtime settings for a [`crate::playback::Manager`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MixerSettings {
    /// Output sample rate in Hz.
    pub sample_rate: u32,
    /// Frames requested per backend pull.
    pub block_frames: usize,
    pub pan_law: PanLaw,
    pub backend: BackendKind,
    /// Attempts made to open the output device before giving up.
    pub stream_open_retries: usize,
    pub stream_open_retry_ms: u64,
}

impl Default for MixerSettings {
    fn default() -> Self {
        Self {
            sample_rate: SAMPLE_RATE,
            block_frames: DEFAULT_BLOCK_FRAMES,
            pan_law: PanLaw::default(),
            backend: BackendKind::default(),
            stream_open_retries: 20,
            stream_open_retry_ms: 100,
        }
    }
}

impl MixerSettings {
    /// Parse settings from a JSON document. Missing fields take defaults.
    pub fn from_json_str(json: &str) -> Result<Self, serde_json::Error> {
        let settings: MixerSettings = serde_json::from_str(json)?;
        Ok(settings.sanitized())
    }

    /// Read settings from a JSON file.
    pub fn from_json_file(path: impl AsRef<Path>) -> std::io::Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
            .map_err(|err| std::io::Error::new(std::io::ErrorKind::InvalidData, err))
    }

    /// Clamp values that would stall the pull loop.
    pub fn sanitized(mut self) -> Self {
        self.sample_rate = self.sample_rate.max(1);
        self.block_frames = self.block_frames.max(1);
        self.stream_open_retries = self.stream_open_retries.max(1);
        self
    }

    /// Duration of one backend block in seconds.
    pub fn block_seconds(&self) -> f64 {
        self.block_frames as f64 / self.sample_rate.max(1) as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_engine_rate() {
        let settings = MixerSettings::default();
        assert_eq!(settings.sample_rate, 44_100);
        assert_eq!(settings.pan_law, PanLaw::Linear);
    }

    #[test]
    fn partial_json_keeps_defaults() {
        let settings =
            MixerSettings::from_json_str(r#"{"block_frames":256,"pan_law":"constant_power"}"#)
                .expect("parse settings");
        assert_eq!(settings.block_frames, 256);
        assert_eq!(settings.pan_law, PanLaw::ConstantPower);
        assert_eq!(settings.sample_rate, 44_100);
    }

    #[test]
    fn zero_block_frames_sanitized() {
        let settings = MixerSettings::from_json_str(r#"{"block_frames":0,"backend":"null"}"#)
            .expect("parse settings");
        assert_eq!(settings.block_frames, 1);
        assert_eq!(settings.backend, BackendKind::Null);
    }

    #[test]
    fn settings_round_trip_through_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("mixer.json");
        let settings = MixerSettings {
            block_frames: 512,
            ..MixerSettings::default()
        };
        std::fs::write(&path, serde_json::to_string(&settings).unwrap()).unwrap();
        let loaded = MixerSettings::from_json_file(&path).expect("load settings");
        assert_eq!(loaded, settings);
    }
}
