//! Per-voice playback state.

use std::fmt::{Display, Formatter};
use std::sync::Arc;

use crate::dsp::Resampler;
use crate::sound::Sound;

/// Identifier of a live voice.
///
/// Ids are allocated monotonically and never shared by two live voices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct VoiceId(pub(crate) u32);

impl VoiceId {
    /// Raw integer value of the id.
    pub fn raw(self) -> u32 {
        self.0
    }
}

impl Display for VoiceId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "voice#{}", self.0)
    }
}

/// Linear fade envelope.
///
/// `volume` moves toward `target` by `gradient` per output frame and stops
/// exactly on the target.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct Fade {
    pub(crate) gradient: f32,
    pub(crate) volume: f32,
    pub(crate) target: f32,
    /// Remove the voice once the envelope settles at silence.
    pub(crate) stop_when_silent: bool,
}

impl Fade {
    pub(crate) fn idle() -> Self {
        Self {
            gradient: 0.0,
            volume: 1.0,
            target: 1.0,
            stop_when_silent: false,
        }
    }

    /// Ramp from `from` to `target` moving `step` per frame.
    fn ramp(&mut self, from: f32, target: f32, step: f32) {
        self.volume = from;
        self.target = target;
        if !step.is_finite() || step <= 0.0 || from == target {
            self.volume = target;
            self.gradient = 0.0;
        } else if target > from {
            self.gradient = step;
        } else {
            self.gradient = -step;
        }
    }

    /// Full 0 → 1 ramp over `seconds`.
    pub(crate) fn fade_in(&mut self, seconds: f32, sample_rate: u32) {
        self.stop_when_silent = false;
        self.ramp(0.0, 1.0, unit_step(seconds, sample_rate));
    }

    /// Ramp from the current level to silence at the full-range rate.
    pub(crate) fn fade_out(&mut self, seconds: f32, sample_rate: u32) {
        self.stop_when_silent = true;
        self.ramp(self.volume, 0.0, unit_step(seconds, sample_rate));
    }

    /// Ramp from the current level to `target`, arriving after `seconds`.
    pub(crate) fn fade_to(&mut self, seconds: f32, target: f32, sample_rate: u32) {
        self.stop_when_silent = false;
        let target = if target.is_finite() { target.max(0.0) } else { 1.0 };
        let span = (target - self.volume).abs();
        self.ramp(self.volume, target, span * unit_step(seconds, sample_rate));
    }

    /// Return the level for the current frame, then advance one frame.
    #[inline]
    pub(crate) fn step(&mut self) -> f32 {
        let level = self.volume;
        if self.gradient != 0.0 {
            self.volume += self.gradient;
            let arrived = if self.gradient > 0.0 {
                self.volume >= self.target
            } else {
                self.volume <= self.target
            };
            if arrived {
                self.volume = self.target;
                self.gradient = 0.0;
            }
        }
        level
    }

    pub(crate) fn is_active(&self) -> bool {
        self.gradient != 0.0
    }

    pub(crate) fn settled_silent(&self) -> bool {
        self.stop_when_silent && !self.is_active() && self.volume <= 0.0
    }
}

fn unit_step(seconds: f32, sample_rate: u32) -> f32 {
    if !seconds.is_finite() || seconds <= 0.0 {
        return f32::INFINITY;
    }
    1.0 / (seconds * sample_rate.max(1) as f32)
}

/// One active playback instance of a [`Sound`].
#[derive(Debug)]
pub(crate) struct Voice {
    pub(crate) sound: Arc<Sound>,
    /// Next source frame to read.
    pub(crate) cursor: i64,
    pub(crate) paused: bool,
    pub(crate) volume: f32,
    pub(crate) fade: Fade,
    pub(crate) speed_enabled: bool,
    pub(crate) playback_speed: f32,
    /// Present while speed is enabled, or while the resource rate differs
    /// from the output rate.
    pub(crate) resampler: Option<Resampler>,
    pub(crate) panning: f32,
}

impl Voice {
    pub(crate) fn new(sound: Arc<Sound>) -> Self {
        Self {
            sound,
            cursor: 0,
            paused: false,
            volume: 1.0,
            fade: Fade::idle(),
            speed_enabled: false,
            playback_speed: 1.0,
            resampler: None,
            panning: 0.0,
        }
    }

    /// Attach or detach the speed resampler. Detaching drops its phase.
    pub(crate) fn set_speed_enabled(&mut self, enabled: bool) {
        self.speed_enabled = enabled;
        if enabled {
            self.resampler.get_or_insert_with(Resampler::new);
        } else {
            self.resampler = None;
        }
    }

    /// Source frames advanced per output frame, or `None` when frames can be
    /// copied straight through.
    pub(crate) fn resample_ratio(&self, output_rate: u32) -> Option<f64> {
        let speed = if self.speed_enabled {
            self.playback_speed as f64
        } else {
            1.0
        };
        let ratio = speed * self.sound.sample_rate() as f64 / output_rate.max(1) as f64;
        if self.resampler.is_none() && ratio == 1.0 {
            None
        } else {
            Some(ratio)
        }
    }

    /// Fraction of the resource already played, in `[0, 1]`.
    pub(crate) fn playback_percent(&self) -> f32 {
        let total = self.sound.sample_count();
        if total == 0 {
            return 0.0;
        }
        (self.cursor as f64 / total as f64).clamp(0.0, 1.0) as f32
    }
}
