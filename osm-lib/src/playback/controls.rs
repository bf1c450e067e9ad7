//! Voice-level control operations for `Manager`.
//!
//! Every call takes the mixer lock briefly. Calls naming an id that is not
//! live are no-ops; getters return `None` for them.

use std::sync::Arc;

use log::Level;

use crate::audio::Sample;
use crate::dsp::{magnitude_spectrum, FftWindow};
use crate::sound::{Sound, SoundMode};
use crate::tools::{lock, seconds_to_frames};

use super::mixer::read_source;
use super::voice::{Voice, VoiceId};
use super::Manager;

impl Manager {
    fn with_voice<R>(&self, id: VoiceId, f: impl FnOnce(&mut Voice) -> R) -> Option<R> {
        lock(&self.state).voice_mut(id).map(f)
    }

    /// Start a new voice for `sound` at its first frame.
    pub fn play(&self, sound: &Arc<Sound>) -> VoiceId {
        let id = lock(&self.state).add_voice(sound.clone());
        self.emit(Level::Debug, &format!("{} started", id));
        id
    }

    /// Remove a voice. Its sound stays alive while other holders remain.
    pub fn stop(&self, id: VoiceId) {
        if lock(&self.state).voices.remove(&id).is_some() {
            self.emit(Level::Debug, &format!("{} stopped", id));
        }
    }

    /// Remove every voice.
    pub fn stop_all(&self) {
        let removed = lock(&self.state).clear();
        if removed > 0 {
            self.emit(Level::Debug, &format!("stopped {} voices", removed));
        }
    }

    pub fn pause(&self, id: VoiceId) {
        self.with_voice(id, |voice| voice.paused = true);
    }

    pub fn resume(&self, id: VoiceId) {
        self.with_voice(id, |voice| voice.paused = false);
    }

    pub fn is_playing(&self, id: VoiceId) -> bool {
        lock(&self.state).voice(id).is_some()
    }

    pub fn is_paused(&self, id: VoiceId) -> Option<bool> {
        lock(&self.state).voice(id).map(|voice| voice.paused)
    }

    /// Number of live voices.
    pub fn voice_count(&self) -> usize {
        lock(&self.state).voices.len()
    }

    /// Set the linear gain applied after the fade envelope.
    pub fn set_volume(&self, id: VoiceId, volume: f32) {
        let volume = if volume.is_finite() { volume } else { 1.0 };
        self.with_voice(id, |voice| voice.volume = volume);
    }

    pub fn get_volume(&self, id: VoiceId) -> Option<f32> {
        lock(&self.state).voice(id).map(|voice| voice.volume)
    }

    /// Ramp the envelope from silence to unity over `seconds`.
    pub fn fade_in(&self, id: VoiceId, seconds: f32) {
        let rate = self.settings.sample_rate;
        self.with_voice(id, |voice| voice.fade.fade_in(seconds, rate));
    }

    /// Ramp the envelope to silence and remove the voice when it gets there.
    ///
    /// The ramp moves at the same rate as a full fade in of `seconds`, so a
    /// voice already below unity falls silent sooner.
    pub fn fade_out(&self, id: VoiceId, seconds: f32) {
        let rate = self.settings.sample_rate;
        self.with_voice(id, |voice| voice.fade.fade_out(seconds, rate));
    }

    /// Ramp the envelope from its current level to `target` over `seconds`.
    pub fn fade(&self, id: VoiceId, seconds: f32, target: f32) {
        let rate = self.settings.sample_rate;
        self.with_voice(id, |voice| voice.fade.fade_to(seconds, target, rate));
    }

    /// Current envelope level.
    pub fn get_fade_volume(&self, id: VoiceId) -> Option<f32> {
        lock(&self.state).voice(id).map(|voice| voice.fade.volume)
    }

    /// Stereo position from -1 (left) to +1 (right). Out-of-range values are
    /// clamped.
    pub fn set_pan(&self, id: VoiceId, position: f32) {
        let position = if position.is_finite() {
            position.clamp(-1.0, 1.0)
        } else {
            0.0
        };
        self.with_voice(id, |voice| voice.panning = position);
    }

    pub fn get_pan(&self, id: VoiceId) -> Option<f32> {
        lock(&self.state).voice(id).map(|voice| voice.panning)
    }

    /// Attach or detach the voice's speed resampler.
    pub fn set_playback_speed_enabled(&self, id: VoiceId, enabled: bool) {
        self.with_voice(id, |voice| voice.set_speed_enabled(enabled));
    }

    pub fn is_playback_speed_enabled(&self, id: VoiceId) -> Option<bool> {
        lock(&self.state).voice(id).map(|voice| voice.speed_enabled)
    }

    /// Playback speed multiplier. Takes effect while speed is enabled.
    pub fn set_playback_speed(&self, id: VoiceId, speed: f32) {
        if !speed.is_finite() || speed <= 0.0 {
            self.emit(
                Level::Warn,
                &format!("ignoring playback speed {} for {}", speed, id),
            );
            return;
        }
        self.with_voice(id, |voice| voice.playback_speed = speed);
    }

    pub fn get_playback_speed(&self, id: VoiceId) -> Option<f32> {
        lock(&self.state).voice(id).map(|voice| voice.playback_speed)
    }

    /// Fraction of the sound already played, in `[0, 1]`.
    pub fn get_playback_percent(&self, id: VoiceId) -> Option<f32> {
        lock(&self.state)
            .voice(id)
            .map(|voice| voice.playback_percent())
    }

    /// Current position in seconds of source time.
    pub fn get_playback_position(&self, id: VoiceId) -> Option<f32> {
        lock(&self.state)
            .voice(id)
            .map(|voice| voice.cursor as f32 / voice.sound.sample_rate().max(1) as f32)
    }

    /// Move a voice to `seconds` into its sound, clamped to the sound's
    /// length. Resampler phase is dropped.
    pub fn set_playback_position(&self, id: VoiceId, seconds: f32) {
        self.with_voice(id, |voice| {
            let mut frame = seconds_to_frames(seconds, voice.sound.sample_rate());
            if voice.sound.mode() != SoundMode::Procedural {
                frame = frame.min(voice.sound.sample_count() as i64);
            }
            voice.cursor = frame;
            if let Some(resampler) = voice.resampler.as_mut() {
                resampler.reset();
            }
        });
    }

    /// Magnitude spectrum of the audio just ahead of the voice's cursor.
    ///
    /// Reads `2 * spectrum.len()` frames without moving the cursor, folds
    /// them to mono and writes `|X[k]| / N` into `spectrum`. Unknown ids and
    /// procedural voices leave `spectrum` zeroed.
    pub fn get_spectrum(&self, id: VoiceId, spectrum: &mut [f32], window: FftWindow) {
        spectrum.fill(0.0);
        if spectrum.is_empty() {
            return;
        }
        let Some((sound, cursor)) = lock(&self.state)
            .voice(id)
            .map(|voice| (voice.sound.clone(), voice.cursor))
        else {
            return;
        };
        if sound.mode() == SoundMode::Procedural {
            return;
        }

        let mut frames = vec![Sample::SILENCE; spectrum.len() * 2];
        read_source(&sound, cursor, &mut frames);
        let mono: Vec<f32> = frames.iter().map(|frame| frame.to_mono()).collect();
        magnitude_spectrum(&mono, spectrum, window);
    }
}
