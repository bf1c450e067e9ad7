//! Voice table and the per-block mixing pull.
//!
//! Everything here runs under the single mixer lock. Control calls and the
//! audio thread contend for the same [`MixerState`]; no method in this module
//! re-enters the lock.

use std::collections::BTreeMap;
use std::sync::Arc;

use log::Level;

use crate::audio::Sample;
use crate::config::PanLaw;
use crate::dsp::{pan_gains, Resampler};
use crate::logging::LogHook;
use crate::sound::{Sound, SoundMode};

use super::voice::{Voice, VoiceId};

/// Outcome of one loop-aware read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct SourceRead {
    /// Frames written to the destination.
    pub(crate) frames: usize,
    /// Source ran out before the destination was filled.
    pub(crate) ended: bool,
    /// Source position after the read.
    pub(crate) cursor: i64,
}

/// Read frames starting at `cursor`, wrapping at the loop end.
///
/// The sound is only read, never advanced; the caller decides where the
/// voice cursor moves.
pub(crate) fn read_source(sound: &Sound, cursor: i64, dest: &mut [Sample]) -> SourceRead {
    let region = sound.loop_frames();
    let mut pos = cursor.max(0);
    let mut filled = 0;
    let mut empty_wraps = 0;

    while filled < dest.len() {
        let mut want = dest.len() - filled;
        if let Some((start, end)) = region {
            if pos >= end {
                pos = start;
            }
            want = want.min((end - pos) as usize);
        }

        let got = sound.get_samples(&mut dest[filled..filled + want], pos as usize);
        filled += got;
        pos += got as i64;

        match region {
            Some((start, end)) => {
                if got == 0 {
                    empty_wraps += 1;
                    if empty_wraps > 1 {
                        return SourceRead {
                            frames: filled,
                            ended: true,
                            cursor: pos,
                        };
                    }
                } else {
                    empty_wraps = 0;
                }
                if pos >= end || got < want {
                    pos = start;
                }
            }
            None => {
                if got < want {
                    return SourceRead {
                        frames: filled,
                        ended: true,
                        cursor: pos,
                    };
                }
            }
        }
    }

    SourceRead {
        frames: filled,
        ended: false,
        cursor: pos,
    }
}

/// Cursor position after moving `frames` forward, wrapping at the loop end.
pub(crate) fn advance_cursor(sound: &Sound, cursor: i64, frames: usize) -> i64 {
    let mut pos = cursor.max(0);
    match sound.loop_frames() {
        Some((start, end)) => {
            if pos >= end {
                pos = start;
            }
            pos += frames as i64;
            if pos >= end {
                pos = start + (pos - end) % (end - start);
            }
            pos
        }
        None => {
            pos += frames as i64;
            if sound.mode() != SoundMode::Procedural {
                pos = pos.min(sound.sample_count() as i64);
            }
            pos
        }
    }
}

/// Shared state behind the mixer lock.
pub(crate) struct MixerState {
    pub(crate) voices: BTreeMap<VoiceId, Voice>,
    next_id: u32,
    pub(crate) sample_rate: u32,
    pan_law: PanLaw,
    log: LogHook,
    source_scratch: Vec<Sample>,
    voice_scratch: Vec<Sample>,
    finished: Vec<VoiceId>,
}

impl MixerState {
    pub(crate) fn new(sample_rate: u32, pan_law: PanLaw, log: LogHook) -> Self {
        Self {
            voices: BTreeMap::new(),
            next_id: 0,
            sample_rate,
            pan_law,
            log,
            source_scratch: Vec::new(),
            voice_scratch: Vec::new(),
            finished: Vec::new(),
        }
    }

    /// Next free id. Ids increase monotonically and skip any still live
    /// after the counter wraps.
    fn allocate_id(&mut self) -> VoiceId {
        loop {
            let id = VoiceId(self.next_id);
            self.next_id = self.next_id.wrapping_add(1);
            if !self.voices.contains_key(&id) {
                return id;
            }
        }
    }

    pub(crate) fn add_voice(&mut self, sound: Arc<Sound>) -> VoiceId {
        let id = self.allocate_id();
        self.voices.insert(id, Voice::new(sound));
        id
    }

    pub(crate) fn voice_mut(&mut self, id: VoiceId) -> Option<&mut Voice> {
        self.voices.get_mut(&id)
    }

    pub(crate) fn voice(&self, id: VoiceId) -> Option<&Voice> {
        self.voices.get(&id)
    }

    /// Mix every active voice into `dest` and return `dest.len()`.
    ///
    /// `dest` is zeroed first. Voices that run out of data, or finish a fade
    /// out, are removed once the pass over the table is complete.
    pub(crate) fn read_samples(&mut self, dest: &mut [Sample]) -> usize {
        dest.fill(Sample::SILENCE);
        let count = dest.len();
        if count == 0 {
            return 0;
        }

        let MixerState {
            voices,
            sample_rate,
            pan_law,
            log,
            source_scratch,
            voice_scratch,
            finished,
            ..
        } = self;

        if voice_scratch.len() < count {
            voice_scratch.resize(count, Sample::SILENCE);
        }

        finished.clear();
        for (id, voice) in voices.iter_mut() {
            if voice.paused {
                continue;
            }
            let rendered = &mut voice_scratch[..count];
            let ended = render_voice(voice, rendered, source_scratch, *sample_rate);
            accumulate(voice, rendered, dest, *pan_law);
            if ended || voice.fade.settled_silent() {
                finished.push(*id);
            }
        }

        for id in finished.drain(..) {
            if voices.remove(&id).is_some() {
                log(Level::Debug, &format!("{} finished", id));
            }
        }

        count
    }

    pub(crate) fn clear(&mut self) -> usize {
        let removed = self.voices.len();
        self.voices.clear();
        removed
    }
}

/// Fill `out` with the voice's next frames at the output rate and move its
/// cursor. Returns true when a non-looping source is exhausted.
fn render_voice(
    voice: &mut Voice,
    out: &mut [Sample],
    source_scratch: &mut Vec<Sample>,
    output_rate: u32,
) -> bool {
    let sound = voice.sound.clone();

    let Some(ratio) = voice.resample_ratio(output_rate) else {
        let read = read_source(&sound, voice.cursor, out);
        out[read.frames..].fill(Sample::SILENCE);
        voice.cursor = read.cursor;
        return read.ended || exhausted(&sound, voice.cursor);
    };

    let resampler = voice.resampler.get_or_insert_with(Resampler::new);
    let need = resampler.input_frames(out.len(), ratio);
    if source_scratch.len() < need {
        source_scratch.resize(need, Sample::SILENCE);
    }
    let input = &mut source_scratch[..need];
    let read = read_source(&sound, voice.cursor, input);
    input[read.frames..].fill(Sample::SILENCE);

    let consumed = resampler.process(input, out, ratio);
    voice.cursor = advance_cursor(&sound, voice.cursor, consumed);
    (read.ended && consumed >= read.frames) || exhausted(&sound, voice.cursor)
}

/// A non-looping finite sound whose cursor sits on or past its last frame.
fn exhausted(sound: &Sound, cursor: i64) -> bool {
    sound.loop_frames().is_none()
        && sound.mode() != SoundMode::Procedural
        && cursor >= sound.sample_count() as i64
}

/// Apply envelope, volume and pan to `rendered` and add it into `dest`.
fn accumulate(voice: &mut Voice, rendered: &[Sample], dest: &mut [Sample], pan_law: PanLaw) {
    let (pan_left, pan_right) = pan_gains(voice.panning, pan_law);
    for (frame, mixed) in rendered.iter().zip(dest.iter_mut()) {
        let gain = voice.fade.step() * voice.volume;
        mixed.left += frame.left * gain * pan_left;
        mixed.right += frame.right * gain * pan_right;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decode::test_fixtures::{ramp_float, ramp_wav};
    use crate::logging::silent;

    fn ramp_sound(frames: usize) -> Arc<Sound> {
        Arc::new(Sound::load(&ramp_wav(frames, 44_100), true).expect("load"))
    }

    #[test]
    fn read_source_stops_short_without_loop() {
        let sound = ramp_sound(100);
        let mut out = vec![Sample::SILENCE; 64];
        let read = read_source(&sound, 80, &mut out);
        assert_eq!(read.frames, 20);
        assert!(read.ended);
        assert_eq!(read.cursor, 100);
        assert_eq!(out[19].left, ramp_float(99));
    }

    #[test]
    fn read_source_wraps_at_loop_end() {
        let sound = ramp_sound(100);
        sound.set_looping(true);
        sound.set_loop_start(10.0 / 44_100.0);
        sound.set_loop_end(20.0 / 44_100.0);

        let mut out = vec![Sample::SILENCE; 30];
        let read = read_source(&sound, 15, &mut out);
        assert_eq!(read.frames, 30);
        assert!(!read.ended);
        assert_eq!(out[0].left, ramp_float(15));
        assert_eq!(out[4].left, ramp_float(19));
        assert_eq!(out[5].left, ramp_float(10));
        assert_eq!(out[15].left, ramp_float(10));
        assert_eq!(read.cursor, 15);
    }

    #[test]
    fn advance_matches_read_position() {
        let sound = ramp_sound(100);
        sound.set_looping(true);
        sound.set_loop_start(10.0 / 44_100.0);
        sound.set_loop_end(20.0 / 44_100.0);

        let mut out = vec![Sample::SILENCE; 37];
        for cursor in [0i64, 5, 12, 19, 25] {
            let read = read_source(&sound, cursor, &mut out);
            assert_eq!(advance_cursor(&sound, cursor, 37), read.cursor);
        }
    }

    #[test]
    fn advance_clamps_past_end() {
        let sound = ramp_sound(100);
        assert_eq!(advance_cursor(&sound, 90, 50), 100);
    }

    #[test]
    fn voice_ends_on_pull_reaching_last_frame() {
        let mut state = MixerState::new(44_100, PanLaw::Linear, silent());
        let id = state.add_voice(ramp_sound(100));

        let mut out = vec![Sample::SILENCE; 100];
        state.read_samples(&mut out);
        assert_eq!(out[99].left, ramp_float(99));
        assert!(state.voice(id).is_none());
    }

    #[test]
    fn resampled_voice_ends_on_pull_reaching_last_frame() {
        let sound = Arc::new(Sound::load(&ramp_wav(441, 22_050), true).expect("load"));
        let mut state = MixerState::new(44_100, PanLaw::Linear, silent());
        let id = state.add_voice(sound);

        let mut out = vec![Sample::SILENCE; 441];
        state.read_samples(&mut out);
        assert_eq!(state.voice(id).expect("voice").cursor, 220);
        state.read_samples(&mut out);
        assert!(state.voice(id).is_none());
    }

    #[test]
    fn looping_voice_survives_pull_reaching_loop_end() {
        let sound = ramp_sound(100);
        sound.set_looping(true);
        let mut state = MixerState::new(44_100, PanLaw::Linear, silent());
        let id = state.add_voice(sound);

        let mut out = vec![Sample::SILENCE; 100];
        state.read_samples(&mut out);
        assert_eq!(state.voice(id).expect("voice").cursor, 0);
    }

    #[test]
    fn paused_voice_is_skipped() {
        let mut state = MixerState::new(44_100, PanLaw::Linear, silent());
        let id = state.add_voice(ramp_sound(1_000));
        state.voice_mut(id).expect("voice").paused = true;

        let mut out = vec![Sample::new(1.0, 1.0); 32];
        assert_eq!(state.read_samples(&mut out), 32);
        assert!(out.iter().all(|frame| *frame == Sample::SILENCE));
        assert_eq!(state.voice(id).expect("voice").cursor, 0);
    }

    #[test]
    fn ids_skip_live_voices_after_wrap() {
        let mut state = MixerState::new(44_100, PanLaw::Linear, silent());
        state.next_id = u32::MAX;
        let last = state.add_voice(ramp_sound(10));
        assert_eq!(last.raw(), u32::MAX);
        let zero = state.add_voice(ramp_sound(10));
        assert_eq!(zero.raw(), 0);
        state.next_id = u32::MAX;
        let next = state.add_voice(ramp_sound(10));
        assert_eq!(next.raw(), 1);
    }
}
