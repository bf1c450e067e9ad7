//! Variable-speed resampling by linear interpolation.
//!
//! The resampler reads from a random-access source, so it carries only its
//! fractional phase between calls. Each call sees the source starting at the
//! voice cursor and reports how many source frames it consumed; the frame
//! after the last consumed one is read again on the next call as the
//! interpolation partner.

use crate::audio::Sample;

const MIN_RATIO: f64 = 1.0 / 64.0;
const MAX_RATIO: f64 = 64.0;

/// Stateful linear-interpolation resampler owned by a single voice.
#[derive(Debug, Clone, Default)]
pub struct Resampler {
    phase: f64,
}

fn sanitize_ratio(ratio: f64) -> f64 {
    if ratio.is_finite() {
        ratio.clamp(MIN_RATIO, MAX_RATIO)
    } else {
        1.0
    }
}

impl Resampler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drop the carried fractional phase.
    pub fn reset(&mut self) {
        self.phase = 0.0;
    }

    /// Source frames the next [`Resampler::process`] call must be given to
    /// produce `output_frames` frames at `ratio` source frames per output
    /// frame.
    pub fn input_frames(&self, output_frames: usize, ratio: f64) -> usize {
        if output_frames == 0 {
            return 0;
        }
        let ratio = sanitize_ratio(ratio);
        let last = self.phase + (output_frames - 1) as f64 * ratio;
        let lookahead = last.floor() as usize + 2;
        let consumed = (self.phase + output_frames as f64 * ratio).floor() as usize;
        lookahead.max(consumed)
    }

    /// Fill `output` from `input` and return the number of source frames
    /// consumed.
    ///
    /// `input` should hold [`Resampler::input_frames`] frames; missing frames
    /// read as silence.
    pub fn process(&mut self, input: &[Sample], output: &mut [Sample], ratio: f64) -> usize {
        let ratio = sanitize_ratio(ratio);
        let at = |index: usize| input.get(index).copied().unwrap_or(Sample::SILENCE);

        for (k, out) in output.iter_mut().enumerate() {
            let pos = self.phase + k as f64 * ratio;
            let base = pos.floor() as usize;
            let frac = (pos - base as f64) as f32;
            let a = at(base);
            let b = at(base + 1);
            *out = Sample::new(
                a.left + (b.left - a.left) * frac,
                a.right + (b.right - a.right) * frac,
            );
        }

        let end = self.phase + output.len() as f64 * ratio;
        let consumed = end.floor() as usize;
        self.phase = end - consumed as f64;
        consumed
    }
}
