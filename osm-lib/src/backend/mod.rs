//! Audio sinks that drain the mixer.
//!
//! A [`Backend`] owns whatever thread or device consumes mixed audio. It is
//! handed a [`MixSource`] at start-up and pulls stereo blocks from it until
//! finalized.

mod null;
#[cfg(feature = "rodio-backend")]
mod output;

use std::sync::{Arc, Mutex};

use dasp_ring_buffer::Bounded;

use crate::audio::Sample;
use crate::config::{BackendKind, MixerSettings};
use crate::error::BackendError;
use crate::logging::LogHook;
use crate::playback::mixer::MixerState;
use crate::tools::lock;

pub use null::NullBackend;
#[cfg(feature = "rodio-backend")]
pub use output::RodioBackend;

/// Consumer of mixed audio.
pub trait Backend: Send {
    /// Start pulling from `source`.
    fn initialize(&mut self, source: MixSource, settings: &MixerSettings)
        -> Result<(), BackendError>;

    /// Stop pulling and release the device. Must be idempotent.
    fn finalize(&mut self);

    fn name(&self) -> &'static str;
}

/// Build the backend named by `kind`.
///
/// Falls back to [`NullBackend`] when the device backend is compiled out.
pub fn create(kind: BackendKind, hook: LogHook) -> Box<dyn Backend> {
    match kind {
        BackendKind::Null => Box::new(NullBackend::new()),
        #[cfg(feature = "rodio-backend")]
        BackendKind::Rodio => Box::new(RodioBackend::new(hook)),
        #[cfg(not(feature = "rodio-backend"))]
        BackendKind::Rodio => {
            hook(
                log::Level::Warn,
                "rodio backend not compiled in, using null backend",
            );
            Box::new(NullBackend::new())
        }
    }
}

/// Cloneable handle through which a backend pulls mixed frames.
#[derive(Clone)]
pub struct MixSource {
    state: Arc<Mutex<MixerState>>,
}

impl MixSource {
    pub(crate) fn new(state: Arc<Mutex<MixerState>>) -> Self {
        Self { state }
    }

    /// Mix the next `dest.len()` frames into `dest`.
    pub fn read_samples(&self, dest: &mut [Sample]) -> usize {
        lock(&self.state).read_samples(dest)
    }

    pub fn sample_rate(&self) -> u32 {
        lock(&self.state).sample_rate
    }
}

/// Adapts block pulls to a per-sample interleaved stream.
///
/// Each refill mixes one block and queues its frames as left/right pairs.
pub struct BlockReader {
    source: MixSource,
    block: Vec<Sample>,
    pending: Bounded<Vec<f32>>,
}

impl BlockReader {
    pub fn new(source: MixSource, block_frames: usize) -> Self {
        let block_frames = block_frames.max(1);
        Self {
            source,
            block: vec![Sample::SILENCE; block_frames],
            pending: Bounded::from(vec![0.0; block_frames * 2]),
        }
    }

    /// Next interleaved sample, mixing a new block when the queue is empty.
    pub fn next_sample(&mut self) -> f32 {
        if let Some(sample) = self.pending.pop() {
            return sample;
        }
        self.refill();
        self.pending.pop().unwrap_or(0.0)
    }

    fn refill(&mut self) {
        let frames = self.source.read_samples(&mut self.block);
        for frame in &self.block[..frames] {
            self.pending.push(frame.left);
            self.pending.push(frame.right);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PanLaw;
    use crate::logging::silent;
    use crate::sound::Sound;

    fn source_with_constant(level: f32) -> MixSource {
        let mut state = MixerState::new(44_100, PanLaw::Linear, silent());
        let sound = Sound::procedural(
            move |dest: &mut [Sample]| dest.fill(Sample::new(level, -level)),
            44_100,
        );
        state.add_voice(Arc::new(sound));
        MixSource::new(Arc::new(Mutex::new(state)))
    }

    #[test]
    fn block_reader_interleaves() {
        let mut reader = BlockReader::new(source_with_constant(0.25), 4);
        let samples: Vec<f32> = (0..20).map(|_| reader.next_sample()).collect();
        for pair in samples.chunks(2) {
            assert_eq!(pair, [0.25, -0.25]);
        }
    }

    #[test]
    fn empty_mixer_streams_silence() {
        let state = MixerState::new(44_100, PanLaw::Linear, silent());
        let source = MixSource::new(Arc::new(Mutex::new(state)));
        assert_eq!(source.sample_rate(), 44_100);
        let mut reader = BlockReader::new(source, 8);
        assert!((0..64).all(|_| reader.next_sample() == 0.0));
    }

    #[test]
    fn null_kind_builds_null_backend() {
        let backend = create(BackendKind::Null, silent());
        assert_eq!(backend.name(), "null");
    }
}
