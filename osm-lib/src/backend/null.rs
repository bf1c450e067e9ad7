//! Headless backend that drains the mixer in real time without a device.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use crate::audio::Sample;
use crate::config::MixerSettings;
use crate::error::BackendError;

use super::{Backend, MixSource};

/// Pulls one block per block period on a worker thread and discards it.
#[derive(Default)]
pub struct NullBackend {
    abort: Arc<AtomicBool>,
    handle: Option<JoinHandle<()>>,
}

impl NullBackend {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Backend for NullBackend {
    fn initialize(
        &mut self,
        source: MixSource,
        settings: &MixerSettings,
    ) -> Result<(), BackendError> {
        self.finalize();
        self.abort = Arc::new(AtomicBool::new(false));
        let abort = self.abort.clone();
        let block_frames = settings.block_frames.max(1);
        let period = Duration::from_secs_f64(settings.block_seconds());

        let handle = thread::Builder::new()
            .name("osm-null-backend".to_string())
            .spawn(move || {
                let mut block = vec![Sample::SILENCE; block_frames];
                let mut deadline = Instant::now();
                while !abort.load(Ordering::SeqCst) {
                    source.read_samples(&mut block);
                    deadline += period;
                    let now = Instant::now();
                    if deadline > now {
                        thread::park_timeout(deadline - now);
                    } else {
                        deadline = now;
                    }
                }
            })?;
        self.handle = Some(handle);
        Ok(())
    }

    fn finalize(&mut self) {
        self.abort.store(true, Ordering::SeqCst);
        if let Some(handle) = self.handle.take() {
            handle.thread().unpark();
            let _ = handle.join();
        }
    }

    fn name(&self) -> &'static str {
        "null"
    }
}

impl Drop for NullBackend {
    fn drop(&mut self) {
        self.finalize();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PanLaw;
    use crate::logging::silent;
    use crate::playback::mixer::MixerState;
    use crate::sound::Sound;
    use std::sync::Mutex;

    #[test]
    fn drains_voices_until_finalized() {
        let mut state = MixerState::new(44_100, PanLaw::Linear, silent());
        let pulls = Arc::new(AtomicBool::new(false));
        let flag = pulls.clone();
        let sound = Sound::procedural(
            move |dest: &mut [Sample]| {
                flag.store(true, Ordering::SeqCst);
                dest.fill(Sample::SILENCE);
            },
            44_100,
        );
        state.add_voice(Arc::new(sound));
        let source = MixSource::new(Arc::new(Mutex::new(state)));

        let mut backend = NullBackend::new();
        backend
            .initialize(source, &MixerSettings::default())
            .expect("start");
        let started = Instant::now();
        while !pulls.load(Ordering::SeqCst) && started.elapsed() < Duration::from_secs(5) {
            thread::sleep(Duration::from_millis(5));
        }
        backend.finalize();
        backend.finalize();
        assert!(pulls.load(Ordering::SeqCst));
    }
}
