//! Mixing engine manager.
//!
//! [`Manager`] owns the voice table and the audio backend. Sounds are loaded
//! through it, played as voices, controlled by [`VoiceId`], and mixed into a
//! stereo stream either by the backend's audio thread or by a direct call to
//! [`Manager::read_samples`].

mod controls;
pub(crate) mod mixer;
mod voice;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use log::Level;

use crate::audio::Sample;
use crate::backend::{self, Backend, MixSource};
use crate::config::MixerSettings;
use crate::logging::{log_facade, LogHook};
use crate::sound::Sound;
use crate::tools::lock;

use mixer::MixerState;

pub use voice::VoiceId;

/// Mixing engine: a voice table plus the backend that drains it.
///
/// Every method takes `&self` and may be called from any thread. Control
/// calls and the audio thread serialize on one internal lock.
pub struct Manager {
    settings: MixerSettings,
    state: Arc<Mutex<MixerState>>,
    backend: Mutex<Box<dyn Backend>>,
    initialized: AtomicBool,
    log: LogHook,
}

impl Manager {
    /// Create a manager using the backend named in `settings` and the `log`
    /// facade for diagnostics.
    pub fn new(settings: MixerSettings) -> Self {
        Self::with_logger(settings, log_facade())
    }

    /// Create a manager that reports diagnostics through `log`.
    pub fn with_logger(settings: MixerSettings, log: LogHook) -> Self {
        let settings = settings.sanitized();
        let backend = backend::create(settings.backend, log.clone());
        Self::with_backend(settings, backend, log)
    }

    /// Create a manager driving a caller-supplied backend.
    ///
    /// # Arguments
    ///
    /// * `settings` - Output rate, block size and pan law.
    /// * `backend` - Audio sink started by [`Manager::initialize`].
    /// * `log` - Diagnostic hook.
    pub fn with_backend(settings: MixerSettings, backend: Box<dyn Backend>, log: LogHook) -> Self {
        let settings = settings.sanitized();
        let state = MixerState::new(settings.sample_rate, settings.pan_law, log.clone());
        Self {
            settings,
            state: Arc::new(Mutex::new(state)),
            backend: Mutex::new(backend),
            initialized: AtomicBool::new(false),
            log,
        }
    }

    /// Start the backend. Returns true on success or if already running.
    pub fn initialize(&self) -> bool {
        let mut backend = lock(&self.backend);
        if self.initialized.load(Ordering::SeqCst) {
            return true;
        }
        match backend.initialize(self.mix_source(), &self.settings) {
            Ok(()) => {
                self.initialized.store(true, Ordering::SeqCst);
                self.emit(
                    Level::Info,
                    &format!(
                        "{} backend started at {} Hz",
                        backend.name(),
                        self.settings.sample_rate
                    ),
                );
                true
            }
            Err(err) => {
                self.emit(
                    Level::Error,
                    &format!("failed to start {} backend: {}", backend.name(), err),
                );
                false
            }
        }
    }

    /// Stop the backend and release every voice. Safe to call repeatedly.
    pub fn finalize(&self) {
        let mut backend = lock(&self.backend);
        if self.initialized.swap(false, Ordering::SeqCst) {
            backend.finalize();
            self.emit(Level::Info, &format!("{} backend stopped", backend.name()));
        }
        drop(backend);
        lock(&self.state).clear();
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized.load(Ordering::SeqCst)
    }

    pub fn settings(&self) -> &MixerSettings {
        &self.settings
    }

    /// Handle the backend uses to pull mixed blocks.
    pub fn mix_source(&self) -> MixSource {
        MixSource::new(self.state.clone())
    }

    /// Load a WAVE or Ogg stream from memory.
    ///
    /// Returns `None` and reports through the log hook when the data cannot
    /// be loaded.
    ///
    /// # Arguments
    ///
    /// * `data` - Complete encoded file contents; not retained.
    /// * `decompress` - Decode everything now instead of streaming.
    pub fn create_sound(&self, data: &[u8], decompress: bool) -> Option<Arc<Sound>> {
        match Sound::load(data, decompress) {
            Ok(sound) => {
                self.emit(Level::Debug, &format!("loaded {:?}", sound));
                Some(Arc::new(sound))
            }
            Err(err) => {
                self.emit(Level::Warn, &format!("failed to load sound: {}", err));
                None
            }
        }
    }

    /// Wrap a generator as an endless sound at the output rate.
    pub fn create_procedural_sound<F>(&self, generator: F) -> Arc<Sound>
    where
        F: FnMut(&mut [Sample]) + Send + 'static,
    {
        Arc::new(Sound::procedural(generator, self.settings.sample_rate))
    }

    /// Mix the next `dest.len()` frames into `dest`.
    ///
    /// This is the same pull the backend performs; it is exposed for offline
    /// rendering with a headless backend.
    pub fn read_samples(&self, dest: &mut [Sample]) -> usize {
        lock(&self.state).read_samples(dest)
    }

    pub(crate) fn emit(&self, level: Level, message: &str) {
        (self.log)(level, message);
    }
}

impl Drop for Manager {
    fn drop(&mut self) {
        self.finalize();
    }
}
