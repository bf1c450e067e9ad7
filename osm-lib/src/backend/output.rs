//! Device backend built on rodio.
//!
//! The output stream lives on its own thread for its whole lifetime. The
//! thread opens the default device, attaches a [`MixerStream`] to the
//! device mixer, reports readiness, then parks until told to stop.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{mpsc, Arc};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use log::Level;
use rodio::{OutputStream, OutputStreamBuilder, Source};

use crate::config::MixerSettings;
use crate::error::BackendError;
use crate::logging::LogHook;

use super::{Backend, BlockReader, MixSource};

const PARK_INTERVAL_MS: u64 = 50;

/// Endless interleaved stereo source fed from the mixer.
struct MixerStream {
    reader: BlockReader,
    sample_rate: u32,
}

impl Iterator for MixerStream {
    type Item = f32;

    fn next(&mut self) -> Option<f32> {
        Some(self.reader.next_sample())
    }
}

impl Source for MixerStream {
    fn current_span_len(&self) -> Option<usize> {
        None
    }

    fn channels(&self) -> u16 {
        2
    }

    fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    fn total_duration(&self) -> Option<Duration> {
        None
    }
}

/// Plays the mix on the default output device.
pub struct RodioBackend {
    log: LogHook,
    abort: Arc<AtomicBool>,
    handle: Option<JoinHandle<()>>,
}

impl RodioBackend {
    pub fn new(log: LogHook) -> Self {
        Self {
            log,
            abort: Arc::new(AtomicBool::new(false)),
            handle: None,
        }
    }
}

fn open_output_stream_with_retry(
    settings: &MixerSettings,
    log: &LogHook,
) -> Result<OutputStream, BackendError> {
    let attempts = settings.stream_open_retries.max(1);
    let mut last_error = String::new();
    for attempt in 1..=attempts {
        match OutputStreamBuilder::open_default_stream() {
            Ok(stream) => return Ok(stream),
            Err(err) => {
                last_error = err.to_string();
                if attempt < attempts {
                    log(
                        Level::Warn,
                        &format!(
                            "open_default_stream attempt {}/{} failed: {}",
                            attempt, attempts, err
                        ),
                    );
                    thread::sleep(Duration::from_millis(settings.stream_open_retry_ms));
                }
            }
        }
    }
    Err(BackendError::StreamOpen(format!(
        "no output stream after {} attempts: {}",
        attempts, last_error
    )))
}

impl Backend for RodioBackend {
    fn initialize(
        &mut self,
        source: MixSource,
        settings: &MixerSettings,
    ) -> Result<(), BackendError> {
        self.finalize();
        self.abort = Arc::new(AtomicBool::new(false));

        let abort = self.abort.clone();
        let log = self.log.clone();
        let settings = settings.clone();
        let (ready_tx, ready_rx) = mpsc::channel::<Result<(), BackendError>>();

        let handle = thread::Builder::new()
            .name("osm-rodio-backend".to_string())
            .spawn(move || {
                let stream = match open_output_stream_with_retry(&settings, &log) {
                    Ok(stream) => stream,
                    Err(err) => {
                        let _ = ready_tx.send(Err(err));
                        return;
                    }
                };
                stream.mixer().add(MixerStream {
                    reader: BlockReader::new(source, settings.block_frames),
                    sample_rate: settings.sample_rate,
                });
                let _ = ready_tx.send(Ok(()));

                while !abort.load(Ordering::SeqCst) {
                    thread::park_timeout(Duration::from_millis(PARK_INTERVAL_MS));
                }
                drop(stream);
            })?;

        let ready = ready_rx.recv().unwrap_or_else(|_| {
            Err(BackendError::StreamOpen(
                "output thread exited before opening a stream".to_string(),
            ))
        });
        match ready {
            Ok(()) => {
                self.handle = Some(handle);
                Ok(())
            }
            Err(err) => {
                let _ = handle.join();
                Err(err)
            }
        }
    }

    fn finalize(&mut self) {
        self.abort.store(true, Ordering::SeqCst);
        if let Some(handle) = self.handle.take() {
            handle.thread().unpark();
            let _ = handle.join();
        }
    }

    fn name(&self) -> &'static str {
        "rodio"
    }
}

impl Drop for RodioBackend {
    fn drop(&mut self) {
        self.finalize();
    }
}
