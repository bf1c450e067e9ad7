//! Playable sound resources.
//!
//! A [`Sound`] is immutable once loaded apart from its loop settings. It is
//! shared through `Arc`: the caller's handle and every voice playing it each
//! hold a reference, and the buffers are freed when the last one drops.

use std::fmt::{Debug, Formatter};
use std::sync::{Arc, Mutex};

use log::debug;

use crate::audio::Sample;
use crate::decode::{decoder_for, Decoder, FileType};
use crate::error::SoundError;
use crate::tools::{lock, seconds_to_frames};

/// Frames decoded per step when a decoder has no bulk path.
const DECODE_BLOCK_FRAMES: usize = 4096;

/// Caller-supplied generator for procedural sounds.
///
/// Runs on the audio thread while the mixer lock is held, so it must not
/// block.
pub type Generator = Box<dyn FnMut(&mut [Sample]) + Send>;

/// How a sound's frames are produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SoundMode {
    /// Fully decoded into memory at load time.
    Decompressed,
    /// Compressed bytes decoded on demand.
    Streaming,
    /// Synthesized by a generator callback.
    Procedural,
}

enum SoundSource {
    Decompressed(Vec<Sample>),
    Streaming {
        data: Arc<[u8]>,
        decoder: Mutex<Box<dyn Decoder>>,
    },
    Procedural(Mutex<Generator>),
}

#[derive(Debug, Clone, Copy)]
struct LoopPoints {
    start: f32,
    end: f32,
    enabled: bool,
}

/// A loaded, playable audio asset.
pub struct Sound {
    source: SoundSource,
    sample_count: usize,
    sample_rate: u32,
    loop_points: Mutex<LoopPoints>,
}

impl Sound {
    /// Load a sound from an in-memory WAVE or Ogg stream.
    ///
    /// The format is sniffed from the leading bytes. With `decompress` the
    /// whole stream is decoded now; otherwise a private copy of the bytes is
    /// kept and decoded on demand. `data` may be dropped after this returns.
    pub fn load(data: &[u8], decompress: bool) -> Result<Sound, SoundError> {
        if data.is_empty() {
            return Err(SoundError::EmptyInput);
        }
        let file_type = FileType::detect(data).ok_or(SoundError::UnsupportedFormat)?;

        let bytes: Arc<[u8]> = Arc::from(data);
        let mut decoder = decoder_for(file_type);
        decoder.load_header(bytes.clone())?;
        let sample_rate = decoder.sample_rate();

        let sample_count;
        let source = if decompress {
            let samples = decompress_all(decoder.as_mut())?;
            sample_count = samples.len();
            debug!(
                "decompressed {:?} sound: {} frames at {} Hz",
                file_type,
                samples.len(),
                sample_rate
            );
            SoundSource::Decompressed(samples)
        } else {
            sample_count = decoder.sample_count();
            SoundSource::Streaming {
                data: bytes,
                decoder: Mutex::new(decoder),
            }
        };

        let sound = Sound {
            source,
            sample_count,
            sample_rate,
            loop_points: Mutex::new(LoopPoints {
                start: 0.0,
                end: 0.0,
                enabled: false,
            }),
        };
        lock(&sound.loop_points).end = sound.length();

        Ok(sound)
    }

    /// Build a sound whose frames come from `generator`.
    ///
    /// Procedural sounds are infinite: they loop by default with a loop end of
    /// one second and report a nominal length of one second.
    pub fn procedural<F>(generator: F, sample_rate: u32) -> Sound
    where
        F: FnMut(&mut [Sample]) + Send + 'static,
    {
        Sound {
            source: SoundSource::Procedural(Mutex::new(Box::new(generator))),
            sample_count: sample_rate.max(1) as usize,
            sample_rate: sample_rate.max(1),
            loop_points: Mutex::new(LoopPoints {
                start: 0.0,
                end: 1.0,
                enabled: true,
            }),
        }
    }

    /// Copy up to `dest.len()` frames starting at frame `offset`.
    ///
    /// A short count signals end of data. Procedural sounds ignore `offset`
    /// and always fill `dest`.
    pub fn get_samples(&self, dest: &mut [Sample], offset: usize) -> usize {
        match &self.source {
            SoundSource::Decompressed(samples) => {
                if offset >= samples.len() {
                    return 0;
                }
                let count = dest.len().min(samples.len() - offset);
                dest[..count].copy_from_slice(&samples[offset..offset + count]);
                count
            }
            SoundSource::Streaming { decoder, .. } => lock(decoder).get_samples(dest, offset),
            SoundSource::Procedural(generator) => {
                let mut generator = lock(generator);
                (*generator)(dest);
                dest.len()
            }
        }
    }

    /// Total frames, or the nominal placeholder for procedural sounds.
    pub fn sample_count(&self) -> usize {
        self.sample_count
    }

    /// Native sample rate (Hz).
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Length in seconds.
    pub fn length(&self) -> f32 {
        self.sample_count as f32 / self.sample_rate.max(1) as f32
    }

    pub fn mode(&self) -> SoundMode {
        match &self.source {
            SoundSource::Decompressed(_) => SoundMode::Decompressed,
            SoundSource::Streaming { .. } => SoundMode::Streaming,
            SoundSource::Procedural(_) => SoundMode::Procedural,
        }
    }

    /// Size of the retained compressed stream, if streaming.
    pub fn compressed_len(&self) -> Option<usize> {
        match &self.source {
            SoundSource::Streaming { data, .. } => Some(data.len()),
            _ => None,
        }
    }

    /// Loop start in seconds.
    pub fn loop_start(&self) -> f32 {
        lock(&self.loop_points).start
    }

    pub fn set_loop_start(&self, seconds: f32) {
        lock(&self.loop_points).start = seconds.max(0.0);
    }

    /// Loop end in seconds.
    pub fn loop_end(&self) -> f32 {
        lock(&self.loop_points).end
    }

    pub fn set_loop_end(&self, seconds: f32) {
        lock(&self.loop_points).end = seconds.max(0.0);
    }

    pub fn is_looping(&self) -> bool {
        lock(&self.loop_points).enabled
    }

    pub fn set_looping(&self, looping: bool) {
        lock(&self.loop_points).enabled = looping;
    }

    /// Loop region in frames, if looping is enabled and the region is
    /// non-empty. The end is clamped to the data length.
    pub(crate) fn loop_frames(&self) -> Option<(i64, i64)> {
        let points = *lock(&self.loop_points);
        if !points.enabled {
            return None;
        }
        let mut end = seconds_to_frames(points.end, self.sample_rate);
        if self.mode() != SoundMode::Procedural {
            end = end.min(self.sample_count as i64);
        }
        let start = seconds_to_frames(points.start, self.sample_rate).min(end);
        if end <= start {
            return None;
        }
        Some((start, end))
    }
}

impl Debug for Sound {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Sound")
            .field("mode", &self.mode())
            .field("sample_count", &self.sample_count)
            .field("sample_rate", &self.sample_rate)
            .field("loop_points", &*lock(&self.loop_points))
            .finish()
    }
}

/// Decode every frame, using the bulk path when the decoder has one.
fn decompress_all(decoder: &mut dyn Decoder) -> Result<Vec<Sample>, SoundError> {
    let count = decoder.sample_count();
    let mut samples: Vec<Sample> = Vec::new();
    samples
        .try_reserve_exact(count)
        .map_err(|_| SoundError::AllocationFailure)?;
    samples.resize(count, Sample::SILENCE);

    let written = match decoder.get_all_samples(&mut samples) {
        Some(written) => written,
        None => {
            let mut written = 0;
            while written < count {
                let end = (written + DECODE_BLOCK_FRAMES).min(count);
                let requested = end - written;
                let got = decoder.get_samples(&mut samples[written..end], written);
                written += got;
                if got < requested {
                    break;
                }
            }
            written
        }
    };

    if written == 0 && count > 0 {
        return Err(SoundError::Decode("stream produced no frames".to_string()));
    }
    samples.truncate(written);
    Ok(samples)
}
