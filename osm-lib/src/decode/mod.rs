//! Decoder interface and format detection.
//!
//! A decoder turns an in-memory compressed stream into stereo frames. New
//! formats are added by extending [`FileType::detect`] and implementing
//! [`Decoder`].

mod file_type;
mod ogg;
mod stream;
mod wave;

use std::sync::Arc;

use crate::audio::Sample;
use crate::error::SoundError;

pub use file_type::FileType;
pub use ogg::OggDecoder;
pub use wave::WaveDecoder;

/// Positional PCM decoder over a compressed byte stream.
pub trait Decoder: Send {
    /// Parse enough of `data` to know the format and the total frame count.
    fn load_header(&mut self, data: Arc<[u8]>) -> Result<(), SoundError>;

    /// Total frames in the stream.
    fn sample_count(&self) -> usize;

    /// Native sample rate of the stream (Hz).
    fn sample_rate(&self) -> u32;

    /// Decode up to `dest.len()` frames starting at frame `offset`.
    ///
    /// Returns the number of frames written. Reading past the end of the
    /// stream, or into corrupt data, yields a short count instead of failing.
    fn get_samples(&mut self, dest: &mut [Sample], offset: usize) -> usize;

    /// Decode the whole stream into `dest` in one pass.
    ///
    /// Returns `None` when the decoder has no bulk path, in which case callers
    /// fall back to [`Decoder::get_samples`].
    fn get_all_samples(&mut self, dest: &mut [Sample]) -> Option<usize> {
        let _ = dest;
        None
    }
}

/// Build the decoder matching a detected file type.
pub fn decoder_for(file_type: FileType) -> Box<dyn Decoder> {
    match file_type {
        FileType::Wave => Box::new(WaveDecoder::new()),
        FileType::Ogg => Box::new(OggDecoder::new()),
    }
}


#[cfg(test)]
mod tests {
    use super::test_fixtures::{ramp_float, ramp_wav};
    use super::*;

    #[test]
    fn decoder_for_matches_file_type() {
        let data: Arc<[u8]> = Arc::from(ramp_wav(64, 44_100));
        let file_type = FileType::detect(&data).expect("wave detected");
        let mut decoder = decoder_for(file_type);
        decoder.load_header(data).expect("header");
        assert_eq!(decoder.sample_count(), 64);

        let mut out = vec![Sample::SILENCE; 8];
        assert_eq!(decoder.get_samples(&mut out, 10), 8);
        assert_eq!(out[0].left, ramp_float(10));
    }
}
