//! Ogg Vorbis decoder.

use std::sync::Arc;

use crate::audio::Sample;
use crate::error::SoundError;

use super::stream::SymphoniaStream;
use super::{Decoder, FileType};

/// Ogg Vorbis decoder.
///
/// Has no bulk path: decompressing an Ogg resource decodes it block by block.
#[derive(Default)]
pub struct OggDecoder {
    stream: Option<SymphoniaStream>,
}

impl OggDecoder {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Decoder for OggDecoder {
    fn load_header(&mut self, data: Arc<[u8]>) -> Result<(), SoundError> {
        self.stream = Some(SymphoniaStream::open(data, FileType::Ogg)?);
        Ok(())
    }

    fn sample_count(&self) -> usize {
        self.stream.as_ref().map_or(0, |s| s.frame_count())
    }

    fn sample_rate(&self) -> u32 {
        self.stream.as_ref().map_or(0, |s| s.sample_rate())
    }

    fn get_samples(&mut self, dest: &mut [Sample], offset: usize) -> usize {
        match self.stream.as_mut() {
            Some(stream) => stream.read(dest, offset),
            None => 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_fixtures::{OGG_FRAME_TOLERANCE, SILENT_OGG, SILENT_OGG_FRAMES};
    use super::*;

    fn loaded() -> OggDecoder {
        let mut decoder = OggDecoder::new();
        decoder
            .load_header(Arc::from(SILENT_OGG))
            .expect("vorbis header");
        decoder
    }

    #[test]
    fn header_reports_rate_and_length() {
        let decoder = loaded();
        assert_eq!(decoder.sample_rate(), 44_100);
        let count = decoder.sample_count();
        assert!(
            count.abs_diff(SILENT_OGG_FRAMES) <= OGG_FRAME_TOLERANCE,
            "frame count {}",
            count
        );
    }

    #[test]
    fn has_no_bulk_path() {
        let mut decoder = loaded();
        let mut out = vec![Sample::SILENCE; 16];
        assert!(decoder.get_all_samples(&mut out).is_none());
    }

    #[test]
    fn positional_reads_decode_silence() {
        let mut decoder = loaded();
        let count = decoder.sample_count();
        let mut out = vec![Sample::new(1.0, 1.0); 1_000];
        assert_eq!(decoder.get_samples(&mut out, 2_000), 1_000);
        assert!(out.iter().all(|frame| *frame == Sample::SILENCE));

        // Backwards read after a forward one seeks.
        assert_eq!(decoder.get_samples(&mut out[..10], 0), 10);
        let tail = decoder.get_samples(&mut out, count - 100);
        assert!(tail <= 100);
        assert_eq!(decoder.get_samples(&mut out, count), 0);
    }

    #[test]
    fn capture_pattern_without_stream_is_invalid() {
        let mut decoder = OggDecoder::new();
        let bytes: Vec<u8> = b"OggS".iter().copied().chain([0u8; 60]).collect();
        let err = decoder.load_header(Arc::from(bytes)).err();
        assert!(matches!(err, Some(SoundError::HeaderInvalid(_))));
        assert!(decoder.get_all_samples(&mut []).is_none());
    }
}
