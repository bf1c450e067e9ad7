//! RIFF/WAVE decoder.

use std::sync::Arc;

use crate::audio::Sample;
use crate::error::SoundError;

use super::stream::SymphoniaStream;
use super::{Decoder, FileType};

/// PCM WAVE decoder. Supports bulk decode.
#[derive(Default)]
pub struct WaveDecoder {
    stream: Option<SymphoniaStream>,
}

impl WaveDecoder {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Decoder for WaveDecoder {
    fn load_header(&mut self, data: Arc<[u8]>) -> Result<(), SoundError> {
        self.stream = Some(SymphoniaStream::open(data, FileType::Wave)?);
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

    fn get_all_samples(&mut self, dest: &mut [Sample]) -> Option<usize> {
        let stream = self.stream.as_mut()?;
        let len = dest.len().min(stream.frame_count());
        Some(stream.read(&mut dest[..len], 0))
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_fixtures::{ramp_float, ramp_wav};
    use super::*;

    #[test]
    fn bulk_decode_fills_whole_buffer() {
        let mut decoder = WaveDecoder::new();
        decoder
            .load_header(Arc::from(ramp_wav(4_410, 44_100)))
            .expect("header");
        assert_eq!(decoder.sample_rate(), 44_100);

        let mut out = vec![Sample::SILENCE; decoder.sample_count()];
        assert_eq!(decoder.get_all_samples(&mut out), Some(4_410));
        assert_eq!(out[4_409].right, ramp_float(4_409));
    }

    #[test]
    fn truncated_header_is_invalid() {
        let mut bytes = ramp_wav(16, 44_100);
        bytes.truncate(20);
        let mut decoder = WaveDecoder::new();
        let err = decoder.load_header(Arc::from(bytes)).err();
        assert!(matches!(err, Some(SoundError::HeaderInvalid(_))));
    }

    #[test]
    fn unloaded_decoder_reads_nothing() {
        let mut decoder = WaveDecoder::new();
        let mut out = vec![Sample::SILENCE; 4];
        assert_eq!(decoder.get_samples(&mut out, 0), 0);
        assert_eq!(decoder.sample_count(), 0);
    }
}
