//! Positional reader shared by the symphonia-backed decoders.

use std::io::{Cursor, ErrorKind};
use std::sync::Arc;

use log::{debug, warn};
use symphonia::core::codecs::{Decoder as CodecDecoder, DecoderOptions, CODEC_TYPE_NULL};
use symphonia::core::errors::Error;
use symphonia::core::formats::{FormatOptions, FormatReader, SeekMode, SeekTo};
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;

use crate::audio::sample::append_stereo_frames;
use crate::audio::Sample;
use crate::error::SoundError;

use super::FileType;

/// Format reader plus codec over an in-memory stream, with a read cursor.
///
/// Decoded packets are staged in `pending`; `position()` is the frame index of
/// the next frame a read would return.
pub(super) struct SymphoniaStream {
    data: Arc<[u8]>,
    file_type: FileType,
    format: Box<dyn FormatReader>,
    decoder: Box<dyn CodecDecoder>,
    track_id: u32,
    sample_rate: u32,
    frame_count: usize,
    pending: Vec<Sample>,
    pending_pos: usize,
    pending_start: u64,
    resync: bool,
    exhausted: bool,
}

fn open_reader(
    data: &Arc<[u8]>,
    file_type: FileType,
) -> Result<(Box<dyn FormatReader>, Box<dyn CodecDecoder>, u32), SoundError> {
    let source = Cursor::new(data.clone());
    let mss = MediaSourceStream::new(Box::new(source), Default::default());

    let mut hint = Hint::new();
    hint.with_extension(file_type.extension());

    let meta_opts: MetadataOptions = Default::default();
    let fmt_opts: FormatOptions = Default::default();

    let probed = symphonia::default::get_probe()
        .format(&hint, mss, &fmt_opts, &meta_opts)
        .map_err(|err| SoundError::HeaderInvalid(err.to_string()))?;
    let format = probed.format;

    let track = format
        .tracks()
        .iter()
        .find(|t| t.codec_params.codec != CODEC_TYPE_NULL)
        .ok_or_else(|| SoundError::HeaderInvalid("no decodable audio track".to_string()))?;
    let track_id = track.id;

    let dec_opts: DecoderOptions = Default::default();
    let decoder = symphonia::default::get_codecs()
        .make(&track.codec_params, &dec_opts)
        .map_err(|err| SoundError::HeaderInvalid(err.to_string()))?;

    Ok((format, decoder, track_id))
}

impl SymphoniaStream {
    /// Probe `data` and prepare to decode from frame 0.
    pub(super) fn open(data: Arc<[u8]>, file_type: FileType) -> Result<Self, SoundError> {
        let (format, decoder, track_id) = open_reader(&data, file_type)?;

        let params = decoder.codec_params().clone();
        let sample_rate = params
            .sample_rate
            .ok_or_else(|| SoundError::HeaderInvalid("missing sample rate".to_string()))?;
        if params.channels.map(|c| c.count()).unwrap_or(1) == 0 {
            return Err(SoundError::HeaderInvalid("stream has no channels".to_string()));
        }

        let mut stream = Self {
            data,
            file_type,
            format,
            decoder,
            track_id,
            sample_rate,
            frame_count: 0,
            pending: Vec::new(),
            pending_pos: 0,
            pending_start: 0,
            resync: false,
            exhausted: false,
        };

        stream.frame_count = match params.n_frames {
            Some(frames) => frames as usize,
            None => stream.count_frames()?,
        };

        Ok(stream)
    }

    pub(super) fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub(super) fn frame_count(&self) -> usize {
        self.frame_count
    }

    /// Frame index of the next frame a read returns.
    pub(super) fn position(&self) -> u64 {
        self.pending_start + self.pending_pos as u64
    }

    /// Read up to `dest.len()` frames starting at frame `offset`.
    pub(super) fn read(&mut self, dest: &mut [Sample], offset: usize) -> usize {
        if offset >= self.frame_count {
            return 0;
        }
        if offset as u64 != self.position() {
            self.seek(offset as u64);
        }

        let mut written = 0;
        while written < dest.len() {
            let available = self.pending.len() - self.pending_pos;
            if available > 0 {
                let take = available.min(dest.len() - written);
                dest[written..written + take]
                    .copy_from_slice(&self.pending[self.pending_pos..self.pending_pos + take]);
                self.pending_pos += take;
                written += take;
                continue;
            }
            if !self.decode_next() {
                break;
            }
        }
        written
    }

    /// Decode the next packet of the selected track into `pending`.
    ///
    /// Returns `false` once the stream has no more frames.
    fn decode_next(&mut self) -> bool {
        if self.exhausted {
            return false;
        }

        self.pending_start = self.position();
        self.pending_pos = 0;
        self.pending.clear();

        loop {
            let packet = match self.format.next_packet() {
                Ok(packet) => packet,
                Err(Error::IoError(err)) if err.kind() == ErrorKind::UnexpectedEof => {
                    self.exhausted = true;
                    return false;
                }
                Err(Error::ResetRequired) => {
                    self.exhausted = true;
                    return false;
                }
                Err(err) => {
                    warn!("stream read error: {}", err);
                    self.exhausted = true;
                    return false;
                }
            };

            if packet.track_id() != self.track_id {
                continue;
            }

            let start = if self.resync {
                packet.ts()
            } else {
                self.position()
            };
            match self.decoder.decode(&packet) {
                Ok(decoded) => {
                    append_stereo_frames(&decoded, &mut self.pending);
                    if self.pending.is_empty() {
                        continue;
                    }
                    self.pending_start = start;
                    self.resync = false;
                    return true;
                }
                Err(Error::DecodeError(err)) => {
                    warn!("decode error: {}", err);
                }
                Err(err) => {
                    warn!("decoder failed: {}", err);
                    self.exhausted = true;
                    return false;
                }
            }
        }
    }

    /// Move the read cursor to `target`.
    ///
    /// Uses the container's seek index when it has one, otherwise restarts
    /// the stream and decodes forward.
    fn seek(&mut self, target: u64) {
        self.pending.clear();
        self.pending_pos = 0;
        self.exhausted = false;

        let seeked = self.format.seek(
            SeekMode::Accurate,
            SeekTo::TimeStamp {
                ts: target,
                track_id: self.track_id,
            },
        );

        match seeked {
            Ok(seeked_to) => {
                self.decoder.reset();
                self.pending_start = seeked_to.actual_ts;
                self.resync = true;
            }
            Err(err) => {
                debug!("seek to frame {} failed ({}), restarting stream", target, err);
                if !self.restart() {
                    return;
                }
            }
        }

        while self.position() < target {
            let available = (self.pending.len() - self.pending_pos) as u64;
            if available == 0 {
                if !self.decode_next() {
                    break;
                }
                continue;
            }
            let skip = available.min(target - self.position()) as usize;
            self.pending_pos += skip;
        }
    }

    /// Rebuild the reader at frame 0.
    fn restart(&mut self) -> bool {
        match open_reader(&self.data, self.file_type) {
            Ok((format, decoder, track_id)) => {
                self.format = format;
                self.decoder = decoder;
                self.track_id = track_id;
                self.pending.clear();
                self.pending_pos = 0;
                self.pending_start = 0;
                self.resync = false;
                self.exhausted = false;
                true
            }
            Err(err) => {
                warn!("failed to restart stream: {}", err);
                self.exhausted = true;
                false
            }
        }
    }

    /// Count frames by decoding the whole stream, then rewind.
    fn count_frames(&mut self) -> Result<usize, SoundError> {
        let mut frames = 0usize;
        while self.decode_next() {
            frames += self.pending.len();
            self.pending_pos = self.pending.len();
        }
        if frames == 0 {
            return Err(SoundError::HeaderInvalid("stream holds no frames".to_string()));
        }
        if !self.restart() {
            return Err(SoundError::Decode("failed to rewind stream".to_string()));
        }
        Ok(frames)
    }
}
