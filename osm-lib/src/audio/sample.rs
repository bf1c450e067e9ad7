//! Stereo sample frames and PCM-to-float conversion.

use symphonia::core::audio::{AudioBufferRef, Signal};

/// One stereo frame.
///
/// Every resource is stored and mixed as stereo frames, so "sample" counts in
/// the public API are frame counts.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Sample {
    pub left: f32,
    pub right: f32,
}

impl Sample {
    /// Silent frame.
    pub const SILENCE: Sample = Sample {
        left: 0.0,
        right: 0.0,
    };

    /// Create a frame from explicit left/right values.
    pub const fn new(left: f32, right: f32) -> Self {
        Self { left, right }
    }

    /// Create a frame carrying the same value on both channels.
    pub const fn mono(value: f32) -> Self {
        Self {
            left: value,
            right: value,
        }
    }

    /// Average of both channels.
    pub fn to_mono(self) -> f32 {
        (self.left + self.right) * 0.5
    }
}

/// Convert a signed 24-bit sample stored in an `i32` to `f32`.
pub fn convert_signed_24bit_to_f32(sample: i32) -> f32 {
    let shifted_sample = sample << 8 >> 8;
    shifted_sample as f32 / 2f32.powi(23)
}

/// Convert an unsigned 24-bit sample stored in a `u32` to `f32`.
pub fn convert_unsigned_24bit_to_f32(sample: u32) -> f32 {
    let shifted_sample = sample as i32 - 2i32.pow(23);
    shifted_sample as f32 / 2f32.powi(23)
}

/// Convert a signed 16-bit sample to `f32`.
pub fn convert_signed_16bit_to_f32(sample: i16) -> f32 {
    sample as f32 / 2f32.powi(15)
}

/// Convert an unsigned 16-bit sample to `f32`.
pub fn convert_unsigned_16bit_to_f32(sample: u16) -> f32 {
    (sample as i32 - 2i32.pow(15)) as f32 / 2f32.powi(15)
}

/// Convert an unsigned 8-bit sample to `f32`.
pub fn convert_unsigned_8bit_to_f32(sample: u8) -> f32 {
    (sample as i16 - 2i16.pow(7)) as f32 / 2f32.powi(7)
}

/// Convert a signed 8-bit sample to `f32`.
pub fn convert_signed_8bit_to_f32(sample: i8) -> f32 {
    sample as f32 / 2f32.powi(7)
}

/// Convert a signed 32-bit sample to `f32`.
pub fn convert_signed_32bit_to_f32(sample: i32) -> f32 {
    sample as f32 / 2f32.powi(31)
}

/// Convert an unsigned 32-bit sample to `f32`.
pub fn convert_unsigned_32bit_to_f32(sample: u32) -> f32 {
    (sample as i64 - 2i64.pow(31)) as f32 / 2f32.powi(31)
}

fn channel_to_f32(decoded: &AudioBufferRef<'_>, channel: usize) -> Vec<f32> {
    match decoded {
        AudioBufferRef::U8(buf) => buf
            .chan(channel)
            .iter()
            .copied()
            .map(convert_unsigned_8bit_to_f32)
            .collect(),
        AudioBufferRef::S8(buf) => buf
            .chan(channel)
            .iter()
            .copied()
            .map(convert_signed_8bit_to_f32)
            .collect(),
        AudioBufferRef::U16(buf) => buf
            .chan(channel)
            .iter()
            .copied()
            .map(convert_unsigned_16bit_to_f32)
            .collect(),
        AudioBufferRef::S16(buf) => buf
            .chan(channel)
            .iter()
            .copied()
            .map(convert_signed_16bit_to_f32)
            .collect(),
        AudioBufferRef::U24(buf) => buf
            .chan(channel)
            .iter()
            .map(|s| convert_unsigned_24bit_to_f32(s.0))
            .collect(),
        AudioBufferRef::S24(buf) => buf
            .chan(channel)
            .iter()
            .map(|s| convert_signed_24bit_to_f32(s.0))
            .collect(),
        AudioBufferRef::U32(buf) => buf
            .chan(channel)
            .iter()
            .copied()
            .map(convert_unsigned_32bit_to_f32)
            .collect(),
        AudioBufferRef::S32(buf) => buf
            .chan(channel)
            .iter()
            .copied()
            .map(convert_signed_32bit_to_f32)
            .collect(),
        AudioBufferRef::F32(buf) => buf.chan(channel).to_vec(),
        AudioBufferRef::F64(buf) => buf.chan(channel).iter().map(|s| *s as f32).collect(),
    }
}

/// Append a decoded packet to `out` as stereo frames.
///
/// Mono input is duplicated onto both channels; channels past the second are
/// ignored.
pub fn append_stereo_frames(decoded: &AudioBufferRef<'_>, out: &mut Vec<Sample>) {
    let channels = decoded.spec().channels.count();
    if channels == 0 || decoded.frames() == 0 {
        return;
    }

    let left = channel_to_f32(decoded, 0);
    if channels == 1 {
        out.extend(left.into_iter().map(Sample::mono));
        return;
    }

    let right = channel_to_f32(decoded, 1);
    out.extend(
        left.into_iter()
            .zip(right)
            .map(|(left, right)| Sample::new(left, right)),
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn signed_16bit_extremes() {
        assert_eq!(convert_signed_16bit_to_f32(i16::MIN), -1.0);
        assert_eq!(convert_signed_16bit_to_f32(0), 0.0);
        assert!((convert_signed_16bit_to_f32(i16::MAX) - 1.0).abs() < 1e-4);
    }

    #[test]
    fn unsigned_8bit_is_offset_binary() {
        assert_eq!(convert_unsigned_8bit_to_f32(128), 0.0);
        assert_eq!(convert_unsigned_8bit_to_f32(0), -1.0);
    }

    #[test]
    fn mono_frame_averages_back() {
        let frame = Sample::mono(0.25);
        assert_eq!(frame.left, frame.right);
        assert_eq!(frame.to_mono(), 0.25);
        assert_eq!(Sample::new(1.0, 0.0).to_mono(), 0.5);
    }
}
