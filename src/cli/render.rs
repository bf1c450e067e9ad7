//! `osm render`: mix files offline into a WAVE file.

use std::sync::Arc;

use clap::ArgMatches;
use hound::{SampleFormat, WavSpec, WavWriter};
use log::info;
use osm_lib::logging::log_facade;
use osm_lib::{Manager, NullBackend, Sample, Sound, SoundMode};

use super::mix::{parse_arg, settings_from_args, start_from_args};
use crate::error::{CliError, Result};

/// Frames needed at `output_rate` to play the longest non-procedural sound.
fn longest_frames(sounds: &[Arc<Sound>], output_rate: u32, speed: f32) -> usize {
    sounds
        .iter()
        .filter(|sound| sound.mode() != SoundMode::Procedural)
        .map(|sound| {
            let seconds = sound.length() as f64 / speed as f64;
            (seconds * output_rate as f64).ceil() as usize
        })
        .max()
        .unwrap_or(0)
}

fn to_i16(sample: f32) -> i16 {
    (sample.clamp(-1.0, 1.0) * i16::MAX as f32).round() as i16
}

pub fn run(args: &ArgMatches) -> Result<i32> {
    let settings = settings_from_args(args)?;
    let out = args
        .get_one::<String>("out")
        .ok_or_else(|| CliError::Argument("--out is required".to_string()))?
        .clone();
    let manager = Manager::with_backend(
        settings.clone(),
        Box::new(NullBackend::new()),
        log_facade(),
    );

    let (sounds, voices) = start_from_args(&manager, args, false)?;
    let speed = parse_arg::<f32>(args, "speed")?
        .filter(|speed| *speed > 0.0)
        .unwrap_or(1.0);
    let frames = match parse_arg::<usize>(args, "frames")? {
        Some(frames) => frames,
        None => longest_frames(&sounds, settings.sample_rate, speed),
    };

    let spec = WavSpec {
        channels: 2,
        sample_rate: settings.sample_rate,
        bits_per_sample: 16,
        sample_format: SampleFormat::Int,
    };
    let mut writer = WavWriter::create(&out, spec)?;
    let mut block = vec![Sample::SILENCE; settings.block_frames];
    let mut written = 0;
    while written < frames {
        let count = (frames - written).min(block.len());
        let mixed = manager.read_samples(&mut block[..count]);
        for frame in &block[..mixed] {
            writer.write_sample(to_i16(frame.left))?;
            writer.write_sample(to_i16(frame.right))?;
        }
        written += mixed;
    }
    writer.finalize()?;

    info!(
        "rendered {} frames from {} voices to {}",
        written,
        voices.len(),
        out
    );
    println!("{} frames written to {}", written, out);
    Ok(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clamps_to_pcm_range() {
        assert_eq!(to_i16(2.0), i16::MAX);
        assert_eq!(to_i16(-2.0), -i16::MAX);
        assert_eq!(to_i16(0.0), 0);
    }
}
