//! Mixer setup shared by `play` and `render`.

use std::str::FromStr;
use std::sync::Arc;

use clap::ArgMatches;
use log::{info, warn};
use osm_lib::{Manager, MixerSettings, PanLaw, Sample, Sound, VoiceId};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::error::{CliError, Result};

/// Parse an optional numeric argument.
pub fn parse_arg<T: FromStr>(args: &ArgMatches, name: &str) -> Result<Option<T>> {
    match args.get_one::<String>(name) {
        Some(raw) => raw
            .parse::<T>()
            .map(Some)
            .map_err(|_| CliError::Argument(format!("--{} {}", name.to_lowercase(), raw))),
        None => Ok(None),
    }
}

/// Settings from `--settings` with flag overrides applied.
pub fn settings_from_args(args: &ArgMatches) -> Result<MixerSettings> {
    let mut settings = match args.get_one::<String>("settings") {
        Some(path) => MixerSettings::from_json_file(path)?,
        None => MixerSettings::default(),
    };
    if let Some(block_frames) = parse_arg::<usize>(args, "block-frames")? {
        settings.block_frames = block_frames;
    }
    if let Some(law) = args.get_one::<String>("pan-law") {
        settings.pan_law = match law.as_str() {
            "constant_power" => PanLaw::ConstantPower,
            _ => PanLaw::Linear,
        };
    }
    Ok(settings.sanitized())
}

/// Per-voice options taken from the command line.
#[derive(Debug, Clone, Copy)]
pub struct VoiceOptions {
    pub gain: f32,
    pub fade_in: f32,
    pub pan: f32,
    pub speed: Option<f32>,
    pub looping: bool,
}

impl VoiceOptions {
    pub fn from_args(args: &ArgMatches, looping: bool) -> Result<Self> {
        Ok(Self {
            gain: parse_arg::<f32>(args, "GAIN")?.unwrap_or(100.0) / 100.0,
            fade_in: parse_arg::<f32>(args, "fade-in")?.unwrap_or(0.0),
            pan: parse_arg::<f32>(args, "pan")?.unwrap_or(0.0),
            speed: parse_arg::<f32>(args, "speed")?,
            looping,
        })
    }
}

/// Load every file named by `FILES`.
pub fn load_sounds(manager: &Manager, args: &ArgMatches) -> Result<Vec<Arc<Sound>>> {
    let decompress = !args.get_flag("stream");
    let mut sounds = Vec::new();
    for path in args.get_many::<String>("FILES").into_iter().flatten() {
        let data = std::fs::read(path)?;
        let sound = manager
            .create_sound(&data, decompress)
            .ok_or_else(|| CliError::Load(path.clone()))?;
        info!(
            "loaded {}: {:?}, {:.3} s at {} Hz",
            path,
            sound.mode(),
            sound.length(),
            sound.sample_rate()
        );
        sounds.push(sound);
    }
    Ok(sounds)
}

/// White-noise generator seeded from the OS.
pub fn noise_sound(manager: &Manager, level: f32) -> Arc<Sound> {
    let level = level.clamp(0.0, 1.0);
    let mut rng = StdRng::from_entropy();
    manager.create_procedural_sound(move |dest: &mut [Sample]| {
        for frame in dest.iter_mut() {
            *frame = Sample::new(
                rng.gen_range(-level..=level),
                rng.gen_range(-level..=level),
            );
        }
    })
}

/// Start one voice per sound with `options` applied.
pub fn start_voices(
    manager: &Manager,
    sounds: &[Arc<Sound>],
    options: VoiceOptions,
) -> Vec<VoiceId> {
    sounds
        .iter()
        .map(|sound| {
            if options.looping {
                sound.set_looping(true);
            }
            let id = manager.play(sound);
            manager.set_volume(id, options.gain);
            manager.set_pan(id, options.pan);
            if options.fade_in > 0.0 {
                manager.fade_in(id, options.fade_in);
            }
            if let Some(speed) = options.speed {
                if speed > 0.0 {
                    manager.set_playback_speed_enabled(id, true);
                    manager.set_playback_speed(id, speed);
                } else {
                    warn!("ignoring non-positive speed {}", speed);
                }
            }
            id
        })
        .collect()
}

/// Load `FILES` plus the optional noise voice and start them all.
pub fn start_from_args(
    manager: &Manager,
    args: &ArgMatches,
    looping: bool,
) -> Result<(Vec<Arc<Sound>>, Vec<VoiceId>)> {
    let mut sounds = load_sounds(manager, args)?;
    if let Some(level) = parse_arg::<f32>(args, "noise")? {
        sounds.push(noise_sound(manager, level));
    }
    let options = VoiceOptions::from_args(args, looping)?;
    let voices = start_voices(manager, &sounds, options);
    Ok((sounds, voices))
}
