//! `osm probe`: report a file's format, length and load mode.

use clap::ArgMatches;
use log::error;
use osm_lib::decode::FileType;
use osm_lib::{Sound, SoundMode};
use serde_json::json;

use crate::error::{CliError, Result};

pub fn run(args: &ArgMatches) -> Result<i32> {
    let path = args
        .get_one::<String>("INPUT")
        .ok_or_else(|| CliError::Argument("missing input".to_string()))?;
    let data = std::fs::read(path)?;

    let format = FileType::detect(&data).map(FileType::extension).unwrap_or("unknown");
    let sound = match Sound::load(&data, !args.get_flag("stream")) {
        Ok(sound) => sound,
        Err(err) => {
            error!("{}: {}", path, err);
            return Err(CliError::Load(path.clone()));
        }
    };

    let mode = match sound.mode() {
        SoundMode::Decompressed => "decompressed",
        SoundMode::Streaming => "streaming",
        SoundMode::Procedural => "procedural",
    };

    if args.get_flag("json") {
        let report = json!({
            "path": path,
            "format": format,
            "mode": mode,
            "sample_rate": sound.sample_rate(),
            "frames": sound.sample_count(),
            "seconds": sound.length(),
            "compressed_bytes": sound.compressed_len(),
        });
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("format: {}", format);
        println!("sample rate: {} Hz", sound.sample_rate());
        println!("frames: {}", sound.sample_count());
        println!("seconds: {:.3}", sound.length());
        println!("mode: {}", mode);
        if let Some(bytes) = sound.compressed_len() {
            println!("compressed bytes: {}", bytes);
        }
    }
    Ok(0)
}
