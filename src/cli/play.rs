//! `osm play`: mix files to the output device in real time.

use std::thread::sleep;
use std::time::Duration;

use clap::ArgMatches;
use log::{error, info};
use osm_lib::{BackendKind, Manager, SoundMode};

use super::mix::{settings_from_args, start_from_args};
use crate::error::{CliError, Result};

const POLL_INTERVAL_MS: u64 = 50;

pub fn run(args: &ArgMatches) -> Result<i32> {
    let mut settings = settings_from_args(args)?;
    if args.get_flag("null-backend") {
        settings.backend = BackendKind::Null;
    }
    let looping = args.get_flag("loop");

    let manager = Manager::new(settings);
    if !manager.initialize() {
        error!("could not start the {:?} backend", manager.settings().backend);
        return Err(CliError::Backend);
    }

    let (sounds, voices) = start_from_args(&manager, args, looping)?;
    info!("playing {} voices", voices.len());

    // Procedural voices never end on their own; wait on the file voices.
    let tracked: Vec<_> = sounds
        .iter()
        .zip(voices.iter())
        .filter(|(sound, _)| sound.mode() != SoundMode::Procedural)
        .map(|(_, id)| *id)
        .collect();

    while tracked.iter().any(|id| manager.is_playing(*id)) {
        sleep(Duration::from_millis(POLL_INTERVAL_MS));
    }

    manager.stop_all();
    manager.finalize();
    Ok(0)
}
