//! `osm create`: print default JSON payloads.

use clap::ArgMatches;
use osm_lib::MixerSettings;

use crate::error::Result;

pub fn run(args: &ArgMatches) -> Result<i32> {
    if let Some(("settings-json", _)) = args.subcommand() {
        println!(
            "{}",
            serde_json::to_string_pretty(&MixerSettings::default())?
        );
    }
    Ok(0)
}
