//! # OSM
//!
//! Command-line harness for the osm mixing engine: play, probe and render
//! WAVE and Ogg Vorbis files.

use log::error;

mod cli;
mod error;
mod logging;

fn run(args: &clap::ArgMatches) -> error::Result<i32> {
    match args.subcommand() {
        Some(("play", sub)) => cli::play::run(sub),
        Some(("probe", sub)) => cli::probe::run(sub),
        Some(("render", sub)) => cli::render::run(sub),
        Some(("create", sub)) => cli::create::run(sub),
        _ => Ok(0),
    }
}

fn main() {
    let args = cli::args::build_cli().get_matches();
    logging::init(args.get_flag("debug"));

    let code = match run(&args) {
        Ok(code) => code,
        Err(err) => {
            error!("{}", err.to_string().to_lowercase());
            -1
        }
    };

    std::process::exit(code)
}
