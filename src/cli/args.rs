//! CLI argument definitions for `osm`.

use clap::{Arg, ArgAction, Command};

fn files_arg() -> Arg {
    Arg::new("FILES")
        .help("WAVE or Ogg Vorbis files to mix")
        .required(true)
        .num_args(1..)
        .index(1)
}

fn mixer_args(command: Command) -> Command {
    command
        .arg(
            Arg::new("settings")
                .long("settings")
                .value_name("PATH")
                .help("Path to a JSON file with mixer settings"),
        )
        .arg(
            Arg::new("block-frames")
                .long("block-frames")
                .value_name("FRAMES")
                .help("Frames mixed per backend pull"),
        )
        .arg(
            Arg::new("pan-law")
                .long("pan-law")
                .value_name("LAW")
                .value_parser(["linear", "constant_power"])
                .help("Stereo pan law"),
        )
        .arg(
            Arg::new("stream")
                .long("stream")
                .action(ArgAction::SetTrue)
                .help("Decode on demand instead of decompressing up front"),
        )
        .arg(
            Arg::new("GAIN")
                .long("gain")
                .short('g')
                .value_name("GAIN")
                .default_value("100")
                .help("Per-voice gain in percent"),
        )
        .arg(
            Arg::new("fade-in")
                .long("fade-in")
                .value_name("SECONDS")
                .default_value("0")
                .help("Fade each voice in over this many seconds"),
        )
        .arg(
            Arg::new("pan")
                .long("pan")
                .value_name("POSITION")
                .default_value("0")
                .allow_hyphen_values(true)
                .help("Pan position for every voice, -1 (left) to 1 (right)"),
        )
        .arg(
            Arg::new("speed")
                .long("speed")
                .value_name("FACTOR")
                .help("Playback speed multiplier"),
        )
        .arg(
            Arg::new("noise")
                .long("noise")
                .value_name("LEVEL")
                .help("Add a procedural white-noise voice at this amplitude"),
        )
}

/// Build the CLI argument parser and command definitions.
pub fn build_cli() -> Command {
    Command::new("osm")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Mix and play in-memory sound assets")
        .arg_required_else_help(true)
        .subcommand_required(true)
        .arg(
            Arg::new("debug")
                .long("debug")
                .short('d')
                .global(true)
                .action(ArgAction::SetTrue)
                .help("Show debug output"),
        )
        .subcommand(mixer_args(
            Command::new("play")
                .about("Play files through the output device until every voice ends")
                .arg(files_arg())
                .arg(
                    Arg::new("loop")
                        .long("loop")
                        .action(ArgAction::SetTrue)
                        .help("Loop every file until interrupted"),
                )
                .arg(
                    Arg::new("null-backend")
                        .long("null-backend")
                        .action(ArgAction::SetTrue)
                        .help("Drain the mix in real time without an output device"),
                ),
        ))
        .subcommand(
            Command::new("probe")
                .about("Load a file and print its format and length")
                .arg(
                    Arg::new("INPUT")
                        .help("The input file path")
                        .required(true)
                        .index(1),
                )
                .arg(
                    Arg::new("json")
                        .long("json")
                        .action(ArgAction::SetTrue)
                        .help("Print the result as JSON"),
                )
                .arg(
                    Arg::new("stream")
                        .long("stream")
                        .action(ArgAction::SetTrue)
                        .help("Load without decompressing and report the retained stream size"),
                ),
        )
        .subcommand(mixer_args(
            Command::new("render")
                .about("Mix files offline into a 16-bit stereo WAVE file")
                .arg(files_arg())
                .arg(
                    Arg::new("out")
                        .long("out")
                        .short('o')
                        .value_name("WAV")
                        .required(true)
                        .help("Output WAVE path"),
                )
                .arg(
                    Arg::new("frames")
                        .long("frames")
                        .value_name("FRAMES")
                        .help("Frames to render (default: the longest input)"),
                ),
        ))
        .subcommand(
            Command::new("create")
                .about("Emit default JSON payloads")
                .subcommand_required(true)
                .subcommand(
                    Command::new("settings-json").about("Print the default mixer settings"),
                ),
        )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_definition_is_consistent() {
        build_cli().debug_assert();
    }

    #[test]
    fn render_requires_out() {
        let result = build_cli().try_get_matches_from(["osm", "render", "a.wav"]);
        assert!(result.is_err());
    }

    #[test]
    fn play_collects_files_and_flags() {
        let matches = build_cli()
            .try_get_matches_from([
                "osm", "play", "a.wav", "b.ogg", "--loop", "--pan", "-0.5",
            ])
            .expect("parse");
        let (name, play) = matches.subcommand().expect("subcommand");
        assert_eq!(name, "play");
        let files: Vec<&String> = play.get_many::<String>("FILES").expect("files").collect();
        assert_eq!(files.len(), 2);
        assert!(play.get_flag("loop"));
        assert_eq!(play.get_one::<String>("pan").map(String::as_str), Some("-0.5"));
    }

    #[test]
    fn report_accepts_stream_flag() {
        let matches = build_cli()
            .try_get_matches_from(["osm", "probe", "a.ogg", "--stream"])
            .expect("parse");
        let (name, report) = matches.subcommand().expect("subcommand");
        assert_eq!(name, "probe");
        assert!(report.get_flag("stream"));
        assert!(!report.get_flag("json"));
    }
}
