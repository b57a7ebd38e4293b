use std::path::PathBuf;

use clap::{ArgAction, Parser};

#[derive(Parser, Debug)]
#[command(
    name = "svmidi",
    version,
    about = "Play a MIDI device from the computer keyboard",
    disable_version_flag = true
)]
pub struct Cli {
    /// Initial instrument (General MIDI program, 0-127)
    #[arg(short, long, allow_negative_numbers = true)]
    pub instrument: Option<i64>,

    /// Initial octave (-1 to 9)
    #[arg(short, long, allow_negative_numbers = true)]
    pub octave: Option<i64>,

    /// Initial MIDI channel (0-15)
    #[arg(short, long, allow_negative_numbers = true)]
    pub channel: Option<i64>,

    /// MIDI output port name filter (default: first port)
    #[arg(short, long)]
    pub port: Option<String>,

    /// Create a virtual output port instead of connecting to one
    #[arg(long = "virtual", conflicts_with = "port")]
    pub virtual_port: bool,

    /// List available MIDI output ports and exit
    #[arg(short, long)]
    pub list: bool,

    /// Config file (default: $XDG_CONFIG_HOME/svmidi/config.toml)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Print version
    #[arg(short = 'v', long = "version", action = ArgAction::Version)]
    #[allow(dead_code)]
    version: Option<bool>,
}
