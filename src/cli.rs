use clap::{Parser, Subcommand};
use std::path::PathBuf;

use stereoscoper::engine::parse_ipd;

#[derive(Parser)]
#[command(name = "stereoscoper")]
#[command(
    about = "Convert dual-fisheye 360 footage into side-by-side stereo video for Quest headsets",
    long_about = "Run without arguments to open the interactive form. Pass --input_path and \
                  --output_path to convert a single file from the command line."
)]
#[command(subcommand_negates_reqs = true, args_conflicts_with_subcommands = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Input 360 video (.360/.mp4)
    #[arg(long = "input_path", value_name = "FILE", required = true)]
    pub input_path: Option<PathBuf>,

    /// Output video (.mp4); a JSON sidecar is written next to it
    #[arg(long = "output_path", value_name = "FILE", required = true)]
    pub output_path: Option<PathBuf>,

    /// Interpupillary distance in millimeters (defaults to config, then 64.0)
    #[arg(long, value_name = "MM", value_parser = parse_ipd_arg)]
    pub ipd: Option<f64>,

    /// Probe the input and print the encode commands without running them
    #[arg(long)]
    pub dry_run: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Locate ffmpeg and print its path and version
    CheckFfmpeg,

    /// Probe a video file for its stereo stream pair, duration and frame rate
    Probe {
        /// Path to the video file
        file: PathBuf,
    },

    /// Show config status and location, or create default config if missing
    InitConfig,
}

fn parse_ipd_arg(s: &str) -> Result<f64, String> {
    parse_ipd(s).ok_or_else(|| format!("'{}' is not a finite number of millimeters", s))
}

pub fn parse() -> Cli {
    Cli::parse()
}
