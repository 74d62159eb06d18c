use clap::Parser;
use std::path::PathBuf;

use crate::config::CONFIG_FILE_NAME;

/// Water sort puzzle for the terminal.
#[derive(Parser, Debug)]
#[command(version, about)]
pub struct Cli {
    /// New-game configuration file (created with defaults if missing)
    #[arg(short, long, value_name = "PATH", default_value = CONFIG_FILE_NAME)]
    pub config: PathBuf,

    /// Directory holding saved games
    #[arg(short, long, value_name = "DIR", default_value = ".")]
    pub saves_dir: PathBuf,

    /// Seed the level generator for a reproducible game
    #[arg(long, value_name = "SEED")]
    pub seed: Option<u64>,

    /// Increase verbosity level (-v for INFO, -vv for DEBUG, -vvv for TRACE)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress all log output
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Write logs to a file as well as stderr
    #[arg(long, value_name = "PATH")]
    pub log_file: Option<PathBuf>,
}
