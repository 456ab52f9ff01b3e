//! Root CLI parser and global options.

use std::path::PathBuf;

use clap::Parser;

use crate::commands::Commands;

/// Command-line interface for readout.
#[derive(Parser)]
#[command(name = "readout")]
#[command(about = "Render summaries and read them aloud")]
#[command(version)]
pub struct Cli {
    /// Override the data directory (preferences and .env)
    #[arg(long = "data-dir", global = true, env = "READOUT_DATA_DIR")]
    pub data_dir: Option<PathBuf>,

    /// Enable verbose/debug output
    #[arg(short = 'v', long = "verbose", global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}
