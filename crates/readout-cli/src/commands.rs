//! Subcommand definitions.

use std::path::PathBuf;

use clap::Subcommand;

/// Available commands.
#[derive(Subcommand)]
pub enum Commands {
    /// Print the chunks a document would be read in
    Segment {
        /// Markdown or text file ("-" for stdin)
        file: PathBuf,
        /// Maximum characters per chunk (defaults to the configured value)
        #[arg(long)]
        max_chars: Option<usize>,
        /// Segment the text as-is instead of stripping markdown first
        #[arg(long)]
        raw: bool,
        /// Print the chunks as a JSON array
        #[arg(long)]
        json: bool,
    },

    /// Render a summary as panel HTML
    Render {
        /// Summary markdown file ("-" for stdin)
        file: PathBuf,
        /// Title of the summarised page
        #[arg(long)]
        title: Option<String>,
        /// URL of the summarised page
        #[arg(long)]
        url: Option<String>,
        /// Publication date as reported by the page
        #[arg(long)]
        published: Option<String>,
        /// Original text, used for the length shown in the panel
        #[arg(long)]
        source: Option<PathBuf>,
        /// Print plain text instead of HTML
        #[arg(long)]
        text: bool,
    },

    /// Read a document aloud through the simulated engine
    Read {
        /// Markdown or text file ("-" for stdin is not supported while reading keys)
        file: PathBuf,
        /// Chunk to start from (1-based)
        #[arg(long, default_value = "1")]
        from: usize,
        /// Playback rate in percent (50-200)
        #[arg(long)]
        rate: Option<u32>,
        /// Voice identifier (see `readout voices`)
        #[arg(long)]
        voice: Option<String>,
        /// Simulated speaking speed at 100%
        #[arg(long, default_value = "180")]
        wpm: u32,
        /// Number of initial chunks the engine drops without starting
        #[arg(long, default_value = "0")]
        flaky: u32,
        /// Make network voices fail
        #[arg(long)]
        offline: bool,
        /// Print playback events as JSON lines
        #[arg(long)]
        json: bool,
    },

    /// List the voices the engine offers
    Voices,

    /// Inspect or change stored preferences
    Prefs {
        #[command(subcommand)]
        command: PrefsCommand,
    },
}

/// Preference subcommands.
#[derive(Subcommand)]
pub enum PrefsCommand {
    /// Show one preference, or all of them
    Get {
        /// Preference key (tts.voice or tts.rate)
        key: Option<String>,
    },
    /// Store a preference
    Set {
        /// Preference key (tts.voice or tts.rate)
        key: String,
        /// New value
        value: String,
    },
}
