//! Segment command handler.

use std::path::Path;

use anyhow::Result;
use readout_speech::{segment, strip_markdown};

use super::read_input;
use crate::bootstrap::CliContext;
use crate::error::CliError;

/// Arguments for the segment command.
pub struct SegmentArgs<'a> {
    pub file: &'a Path,
    pub max_chars: Option<usize>,
    pub raw: bool,
    pub json: bool,
}

/// Split `source` the way the reader would.
pub fn chunks_for(source: &str, max_chars: usize, raw: bool) -> Vec<String> {
    if raw {
        segment(source, max_chars)
    } else {
        segment(&strip_markdown(source), max_chars)
    }
}

pub fn execute(ctx: &CliContext, args: &SegmentArgs<'_>) -> Result<()> {
    let max_chars = args.max_chars.unwrap_or(ctx.settings.max_chunk_chars);
    if max_chars == 0 {
        return Err(CliError::Arguments("--max-chars must be at least 1".to_string()).into());
    }

    let source = read_input(args.file)?;
    let chunks = chunks_for(&source, max_chars, args.raw);

    if args.json {
        println!("{}", serde_json::to_string_pretty(&chunks)?);
        return Ok(());
    }
    if chunks.is_empty() {
        println!("Nothing to read.");
        return Ok(());
    }
    let width = chunks.len().to_string().len();
    for (i, chunk) in chunks.iter().enumerate() {
        println!("{:>width$}  {chunk}", i + 1);
    }
    Ok(())
}
