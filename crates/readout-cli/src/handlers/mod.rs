//! Command handlers.
//!
//! Each handler parses what clap could not, calls into the library crates
//! and formats the result for the terminal.

pub mod prefs;
pub mod read;
pub mod render;
pub mod segment;
pub mod voices;

use std::io::Read;
use std::path::Path;

use crate::error::CliError;

/// Read a whole input file, with `-` meaning stdin.
pub fn read_input(path: &Path) -> Result<String, CliError> {
    if path.as_os_str() == "-" {
        let mut buf = String::new();
        std::io::stdin().read_to_string(&mut buf)?;
        return Ok(buf);
    }
    std::fs::read_to_string(path)
        .map_err(|e| CliError::Io(format!("cannot read {}: {e}", path.display())))
}
