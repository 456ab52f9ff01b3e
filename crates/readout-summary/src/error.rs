//! Summary rendering errors.

use thiserror::Error;

/// Errors raised while preparing a summary for display.
#[derive(Debug, Error)]
pub enum SummaryError {
    /// A markdown rule failed to compile.
    #[error("Invalid markdown rule '{name}': {source}")]
    Rule {
        name: &'static str,
        #[source]
        source: regex::Error,
    },
}
