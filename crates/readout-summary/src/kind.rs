//! What kind of content a summary was made from.

use serde::{Deserialize, Serialize};

/// Source texts shorter than this get a single-paragraph summary.
pub const SHORT_TEXT_WORDS: usize = 500;

/// The content a summary was produced from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SummaryKind {
    /// Page text or a selection.
    #[default]
    Text,
    /// A video transcript.
    Youtube,
}

impl SummaryKind {
    /// Classify a page by its URL.
    pub fn for_url(url: &str) -> Self {
        if url.contains("youtube.com/watch") || url.contains("youtu.be/") {
            Self::Youtube
        } else {
            Self::Text
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Youtube => "youtube",
        }
    }

    /// Instruction appended to the summary request, chosen by source length.
    pub const fn length_hint(words: usize) -> &'static str {
        if words < SHORT_TEXT_WORDS {
            "Please provide a concise, single-paragraph summary."
        } else {
            "Please provide a detailed summary following the guidelines."
        }
    }
}

impl std::fmt::Display for SummaryKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Number of whitespace-separated words in `text`.
pub fn word_count(text: &str) -> usize {
    text.split_whitespace().count()
}
