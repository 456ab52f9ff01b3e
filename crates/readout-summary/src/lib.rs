#![doc = include_str!(concat!(env!("OUT_DIR"), "/README_GENERATED.md"))]
#![deny(unused_crate_dependencies)]

pub mod date;
pub mod document;
pub mod error;
pub mod kind;
pub mod markdown;

pub use date::{UNKNOWN_DATE, format_published_date};
pub use document::{SummaryDocument, error_panel_html};
pub use error::SummaryError;
pub use kind::{SummaryKind, word_count};
pub use markdown::{BlockKind, DisplayBlock, MarkdownRenderer, TextColour, render_markdown};
