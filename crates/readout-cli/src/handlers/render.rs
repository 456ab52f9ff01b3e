//! Render command handler.

use std::path::Path;

use anyhow::Result;
use readout_summary::{MarkdownRenderer, SummaryDocument, word_count};

use super::read_input;

/// Arguments for the render command.
pub struct RenderArgs<'a> {
    pub file: &'a Path,
    pub title: Option<String>,
    pub url: Option<String>,
    pub published: Option<String>,
    pub source: Option<&'a Path>,
    pub text: bool,
}

/// Assemble the document the panel would show.
pub fn build_document(markdown: String, args: &RenderArgs<'_>, source_words: Option<usize>) -> SummaryDocument {
    let mut doc = SummaryDocument::new(markdown);
    if let Some(title) = &args.title {
        doc = doc.with_title(title.clone());
    }
    if let Some(url) = &args.url {
        doc = doc.with_page_url(url.clone());
    }
    if let Some(published) = &args.published {
        doc = doc.with_published(published.clone());
    }
    if let Some(words) = source_words {
        doc = doc.with_word_count(words);
    }
    doc
}

pub fn execute(args: &RenderArgs<'_>) -> Result<()> {
    let markdown = read_input(args.file)?;
    let source_words = match args.source {
        Some(path) => Some(word_count(&read_input(path)?)),
        None => None,
    };

    let renderer = MarkdownRenderer::new().map_err(crate::error::CliError::from)?;
    let doc = build_document(markdown, args, source_words);
    tracing::debug!(kind = %doc.kind, words = ?doc.word_count, "Rendering summary");

    if args.text {
        println!("{}", doc.summary_text(&renderer));
    } else {
        println!("{}", doc.panel_html(&renderer));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use readout_summary::SummaryKind;

    #[test]
    fn test_build_document_applies_flags() {
        let args = RenderArgs {
            file: Path::new("-"),
            title: Some("Tides".to_string()),
            url: Some("https://www.youtube.com/watch?v=x".to_string()),
            published: None,
            source: None,
            text: false,
        };
        let doc = build_document("Body".to_string(), &args, Some(812));
        assert_eq!(doc.heading(), "Tides - Summary");
        assert_eq!(doc.kind, SummaryKind::Youtube);
        assert_eq!(doc.word_count, Some(812));
    }
}
