//! The summary panel page.

use serde::Serialize;

use crate::date::format_published_date;
use crate::kind::SummaryKind;
use crate::markdown::{BlockKind, MarkdownRenderer, escape_html};

const DEFAULT_TITLE: &str = "Summary";
const DEFAULT_URL: &str = "#";
const EMPTY_SUMMARY: &str = "No summary available.";
const EMPTY_ERROR: &str = "No error message available.";

/// A finished summary together with what is known about its source page.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SummaryDocument {
    pub title: Option<String>,
    pub page_url: Option<String>,
    /// Publication date exactly as the page reported it.
    pub published: Option<String>,
    /// Length of the source text, in words.
    pub word_count: Option<usize>,
    pub kind: SummaryKind,
    pub markdown: String,
}

impl SummaryDocument {
    pub fn new(markdown: impl Into<String>) -> Self {
        Self {
            markdown: markdown.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Set the source URL; the summary kind follows from it.
    #[must_use]
    pub fn with_page_url(mut self, url: impl Into<String>) -> Self {
        let url = url.into();
        self.kind = SummaryKind::for_url(&url);
        self.page_url = Some(url);
        self
    }

    #[must_use]
    pub fn with_published(mut self, published: impl Into<String>) -> Self {
        self.published = Some(published.into());
        self
    }

    #[must_use]
    pub const fn with_word_count(mut self, words: usize) -> Self {
        self.word_count = Some(words);
        self
    }

    /// Heading shown at the top of the panel.
    pub fn heading(&self) -> String {
        let title = self
            .title
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .unwrap_or(DEFAULT_TITLE);
        format!("{title} - Summary")
    }

    /// The summary markdown, or a placeholder when there is none.
    pub fn summary_markdown(&self) -> &str {
        if self.markdown.trim().is_empty() {
            EMPTY_SUMMARY
        } else {
            &self.markdown
        }
    }

    /// Full panel markup: heading, source details and the rendered summary.
    pub fn panel_html(&self, renderer: &MarkdownRenderer) -> String {
        let url = self.page_url.as_deref().unwrap_or(DEFAULT_URL);
        let published = format_published_date(self.published.as_deref().unwrap_or_default());
        let length = self
            .word_count
            .map_or_else(|| "Unknown".to_string(), |n| n.to_string());

        let mut html = String::new();
        html.push_str(&format!("<h1>{}</h1>\n", escape_html(&self.heading())));
        html.push_str("<p class=\"summary-info\">");
        html.push_str(&format!(
            "<strong>Date Published:</strong> {}<br>",
            escape_html(&published)
        ));
        html.push_str(&format!("<strong>Original Length:</strong> {length} words<br>"));
        html.push_str(&format!(
            "<strong>Original Page:</strong> <a href=\"{0}\" target=\"_blank\">{0}</a>",
            escape_html(url)
        ));
        html.push_str("</p>\n<div class=\"summary-content\">");
        html.push_str(&renderer.render_html(self.summary_markdown()));
        html.push_str("</div>");
        html
    }

    /// The summary as plain text, one paragraph per block.
    pub fn summary_text(&self, renderer: &MarkdownRenderer) -> String {
        renderer
            .render(self.summary_markdown())
            .into_iter()
            .filter(|block| block.kind != BlockKind::Rule)
            .map(|block| block.text)
            .collect::<Vec<_>>()
            .join("\n\n")
    }
}

/// Markup for the error panel shown when summarising failed.
pub fn error_panel_html(message: Option<&str>) -> String {
    let message = message
        .map(str::trim)
        .filter(|m| !m.is_empty())
        .unwrap_or(EMPTY_ERROR);
    format!(
        "<h2>Error Occurred</h2><p id=\"error-message\">{}</p>",
        escape_html(message)
    )
}
