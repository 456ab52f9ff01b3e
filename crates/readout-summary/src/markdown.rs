//! Summary markdown to display blocks.
//!
//! Summaries use a small dialect: `#` to `###` headings, `**bold**`,
//! `*italic*`, `---` rules and the colour tags `<red>`, `<blue>`, `<green>`
//! and `<orange>`. Every non-blank line becomes one block. Anything else,
//! raw HTML included, is shown as text.

use regex::{Captures, Regex};
use serde::Serialize;

use crate::error::SummaryError;

/// Colours a summary may tag text with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TextColour {
    Red,
    Blue,
    Green,
    Orange,
}

impl TextColour {
    pub const ALL: [Self; 4] = [Self::Red, Self::Blue, Self::Green, Self::Orange];

    /// The tag name used in summary markdown.
    pub const fn tag(self) -> &'static str {
        match self {
            Self::Red => "red",
            Self::Blue => "blue",
            Self::Green => "green",
            Self::Orange => "orange",
        }
    }

    /// CSS colour of the rendered span.
    pub const fn css(self) -> &'static str {
        match self {
            Self::Red => "#e74c3c",
            Self::Blue => "#1e90ff",
            Self::Green => "#2ecc71",
            Self::Orange => "#f39c12",
        }
    }
}

/// What a display block is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum BlockKind {
    Heading { level: u8 },
    Paragraph,
    Rule,
}

/// One rendered line of a summary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DisplayBlock {
    pub kind: BlockKind,
    /// Markup for the panel.
    pub html: String,
    /// The same content with all formatting removed.
    pub text: String,
}

/// Compiled markdown rules.
#[derive(Debug)]
pub struct MarkdownRenderer {
    heading: Regex,
    emphasised: Regex,
    bold: Regex,
    italic: Regex,
    colours: Vec<(TextColour, Regex)>,
    rule: Regex,
}

fn compile(name: &'static str, pattern: &str) -> Result<Regex, SummaryError> {
    Regex::new(pattern).map_err(|source| SummaryError::Rule { name, source })
}

impl MarkdownRenderer {
    pub fn new() -> Result<Self, SummaryError> {
        let colours = TextColour::ALL
            .into_iter()
            .map(|colour| {
                // Tags are matched after escaping, so look for the entities
                let pattern = format!("&lt;{0}&gt;(.*?)&lt;/{0}&gt;", colour.tag());
                compile("colour", &pattern).map(|re| (colour, re))
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            heading: compile("heading", r"^(#{1,3})\s+(.*)$")?,
            emphasised: compile("emphasised heading", r"^\*([^*].*?)\*$")?,
            bold: compile("bold", r"\*\*(.+?)\*\*")?,
            italic: compile("italic", r"\*(.+?)\*")?,
            colours,
            rule: compile("rule", r"^\s*(?:-{3,}|\*{3,}|_{3,})\s*$")?,
        })
    }

    /// Render `markdown` into one block per non-blank line.
    pub fn render(&self, markdown: &str) -> Vec<DisplayBlock> {
        markdown
            .lines()
            .filter(|line| !line.trim().is_empty())
            .map(|line| self.render_line(line.trim_end()))
            .collect()
    }

    /// Render straight to panel HTML.
    pub fn render_html(&self, markdown: &str) -> String {
        self.render(markdown)
            .into_iter()
            .map(|block| block.html)
            .collect()
    }

    fn render_line(&self, line: &str) -> DisplayBlock {
        if self.rule.is_match(line) {
            return DisplayBlock {
                kind: BlockKind::Rule,
                html: "<hr>".to_string(),
                text: String::new(),
            };
        }

        if let Some(caps) = self.heading.captures(line) {
            let level = u8::try_from(caps[1].len()).unwrap_or(3);
            let content = caps[2].trim();
            let (inner_html, text) = match self.emphasised.captures(content) {
                Some(emphasised) => {
                    // A heading wrapped in asterisks keeps its emphasis
                    let wrapper = if level == 3 { "em" } else { "strong" };
                    let inner = &emphasised[1];
                    (
                        format!("<{wrapper}>{}</{wrapper}>", self.inline_html(inner)),
                        self.inline_text(inner),
                    )
                }
                None => (self.inline_html(content), self.inline_text(content)),
            };
            return DisplayBlock {
                kind: BlockKind::Heading { level },
                html: format!("<h{level}>{inner_html}</h{level}>"),
                text,
            };
        }

        let content = line.trim();
        DisplayBlock {
            kind: BlockKind::Paragraph,
            html: format!("<p>{}</p>", self.inline_html(content)),
            text: self.inline_text(content),
        }
    }

    fn inline_html(&self, raw: &str) -> String {
        let escaped = escape_html(raw);
        let bold = self.bold.replace_all(&escaped, "<strong>$1</strong>");
        let mut html = self.italic.replace_all(&bold, "<em>$1</em>").into_owned();
        for (colour, re) in &self.colours {
            html = re
                .replace_all(&html, |caps: &Captures| {
                    format!("<span style=\"color:{}\">{}</span>", colour.css(), &caps[1])
                })
                .into_owned();
        }
        html
    }

    fn inline_text(&self, raw: &str) -> String {
        let bold = self.bold.replace_all(raw, "$1");
        let mut text = self.italic.replace_all(&bold, "$1").into_owned();
        for (colour, _) in &self.colours {
            let open = format!("<{}>", colour.tag());
            let close = format!("</{}>", colour.tag());
            text = text.replace(&open, "").replace(&close, "");
        }
        text
    }
}

/// Render `markdown` with a freshly compiled rule set.
pub fn render_markdown(markdown: &str) -> Result<Vec<DisplayBlock>, SummaryError> {
    Ok(MarkdownRenderer::new()?.render(markdown))
}

pub(crate) fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}
