//! Text preprocessing for read-aloud.
//!
//! Turns a summary's markdown source into plain paragraphs that are safe to
//! hand to a speech engine. Paragraph breaks survive as blank lines so the
//! segmenter can keep using them as chunk boundaries.

/// Strip markdown formatting from text, producing plain paragraphs for speech.
///
/// Handles:
/// - Thinking/reasoning blocks (`<think>`, `<reasoning>`, etc.) → removed entirely
/// - Fenced code blocks (```…```) → "Code omitted."
/// - Inline code (`…`) → unwrapped
/// - Headers (# … ) → text only, as a paragraph of their own
/// - Bold / italic / strikethrough → text only
/// - Colour tags (`<red>…</red>` and friends) → text only
/// - Links \[text\](url) → text only
/// - Images !\[alt\](url) → "image: alt"
/// - Bullet / numbered lists → text only, one paragraph per item
/// - Blockquotes (> …) → text only
/// - Horizontal rules (---, ***, ___) → paragraph break
///
/// Consecutive plain lines are joined into one paragraph; paragraphs are
/// separated by a single blank line.
#[must_use]
pub fn strip_markdown(text: &str) -> String {
    let text = strip_thinking_blocks(text);

    let mut paragraphs = Paragraphs::default();
    let mut in_code_block = false;
    let mut code_block_replaced = false;

    for line in text.lines() {
        let trimmed = line.trim();

        if trimmed.starts_with("```") {
            in_code_block = !in_code_block;
            code_block_replaced = false;
            paragraphs.flush();
            continue;
        }

        if in_code_block {
            if !code_block_replaced {
                paragraphs.push_block("Code omitted.");
                code_block_replaced = true;
            }
            continue;
        }

        if trimmed.is_empty() || is_horizontal_rule(trimmed) {
            paragraphs.flush();
            continue;
        }

        let processed = strip_line_markdown(trimmed);
        let processed = processed.trim();
        if processed.is_empty() {
            continue;
        }

        if starts_block(trimmed) {
            paragraphs.push_block(processed);
        } else {
            paragraphs.push_line(processed);
        }
    }

    paragraphs.finish()
}

/// Collapse every whitespace run into a single space and trim the ends.
#[must_use]
pub fn collapse_whitespace(text: &str) -> String {
    let mut result = String::with_capacity(text.len());
    let mut prev_space = false;

    for c in text.chars() {
        if c.is_whitespace() {
            if !prev_space {
                result.push(' ');
                prev_space = true;
            }
        } else {
            result.push(c);
            prev_space = false;
        }
    }

    result.trim().to_string()
}

// ── Internal helpers ───────────────────────────────────────────────

#[derive(Default)]
struct Paragraphs {
    done: Vec<String>,
    current: String,
    /// The current paragraph is a heading or list item and takes no
    /// continuation lines.
    closed: bool,
}

impl Paragraphs {
    fn push_line(&mut self, line: &str) {
        if self.closed {
            self.flush();
        }
        if !self.current.is_empty() {
            self.current.push(' ');
        }
        self.current.push_str(line);
    }

    fn push_block(&mut self, line: &str) {
        self.flush();
        self.current.push_str(line);
        self.closed = true;
    }

    fn flush(&mut self) {
        let paragraph = collapse_whitespace(&std::mem::take(&mut self.current));
        if !paragraph.is_empty() {
            self.done.push(paragraph);
        }
        self.closed = false;
    }

    fn finish(mut self) -> String {
        self.flush();
        self.done.join("\n\n")
    }
}

/// Whether a markdown line opens a block of its own (heading, list item).
fn starts_block(line: &str) -> bool {
    line.starts_with('#') || strip_list_marker(line).len() != line.len()
}

/// Remove `<think>…</think>`, `<reasoning>…</reasoning>`,
/// `<seed:think>…</seed:think>`, and `<|START_THINKING|>…<|END_THINKING|>`
/// blocks entirely so that model reasoning is never read out.
fn strip_thinking_blocks(text: &str) -> String {
    let mut result = strip_tag_block_pair(text, "<think", "</think>");
    result = strip_tag_block_pair(&result, "<reasoning>", "</reasoning>");
    result = strip_tag_block_pair(&result, "<seed:think>", "</seed:think>");
    strip_tag_block_pair(&result, "<|START_THINKING|>", "<|END_THINKING|>")
}

/// Remove all occurrences of `<open_tag…>…<close_tag>` from text.
///
/// `open_prefix` may be a prefix like `<think` that matches `<think>`,
/// `<think duration="5">`, etc.
fn strip_tag_block_pair(text: &str, open_prefix: &str, close_tag: &str) -> String {
    let mut result = String::with_capacity(text.len());
    let haystack = text.to_ascii_lowercase();
    let open_lower = open_prefix.to_ascii_lowercase();
    let close_lower = close_tag.to_ascii_lowercase();

    let mut cursor = 0;

    while cursor < text.len() {
        let Some(open_start) = haystack[cursor..].find(&open_lower) else {
            result.push_str(&text[cursor..]);
            break;
        };
        let abs_open = cursor + open_start;

        if let Some(tag_end_offset) = haystack[abs_open..].find('>') {
            let tag_end = abs_open + tag_end_offset + 1;
            if let Some(close_offset) = haystack[tag_end..].find(&close_lower) {
                result.push_str(&text[cursor..abs_open]);
                cursor = tag_end + close_offset + close_tag.len();
                continue;
            }
        }

        // Unclosed block, keep as-is
        result.push_str(&text[cursor..abs_open + open_prefix.len()]);
        cursor = abs_open + open_prefix.len();
    }

    result
}

/// Check if a line is a horizontal rule (---, ***, ___).
fn is_horizontal_rule(line: &str) -> bool {
    let chars: Vec<char> = line.chars().filter(|c| !c.is_whitespace()).collect();
    chars.len() >= 3
        && chars.iter().all(|&c| c == '-' || c == '*' || c == '_')
        && chars.windows(2).all(|w| w[0] == w[1])
}

/// Strip inline markdown from a single trimmed line.
fn strip_line_markdown(line: &str) -> String {
    let mut s = line.to_string();

    while s.starts_with('>') {
        s = s.trim_start_matches('>').trim_start().to_string();
    }

    if s.starts_with('#') {
        s = s.trim_start_matches('#').trim_start().to_string();
    }

    s = strip_list_marker(&s).to_string();
    s = strip_images(&s);
    s = strip_links(&s);
    s = strip_inline_code(&s);
    s = strip_emphasis(&s);
    strip_html_tags(&s)
}

fn strip_list_marker(line: &str) -> &str {
    if let Some(rest) = line
        .strip_prefix("- ")
        .or_else(|| line.strip_prefix("* "))
        .or_else(|| line.strip_prefix("+ "))
    {
        return rest;
    }

    // Numbered: 1. item, 2) item
    if let Some(pos) = line.find(|c: char| !c.is_ascii_digit()) {
        if pos > 0 {
            let after = &line[pos..];
            if after.starts_with(". ") || after.starts_with(") ") {
                return &after[2..];
            }
        }
    }

    line
}

fn strip_images(text: &str) -> String {
    let mut result = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();

    while let Some(c) = chars.next() {
        if c != '!' || chars.peek() != Some(&'[') {
            result.push(c);
            continue;
        }

        chars.next();
        let alt: String = chars.by_ref().take_while(|&c| c != ']').collect();
        if chars.peek() == Some(&'(') {
            chars.next();
            chars.by_ref().take_while(|&c| c != ')').for_each(drop);
            if !alt.is_empty() {
                result.push_str("image: ");
                result.push_str(&alt);
            }
            continue;
        }
        result.push_str("![");
        result.push_str(&alt);
        result.push(']');
    }

    result
}

fn strip_links(text: &str) -> String {
    let mut result = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();

    while let Some(c) = chars.next() {
        if c != '[' {
            result.push(c);
            continue;
        }

        let link_text: String = chars.by_ref().take_while(|&c| c != ']').collect();
        if chars.peek() == Some(&'(') {
            chars.next();
            chars.by_ref().take_while(|&c| c != ')').for_each(drop);
            result.push_str(&link_text);
            continue;
        }
        result.push('[');
        result.push_str(&link_text);
        result.push(']');
    }

    result
}

fn strip_inline_code(text: &str) -> String {
    let mut result = String::with_capacity(text.len());
    let mut rest = text;

    while let Some(open) = rest.find('`') {
        result.push_str(&rest[..open]);
        let after = &rest[open + 1..];
        match after.find('`') {
            Some(close) => {
                result.push_str(&after[..close]);
                rest = &after[close + 1..];
            }
            None => rest = after,
        }
    }
    result.push_str(rest);

    result
}

fn strip_emphasis(text: &str) -> String {
    // Standalone underscores are left alone (snake_case words)
    text.replace("**", "")
        .replace("__", "")
        .replace("~~", "")
        .replace('*', "")
}

fn strip_html_tags(text: &str) -> String {
    let mut result = String::with_capacity(text.len());
    let mut in_tag = false;

    for c in text.chars() {
        match c {
            '<' => in_tag = true,
            '>' if in_tag => in_tag = false,
            _ if !in_tag => result.push(c),
            _ => {}
        }
    }

    result
}
