//! Text segmentation into speakable chunks.
//!
//! Engines tend to stall or silently drop long utterances, so text is cut
//! into short chunks before playback. Boundaries are chosen in order of
//! preference: paragraph, sentence, whitespace, and finally a hard cut at a
//! character boundary for a single word longer than the bound. Lengths are
//! measured in characters, never bytes.

use crate::text_utils::collapse_whitespace;

/// Characters that end a sentence.
const TERMINATORS: &[char] = &['.', '!', '?', '…'];

/// Closing characters that stay attached to the sentence they follow.
const CLOSERS: &[char] = &['"', '\'', '”', '’', ')', ']', '»'];

/// Split `text` into chunks of at most `max_chars` characters.
///
/// Every chunk is non-empty and carries its whitespace collapsed to single
/// spaces. Sentences are never merged, so `"A. B. C."` yields three chunks.
/// Empty or whitespace-only input yields no chunks. If splitting produces
/// nothing usable for non-empty input, the whole trimmed input is returned
/// as a single chunk.
#[must_use]
pub fn segment(text: &str, max_chars: usize) -> Vec<String> {
    let max_chars = max_chars.max(1);
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Vec::new();
    }

    let mut chunks = Vec::new();
    for paragraph in paragraphs(trimmed) {
        for sentence in sentences(&paragraph) {
            push_bounded(&mut chunks, sentence, max_chars);
        }
    }

    if chunks.is_empty() {
        tracing::debug!("Segmentation produced no chunks, reading input whole");
        chunks.push(trimmed.to_string());
    }

    chunks
}

/// Paragraphs are separated by one or more blank lines. Line breaks inside a
/// paragraph are soft and become spaces.
fn paragraphs(text: &str) -> Vec<String> {
    let mut result = Vec::new();
    let mut current = String::new();

    for line in text.lines() {
        if line.trim().is_empty() {
            flush_paragraph(&mut result, &mut current);
        } else {
            current.push_str(line);
            current.push(' ');
        }
    }
    flush_paragraph(&mut result, &mut current);

    result
}

fn flush_paragraph(result: &mut Vec<String>, current: &mut String) {
    let paragraph = collapse_whitespace(current);
    current.clear();
    if !paragraph.is_empty() {
        result.push(paragraph);
    }
}

/// Split a whitespace-normalized paragraph after each terminator (plus any
/// closing quotes or brackets) that is followed by a space or the end.
fn sentences(paragraph: &str) -> Vec<&str> {
    let mut result = Vec::new();
    let mut start = 0;
    let mut chars = paragraph.char_indices().peekable();

    while let Some((_, c)) = chars.next() {
        if !TERMINATORS.contains(&c) {
            continue;
        }
        while let Some(&(_, next)) = chars.peek() {
            if TERMINATORS.contains(&next) || CLOSERS.contains(&next) {
                chars.next();
            } else {
                break;
            }
        }
        match chars.peek() {
            Some(&(at, next)) if next.is_whitespace() => {
                result.push(paragraph[start..at].trim());
                start = at;
            }
            None => {
                result.push(paragraph[start..].trim());
                start = paragraph.len();
            }
            Some(_) => {}
        }
    }

    if start < paragraph.len() {
        result.push(paragraph[start..].trim());
    }

    result.retain(|s| !s.is_empty());
    result
}

/// Push `text`, cutting it at whitespace (or mid-word as a last resort) until
/// every piece fits in `max_chars`.
fn push_bounded(chunks: &mut Vec<String>, text: &str, max_chars: usize) {
    let mut rest = text.trim();

    while rest.chars().count() > max_chars {
        let (piece, remainder) = cut(rest, max_chars);
        let piece = piece.trim_end();
        if !piece.is_empty() {
            chunks.push(piece.to_string());
        }
        rest = remainder.trim_start();
    }

    if !rest.is_empty() {
        chunks.push(rest.to_string());
    }
}

/// Split `text` (longer than `max_chars`) into a head of at most `max_chars`
/// characters and the remainder.
fn cut(text: &str, max_chars: usize) -> (&str, &str) {
    let mut last_space = None;
    let mut hard_cut = text.len();

    for (count, (at, c)) in text.char_indices().enumerate() {
        if c.is_whitespace() && count > 0 && count <= max_chars {
            last_space = Some((at, c.len_utf8()));
        }
        if count == max_chars {
            hard_cut = at;
            break;
        }
    }

    match last_space {
        Some((at, width)) => (&text[..at], &text[at + width..]),
        None => text.split_at(hard_cut),
    }
}
