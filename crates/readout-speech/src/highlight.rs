//! Span-based highlight renderer.
//!
//! Lays the spoken text out as one span per chunk and keeps at most one of
//! them marked. Clones share state, so the sequencer can own one handle
//! while a display panel reads from another.

use std::fmt::Write as _;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use readout_core::HighlightRenderer;

/// CSS class on every chunk span.
pub const CHUNK_CLASS: &str = "readout-chunk";

/// CSS class added to the span being spoken.
pub const HIGHLIGHT_CLASS: &str = "readout-highlight";

#[derive(Debug, Default)]
struct SpanState {
    spans: Vec<String>,
    marked: Option<usize>,
}

/// Highlight renderer over an in-memory list of chunk spans.
#[derive(Debug, Clone, Default)]
pub struct SpanHighlighter {
    state: Arc<Mutex<SpanState>>,
}

impl SpanHighlighter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Index of the marked span, if any.
    pub fn marked(&self) -> Option<usize> {
        self.lock().marked
    }

    /// Text of the marked span, if any.
    pub fn marked_text(&self) -> Option<String> {
        let state = self.lock();
        state.marked.and_then(|i| state.spans.get(i).cloned())
    }

    /// Text of span `index`.
    pub fn span_text(&self, index: usize) -> Option<String> {
        self.lock().spans.get(index).cloned()
    }

    /// Number of laid-out spans.
    pub fn span_count(&self) -> usize {
        self.lock().spans.len()
    }

    /// Render the spans as HTML, marking the highlighted one.
    pub fn render_html(&self) -> String {
        let state = self.lock();
        let mut html = String::new();

        for (i, text) in state.spans.iter().enumerate() {
            if i > 0 {
                html.push(' ');
            }
            let class = if state.marked == Some(i) {
                format!("{CHUNK_CLASS} {HIGHLIGHT_CLASS}")
            } else {
                CHUNK_CLASS.to_string()
            };
            let _ = write!(
                html,
                r#"<span class="{class}" data-chunk="{i}">{}</span>"#,
                escape_html(text)
            );
        }

        html
    }

    fn lock(&self) -> MutexGuard<'_, SpanState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl HighlightRenderer for SpanHighlighter {
    fn prepare(&mut self, chunks: &[String]) {
        let mut state = self.lock();
        state.spans = chunks.to_vec();
        state.marked = None;
    }

    fn set_highlight(&mut self, index: Option<usize>) {
        let mut state = self.lock();
        match index {
            Some(i) if i >= state.spans.len() => {
                tracing::warn!(index = i, spans = state.spans.len(), "No span for chunk, clearing highlight");
                state.marked = None;
            }
            _ => state.marked = index,
        }
    }
}

fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            _ => escaped.push(c),
        }
    }
    escaped
}
