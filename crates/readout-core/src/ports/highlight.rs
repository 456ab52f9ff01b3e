//! Highlight renderer port.

/// Marks the displayed text span for a chunk.
///
/// `set_highlight(Some(i))` removes any existing marker and applies it to
/// chunk `i`; `set_highlight(None)` clears it. Implementations must be
/// idempotent and must not fail for an index without a span (log and clear
/// instead).
pub trait HighlightRenderer: Send {
    /// Called once per playback session with the chunks about to be spoken,
    /// so the renderer can lay out one span per chunk.
    fn prepare(&mut self, _chunks: &[String]) {}

    fn set_highlight(&mut self, index: Option<usize>);
}

/// A renderer that discards every request.
///
/// Useful for headless playback and for tests that only care about the
/// engine side.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopHighlighter;

impl HighlightRenderer for NoopHighlighter {
    fn set_highlight(&mut self, _index: Option<usize>) {}
}
