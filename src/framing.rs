//! Line framing for the decoded text stream.
//!
//! Accumulates decoded text and yields complete lines; the trailing
//! partial line stays buffered until its terminator arrives. A line is
//! only ever handed downstream once it is known to be complete.

/// Accumulates text and drains complete newline-terminated lines.
///
/// Carries exactly one piece of state between chunks: the trailing
/// partial line. One framer belongs to one stream session; construct a
/// fresh one on (re)connect.
#[derive(Debug, Default)]
pub struct LineFramer {
    buffer: String,
}

impl LineFramer {
    /// Create a new framer with an empty buffer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append decoded text and return all complete lines.
    ///
    /// Line terminators are `\n`, with an optional preceding `\r` stripped.
    /// Text after the final terminator remains buffered for the next call.
    pub fn push(&mut self, text: &str) -> Vec<String> {
        self.buffer.push_str(text);

        let mut lines = Vec::new();
        while let Some(pos) = self.buffer.find('\n') {
            let mut line: String = self.buffer.drain(..=pos).collect();
            line.pop();
            if line.ends_with('\r') {
                line.pop();
            }
            lines.push(line);
        }
        lines
    }

    /// The buffered partial line, if any.
    ///
    /// When the stream ends this leftover is discarded, never flushed as
    /// a final line: without its terminator the line cannot be known to
    /// be complete.
    pub fn partial(&self) -> &str {
        &self.buffer
    }
}
