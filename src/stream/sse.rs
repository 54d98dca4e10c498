//! Line framing for the upstream SSE body and encoding of outbound SSE frames.
//!
//! The upstream sends one `data:` line per marker or text fragment. Bytes can
//! arrive split at arbitrary points, so [`LineFramer`] keeps the unterminated
//! tail of each read and only hands out lines once their `\n` has arrived.
use bytes::{Bytes, BytesMut};
use memchr::memchr_iter;

pub const DONE_FRAME: &str = "data: [DONE]\n\n";

/// Carry-over buffer that turns arbitrary byte reads into complete lines.
#[derive(Debug, Default)]
pub struct LineFramer {
    buffer: BytesMut,
}

impl LineFramer {
    #[must_use]
    pub fn new() -> Self {
        Self {
            buffer: BytesMut::with_capacity(4 * 1024),
        }
    }

    /// Append `chunk` and push every newly completed line into `out`.
    ///
    /// A trailing `\r` is stripped. Lines are decoded as UTF-8 only once complete,
    /// so a multi-byte character split across reads is reassembled intact.
    pub fn feed_into(&mut self, chunk: &[u8], out: &mut Vec<String>) {
        self.buffer.extend_from_slice(chunk);

        let mut consumed = 0usize;
        for line_end in memchr_iter(b'\n', &self.buffer) {
            out.push(decode_line(&self.buffer[consumed..line_end]));
            consumed = line_end + 1;
        }
        if consumed > 0 {
            let _ = self.buffer.split_to(consumed);
        }
    }

    /// Feed a chunk and collect the completed lines.
    #[must_use]
    pub fn feed(&mut self, chunk: &[u8]) -> Vec<String> {
        let mut out = Vec::new();
        self.feed_into(chunk, &mut out);
        out
    }

    /// Take the unterminated remainder once the byte stream has ended.
    #[must_use]
    pub fn finish(&mut self) -> Option<String> {
        if self.buffer.is_empty() {
            return None;
        }
        let rest = self.buffer.split();
        Some(decode_line(&rest))
    }

    #[must_use]
    pub fn pending_len(&self) -> usize {
        self.buffer.len()
    }
}

fn decode_line(raw: &[u8]) -> String {
    let raw = raw.strip_suffix(b"\r").unwrap_or(raw);
    String::from_utf8_lossy(raw).into_owned()
}

/// Payload of a `data:` line with surrounding whitespace removed.
///
/// Returns `None` for blank keep-alives, comments and any other SSE field.
#[must_use]
pub fn data_payload(line: &str) -> Option<&str> {
    line.strip_prefix("data:").map(str::trim)
}

/// Format an OpenAI-style SSE frame (no event type, just data).
#[must_use]
pub fn openai_sse_frame(json: &str) -> String {
    let mut out = String::with_capacity(8 + json.len());
    out.push_str("data: ");
    out.push_str(json);
    out.push_str("\n\n");
    out
}

/// The terminal `[DONE]` frame.
#[must_use]
pub fn done_frame() -> Bytes {
    Bytes::from_static(DONE_FRAME.as_bytes())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_complete_lines_in_one_read() {
        let mut framer = LineFramer::new();
        let lines = framer.feed(b"data: a\n\ndata: b\n");
        assert_eq!(lines, vec!["data: a", "", "data: b"]);
        assert_eq!(framer.pending_len(), 0);
    }

    #[test]
    fn test_line_split_across_reads() {
        let mut framer = LineFramer::new();
        assert!(framer.feed(b"data: hel").is_empty());
        assert_eq!(framer.pending_len(), 9);
        assert_eq!(framer.feed(b"lo\n"), vec!["data: hello"]);
    }

    #[test]
    fn test_multibyte_char_split_across_reads() {
        let text = "data: 你好\n".as_bytes();
        // cut inside the first CJK character
        let (head, tail) = text.split_at(8);
        let mut framer = LineFramer::new();
        assert!(framer.feed(head).is_empty());
        assert_eq!(framer.feed(tail), vec!["data: 你好"]);
    }

    #[test]
    fn test_crlf_line_endings() {
        let mut framer = LineFramer::new();
        assert_eq!(
            framer.feed(b"data: x\r\n\r\ndata: y\r\n"),
            vec!["data: x", "", "data: y"]
        );
    }

    #[test]
    fn test_finish_returns_unterminated_tail() {
        let mut framer = LineFramer::new();
        assert!(framer.feed(b"data: tail").is_empty());
        assert_eq!(framer.finish().as_deref(), Some("data: tail"));
        assert_eq!(framer.finish(), None);
    }

    #[test]
    fn test_feed_into_appends() {
        let mut framer = LineFramer::new();
        let mut out = vec!["existing".to_string()];
        framer.feed_into(b"data: z\n", &mut out);
        assert_eq!(out, vec!["existing", "data: z"]);
    }

    #[test]
    fn test_data_payload() {
        assert_eq!(data_payload("data: hello"), Some("hello"));
        assert_eq!(data_payload("data:hello"), Some("hello"));
        assert_eq!(data_payload("data:  two "), Some("two"));
        assert_eq!(data_payload(""), None);
        assert_eq!(data_payload(": keep-alive"), None);
        assert_eq!(data_payload("event: message"), None);
    }

    #[test]
    fn test_frame_helpers() {
        assert_eq!(openai_sse_frame("{\"a\":1}"), "data: {\"a\":1}\n\n");
        assert_eq!(done_frame().as_ref(), b"data: [DONE]\n\n");
    }
}
