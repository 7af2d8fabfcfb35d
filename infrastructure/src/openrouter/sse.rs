//! Server-sent events decoding for streamed completions.
//!
//! Bytes arrive in arbitrary chunks, so [`SseDecoder`] buffers raw bytes until
//! a full line is available and only then decodes it. A chunk boundary may fall
//! inside a multi-byte character. Only `data: ` lines matter; blank lines, comments and
//! the `[DONE]` sentinel are dropped, and a chunk that fails to parse is
//! logged and skipped.

use serde::Deserialize;
use tracing::debug;

const DONE: &str = "[DONE]";

#[derive(Debug, Deserialize)]
struct StreamChunk {
    #[serde(default)]
    choices: Vec<StreamChoice>,
}

#[derive(Debug, Deserialize)]
struct StreamChoice {
    #[serde(default)]
    delta: Option<Delta>,
}

#[derive(Debug, Deserialize)]
struct Delta {
    #[serde(default)]
    content: Option<String>,
}

/// Incremental SSE line splitter
#[derive(Debug, Default)]
pub struct SseDecoder {
    buffer: Vec<u8>,
    done: bool,
}

impl SseDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether the `[DONE]` sentinel was seen
    pub fn is_done(&self) -> bool {
        self.done
    }

    /// Feed raw bytes and return the content deltas they complete
    pub fn feed(&mut self, bytes: &[u8]) -> Vec<String> {
        self.buffer.extend_from_slice(bytes);

        let mut deltas = Vec::new();
        while let Some(end) = self.buffer.iter().position(|&b| b == b'\n') {
            let line: Vec<u8> = self.buffer.drain(..=end).collect();
            if let Some(delta) = self.raw_line(&line) {
                deltas.push(delta);
            }
        }
        deltas
    }

    /// Flush a final line that had no trailing newline
    pub fn finish(&mut self) -> Option<String> {
        let rest = std::mem::take(&mut self.buffer);
        self.raw_line(&rest)
    }

    fn raw_line(&mut self, bytes: &[u8]) -> Option<String> {
        match std::str::from_utf8(bytes) {
            Ok(line) => self.line(line.trim_end_matches(['\r', '\n'])),
            Err(e) => {
                debug!("Skipping stream line that is not UTF-8: {}", e);
                None
            }
        }
    }

    fn line(&mut self, line: &str) -> Option<String> {
        if self.done {
            return None;
        }
        let data = line.strip_prefix("data:")?.trim_start();
        if data == DONE {
            self.done = true;
            return None;
        }
        parse_delta(data)
    }
}

/// `choices[0].delta.content` of one data payload, when non-empty
pub fn parse_delta(data: &str) -> Option<String> {
    match serde_json::from_str::<StreamChunk>(data) {
        Ok(chunk) => chunk
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.delta)
            .and_then(|d| d.content)
            .filter(|c| !c.is_empty()),
        Err(e) => {
            debug!("Skipping malformed stream chunk: {}", e);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn data(content: &str) -> String {
        format!(
            "data: {}\n\n",
            serde_json::json!({"choices": [{"delta": {"content": content}}]})
        )
    }

    #[test]
    fn test_lines_split_across_chunks() {
        let mut decoder = SseDecoder::new();
        let payload = format!("{}{}", data("Hel"), data("lo"));
        let (a, b) = payload.split_at(10);

        let mut out = decoder.feed(a.as_bytes());
        out.extend(decoder.feed(b.as_bytes()));
        assert_eq!(out, vec!["Hel", "lo"]);
    }

    #[test]
    fn test_done_comments_and_garbage_are_skipped() {
        let mut decoder = SseDecoder::new();
        let stream = format!(
            ": OPENROUTER PROCESSING\n\n{}data: {{not json\n\n{}data: [DONE]\n\n{}",
            data("a"),
            data(""),
            data("after done")
        );
        assert_eq!(decoder.feed(stream.as_bytes()), vec!["a"]);
        assert!(decoder.is_done());
    }

    #[test]
    fn test_crlf_and_unterminated_last_line() {
        let mut decoder = SseDecoder::new();
        let first = decoder.feed(b"data: {\"choices\":[{\"delta\":{\"content\":\"x\"}}]}\r\n");
        assert_eq!(first, vec!["x"]);
        assert!(decoder.feed(b"data: {\"choices\":[{\"delta\":{\"content\":\"y\"}}]}").is_empty());
        assert_eq!(decoder.finish().as_deref(), Some("y"));
    }

    #[test]
    fn test_multibyte_character_split_across_chunks() {
        let mut decoder = SseDecoder::new();
        let payload = data("café 😀");
        let cut = payload.find('é').unwrap() + 1;
        let (a, b) = payload.as_bytes().split_at(cut);

        assert!(decoder.feed(a).is_empty());
        assert_eq!(decoder.feed(b), vec!["café 😀"]);
    }

    #[test]
    fn test_emoji_split_byte_by_byte() {
        let mut decoder = SseDecoder::new();
        let mut out = Vec::new();
        for byte in data("😀 ok").as_bytes() {
            out.extend(decoder.feed(std::slice::from_ref(byte)));
        }
        assert_eq!(out, vec!["😀 ok"]);
    }

    #[test]
    fn test_role_only_delta() {
        assert_eq!(parse_delta(r#"{"choices":[{"delta":{"role":"assistant"}}]}"#), None);
    }
}
