//! Server-Sent Events (SSE) line framing.
//!
//! Chat completion streams are consumed line by line: each `data: ` line is
//! one payload, everything else (blank separators, `: heartbeat` comments,
//! `event:`/`id:` fields) carries nothing we act on. Body chunks arrive at
//! arbitrary boundaries, so the decoder buffers raw bytes until a newline is
//! seen. Buffering bytes rather than text keeps multi-byte characters that
//! straddle two chunks intact.

use crate::provider::error::TransportError;

/// SSE data field marker.
pub const DATA_PREFIX: &str = "data: ";

/// Longest line the decoder will buffer before giving up on the stream.
pub const MAX_LINE_BYTES: usize = 4 * 1024 * 1024;

/// A classified SSE line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SseLine<'a> {
    /// Empty line (event separator).
    Blank,
    /// Payload of a `data: ` line.
    Data(&'a str),
    /// Comment, heartbeat or a field we don't use.
    Other,
}

impl<'a> SseLine<'a> {
    pub fn classify(line: &'a str) -> Self {
        if line.is_empty() {
            Self::Blank
        } else if let Some(data) = line.strip_prefix(DATA_PREFIX) {
            Self::Data(data)
        } else {
            Self::Other
        }
    }
}

/// Incremental line decoder.
///
/// Feed body chunks with [`push`](Self::push), drain complete lines with
/// [`next_line`](Self::next_line). Call [`finish`](Self::finish) at EOF so a
/// final unterminated line is still returned.
#[derive(Debug)]
pub struct SseLineDecoder {
    buffer: Vec<u8>,
    /// Bytes of `buffer` already searched for a newline.
    scanned: usize,
    max_line: usize,
    eof: bool,
}

impl Default for SseLineDecoder {
    fn default() -> Self {
        Self::with_max_line(MAX_LINE_BYTES)
    }
}

impl SseLineDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_max_line(max_line: usize) -> Self {
        Self {
            buffer: Vec::new(),
            scanned: 0,
            max_line,
            eof: false,
        }
    }

    /// Append a chunk of body bytes.
    pub fn push(&mut self, chunk: &[u8]) {
        self.buffer.extend_from_slice(chunk);
    }

    /// Mark the end of input.
    pub fn finish(&mut self) {
        self.eof = true;
    }

    /// Next complete line without its terminator (`\n` or `\r\n`).
    ///
    /// Returns `Ok(None)` when more input is needed, or when input is finished
    /// and fully drained.
    pub fn next_line(&mut self) -> Result<Option<String>, TransportError> {
        if let Some(offset) = self.buffer[self.scanned..].iter().position(|&b| b == b'\n') {
            let end = self.scanned + offset;
            let mut line: Vec<u8> = self.buffer.drain(..=end).collect();
            line.pop();
            if line.last() == Some(&b'\r') {
                line.pop();
            }
            self.scanned = 0;
            return Ok(Some(decode(line)));
        }

        self.scanned = self.buffer.len();
        if self.buffer.len() > self.max_line {
            return Err(TransportError::LineTooLong {
                limit: self.max_line,
            });
        }

        if self.eof && !self.buffer.is_empty() {
            let mut line = std::mem::take(&mut self.buffer);
            if line.last() == Some(&b'\r') {
                line.pop();
            }
            self.scanned = 0;
            return Ok(Some(decode(line)));
        }

        Ok(None)
    }

    /// Check if there's pending data in the buffer.
    pub fn has_pending(&self) -> bool {
        !self.buffer.is_empty()
    }
}

fn decode(line: Vec<u8>) -> String {
    String::from_utf8(line).unwrap_or_else(|e| String::from_utf8_lossy(e.as_bytes()).into_owned())
}
