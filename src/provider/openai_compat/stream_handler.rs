//! Stream handling for OpenAI-compatible API.
//!
//! [`StreamHandler`] turns classified SSE lines into [`ChatResponse`]s. It is
//! a two-state machine: reading until either the `[DONE]` sentinel or a
//! finish reason moves it to done, after which every further line is ignored.
//! Transport failures and cancellation are handled by the caller driving it.

use super::stream::StreamChunk;
use crate::provider::error::{ApiError, Error};
use crate::provider::http::SseLine;
use crate::provider::types::{ChatResponse, Usage};

/// Payload that ends an OpenAI-compatible stream.
pub const DONE_SENTINEL: &str = "[DONE]";

/// Longest prefix of a bad payload echoed into logs.
const LOG_PREVIEW_CHARS: usize = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Reading,
    Done,
}

/// Accumulates deltas of one streaming response.
#[derive(Debug)]
pub(crate) struct StreamHandler {
    state: State,
    accumulated: String,
    usage: Option<Usage>,
    /// Non-empty deltas seen so far.
    chunks: usize,
    /// HTTP status of the stream, reported on in-band errors.
    status: u16,
}

impl StreamHandler {
    pub fn new(status: u16) -> Self {
        Self {
            state: State::Reading,
            accumulated: String::with_capacity(1024),
            usage: None,
            chunks: 0,
            status,
        }
    }

    pub fn is_done(&self) -> bool {
        self.state == State::Done
    }

    pub fn chunks(&self) -> usize {
        self.chunks
    }

    /// Process one line, returning the responses it produces (zero, one or two).
    ///
    /// A line that fails to decode is logged and skipped. An in-band error
    /// envelope ends the stream with [`ApiError`].
    pub fn handle_line(&mut self, line: &str) -> Result<Vec<ChatResponse>, Error> {
        if self.is_done() {
            return Ok(Vec::new());
        }

        let data = match SseLine::classify(line) {
            SseLine::Data(data) => data,
            SseLine::Blank | SseLine::Other => return Ok(Vec::new()),
        };

        if data == DONE_SENTINEL {
            self.state = State::Done;
            tracing::debug!(
                chunks = self.chunks,
                content_len = self.accumulated.len(),
                "Stream completed with [DONE]"
            );
            if self.accumulated.is_empty() {
                return Ok(Vec::new());
            }
            return Ok(vec![self.final_response(None)]);
        }

        let chunk = match serde_json::from_str::<StreamChunk>(data) {
            Ok(chunk) => chunk,
            Err(e) => {
                tracing::warn!(
                    error = %e,
                    data = preview(data),
                    "Failed to parse stream chunk, skipping"
                );
                return Ok(Vec::new());
            }
        };

        if let Some(err) = chunk.error.filter(|e| !e.message.is_empty()) {
            self.state = State::Done;
            return Err(ApiError {
                status: self.status,
                message: err.message,
                error_type: err.error_type,
                code: None,
                retry_after: None,
                body: data.to_string(),
            }
            .into());
        }

        if let Some(usage) = chunk.usage {
            self.usage = Some(usage.into());
        }

        let mut responses = Vec::new();
        let Some(choice) = chunk.choices.into_iter().next() else {
            return Ok(responses);
        };

        if let Some(delta) = choice.delta.content
            && !delta.is_empty()
        {
            self.chunks += 1;
            self.accumulated.push_str(&delta);
            if self.chunks % 10 == 0 {
                tracing::debug!(
                    chunks = self.chunks,
                    accumulated_len = self.accumulated.len(),
                    "Streaming progress"
                );
            }
            responses.push(ChatResponse::partial(delta));
        }

        if let Some(reason) = choice.finish_reason
            && !reason.is_empty()
        {
            self.state = State::Done;
            tracing::debug!(
                reason = %reason,
                chunks = self.chunks,
                content_len = self.accumulated.len(),
                "Stream finished"
            );
            responses.push(self.final_response(Some(reason)));
        }

        Ok(responses)
    }

    fn final_response(&self, finish_reason: Option<String>) -> ChatResponse {
        ChatResponse::complete(self.accumulated.clone(), finish_reason, self.usage)
    }
}

/// First [`LOG_PREVIEW_CHARS`] characters of `data`.
fn preview(data: &str) -> &str {
    match data.char_indices().nth(LOG_PREVIEW_CHARS) {
        Some((idx, _)) => &data[..idx],
        None => data,
    }
}
