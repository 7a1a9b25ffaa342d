//! The lazy response sequence returned by chat calls.

use crate::provider::error::Error;
use crate::provider::types::ChatResponse;
use futures::stream::{BoxStream, Stream, StreamExt};
use std::fmt;
use std::pin::Pin;
use std::task::{Context, Poll};

/// Single-pass sequence of responses from one chat call.
///
/// Nothing happens until the stream is polled: each poll performs at most the
/// I/O needed for the next value. The sequence ends after a final response,
/// after the first error, or when the caller drops it. Dropping releases the
/// underlying HTTP connection.
pub struct ChatStream {
    inner: BoxStream<'static, Result<ChatResponse, Error>>,
}

impl ChatStream {
    pub(crate) fn new(inner: BoxStream<'static, Result<ChatResponse, Error>>) -> Self {
        Self { inner }
    }

    /// Drain the sequence and return its final response.
    ///
    /// Returns `Ok(None)` when the call completed without one (an empty stream
    /// or a response with no choices).
    pub async fn final_response(mut self) -> Result<Option<ChatResponse>, Error> {
        let mut last = None;
        while let Some(item) = self.next().await {
            let response = item?;
            if response.is_final {
                last = Some(response);
            }
        }
        Ok(last)
    }
}

impl Stream for ChatStream {
    type Item = Result<ChatResponse, Error>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.inner.poll_next_unpin(cx)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl fmt::Debug for ChatStream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChatStream").finish_non_exhaustive()
    }
}
