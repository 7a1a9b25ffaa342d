//! OpenAI-compatible API client.

use super::request_builder::build_request;
use super::response::OpenAIResponse;
use super::stream_handler::StreamHandler;
use crate::config::ClientConfig;
use crate::provider::error::{ApiError, Error, TransportError};
use crate::provider::http::{HttpClient, SseLineDecoder};
use crate::provider::stream::ChatStream;
use crate::provider::types::{ChatRequest, ChatResponse};
use bytes::Bytes;
use futures::stream::{self, BoxStream, StreamExt};
use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Instant;
use tokio_util::sync::CancellationToken;

/// Native OpenAI-compatible API client.
///
/// Cheap to clone. Clones share one connection pool and may send concurrently.
#[derive(Debug, Clone)]
pub struct OpenAICompatClient {
    inner: Arc<Inner>,
}

#[derive(Debug)]
struct Inner {
    http: HttpClient,
    model: String,
}

impl OpenAICompatClient {
    /// Create a client with its own pooled transport.
    pub fn new(config: ClientConfig) -> Result<Self, Error> {
        config.validate()?;
        let http = HttpClient::new(&config)?;
        Ok(Self::from_parts(http, config, "own"))
    }

    /// Create a client on a pre-configured transport.
    ///
    /// `config.timeout_ms` and `config.transport` are ignored; the timeouts
    /// `client` was built with apply.
    pub fn with_http_client(config: ClientConfig, client: reqwest::Client) -> Result<Self, Error> {
        config.validate()?;
        let http = HttpClient::with_client(&config, client)?;
        Ok(Self::from_parts(http, config, "shared"))
    }

    fn from_parts(http: HttpClient, config: ClientConfig, transport: &str) -> Self {
        tracing::info!(
            url = %http.url(),
            model = %config.model,
            timeout_ms = config.timeout().as_millis() as u64,
            transport,
            "Created OpenAI-compatible client"
        );
        Self {
            inner: Arc::new(Inner {
                http,
                model: config.model,
            }),
        }
    }

    /// Model identifier sent with every request.
    pub fn model_name(&self) -> &str {
        &self.inner.model
    }

    /// Start a chat call.
    ///
    /// Returns immediately; the request is built and sent on the first poll.
    /// With `stream` set the sequence yields partial deltas followed by one
    /// final response. Otherwise it yields at most one final response.
    /// Cancelling `cancel` ends the sequence with [`TransportError::Cancelled`]
    /// at the next poll, even if responses are already queued.
    pub fn send(&self, cancel: CancellationToken, request: ChatRequest, stream: bool) -> ChatStream {
        let call = PendingCall {
            inner: Arc::clone(&self.inner),
            cancel,
            request,
            stream,
        };
        ChatStream::new(stream::unfold(SendState::Start(call), step).boxed())
    }
}

enum SendState {
    Start(PendingCall),
    Streaming(Box<SseSession>),
    Finished,
}

async fn step(state: SendState) -> Option<(Result<ChatResponse, Error>, SendState)> {
    match state {
        SendState::Start(call) => match call.start().await {
            Ok(Started::Complete(Some(response))) => Some((Ok(response), SendState::Finished)),
            Ok(Started::Complete(None)) => None,
            Ok(Started::Streaming(session)) => next_streamed(session).await,
            Err(e) => Some((Err(e), SendState::Finished)),
        },
        SendState::Streaming(session) => next_streamed(session).await,
        SendState::Finished => None,
    }
}

async fn next_streamed(
    mut session: Box<SseSession>,
) -> Option<(Result<ChatResponse, Error>, SendState)> {
    let item = session.next().await?;
    // Drop the session (and its connection) as soon as nothing more can follow.
    let next = if item.is_err() || session.is_exhausted() {
        SendState::Finished
    } else {
        SendState::Streaming(session)
    };
    Some((item, next))
}

struct PendingCall {
    inner: Arc<Inner>,
    cancel: CancellationToken,
    request: ChatRequest,
    stream: bool,
}

enum Started {
    Complete(Option<ChatResponse>),
    Streaming(Box<SseSession>),
}

impl PendingCall {
    async fn start(self) -> Result<Started, Error> {
        if self.cancel.is_cancelled() {
            return Err(TransportError::Cancelled.into());
        }

        let body = build_request(&self.request, &self.inner.model, self.stream)?;
        let started = Instant::now();

        let response = tokio::select! {
            biased;
            () = self.cancel.cancelled() => Err(Error::from(TransportError::Cancelled)),
            result = self.inner.http.post(&body, self.stream) => result,
        }
        .inspect_err(|e| {
            tracing::debug!(
                error = %e,
                elapsed_ms = started.elapsed().as_millis() as u64,
                "Chat completion request failed"
            );
        })?;

        let status = response.status().as_u16();
        if self.stream {
            tracing::debug!(
                status,
                elapsed_ms = started.elapsed().as_millis() as u64,
                "Chat completion stream opened"
            );
            return Ok(Started::Streaming(Box::new(SseSession::new(
                response, status, self.cancel, started,
            ))));
        }

        let text = tokio::select! {
            biased;
            () = self.cancel.cancelled() => Err(Error::from(TransportError::Cancelled)),
            result = response.text() => result.map_err(|e| Error::from(TransportError::Read(e))),
        }?;

        let parsed: OpenAIResponse = serde_json::from_str(&text).map_err(|e| ApiError {
            status,
            message: format!("failed to decode response: {e}"),
            error_type: None,
            code: None,
            retry_after: None,
            body: text.clone(),
        })?;

        let response = parsed.into_chat_response();
        if response.is_none() {
            tracing::warn!(status, "Chat completion response has no choices");
        }
        tracing::info!(
            status,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Chat completion finished"
        );
        Ok(Started::Complete(response))
    }
}

/// An open SSE response being read on demand.
struct SseSession {
    body: BoxStream<'static, reqwest::Result<Bytes>>,
    decoder: SseLineDecoder,
    handler: StreamHandler,
    /// Responses parsed but not yet handed out.
    pending: VecDeque<ChatResponse>,
    cancel: CancellationToken,
    eof: bool,
    started: Instant,
}

impl SseSession {
    fn new(
        response: reqwest::Response,
        status: u16,
        cancel: CancellationToken,
        started: Instant,
    ) -> Self {
        Self {
            body: response.bytes_stream().boxed(),
            decoder: SseLineDecoder::new(),
            handler: StreamHandler::new(status),
            pending: VecDeque::new(),
            cancel,
            eof: false,
            started,
        }
    }

    fn is_exhausted(&self) -> bool {
        self.pending.is_empty()
            && (self.handler.is_done() || (self.eof && !self.decoder.has_pending()))
    }

    /// Next response, reading more of the body only when nothing is queued.
    async fn next(&mut self) -> Option<Result<ChatResponse, Error>> {
        loop {
            if self.cancel.is_cancelled() {
                tracing::warn!(
                    chunks = self.handler.chunks(),
                    elapsed_ms = self.started.elapsed().as_millis() as u64,
                    "Chat completion stream cancelled"
                );
                return Some(Err(TransportError::Cancelled.into()));
            }

            if let Some(response) = self.pending.pop_front() {
                return Some(Ok(response));
            }
            if self.handler.is_done() {
                return None;
            }

            match self.decoder.next_line() {
                Ok(Some(line)) => {
                    match self.handler.handle_line(&line) {
                        Ok(responses) => self.pending.extend(responses),
                        Err(e) => return Some(Err(e)),
                    }
                    continue;
                }
                Ok(None) if self.eof => {
                    tracing::debug!(
                        chunks = self.handler.chunks(),
                        "Stream ended without [DONE] or finish reason"
                    );
                    return None;
                }
                Ok(None) => {}
                Err(e) => return Some(Err(e.into())),
            }

            let read = tokio::select! {
                biased;
                () = self.cancel.cancelled() => None,
                chunk = self.body.next() => Some(chunk),
            };
            // Cancelled while waiting; reported at the top of the loop.
            let Some(chunk) = read else { continue };

            match chunk {
                Some(Ok(bytes)) => self.decoder.push(&bytes),
                Some(Err(e)) => return Some(Err(TransportError::Read(e).into())),
                None => {
                    self.decoder.finish();
                    self.eof = true;
                }
            }
        }
    }
}

impl Drop for SseSession {
    fn drop(&mut self) {
        tracing::info!(
            chunks = self.handler.chunks(),
            completed = self.handler.is_done(),
            elapsed_ms = self.started.elapsed().as_millis() as u64,
            "Chat completion stream closed"
        );
    }
}
