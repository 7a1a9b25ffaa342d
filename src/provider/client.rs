//! The model seam the orchestration layer programs against.

use super::openai_compat::OpenAICompatClient;
use super::stream::ChatStream;
use super::types::ChatRequest;
use tokio_util::sync::CancellationToken;

/// A chat model that turns a request into a lazy response sequence.
///
/// Implementations must be shareable across tasks; every `send` is an
/// independent call.
pub trait ChatModel: Send + Sync {
    /// Model identifier.
    fn name(&self) -> &str;

    /// Start a chat call. See [`OpenAICompatClient::send`].
    fn send(&self, cancel: CancellationToken, request: ChatRequest, stream: bool) -> ChatStream;
}

impl ChatModel for OpenAICompatClient {
    fn name(&self) -> &str {
        self.model_name()
    }

    fn send(&self, cancel: CancellationToken, request: ChatRequest, stream: bool) -> ChatStream {
        OpenAICompatClient::send(self, cancel, request, stream)
    }
}
