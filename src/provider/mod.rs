//! Chat completion provider.
//!
//! A client for OpenAI-compatible chat completion endpoints, with streaming.
//!
//! # Example
//!
//! ```ignore
//! use oai_compat::provider::{self, ChatRequest, Message, Provider};
//! use futures::StreamExt;
//! use tokio_util::sync::CancellationToken;
//!
//! let client = provider::create(Provider::DeepSeek, api_key, None)?;
//! let request = ChatRequest::new(vec![Message::user("2+2?")]);
//! let mut stream = client.send(CancellationToken::new(), request, true);
//! while let Some(response) = stream.next().await {
//!     print!("{}", response?.text);
//! }
//! ```

mod api_provider;
mod client;
mod error;
mod http;
mod openai_compat;
mod stream;
mod types;

pub use api_provider::Provider;
pub use client::ChatModel;
pub use error::{ApiError, Error, SchemaError, TransportError};
pub use http::{CHAT_COMPLETIONS_PATH, DATA_PREFIX, MAX_LINE_BYTES};
pub use openai_compat::{DONE_SENTINEL, MAX_SCHEMA_DEPTH, OpenAICompatClient};
pub use stream::ChatStream;
pub use types::*;

/// Create a client for a hosted provider with its default endpoint.
pub fn create(
    provider: Provider,
    api_key: impl Into<String>,
    model: Option<&str>,
) -> Result<OpenAICompatClient, Error> {
    OpenAICompatClient::new(provider.client_config(api_key, model, None)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_client() {
        let client = create(Provider::DeepSeek, "test-key", None).unwrap();
        assert_eq!(client.model_name(), "deepseek-chat");
    }

    #[test]
    fn test_create_requires_key() {
        assert!(matches!(
            create(Provider::DeepSeek, "", None),
            Err(Error::Config(_))
        ));
    }
}
