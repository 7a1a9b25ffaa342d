//! OpenAI-compatible API client.
//!
//! Serves DeepSeek, `OpenAI` and self-hosted servers exposing
//! `/v1/chat/completions`.

mod client;
mod convert;
mod request;
mod request_builder;
mod response;
mod stream;
mod stream_handler;


pub use client::OpenAICompatClient;
pub(crate) use response::null_as_default;
pub use convert::MAX_SCHEMA_DEPTH;
pub use stream_handler::DONE_SENTINEL;
