//! Streaming client for OpenAI-compatible chat completion APIs.
//!
//! Covers DeepSeek, `OpenAI` and self-hosted servers speaking the same
//! `/v1/chat/completions` protocol. Calls return a lazy [`ChatStream`] that
//! does no I/O until polled and stops on cancellation or drop.

#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

pub mod config;
pub mod provider;

pub use config::{ClientConfig, TransportConfig};
pub use provider::{
    ApiError, ChatModel, ChatRequest, ChatResponse, ChatStream, Error, Message,
    OpenAICompatClient, Provider, TransportError,
};
