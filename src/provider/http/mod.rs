//! Shared HTTP utilities for OpenAI-compatible providers.

mod client;
mod sse;

pub use client::{CHAT_COMPLETIONS_PATH, HttpClient};
pub use sse::{DATA_PREFIX, MAX_LINE_BYTES, SseLine, SseLineDecoder};
