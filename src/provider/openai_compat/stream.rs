//! OpenAI-compatible streaming response types.

use super::response::{WireUsage, null_as_default};
use crate::provider::error::ErrorBody;
use serde::Deserialize;

/// Streaming chunk from OpenAI-compatible APIs.
#[derive(Debug, Deserialize)]
#[allow(dead_code)]
pub struct StreamChunk {
    #[serde(default, deserialize_with = "null_as_default")]
    pub id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub choices: Vec<StreamChoice>,
    /// Usage info, sent on the last chunk by providers that report it.
    #[serde(default)]
    pub usage: Option<WireUsage>,
    /// In-band error some providers send instead of a chunk.
    #[serde(default)]
    pub error: Option<ErrorBody>,
}

/// A choice in a streaming chunk.
#[derive(Debug, Deserialize)]
pub struct StreamChoice {
    #[serde(default, deserialize_with = "null_as_default")]
    pub delta: StreamDelta,
    #[serde(default)]
    pub finish_reason: Option<String>,
}

/// Delta content in a streaming choice.
#[derive(Debug, Default, Deserialize)]
#[allow(dead_code)]
pub struct StreamDelta {
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
}
