//! OpenAI-compatible API response types.

use crate::provider::types::{ChatResponse, Usage};
use serde::{Deserialize, Deserializer};

/// Decode `null` as the type's default. Providers send `null` for fields
/// they leave unset; `#[serde(default)]` alone only covers absent keys.
pub(crate) fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Response from OpenAI-compatible chat completions.
#[derive(Debug, Deserialize)]
pub struct OpenAIResponse {
    #[serde(default, deserialize_with = "null_as_default")]
    pub id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub choices: Vec<Choice>,
    #[serde(default)]
    pub usage: Option<WireUsage>,
}

/// A choice in the response.
#[derive(Debug, Deserialize)]
pub struct Choice {
    #[serde(default, deserialize_with = "null_as_default")]
    pub message: ResponseMessage,
    #[serde(default)]
    pub finish_reason: Option<String>,
}

/// Message content in a response.
#[derive(Debug, Default, Deserialize)]
#[allow(dead_code)]
pub struct ResponseMessage {
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
}

/// Token usage information.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
#[allow(clippy::struct_field_names)] // Field names match API response
pub struct WireUsage {
    #[serde(default, deserialize_with = "null_as_default")]
    pub prompt_tokens: u32,
    #[serde(default, deserialize_with = "null_as_default")]
    pub completion_tokens: u32,
    #[serde(default, deserialize_with = "null_as_default")]
    pub total_tokens: u32,
}

impl From<WireUsage> for Usage {
    fn from(usage: WireUsage) -> Self {
        Self {
            prompt_tokens: usage.prompt_tokens,
            completion_tokens: usage.completion_tokens,
            total_tokens: usage.total_tokens,
        }
    }
}

impl OpenAIResponse {
    /// Final response built from the first choice, `None` when there are no choices.
    pub fn into_chat_response(self) -> Option<ChatResponse> {
        let usage = self.usage.map(Usage::from);
        let choice = self.choices.into_iter().next()?;
        Some(ChatResponse::complete(
            choice.message.content.unwrap_or_default(),
            choice.finish_reason,
            usage,
        ))
    }
}
