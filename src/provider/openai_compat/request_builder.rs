//! Request building for OpenAI-compatible API.

use super::convert::{messages_to_wire, tools_to_wire};
use super::request::OpenAIRequest;
use crate::provider::error::Error;
use crate::provider::types::ChatRequest;

/// Build an `OpenAI`-compatible request body from a `ChatRequest`.
///
/// Unset generation parameters are omitted so the provider's defaults apply.
pub(crate) fn build_request(
    request: &ChatRequest,
    model: &str,
    stream: bool,
) -> Result<OpenAIRequest, Error> {
    let messages = messages_to_wire(&request.messages);

    let tools = if request.tools.is_empty() {
        None
    } else {
        Some(tools_to_wire(&request.tools)?)
    };

    tracing::debug!(
        model,
        stream,
        messages = messages.len(),
        dropped = request.messages.len() - messages.len(),
        tools = tools.as_ref().map_or(0, Vec::len),
        temperature = ?request.params.temperature,
        max_tokens = ?request.params.max_output_tokens,
        "Built chat completion request"
    );

    Ok(OpenAIRequest {
        model: model.to_string(),
        messages,
        stream,
        temperature: request.params.temperature,
        max_tokens: request.params.max_output_tokens,
        tools,
    })
}
