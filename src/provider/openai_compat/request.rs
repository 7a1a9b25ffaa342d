//! OpenAI-compatible API request types.

use serde::Serialize;
use std::collections::BTreeMap;

/// Top-level request to OpenAI-compatible APIs.
#[derive(Debug, Serialize)]
pub struct OpenAIRequest {
    pub model: String,
    pub messages: Vec<OpenAIMessage>,
    pub stream: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tools: Option<Vec<OpenAITool>>,
}

/// A message in the conversation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OpenAIMessage {
    pub role: &'static str,
    pub content: String,
}

/// Tool definition for the API.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OpenAITool {
    #[serde(rename = "type")]
    pub tool_type: &'static str,
    pub function: FunctionDefinition,
}

/// Function definition within a tool.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FunctionDefinition {
    pub name: String,
    pub description: String,
    pub parameters: WireSchema,
}

/// Parameter schema as sent on the wire.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WireSchema {
    #[serde(rename = "type")]
    pub schema_type: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub properties: Option<BTreeMap<String, WireSchema>>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub required: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub items: Option<Box<WireSchema>>,
    #[serde(rename = "enum", skip_serializing_if = "Vec::is_empty")]
    pub enum_values: Vec<serde_json::Value>,
}

impl WireSchema {
    /// `{"type": "object", "properties": {}}`, used when a tool has no schema.
    pub fn empty_object() -> Self {
        Self {
            schema_type: "object",
            description: None,
            properties: Some(BTreeMap::new()),
            required: Vec::new(),
            items: None,
            enum_values: Vec::new(),
        }
    }
}
