//! Provider-neutral types shared by every OpenAI-compatible backend.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: Vec<ContentBlock>,
}

impl Message {
    pub fn new(role: Role, content: Vec<ContentBlock>) -> Self {
        Self { role, content }
    }

    /// Single text block message.
    pub fn text(role: Role, text: impl Into<String>) -> Self {
        Self::new(role, vec![ContentBlock::Text { text: text.into() }])
    }

    pub fn user(text: impl Into<String>) -> Self {
        Self::text(Role::User, text)
    }

    pub fn assistant(text: impl Into<String>) -> Self {
        Self::text(Role::Assistant, text)
    }

    pub fn system(text: impl Into<String>) -> Self {
        Self::text(Role::System, text)
    }
}

/// Conversation role.
///
/// Upstream frameworks call the assistant `model`; roles this client has no
/// wire mapping for deserialize as `Other` and are sent as `user`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    System,
    User,
    #[serde(alias = "model")]
    Assistant,
    #[serde(other)]
    Other,
}

/// One part of a message. Only text reaches the wire; any other part type
/// the host attaches decodes as `Other` and is left out of requests.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentBlock {
    Text { text: String },
    #[serde(other)]
    Other,
}

impl ContentBlock {
    /// Text carried by this block, if any.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text { text } => Some(text),
            _ => None,
        }
    }
}

/// Sampling parameters. Unset fields are left to the provider's defaults.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationParams {
    pub temperature: Option<f32>,
    pub max_output_tokens: Option<u32>,
}

#[derive(Debug, Clone, Default)]
pub struct ChatRequest {
    pub messages: Vec<Message>,
    /// Tool descriptors keyed by tool name.
    pub tools: BTreeMap<String, ToolDescriptor>,
    pub params: GenerationParams,
}

impl ChatRequest {
    pub fn new(messages: Vec<Message>) -> Self {
        Self {
            messages,
            ..Default::default()
        }
    }

    #[must_use]
    pub fn with_tool(mut self, name: impl Into<String>, tool: ToolDescriptor) -> Self {
        self.tools.insert(name.into(), tool);
        self
    }

    #[must_use]
    pub fn with_params(mut self, params: GenerationParams) -> Self {
        self.params = params;
        self
    }
}

/// A tool as handed over by the orchestration layer.
///
/// Frameworks describe tools either as loose JSON maps
/// (`{"description": ..., "parameters": {...}}`) or as structured declarations.
/// Both are normalized into [`ToolDeclaration`] before conversion.
#[derive(Debug, Clone)]
pub enum ToolDescriptor {
    Raw(serde_json::Map<String, serde_json::Value>),
    Declaration(ToolDeclaration),
}

impl From<ToolDeclaration> for ToolDescriptor {
    fn from(decl: ToolDeclaration) -> Self {
        Self::Declaration(decl)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ToolDeclaration {
    pub name: String,
    pub description: String,
    pub parameters: Option<Schema>,
}

/// JSON-Schema subset used for tool parameters.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Schema {
    /// `None` when the type tag is missing or unrecognized.
    pub schema_type: Option<SchemaType>,
    pub description: Option<String>,
    pub properties: BTreeMap<String, Schema>,
    pub required: BTreeSet<String>,
    pub items: Option<Box<Schema>>,
    pub enum_values: Vec<serde_json::Value>,
}

impl Schema {
    pub fn of(schema_type: SchemaType) -> Self {
        Self {
            schema_type: Some(schema_type),
            ..Default::default()
        }
    }

    /// Object schema with the given properties, none of them required.
    pub fn object(properties: impl IntoIterator<Item = (String, Schema)>) -> Self {
        Self {
            schema_type: Some(SchemaType::Object),
            properties: properties.into_iter().collect(),
            ..Default::default()
        }
    }

    pub fn array(items: Schema) -> Self {
        Self {
            schema_type: Some(SchemaType::Array),
            items: Some(Box::new(items)),
            ..Default::default()
        }
    }

    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    #[must_use]
    pub fn with_required<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.required.extend(names.into_iter().map(Into::into));
        self
    }

    #[must_use]
    pub fn with_enum(mut self, values: impl IntoIterator<Item = serde_json::Value>) -> Self {
        self.enum_values = values.into_iter().collect();
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchemaType {
    String,
    Number,
    Integer,
    Boolean,
    Array,
    Object,
}

impl SchemaType {
    /// Parse a type tag, ignoring case (`"STRING"` and `"string"` both match).
    pub fn parse(tag: &str) -> Option<Self> {
        match tag.to_ascii_lowercase().as_str() {
            "string" => Some(Self::String),
            "number" => Some(Self::Number),
            "integer" => Some(Self::Integer),
            "boolean" => Some(Self::Boolean),
            "array" => Some(Self::Array),
            "object" => Some(Self::Object),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Number => "number",
            Self::Integer => "integer",
            Self::Boolean => "boolean",
            Self::Array => "array",
            Self::Object => "object",
        }
    }
}

/// One unit of output from a chat call.
///
/// Streaming calls yield `is_partial` responses carrying only the new delta,
/// followed by one `is_final` response with the whole accumulated text.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChatResponse {
    pub text: String,
    pub is_partial: bool,
    pub is_final: bool,
    pub finish_reason: Option<String>,
    pub usage: Option<Usage>,
}

impl ChatResponse {
    pub(crate) fn partial(delta: impl Into<String>) -> Self {
        Self {
            text: delta.into(),
            is_partial: true,
            ..Default::default()
        }
    }

    pub(crate) fn complete(
        text: impl Into<String>,
        finish_reason: Option<String>,
        usage: Option<Usage>,
    ) -> Self {
        Self {
            text: text.into(),
            is_partial: false,
            is_final: true,
            finish_reason: finish_reason.filter(|r| !r.is_empty()),
            usage,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Usage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
}
