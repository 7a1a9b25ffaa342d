//! Conversion between the provider-neutral model and the OpenAI wire schema.
//!
//! Everything here is pure: no I/O, no shared state.

use super::request::{FunctionDefinition, OpenAIMessage, OpenAITool, WireSchema};
use crate::provider::error::{Error, SchemaError};
use crate::provider::types::{
    Message, Role, Schema, SchemaType, ToolDeclaration, ToolDescriptor,
};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// Deepest schema nesting accepted before conversion is refused.
pub const MAX_SCHEMA_DEPTH: usize = 64;

/// Wire role for a conversation role. Roles without a mapping are sent as `user`.
pub fn wire_role(role: Role) -> &'static str {
    match role {
        Role::System => "system",
        Role::Assistant => "assistant",
        Role::User | Role::Other => "user",
    }
}

/// Convert messages to wire format, preserving order.
///
/// Non-empty text blocks of a message are joined with `\n`; a message without
/// any text produces no wire entry.
pub fn messages_to_wire(messages: &[Message]) -> Vec<OpenAIMessage> {
    messages
        .iter()
        .filter_map(|msg| {
            let text = msg
                .content
                .iter()
                .filter_map(|b| b.as_text())
                .filter(|t| !t.is_empty())
                .collect::<Vec<_>>()
                .join("\n");

            if text.is_empty() {
                return None;
            }

            Some(OpenAIMessage {
                role: wire_role(msg.role),
                content: text,
            })
        })
        .collect()
}

/// Convert tool descriptors to wire tools, in name order.
pub fn tools_to_wire(tools: &BTreeMap<String, ToolDescriptor>) -> Result<Vec<OpenAITool>, Error> {
    let mut wire_tools = Vec::with_capacity(tools.len());

    for (name, descriptor) in tools {
        let tool_error = |source| Error::RequestBuild {
            tool: name.clone(),
            source,
        };

        let decl = tool_declaration(name, descriptor).map_err(tool_error)?;
        let parameters = schema_to_wire(decl.parameters.as_ref()).map_err(tool_error)?;

        wire_tools.push(OpenAITool {
            tool_type: "function",
            function: FunctionDefinition {
                name: decl.name,
                description: decl.description,
                parameters,
            },
        });
    }

    Ok(wire_tools)
}

/// Normalize a tool descriptor into a declaration.
///
/// Raw maps contribute a string `description` and a `parameters` schema; a
/// map without a description gets `Tool: <name>`. A declaration's own name
/// wins over the map key unless it is empty.
pub fn tool_declaration(
    name: &str,
    descriptor: &ToolDescriptor,
) -> Result<ToolDeclaration, SchemaError> {
    match descriptor {
        ToolDescriptor::Declaration(decl) => {
            let mut decl = decl.clone();
            if decl.name.is_empty() {
                decl.name = name.to_string();
            }
            Ok(decl)
        }
        ToolDescriptor::Raw(map) => {
            let description = map
                .get("description")
                .and_then(Value::as_str)
                .map_or_else(|| format!("Tool: {name}"), String::from);

            let parameters = match map.get("parameters") {
                None | Some(Value::Null) => None,
                Some(value) => Some(schema_from_json(value)?),
            };

            Ok(ToolDeclaration {
                name: name.to_string(),
                description,
                parameters,
            })
        }
    }
}

/// Convert a parameter schema to wire format.
///
/// A missing schema becomes `{"type": "object", "properties": {}}`; an unset
/// type tag becomes `"string"`.
pub fn schema_to_wire(schema: Option<&Schema>) -> Result<WireSchema, SchemaError> {
    match schema {
        None => Ok(WireSchema::empty_object()),
        Some(schema) => convert_schema(schema, 0),
    }
}

fn convert_schema(schema: &Schema, depth: usize) -> Result<WireSchema, SchemaError> {
    if depth >= MAX_SCHEMA_DEPTH {
        return Err(SchemaError::TooDeep {
            limit: MAX_SCHEMA_DEPTH,
        });
    }

    let properties = if schema.properties.is_empty() {
        None
    } else {
        let mut properties = BTreeMap::new();
        for (name, prop) in &schema.properties {
            let converted = convert_schema(prop, depth + 1)
                .map_err(|e| SchemaError::in_property(name, e))?;
            properties.insert(name.clone(), converted);
        }
        Some(properties)
    };

    let items = match &schema.items {
        Some(items) => Some(Box::new(
            convert_schema(items, depth + 1).map_err(SchemaError::in_items)?,
        )),
        None => None,
    };

    Ok(WireSchema {
        schema_type: schema.schema_type.map_or("string", SchemaType::as_str),
        description: schema.description.clone().filter(|d| !d.is_empty()),
        properties,
        required: schema.required.iter().cloned().collect(),
        items,
        enum_values: schema.enum_values.clone(),
    })
}

/// Parse a JSON-Schema value into a [`Schema`].
pub fn schema_from_json(value: &Value) -> Result<Schema, SchemaError> {
    parse_schema(value, 0)
}

fn parse_schema(value: &Value, depth: usize) -> Result<Schema, SchemaError> {
    if depth >= MAX_SCHEMA_DEPTH {
        return Err(SchemaError::TooDeep {
            limit: MAX_SCHEMA_DEPTH,
        });
    }

    let Value::Object(obj) = value else {
        return Err(SchemaError::Invalid(format!(
            "expected an object, got {}",
            json_kind(value)
        )));
    };

    let mut schema = Schema {
        schema_type: parse_type(obj.get("type")),
        description: obj
            .get("description")
            .and_then(Value::as_str)
            .map(String::from),
        ..Default::default()
    };

    match obj.get("properties") {
        None | Some(Value::Null) => {}
        Some(Value::Object(props)) => {
            for (name, prop) in props {
                let parsed =
                    parse_schema(prop, depth + 1).map_err(|e| SchemaError::in_property(name, e))?;
                schema.properties.insert(name.clone(), parsed);
            }
        }
        Some(other) => {
            return Err(SchemaError::Invalid(format!(
                "`properties` must be an object, got {}",
                json_kind(other)
            )));
        }
    }

    match obj.get("items") {
        None | Some(Value::Null) => {}
        Some(items) => {
            let parsed = parse_schema(items, depth + 1).map_err(SchemaError::in_items)?;
            schema.items = Some(Box::new(parsed));
        }
    }

    schema.required = parse_required(obj)?;

    match obj.get("enum") {
        None | Some(Value::Null) => {}
        Some(Value::Array(values)) => schema.enum_values.clone_from(values),
        Some(other) => {
            return Err(SchemaError::Invalid(format!(
                "`enum` must be an array, got {}",
                json_kind(other)
            )));
        }
    }

    Ok(schema)
}

/// Type tag: a string, or a JSON-Schema type list whose first non-`null` entry wins.
fn parse_type(value: Option<&Value>) -> Option<SchemaType> {
    match value? {
        Value::String(tag) => SchemaType::parse(tag),
        Value::Array(tags) => tags
            .iter()
            .filter_map(Value::as_str)
            .find(|t| !t.eq_ignore_ascii_case("null"))
            .and_then(SchemaType::parse),
        _ => None,
    }
}

fn parse_required(
    obj: &Map<String, Value>,
) -> Result<std::collections::BTreeSet<String>, SchemaError> {
    match obj.get("required") {
        None | Some(Value::Null) => Ok(Default::default()),
        Some(Value::Array(names)) => names
            .iter()
            .map(|n| {
                n.as_str().map(String::from).ok_or_else(|| {
                    SchemaError::Invalid(format!(
                        "`required` entries must be strings, got {}",
                        json_kind(n)
                    ))
                })
            })
            .collect(),
        Some(other) => Err(SchemaError::Invalid(format!(
            "`required` must be an array, got {}",
            json_kind(other)
        ))),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
