//! Tool-call wire contract for text-completion providers.
//!
//! Chat-completion APIs return structured tool calls; plain generate
//! endpoints do not, so those adapters instruct the model to answer with
//! exactly one `<tool_call>{"name": ..., "arguments": {...}}</tool_call>`
//! block and parse it here. Name and argument validation against the
//! catalog stays in the engine; this layer only locks down the envelope.

use serde::Deserialize;

use crate::models::JsonMap;

pub const TOOL_CALL_START: &str = "<tool_call>";
pub const TOOL_CALL_END: &str = "</tool_call>";

#[derive(Debug, Deserialize)]
struct ToolCallWire {
    name: String,
    #[serde(default)]
    arguments: serde_json::Value,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ToolParseError {
    MissingToolCallBlock,
    MultipleToolCallBlocks,
    InvalidJson,
    InvalidArguments(String),
}

impl std::fmt::Display for ToolParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ToolParseError::MissingToolCallBlock => write!(f, "missing <tool_call> block"),
            ToolParseError::MultipleToolCallBlocks => write!(f, "multiple <tool_call> blocks"),
            ToolParseError::InvalidJson => write!(f, "invalid tool call json"),
            ToolParseError::InvalidArguments(msg) => write!(f, "invalid tool arguments: {msg}"),
        }
    }
}

impl std::error::Error for ToolParseError {}

/// Extracts the JSON inside the first `<tool_call>...</tool_call>` block.
///
/// If there are multiple blocks, returns `None` so the caller can treat it
/// as invalid.
pub fn extract_tool_call_json(raw: &str) -> Option<String> {
    let start = raw.find(TOOL_CALL_START)? + TOOL_CALL_START.len();
    let rest = &raw[start..];
    let end_rel = rest.find(TOOL_CALL_END)?;
    let end = start + end_rel;

    let after_end = &raw[end + TOOL_CALL_END.len()..];
    if after_end.contains(TOOL_CALL_START) {
        return None;
    }

    Some(raw[start..end].trim().to_string())
}

/// Parses a full completion into `(tool_name, arguments)`.
///
/// Contract:
/// - exactly one `<tool_call>...</tool_call>` block
/// - the JSON is an object `{ "name": "...", "arguments": { ... } }`
/// - `arguments` may be omitted or null; otherwise it must be an object
pub fn parse_tool_call(raw: &str) -> Result<(String, JsonMap), ToolParseError> {
    let json_str = match extract_tool_call_json(raw) {
        Some(s) => s,
        None => {
            if raw.matches(TOOL_CALL_START).count() > 1 {
                return Err(ToolParseError::MultipleToolCallBlocks);
            }
            return Err(ToolParseError::MissingToolCallBlock);
        }
    };

    let wire: ToolCallWire =
        serde_json::from_str(&json_str).map_err(|_| ToolParseError::InvalidJson)?;

    let arguments = match wire.arguments {
        serde_json::Value::Null => JsonMap::new(),
        serde_json::Value::Object(map) => map,
        other => {
            return Err(ToolParseError::InvalidArguments(format!(
                "expected an object, got {other}"
            )));
        }
    };

    Ok((wire.name, arguments))
}
