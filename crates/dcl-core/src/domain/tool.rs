//! Operations exposed by subordinate servers and their results.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Returned when an operation produced neither text nor structured data.
pub const NO_CONTENT_SENTINEL: &str = "[OK] Tool executed successfully but returned no text content";

/// Label preceding the structured-data block in rendered results.
const STRUCTURED_LABEL: &str = "Structured content:";

/// Tool definition from a subordinate MCP server.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct McpTool {
    /// Tool name (function name).
    pub name: String,

    /// Human-readable description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// JSON Schema for input parameters.
    #[serde(
        default,
        rename = "inputSchema",
        skip_serializing_if = "Option::is_none"
    )]
    pub input_schema: Option<Value>,
}

impl McpTool {
    /// Create a new tool definition.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
            input_schema: None,
        }
    }

    /// Set the description.
    #[must_use]
    pub fn with_description(mut self, desc: impl Into<String>) -> Self {
        self.description = Some(desc.into());
        self
    }

    /// Set the input schema.
    #[must_use]
    pub fn with_input_schema(mut self, schema: Value) -> Self {
        self.input_schema = Some(schema);
        self
    }
}

/// Normalized outcome of invoking one operation on a subordinate server.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OperationResult {
    /// Text segments, in the order the subordinate returned them.
    pub text: Vec<String>,

    /// Optional structured payload. Never holds an empty value.
    pub structured: Option<Value>,

    /// Whether the subordinate flagged the result as a tool-level error.
    pub is_error: bool,
}

impl OperationResult {
    /// Build a result, discarding a structured payload that carries no data
    /// (null, false, zero, or an empty string, array or object).
    pub fn new(text: Vec<String>, structured: Option<Value>) -> Self {
        Self {
            text,
            structured: structured.filter(has_data),
            is_error: false,
        }
    }

    /// Mark the result as a tool-level error.
    #[must_use]
    pub const fn with_error_flag(mut self, is_error: bool) -> Self {
        self.is_error = is_error;
        self
    }

    /// Whether the result carries neither text nor structured data.
    pub fn is_empty(&self) -> bool {
        self.structured.is_none() && self.text.iter().all(String::is_empty)
    }

    /// Render the result as the single text block returned to the caller.
    ///
    /// Non-empty text segments are joined with newlines, followed by the
    /// labeled structured block. An empty rendering becomes
    /// [`NO_CONTENT_SENTINEL`], exactly when [`is_empty`](Self::is_empty) holds.
    pub fn render(&self) -> String {
        let mut output: Vec<String> =
            self.text.iter().filter(|segment| !segment.is_empty()).cloned().collect();

        if let Some(data) = &self.structured {
            let pretty = serde_json::to_string_pretty(data).unwrap_or_else(|_| data.to_string());
            output.push(format!("\n{STRUCTURED_LABEL} {pretty}"));
        }

        let rendered = output.join("\n");
        if rendered.is_empty() {
            NO_CONTENT_SENTINEL.to_string()
        } else {
            rendered
        }
    }
}

fn has_data(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(flag) => *flag,
        Value::Number(number) => number.as_f64().is_some_and(|n| n != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(items) => !items.is_empty(),
        Value::Object(map) => !map.is_empty(),
    }
}
