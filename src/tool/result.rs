// ABOUTME: Defines ToolResult, ToolInvocation and ToolOutput - the types that
// ABOUTME: flow through a tool call from inbound event to outbound envelope.

use serde::Deserialize;

/// Result of a tool handler execution.
#[derive(Debug, Clone)]
pub struct ToolResult {
    /// The output content, always a JSON-encoded string on the wire.
    pub content: String,

    /// Whether this result represents an error.
    pub is_error: bool,
}

impl ToolResult {
    /// Create a successful text result.
    pub fn text(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            is_error: false,
        }
    }

    /// Create an error result.
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            content: message.into(),
            is_error: true,
        }
    }

    /// Create an error result in the `{"error": ..., "message": ...}` wire convention.
    pub fn error_json(error: &str, message: impl Into<String>) -> Self {
        Self::error(
            serde_json::json!({
                "error": error,
                "message": message.into(),
            })
            .to_string(),
        )
    }
}

impl Default for ToolResult {
    fn default() -> Self {
        Self::text("")
    }
}

/// A single tool call observed on the inbound event stream.
///
/// `arguments` is the JSON-encoded argument string exactly as delivered by
/// the upstream session; it is parsed once, at the executor boundary.
#[derive(Debug, Clone, Deserialize)]
pub struct ToolInvocation {
    pub call_id: String,
    pub name: String,
    #[serde(default)]
    pub arguments: String,
}

/// The single result envelope produced for a [`ToolInvocation`].
///
/// Exactly one of these exists per call id; it is immutable once produced.
#[derive(Debug, Clone)]
pub struct ToolOutput {
    pub call_id: String,
    pub output: String,
    pub is_error: bool,
}

impl ToolOutput {
    /// Envelope a handler result for a call id.
    pub fn from_result(call_id: impl Into<String>, result: ToolResult) -> Self {
        Self {
            call_id: call_id.into(),
            output: result.content,
            is_error: result.is_error,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_json_shape() {
        let result = ToolResult::error_json("unknown tool", "no such tool");
        assert!(result.is_error);

        let value: serde_json::Value = serde_json::from_str(&result.content).unwrap();
        assert_eq!(value["error"], "unknown tool");
        assert_eq!(value["message"], "no such tool");
    }

    #[test]
    fn test_invocation_parses_wire_fields() {
        let invocation: ToolInvocation = serde_json::from_str(
            r#"{"call_id":"c1","name":"get_weather_from_coords","arguments":"{\"latitude\":10}"}"#,
        )
        .unwrap();

        assert_eq!(invocation.call_id, "c1");
        assert_eq!(invocation.name, "get_weather_from_coords");
        assert_eq!(invocation.arguments, "{\"latitude\":10}");
    }
}
