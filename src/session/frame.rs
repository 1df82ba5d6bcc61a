// ABOUTME: Outbound frames - the envelopes sent back to the upstream session
// ABOUTME: for tool results, configuration changes, and credential sideband.

use serde::Serialize;

use crate::tool::ToolOutput;

/// The `function_call_output` item nested in a `conversation.item.create`.
#[derive(Debug, Clone, Serialize)]
pub struct FunctionCallOutputItem {
    #[serde(rename = "type")]
    pub kind: String,
    pub call_id: String,
    pub output: String,
}

/// A frame sent to the upstream session.
///
/// Serialized shapes are wire contracts and must match the upstream
/// protocol byte-for-byte in structure.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type")]
pub enum OutboundFrame {
    /// Deliver a tool result for a call id.
    #[serde(rename = "conversation.item.create")]
    ItemCreate { item: FunctionCallOutputItem },

    /// Ask the model to continue after a tool result.
    #[serde(rename = "response.create")]
    ResponseCreate,

    /// User-initiated session configuration change.
    #[serde(rename = "session.update")]
    SessionUpdate { session: serde_json::Value },

    /// Credential sideband: install a token on the other side.
    #[serde(rename = "google.token.update")]
    TokenUpdate { token: String },

    /// Credential sideband: clear the token on the other side.
    #[serde(rename = "google.token.revoke")]
    TokenRevoke,
}

impl OutboundFrame {
    /// Wrap a tool output in its delivery envelope.
    pub fn function_call_output(output: &ToolOutput) -> Self {
        Self::ItemCreate {
            item: FunctionCallOutputItem {
                kind: "function_call_output".to_string(),
                call_id: output.call_id.clone(),
                output: output.output.clone(),
            },
        }
    }
}
