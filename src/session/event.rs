// ABOUTME: Inbound event envelope - classifies raw frames from the upstream
// ABOUTME: session into the kinds the router knows how to handle.

use serde::Deserialize;
use serde_json::Value;

use super::state::Role;
use crate::tool::ToolInvocation;

/// A transcript item as announced by `conversation.item.created`.
#[derive(Debug, Clone, Deserialize)]
pub struct CreatedItem {
    #[serde(default)]
    pub id: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub role: Option<Role>,
    #[serde(default)]
    pub content: Vec<Value>,
    #[serde(default)]
    pub call_id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub arguments: String,
}

impl CreatedItem {
    /// Flatten the content blocks into display text.
    ///
    /// Message content arrives as blocks carrying either `text` or, for
    /// audio items, `transcript`.
    pub fn text(&self) -> String {
        self.content
            .iter()
            .filter_map(|block| {
                block
                    .get("text")
                    .or_else(|| block.get("transcript"))
                    .and_then(Value::as_str)
            })
            .collect::<Vec<_>>()
            .join("")
    }
}

/// A classified inbound event.
///
/// Every recognized `type` maps to one variant; anything else becomes
/// [`InboundEvent::Unknown`] so the stream stays forward compatible.
#[derive(Debug, Clone)]
pub enum InboundEvent {
    /// `conversation.item.created`
    ItemCreated(CreatedItem),
    /// `response.audio_transcript.delta`
    TranscriptDelta { item_id: String, delta: String },
    /// `response.audio_transcript.done`
    TranscriptDone { item_id: String, transcript: String },
    /// `response.function_call_arguments.done`
    FunctionCall(ToolInvocation),
    /// `google.token.update` - credential sideband, not transcript state.
    TokenUpdate { token: String },
    /// `google.token.revoke`
    TokenRevoke,
    /// `connection.opened` - lifecycle marker.
    ConnectionOpened,
    /// `connection.closed`
    ConnectionClosed,
    /// Any unrecognized kind; logged and dropped by the router.
    Unknown { kind: String },
}

impl InboundEvent {
    /// Classify a raw inbound frame.
    ///
    /// Fails only when the frame is not JSON or a recognized kind is missing
    /// its required fields; unrecognized kinds parse to `Unknown`.
    pub fn parse(raw: &str) -> Result<Self, serde_json::Error> {
        let value: Value = serde_json::from_str(raw)?;
        let kind = value
            .get("type")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();

        match kind.as_str() {
            "conversation.item.created" => {
                #[derive(Deserialize)]
                struct Envelope {
                    item: CreatedItem,
                }
                let envelope: Envelope = serde_json::from_value(value)?;
                Ok(Self::ItemCreated(envelope.item))
            }
            "response.audio_transcript.delta" => {
                #[derive(Deserialize)]
                struct Envelope {
                    item_id: String,
                    delta: String,
                }
                let envelope: Envelope = serde_json::from_value(value)?;
                Ok(Self::TranscriptDelta {
                    item_id: envelope.item_id,
                    delta: envelope.delta,
                })
            }
            "response.audio_transcript.done" => {
                #[derive(Deserialize)]
                struct Envelope {
                    item_id: String,
                    transcript: String,
                }
                let envelope: Envelope = serde_json::from_value(value)?;
                Ok(Self::TranscriptDone {
                    item_id: envelope.item_id,
                    transcript: envelope.transcript,
                })
            }
            "response.function_call_arguments.done" => {
                let invocation: ToolInvocation = serde_json::from_value(value)?;
                Ok(Self::FunctionCall(invocation))
            }
            "google.token.update" => {
                #[derive(Deserialize)]
                struct Envelope {
                    token: String,
                }
                let envelope: Envelope = serde_json::from_value(value)?;
                Ok(Self::TokenUpdate {
                    token: envelope.token,
                })
            }
            "google.token.revoke" => Ok(Self::TokenRevoke),
            "connection.opened" => Ok(Self::ConnectionOpened),
            "connection.closed" => Ok(Self::ConnectionClosed),
            _ => Ok(Self::Unknown { kind }),
        }
    }
}
