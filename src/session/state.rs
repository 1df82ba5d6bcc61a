// ABOUTME: SessionState - the ordered transcript of one live session plus
// ABOUTME: its connectivity status.

use serde::{Deserialize, Serialize};

/// Connectivity of the session transport.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConnectionStatus {
    #[default]
    Disconnected,
    Connecting,
    Connected,
}

/// Role of a message sender.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
    System,
}

/// Completion status of a function-call item.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallStatus {
    Running,
    Completed,
    Failed,
}

/// One entry in the session transcript.
///
/// The sequence is append-only; the only in-place mutation is a
/// function-call item picking up its arguments and, later, its output.
#[derive(Debug, Clone)]
pub enum ConversationItem {
    Message {
        id: String,
        role: Role,
        content: String,
    },
    FunctionCall {
        item_id: String,
        call_id: String,
        name: String,
        arguments: String,
        output: Option<String>,
        status: CallStatus,
    },
}

/// Transcript and connectivity for one live session.
///
/// Mutated only on the router's consumption path (including completion
/// continuations the router itself spawned).
#[derive(Debug, Default)]
pub struct SessionState {
    items: Vec<ConversationItem>,
    status: ConnectionStatus,
}

impl SessionState {
    /// Create an empty, disconnected session state.
    pub fn new() -> Self {
        Self::default()
    }

    /// The transcript in arrival order.
    pub fn items(&self) -> &[ConversationItem] {
        &self.items
    }

    /// Current connectivity status.
    pub fn status(&self) -> ConnectionStatus {
        self.status
    }

    pub(crate) fn set_status(&mut self, status: ConnectionStatus) {
        self.status = status;
    }

    /// Append a message item.
    pub(crate) fn push_message(&mut self, id: impl Into<String>, role: Role, content: String) {
        self.items.push(ConversationItem::Message {
            id: id.into(),
            role,
            content,
        });
    }

    /// Append transcript text to the message with the given item id.
    ///
    /// Deltas for an unseen item start a new assistant message so a late
    /// `conversation.item.created` cannot drop transcript text.
    pub(crate) fn append_transcript(&mut self, item_id: &str, delta: &str) {
        for item in self.items.iter_mut().rev() {
            if let ConversationItem::Message { id, content, .. } = item {
                if id == item_id {
                    content.push_str(delta);
                    return;
                }
            }
        }
        self.push_message(item_id, Role::Assistant, delta.to_string());
    }

    /// Replace the content of the message with the given item id.
    pub(crate) fn set_transcript(&mut self, item_id: &str, transcript: String) {
        for item in self.items.iter_mut().rev() {
            if let ConversationItem::Message { id, content, .. } = item {
                if id == item_id {
                    *content = transcript;
                    return;
                }
            }
        }
        self.push_message(item_id, Role::Assistant, transcript);
    }

    /// Record a function call, updating an existing item for the call id if
    /// one was already announced.
    pub(crate) fn upsert_function_call(
        &mut self,
        item_id: &str,
        call_id: &str,
        name: &str,
        arguments: &str,
    ) {
        for item in self.items.iter_mut().rev() {
            if let ConversationItem::FunctionCall {
                call_id: existing,
                arguments: args,
                name: existing_name,
                ..
            } = item
            {
                if existing == call_id {
                    *args = arguments.to_string();
                    if existing_name.is_empty() {
                        *existing_name = name.to_string();
                    }
                    return;
                }
            }
        }
        self.items.push(ConversationItem::FunctionCall {
            item_id: item_id.to_string(),
            call_id: call_id.to_string(),
            name: name.to_string(),
            arguments: arguments.to_string(),
            output: None,
            status: CallStatus::Running,
        });
    }

    /// Attach a result to the function-call item with the given call id.
    pub(crate) fn complete_function_call(
        &mut self,
        call_id: &str,
        output: String,
        is_error: bool,
    ) {
        for item in self.items.iter_mut().rev() {
            if let ConversationItem::FunctionCall {
                call_id: existing,
                output: slot,
                status,
                ..
            } = item
            {
                if existing == call_id {
                    *slot = Some(output);
                    *status = if is_error {
                        CallStatus::Failed
                    } else {
                        CallStatus::Completed
                    };
                    return;
                }
            }
        }
    }
}
