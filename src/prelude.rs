// ABOUTME: Prelude module - convenient imports for common use cases.
// ABOUTME: Use `use callbridge::prelude::*;` to get started quickly.

pub use crate::channel::{SessionChannel, Transport, WsTransport};
pub use crate::credential::CredentialBroker;
pub use crate::error::{BridgeError, ChannelError, CredentialError, ToolError};
pub use crate::session::{
    CallStatus, ConnectionStatus, ConversationItem, InboundEvent, OutboundFrame, Role,
    SessionEventRouter, SessionState,
};
pub use crate::tool::{
    Executor, Registry, Tool, ToolDefinition, ToolInvocation, ToolOutput, ToolResult,
};
pub use crate::tools::{
    CreateCalendarEventTool, GetCalendarEventsTool, PersonSearchTool, WeatherTool,
};
