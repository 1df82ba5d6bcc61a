// ABOUTME: Defines all error types for the callbridge library using thiserror.
// ABOUTME: Each submodule has its own error enum, unified under BridgeError.

/// Top-level error type for the callbridge library.
#[derive(Debug, thiserror::Error)]
pub enum BridgeError {
    #[error("Tool error: {0}")]
    Tool(#[from] ToolError),

    #[error("Credential error: {0}")]
    Credential(#[from] CredentialError),

    #[error("Channel error: {0}")]
    Channel(#[from] ChannelError),
}

/// Errors from tool registration and execution.
#[derive(Debug, thiserror::Error)]
pub enum ToolError {
    #[error("Tool '{0}' is already registered")]
    Duplicate(String),

    #[error("Tool not found: {0}")]
    NotFound(String),

    #[error("Invalid arguments: {0}")]
    InvalidArguments(String),

    #[error("Execution failed: {0}")]
    Execution(#[source] anyhow::Error),

    #[error("Tool execution timed out")]
    Timeout,
}

/// Errors from credential access.
#[derive(Debug, thiserror::Error)]
pub enum CredentialError {
    #[error("No credential is active")]
    NotAuthenticated,
}

/// Errors from the session channel and its transport.
#[derive(Debug, thiserror::Error)]
pub enum ChannelError {
    #[error("No active transport")]
    NotConnected,

    #[error("Connection failed: {0}")]
    Connection(String),

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
