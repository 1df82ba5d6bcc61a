// ABOUTME: Implements the Executor - resolves an invocation to its tool,
// ABOUTME: validates arguments, runs the handler, and envelopes the outcome.

use std::time::Duration;

use super::{Registry, Tool, ToolInvocation, ToolOutput, ToolResult};
use crate::error::ToolError;

/// Default deadline for a single tool invocation.
pub const DEFAULT_TOOL_TIMEOUT: Duration = Duration::from_secs(30);

/// Executes tool invocations against a [`Registry`].
///
/// `execute` is infallible at the type level: every failure mode is encoded
/// into the returned [`ToolOutput`] so the upstream session always receives
/// exactly one result per call id.
pub struct Executor {
    registry: Registry,
    timeout: Option<Duration>,
}

impl Executor {
    /// Create an executor with the default per-invocation deadline.
    pub fn new(registry: Registry) -> Self {
        Self {
            registry,
            timeout: Some(DEFAULT_TOOL_TIMEOUT),
        }
    }

    /// Override the per-invocation deadline. `None` disables the bound.
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    /// The registry this executor resolves tools from.
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Execute one invocation and produce its single result envelope.
    ///
    /// The handler is invoked at most once; it is never invoked when the
    /// tool is unknown or a required argument is missing.
    pub async fn execute(&self, invocation: &ToolInvocation) -> ToolOutput {
        let result = match self.run(invocation).await {
            Ok(result) => result,
            Err(error) => Self::encode_error(error),
        };
        ToolOutput::from_result(&invocation.call_id, result)
    }

    async fn run(&self, invocation: &ToolInvocation) -> Result<ToolResult, ToolError> {
        let tool = self
            .registry
            .get(&invocation.name)
            .await
            .ok_or_else(|| ToolError::NotFound(invocation.name.clone()))?;

        let params = Self::validate(tool.as_ref(), &invocation.arguments)
            .map_err(ToolError::InvalidArguments)?;

        let call = tool.execute(params);
        let outcome = match self.timeout {
            Some(limit) => tokio::time::timeout(limit, call)
                .await
                .map_err(|_| ToolError::Timeout)?,
            None => call.await,
        };

        outcome.map_err(ToolError::Execution)
    }

    /// Parse the raw argument string and check the schema's required set.
    fn validate(tool: &dyn Tool, arguments: &str) -> Result<serde_json::Value, String> {
        let raw = if arguments.trim().is_empty() {
            "{}"
        } else {
            arguments
        };

        let params: serde_json::Value = serde_json::from_str(raw)
            .map_err(|e| format!("arguments are not valid JSON: {}", e))?;

        let object = params
            .as_object()
            .ok_or_else(|| "arguments must be a JSON object".to_string())?;

        let schema = tool.schema();
        let missing: Vec<&str> = schema["required"]
            .as_array()
            .map(|required| {
                required
                    .iter()
                    .filter_map(|v| v.as_str())
                    .filter(|key| !object.contains_key(*key))
                    .collect()
            })
            .unwrap_or_default();

        if !missing.is_empty() {
            return Err(format!(
                "missing required field(s): {}",
                missing.join(", ")
            ));
        }

        Ok(params)
    }

    /// Encode a tool-level failure into the wire error convention.
    fn encode_error(error: ToolError) -> ToolResult {
        match error {
            ToolError::NotFound(name) => ToolResult::error_json(
                "unknown tool",
                format!("no tool registered under '{}'", name),
            ),
            ToolError::InvalidArguments(message) => {
                ToolResult::error_json("invalid arguments", message)
            }
            ToolError::Timeout => {
                ToolResult::error_json("timeout", "tool call exceeded its deadline")
            }
            ToolError::Execution(e) => ToolResult::error_json("handler failure", e.to_string()),
            other => ToolResult::error_json("tool error", other.to_string()),
        }
    }
}
