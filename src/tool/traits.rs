// ABOUTME: Defines the Tool trait - the core abstraction for callable capabilities.
// ABOUTME: Tools have a name, description, schema, and async execute method.

use async_trait::async_trait;

use super::ToolResult;

/// A tool that can be invoked by the upstream model.
#[async_trait]
pub trait Tool: Send + Sync {
    /// Returns the unique name of this tool.
    fn name(&self) -> &str;

    /// Returns a human-readable description for the model.
    fn description(&self) -> &str;

    /// Returns the JSON Schema for the tool's input parameters.
    ///
    /// The schema carries `type`, `properties` and `required`; the executor
    /// checks the `required` list before the handler ever runs.
    fn schema(&self) -> serde_json::Value;

    /// Execute the tool with validated parameters.
    ///
    /// Provider failures should be encoded into the returned [`ToolResult`]
    /// rather than propagated; an escaping error is still caught by the
    /// executor and converted to an error result.
    async fn execute(&self, params: serde_json::Value) -> Result<ToolResult, anyhow::Error>;
}
