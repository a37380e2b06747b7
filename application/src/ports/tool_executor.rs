//! Tool Executor port
//!
//! Defines how a host looks up registered tools and executes calls.

use async_trait::async_trait;
use fnbridge_domain::tool::{entities::ToolCall, error::ToolError, traits::FunctionTool};
use std::sync::Arc;

/// Port for tool execution
///
/// Implementations (adapters) live in the infrastructure layer.
#[async_trait]
pub trait ToolExecutorPort: Send + Sync {
    /// Names of all registered tools, sorted
    fn tool_names(&self) -> Vec<&str>;

    /// Get a registered tool by name
    fn get_tool(&self, name: &str) -> Option<Arc<dyn FunctionTool>>;

    /// Check if a tool is registered
    fn has_tool(&self, name: &str) -> bool {
        self.get_tool(name).is_some()
    }

    /// Execute a tool call asynchronously
    ///
    /// Tool scripts block while they run; implementations must not stall
    /// the async runtime.
    async fn execute(&self, call: &ToolCall) -> Result<String, ToolError>;

    /// Execute a tool call synchronously (blocking)
    fn execute_sync(&self, call: &ToolCall) -> Result<String, ToolError>;
}
