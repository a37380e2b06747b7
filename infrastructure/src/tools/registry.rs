//! Tool Registry
//!
//! The [`ToolRegistry`] is the host side of registration: it collects the
//! tools a [`RegisterToolsUseCase`] pass hands over and implements
//! [`ToolExecutorPort`] so callers can look them up and run them by name.
//!
//! # Usage
//!
//! ```ignore
//! use fnbridge_infrastructure::{config::ConfigLoader, tools::ToolRegistry};
//!
//! let config = ConfigLoader::load(None);
//! let (registry, report) = ToolRegistry::load(&config);
//!
//! for (name, reason) in report.skipped() {
//!     println!("skipped {name}: {reason}");
//! }
//!
//! let call = ToolCall::new("get_current_weather").with_arg("location", "Paris");
//! let output = registry.execute(&call).await?;
//! ```
//!
//! # Name Collisions
//!
//! The use case already drops duplicate manifest names, so `register` only
//! sees unique names from a single pass. Registering the same name again
//! (e.g. from a second pass) replaces the earlier tool.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use fnbridge_application::{
    ports::tool_executor::ToolExecutorPort,
    use_cases::register_tools::{RegisterToolsUseCase, RegistrationReport},
};
use fnbridge_domain::tool::{entities::ToolCall, error::ToolError, traits::FunctionTool};
use tracing::{debug, info};

use crate::config::FunctionsConfig;

/// Registered tools keyed by name
#[derive(Default)]
pub struct ToolRegistry {
    tools: HashMap<String, Arc<dyn FunctionTool>>,
}

impl ToolRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Run a registration pass against the configured functions directory.
    pub fn load(config: &FunctionsConfig) -> (Self, RegistrationReport) {
        let use_case = RegisterToolsUseCase::new(
            Arc::new(config.manifest_source()),
            Arc::new(config.tool_factory()),
            config.policy(),
        );

        let mut registry = Self::new();
        let report = use_case.execute(|tool| registry.register(tool));

        info!(
            registered = registry.len(),
            skipped = report.skipped().len(),
            directory = %config.functions_directory.display(),
            "Registered llm-functions tools"
        );

        (registry, report)
    }

    pub fn register(&mut self, tool: Arc<dyn FunctionTool>) {
        let name = tool.name().to_string();
        if self.tools.insert(name.clone(), tool).is_some() {
            debug!(tool = %name, "Replaced previously registered tool");
        }
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    fn lookup(&self, name: &str) -> Result<Arc<dyn FunctionTool>, ToolError> {
        self.tools
            .get(name)
            .cloned()
            .ok_or_else(|| ToolError::UnknownTool(name.to_string()))
    }
}

impl std::fmt::Debug for ToolRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ToolRegistry")
            .field("tools", &self.tool_names())
            .finish()
    }
}

#[async_trait]
impl ToolExecutorPort for ToolRegistry {
    fn tool_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.tools.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    fn get_tool(&self, name: &str) -> Option<Arc<dyn FunctionTool>> {
        self.tools.get(name).cloned()
    }

    async fn execute(&self, call: &ToolCall) -> Result<String, ToolError> {
        let tool = self.lookup(&call.tool_name)?;
        let arguments = call.arguments.clone();

        tokio::task::spawn_blocking(move || tool.invoke(&arguments))
            .await
            .map_err(|e| ToolError::Spawn {
                tool: call.tool_name.clone(),
                message: e.to_string(),
            })?
    }

    fn execute_sync(&self, call: &ToolCall) -> Result<String, ToolError> {
        self.lookup(&call.tool_name)?.invoke(&call.arguments)
    }
}
