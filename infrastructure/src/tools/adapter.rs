//! Script tool adapter: binds a manifest definition to a runnable script.
//!
//! [`ScriptTool`] is what the host sees: static metadata plus
//! `invoke(arguments)`, which validates required parameters, builds the
//! command line and runs it.

use fnbridge_application::ports::tool_factory::ToolFactory;
use fnbridge_domain::tool::{
    entities::{ToolArguments, ToolDefinition},
    error::ToolError,
    traits::{FunctionTool, RequiredParameterValidator, ToolValidator},
    value_objects::ToolOutput,
};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use super::{command::CommandBuilder, process::ProcessExecutor};

/// A manifest tool backed by a script in the functions directory
#[derive(Debug, Clone)]
pub struct ScriptTool {
    definition: Arc<ToolDefinition>,
    builder: CommandBuilder,
    executor: ProcessExecutor,
}

impl ScriptTool {
    pub fn new(
        definition: Arc<ToolDefinition>,
        functions_dir: impl Into<PathBuf>,
        executor: ProcessExecutor,
    ) -> Self {
        Self {
            definition,
            builder: CommandBuilder::new(functions_dir),
            executor,
        }
    }

    pub fn functions_dir(&self) -> &Path {
        self.builder.functions_dir()
    }

    /// Invoke and keep the full [`ToolOutput`] (truncation flag, metadata)
    pub fn run(&self, arguments: &ToolArguments) -> Result<ToolOutput, ToolError> {
        RequiredParameterValidator.validate(arguments, &self.definition)?;

        let spec = self.builder.build(&self.definition, arguments)?;
        self.executor
            .execute(&self.definition.name, &spec, self.builder.functions_dir())
    }
}

impl FunctionTool for ScriptTool {
    fn definition(&self) -> &ToolDefinition {
        &self.definition
    }

    fn invoke(&self, arguments: &ToolArguments) -> Result<String, ToolError> {
        self.run(arguments).map(ToolOutput::into_content)
    }
}

/// Creates [`ScriptTool`]s that share one functions directory and executor
#[derive(Debug, Clone)]
pub struct ScriptToolFactory {
    functions_dir: PathBuf,
    executor: ProcessExecutor,
}

impl ScriptToolFactory {
    pub fn new(functions_dir: impl Into<PathBuf>, executor: ProcessExecutor) -> Self {
        Self {
            functions_dir: functions_dir.into(),
            executor,
        }
    }
}

impl ToolFactory for ScriptToolFactory {
    fn bind(&self, definition: Arc<ToolDefinition>) -> Arc<dyn FunctionTool> {
        Arc::new(ScriptTool::new(
            definition,
            self.functions_dir.clone(),
            self.executor.clone(),
        ))
    }
}
