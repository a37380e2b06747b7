//! Tool domain traits
//!
//! [`FunctionTool`] is the fixed-shape callable handed to the host: static
//! metadata plus `invoke(arguments)`. [`ToolValidator`] holds the pure
//! pre-invocation checks.

use super::entities::{ToolArguments, ToolDefinition};
use super::error::ToolError;

/// A tool the host can call by name with a map of arguments.
pub trait FunctionTool: Send + Sync {
    /// Static metadata parsed from the manifest
    fn definition(&self) -> &ToolDefinition;

    fn name(&self) -> &str {
        &self.definition().name
    }

    /// Generated help text (description plus one line per parameter)
    fn description(&self) -> String {
        self.definition().describe()
    }

    /// Run the tool and return its captured output
    fn invoke(&self, arguments: &ToolArguments) -> Result<String, ToolError>;
}

/// Validator for tool arguments
///
/// Pure domain check of supplied arguments against a definition, without
/// any I/O.
pub trait ToolValidator {
    fn validate(&self, arguments: &ToolArguments, definition: &ToolDefinition)
    -> Result<(), ToolError>;
}

/// Checks that every required parameter is present.
///
/// Unknown arguments are not an error; the command builder drops them.
#[derive(Debug, Clone, Copy, Default)]
pub struct RequiredParameterValidator;

impl ToolValidator for RequiredParameterValidator {
    fn validate(
        &self,
        arguments: &ToolArguments,
        definition: &ToolDefinition,
    ) -> Result<(), ToolError> {
        match definition
            .parameters
            .required
            .iter()
            .find(|name| !arguments.contains_key(name.as_str()))
        {
            Some(missing) => Err(ToolError::MissingParameter {
                tool: definition.name.clone(),
                parameter: missing.clone(),
            }),
            None => Ok(()),
        }
    }
}
