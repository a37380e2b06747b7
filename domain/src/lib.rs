//! Domain layer for fnbridge
//!
//! This crate contains the tool entities, the allow/deny policy and the
//! error taxonomy. It has no dependencies on infrastructure concerns.

pub mod tool;

// Re-export commonly used types
pub use tool::{
    entities::{
        CommandSpec, ManifestEntry, ParameterSchema, Properties, PropertySpec, ToolArguments,
        ToolCall, ToolDefinition,
    },
    error::{ManifestError, ToolError},
    policy::{PolicyDecision, ToolPolicy},
    traits::{FunctionTool, RequiredParameterValidator, ToolValidator},
    value_objects::{ToolOutput, ToolResultMetadata},
};
