//! Tool domain module
//!
//! Core abstractions for exposing manifest-declared scripts as tools.
//!
//! ```text
//! ┌────────────────┐    ┌──────────────┐    ┌──────────────┐    ┌──────────────┐
//! │ ToolDefinition │───▶│ ToolPolicy   │───▶│ FunctionTool │───▶│ ToolOutput / │
//! │ (manifest)     │    │ (allow/deny) │    │ (callable)   │    │ ToolError    │
//! └────────────────┘    └──────────────┘    └──────┬───────┘    └──────────────┘
//!                                                  │
//!                                                  └─ ToolCall → CommandSpec
//! ```
//!
//! # Key Types
//!
//! - [`ToolDefinition`] - name, description and [`ParameterSchema`] of one tool
//! - [`ToolPolicy`] - denylist-first allow/deny filter
//! - [`ToolCall`] - an invocation request with arguments
//! - [`CommandSpec`] - resolved script path plus `--kebab-case` flag tokens
//! - [`ToolOutput`] - captured output with [`ToolResultMetadata`](value_objects::ToolResultMetadata)
//! - [`FunctionTool`] - fixed-shape callable exposed to the host
//! - [`ToolValidator`] - pure argument checks before execution
//!
//! # Architecture
//!
//! - **Domain** (this module): pure definitions, no I/O
//! - **Application**: registration use case and ports
//! - **Infrastructure**: manifest parsing, script resolution, process execution

pub mod entities;
pub mod error;
pub mod policy;
pub mod traits;
pub mod value_objects;

pub use entities::{
    CommandSpec, ManifestEntry, ParameterSchema, Properties, PropertySpec, ToolArguments, ToolCall,
    ToolDefinition,
};
pub use error::{ManifestError, ToolError};
pub use policy::{PolicyDecision, ToolPolicy};
pub use traits::{FunctionTool, RequiredParameterValidator, ToolValidator};
pub use value_objects::{ToolOutput, ToolResultMetadata};
