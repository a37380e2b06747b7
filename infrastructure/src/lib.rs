//! Infrastructure layer for fnbridge
//!
//! This crate contains adapters that implement the ports defined
//! in the application layer: manifest parsing, script resolution and
//! execution, plus configuration file loading.

pub mod config;
pub mod tools;

// Re-export commonly used types
pub use config::{
    ConfigLoader, ConfigValidationError, FileFunctionsConfig, FunctionsConfig,
};
pub use tools::{
    CommandBuilder, FileManifestSource, FunctionsManifest, ProcessExecutor, ScriptTool,
    ScriptToolFactory, ToolRegistry,
};
