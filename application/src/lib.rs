//! Application layer for fnbridge
//!
//! This crate contains the registration use case and the port definitions.
//! It depends only on the domain layer.

pub mod ports;
pub mod use_cases;

// Re-export commonly used types
pub use ports::{
    manifest_source::ManifestSource, tool_executor::ToolExecutorPort, tool_factory::ToolFactory,
};
pub use use_cases::register_tools::{
    RegisterToolsUseCase, RegistrationOutcome, RegistrationReport, SkipReason,
};
