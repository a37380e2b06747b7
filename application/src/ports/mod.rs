//! Port definitions (interfaces for external adapters)
//!
//! Ports define the contracts that infrastructure adapters must implement.

pub mod manifest_source;
pub mod tool_executor;
pub mod tool_factory;
