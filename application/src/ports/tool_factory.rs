//! Tool Factory port
//!
//! Binds a parsed definition to an executable [`FunctionTool`].

use fnbridge_domain::tool::{entities::ToolDefinition, traits::FunctionTool};
use std::sync::Arc;

/// Port for turning definitions into callables
pub trait ToolFactory: Send + Sync {
    fn bind(&self, definition: Arc<ToolDefinition>) -> Arc<dyn FunctionTool>;
}
