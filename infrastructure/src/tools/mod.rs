//! Tool implementations backed by llm-functions scripts
//!
//! ```text
//! functions.json ──▶ FunctionsManifest ──▶ RegisterToolsUseCase ──▶ ToolRegistry
//!                                              │ (ToolPolicy)
//!                                              ▼
//!                                         ScriptTool::invoke
//!                                              │
//!                         CommandBuilder ──────┴──────▶ ProcessExecutor
//!                    (script + --kebab flags)        (LLM_OUTPUT, timeout, cap)
//! ```

pub mod adapter;
pub mod command;
pub mod manifest;
pub mod process;
pub mod source;

mod registry;

pub use adapter::{ScriptTool, ScriptToolFactory};
pub use command::{CommandBuilder, SCRIPT_EXTENSIONS};
pub use manifest::FunctionsManifest;
pub use process::{ProcessExecutor, TRUNCATION_MARKER};
pub use registry::ToolRegistry;
pub use source::FileManifestSource;

use std::path::PathBuf;

/// Make `path` absolute against the current directory.
///
/// Scripts run with the functions directory as their working directory, so
/// every path handed to them (and the script path itself) must not depend
/// on the caller's cwd.
pub(crate) fn absolute_path(path: PathBuf) -> PathBuf {
    std::path::absolute(&path).unwrap_or(path)
}
