//! Configuration loading for fnbridge
//!
//! This module handles file I/O and merging of configuration from multiple sources.
//! The priority order (highest to lowest):
//!
//! 1. `LLM_FUNCTIONS_DIR` / `AICHAT_FUNCTIONS_DIR` / `LLM_FUNCTIONS_JSON`
//! 2. `--config <path>` specified file, else
//!    `~/.config/io.datasette.llm/llm-functions.yaml`
//! 3. Default values

mod file_config;
mod loader;

pub use file_config::{
    ConfigValidationError, DEFAULT_FUNCTIONS_DIR, DEFAULT_MANIFEST_NAME, DEFAULT_MAX_OUTPUT_SIZE,
    DEFAULT_TIMEOUT_SECS, FileFunctionsConfig, FunctionsConfig,
};
pub use loader::{AICHAT_FUNCTIONS_DIR_ENV, ConfigLoader, FUNCTIONS_DIR_ENV, FUNCTIONS_JSON_ENV};
