//! Tool error types
//!
//! Two families: [`ManifestError`] for loading the functions manifest
//! (registration time) and [`ToolError`] for invoking a tool (call time).
//! Call-time errors are returned to the caller, never swallowed.

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while loading the functions manifest
#[derive(Debug, Error)]
pub enum ManifestError {
    #[error("functions manifest not found at {}", .path.display())]
    NotFound { path: PathBuf },

    #[error("invalid functions manifest {}: {message}", .path.display())]
    Format { path: PathBuf, message: String },

    #[error("failed to read functions manifest {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl ManifestError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, ManifestError::NotFound { .. })
    }
}

/// Errors raised while invoking a tool
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ToolError {
    #[error("Tool script for '{tool}' not found in {directory}")]
    ToolNotFound { tool: String, directory: String },

    #[error("Unknown tool: {0}")]
    UnknownTool(String),

    #[error("Required parameter '{parameter}' missing for tool '{tool}'")]
    MissingParameter { tool: String, parameter: String },

    #[error("Tool '{tool}' failed with exit code {exit_code}{}", stderr_suffix(.stderr))]
    Execution {
        tool: String,
        exit_code: i32,
        stderr: Option<String>,
    },

    #[error("Tool '{tool}' timed out after {seconds} seconds")]
    Timeout { tool: String, seconds: u64 },

    #[error("Failed to start tool '{tool}': {message}")]
    Spawn { tool: String, message: String },
}

fn stderr_suffix(stderr: &Option<String>) -> String {
    match stderr {
        Some(text) => format!("\nStderr: {}", text),
        None => String::new(),
    }
}

impl ToolError {
    /// Stable error code for the host
    ///
    /// | Code | Variants |
    /// |------|----------|
    /// | `NOT_FOUND` | `ToolNotFound`, `UnknownTool` |
    /// | `INVALID_ARGUMENT` | `MissingParameter` |
    /// | `EXECUTION_FAILED` | `Execution`, `Spawn` |
    /// | `TIMEOUT` | `Timeout` |
    pub fn code(&self) -> &'static str {
        match self {
            ToolError::ToolNotFound { .. } | ToolError::UnknownTool(_) => "NOT_FOUND",
            ToolError::MissingParameter { .. } => "INVALID_ARGUMENT",
            ToolError::Execution { .. } | ToolError::Spawn { .. } => "EXECUTION_FAILED",
            ToolError::Timeout { .. } => "TIMEOUT",
        }
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, ToolError::Timeout { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_execution_error_includes_stderr() {
        let err = ToolError::Execution {
            tool: "fs_rm".into(),
            exit_code: 2,
            stderr: Some("permission denied".into()),
        };

        assert_eq!(
            err.to_string(),
            "Tool 'fs_rm' failed with exit code 2\nStderr: permission denied"
        );
        assert_eq!(err.code(), "EXECUTION_FAILED");
    }

    #[test]
    fn test_execution_error_without_stderr() {
        let err = ToolError::Execution {
            tool: "fs_rm".into(),
            exit_code: 1,
            stderr: None,
        };
        assert_eq!(err.to_string(), "Tool 'fs_rm' failed with exit code 1");
    }

    #[test]
    fn test_timeout_message() {
        let err = ToolError::Timeout {
            tool: "slow".into(),
            seconds: 30,
        };

        assert_eq!(err.to_string(), "Tool 'slow' timed out after 30 seconds");
        assert!(err.is_timeout());
        assert_eq!(err.code(), "TIMEOUT");
    }

    #[test]
    fn test_missing_parameter_names_parameter() {
        let err = ToolError::MissingParameter {
            tool: "echo_tool".into(),
            parameter: "message".into(),
        };

        assert!(err.to_string().contains("'message'"));
        assert_eq!(err.code(), "INVALID_ARGUMENT");
    }

    #[test]
    fn test_manifest_not_found() {
        let err = ManifestError::NotFound {
            path: PathBuf::from("/nope/functions.json"),
        };

        assert!(err.is_not_found());
        assert!(err.to_string().contains("/nope/functions.json"));
    }
}
