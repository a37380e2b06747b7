//! Configuration file schema
//!
//! Raw YAML values as written by the user, and the resolved
//! [`FunctionsConfig`] the rest of the crate consumes.

use crate::tools::{FileManifestSource, ProcessExecutor, ScriptToolFactory};
use fnbridge_domain::tool::policy::ToolPolicy;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

/// Default functions checkout, relative to the home directory
pub const DEFAULT_FUNCTIONS_DIR: &str = "llm-functions";

/// Default manifest file name inside the functions directory
pub const DEFAULT_MANIFEST_NAME: &str = "functions.json";

pub use crate::tools::process::{DEFAULT_MAX_OUTPUT_SIZE, DEFAULT_TIMEOUT_SECS};

/// Configuration validation errors
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigValidationError {
    #[error("timeout cannot be 0")]
    InvalidTimeout,

    #[error("max_output_size cannot be 0")]
    InvalidMaxOutputSize,

    #[error("tool name in {list} cannot be empty")]
    EmptyToolName { list: &'static str },
}

/// Raw configuration from `llm-functions.yaml`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileFunctionsConfig {
    /// Path to the llm-functions checkout (`~` allowed)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub functions_directory: Option<String>,
    /// Path to the manifest; defaults to `functions.json` in the directory
    #[serde(skip_serializing_if = "Option::is_none")]
    pub functions_json: Option<String>,
    /// When set and non-empty, only these tools are registered
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tool_allowlist: Option<Vec<String>>,
    /// Tools that are never registered
    pub tool_denylist: Vec<String>,
    /// Per-call timeout in seconds
    pub timeout: u64,
    /// Output cap in bytes
    pub max_output_size: usize,
}

impl Default for FileFunctionsConfig {
    fn default() -> Self {
        Self {
            functions_directory: None,
            functions_json: None,
            tool_allowlist: None,
            tool_denylist: Vec::new(),
            timeout: DEFAULT_TIMEOUT_SECS,
            max_output_size: DEFAULT_MAX_OUTPUT_SIZE,
        }
    }
}

impl FileFunctionsConfig {
    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        if self.timeout == 0 {
            return Err(ConfigValidationError::InvalidTimeout);
        }

        if self.max_output_size == 0 {
            return Err(ConfigValidationError::InvalidMaxOutputSize);
        }

        let lists = [
            ("tool_allowlist", self.tool_allowlist.as_deref().unwrap_or_default()),
            ("tool_denylist", self.tool_denylist.as_slice()),
        ];
        for (list, names) in lists {
            if names.iter().any(|name| name.trim().is_empty()) {
                return Err(ConfigValidationError::EmptyToolName { list });
            }
        }

        Ok(())
    }

    /// Resolve paths against the current user's home directory
    pub fn resolve(&self) -> FunctionsConfig {
        self.resolve_with_home(dirs::home_dir().as_deref())
    }

    pub fn resolve_with_home(&self, home: Option<&Path>) -> FunctionsConfig {
        let functions_directory = match non_empty(&self.functions_directory) {
            Some(raw) => expand_home(raw, home),
            None => home
                .map(|h| h.join(DEFAULT_FUNCTIONS_DIR))
                .unwrap_or_else(|| PathBuf::from(DEFAULT_FUNCTIONS_DIR)),
        };

        let functions_json = match non_empty(&self.functions_json) {
            Some(raw) => expand_home(raw, home),
            None => functions_directory.join(DEFAULT_MANIFEST_NAME),
        };

        FunctionsConfig {
            functions_directory,
            functions_json,
            tool_allowlist: self.tool_allowlist.clone(),
            tool_denylist: self.tool_denylist.clone(),
            timeout: self.timeout,
            max_output_size: self.max_output_size,
        }
    }
}

/// Fully resolved configuration
#[derive(Debug, Clone, PartialEq)]
pub struct FunctionsConfig {
    pub functions_directory: PathBuf,
    pub functions_json: PathBuf,
    pub tool_allowlist: Option<Vec<String>>,
    pub tool_denylist: Vec<String>,
    /// Seconds
    pub timeout: u64,
    pub max_output_size: usize,
}

impl Default for FunctionsConfig {
    fn default() -> Self {
        FileFunctionsConfig::default().resolve()
    }
}

impl FunctionsConfig {
    /// Allow/deny policy; an empty allowlist allows everything
    pub fn policy(&self) -> ToolPolicy {
        ToolPolicy::new(self.tool_allowlist.clone(), self.tool_denylist.clone())
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout)
    }

    pub fn executor(&self) -> ProcessExecutor {
        ProcessExecutor::new(self.timeout(), self.max_output_size)
    }

    pub fn manifest_source(&self) -> FileManifestSource {
        FileManifestSource::new(&self.functions_directory, &self.functions_json)
    }

    pub fn tool_factory(&self) -> ScriptToolFactory {
        ScriptToolFactory::new(&self.functions_directory, self.executor())
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

/// Expand a leading `~` (alone or followed by a separator)
fn expand_home(raw: &str, home: Option<&Path>) -> PathBuf {
    let Some(home) = home else {
        return PathBuf::from(raw);
    };

    if raw == "~" {
        return home.to_path_buf();
    }

    match raw.strip_prefix("~/") {
        Some(rest) => home.join(rest),
        None => PathBuf::from(raw),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use figment::providers::{Format, Yaml};

    #[test]
    fn test_defaults() {
        let config = FileFunctionsConfig::default().resolve_with_home(Some(Path::new("/home/ada")));

        assert_eq!(config.functions_directory, PathBuf::from("/home/ada/llm-functions"));
        assert_eq!(
            config.functions_json,
            PathBuf::from("/home/ada/llm-functions/functions.json")
        );
        assert_eq!(config.timeout(), Duration::from_secs(30));
        assert_eq!(config.max_output_size, 1_048_576);
        assert!(config.policy().is_allowed("anything"));
    }

    #[test]
    fn test_deserialize_full_config() {
        let yaml = r#"
functions_directory: ~/src/llm-functions
functions_json: /etc/functions.json
tool_allowlist: [fs_ls, get_time]
tool_denylist: [fs_rm]
timeout: 5
max_output_size: 2048
"#;
        let file: FileFunctionsConfig = figment::Figment::new()
            .merge(Yaml::string(yaml))
            .extract()
            .unwrap();
        let config = file.resolve_with_home(Some(Path::new("/home/ada")));

        assert_eq!(config.functions_directory, PathBuf::from("/home/ada/src/llm-functions"));
        assert_eq!(config.functions_json, PathBuf::from("/etc/functions.json"));
        assert_eq!(config.timeout, 5);
        assert_eq!(config.max_output_size, 2048);

        let policy = config.policy();
        assert!(policy.is_allowed("fs_ls"));
        assert!(!policy.is_allowed("fs_rm"));
        assert!(!policy.is_allowed("web_search"));
    }

    #[test]
    fn test_manifest_follows_directory() {
        let file = FileFunctionsConfig {
            functions_directory: Some("/opt/fns".into()),
            ..Default::default()
        };
        let config = file.resolve_with_home(None);

        assert_eq!(config.functions_json, PathBuf::from("/opt/fns/functions.json"));
    }

    #[test]
    fn test_empty_values_use_defaults() {
        let file = FileFunctionsConfig {
            functions_directory: Some("  ".into()),
            tool_allowlist: Some(vec![]),
            ..Default::default()
        };
        let config = file.resolve_with_home(Some(Path::new("/h")));

        assert_eq!(config.functions_directory, PathBuf::from("/h/llm-functions"));
        assert!(config.policy().is_allowed("fs_ls"));
    }

    #[test]
    fn test_expand_home() {
        let home = Some(Path::new("/h"));
        assert_eq!(expand_home("~", home), PathBuf::from("/h"));
        assert_eq!(expand_home("~/x", home), PathBuf::from("/h/x"));
        assert_eq!(expand_home("~other/x", home), PathBuf::from("~other/x"));
        assert_eq!(expand_home("~/x", None), PathBuf::from("~/x"));
    }

    #[test]
    fn test_validate() {
        assert!(FileFunctionsConfig::default().validate().is_ok());

        let zero = FileFunctionsConfig {
            timeout: 0,
            ..Default::default()
        };
        assert_eq!(zero.validate(), Err(ConfigValidationError::InvalidTimeout));

        let blank = FileFunctionsConfig {
            tool_denylist: vec!["".into()],
            ..Default::default()
        };
        assert_eq!(
            blank.validate(),
            Err(ConfigValidationError::EmptyToolName {
                list: "tool_denylist"
            })
        );
    }
}
