//! Command builder: tool definition + arguments → script command line
//!
//! Scripts are looked up under `{functions_dir}/tools/` first, then directly
//! under `{functions_dir}/`, probing extensions in [`SCRIPT_EXTENSIONS`]
//! order. Arguments become `--kebab-case` flags.

use fnbridge_domain::tool::{
    entities::{CommandSpec, ToolArguments, ToolDefinition},
    error::ToolError,
};
use serde_json::Value;
use std::path::{Path, PathBuf};

/// Extension probe order for tool scripts
pub const SCRIPT_EXTENSIONS: [&str; 4] = [".sh", ".js", ".py", ""];

/// Subdirectory searched before the functions root
const TOOLS_SUBDIR: &str = "tools";

/// Builds [`CommandSpec`]s for tools under one functions directory
#[derive(Debug, Clone)]
pub struct CommandBuilder {
    functions_dir: PathBuf,
}

impl CommandBuilder {
    pub fn new(functions_dir: impl Into<PathBuf>) -> Self {
        Self {
            functions_dir: super::absolute_path(functions_dir.into()),
        }
    }

    pub fn functions_dir(&self) -> &Path {
        &self.functions_dir
    }

    /// Find the script for `tool_name`, if any.
    pub fn resolve_script(&self, tool_name: &str) -> Option<PathBuf> {
        let search_dirs = [self.functions_dir.join(TOOLS_SUBDIR), self.functions_dir.clone()];

        search_dirs.iter().find_map(|dir| {
            SCRIPT_EXTENSIONS
                .iter()
                .map(|ext| dir.join(format!("{}{}", tool_name, ext)))
                .find(|candidate| candidate.is_file())
        })
    }

    /// Build the command line for a call.
    ///
    /// Only arguments declared in the tool's schema are passed; boolean
    /// parameters become bare flags when truthy and are omitted otherwise.
    /// Required parameters are not checked here.
    pub fn build(
        &self,
        definition: &ToolDefinition,
        arguments: &ToolArguments,
    ) -> Result<CommandSpec, ToolError> {
        let script =
            self.resolve_script(&definition.name)
                .ok_or_else(|| ToolError::ToolNotFound {
                    tool: definition.name.clone(),
                    directory: self.functions_dir.display().to_string(),
                })?;

        let mut spec = CommandSpec::new(script);

        for (name, property) in &definition.parameters.properties {
            let Some(value) = arguments.get(name) else {
                continue;
            };

            if property.is_boolean() {
                if is_truthy(value) {
                    spec.push_flag(name);
                }
            } else {
                spec.push_option(name, value_to_arg(value));
            }
        }

        Ok(spec)
    }
}

/// JSON truthiness: `false`, `null`, `0`, `""`, `[]` and `{}` are falsy
fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(a) => !a.is_empty(),
        Value::Object(o) => !o.is_empty(),
    }
}

/// Strings pass through unquoted; everything else uses its JSON text
fn value_to_arg(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fnbridge_domain::tool::entities::PropertySpec;
    use serde_json::json;
    use std::fs;
    use tempfile::{TempDir, tempdir};

    fn functions_dir(scripts: &[&str]) -> TempDir {
        let dir = tempdir().unwrap();
        fs::create_dir_all(dir.path().join("tools")).unwrap();
        for script in scripts {
            fs::write(dir.path().join(script), "#!/bin/sh\n").unwrap();
        }
        dir
    }

    fn args(pairs: &[(&str, Value)]) -> ToolArguments {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    fn git_log() -> ToolDefinition {
        ToolDefinition::new("git_log", "Show commits")
            .with_parameter("max_count", PropertySpec::new("integer"), false)
            .with_parameter("all_branches", PropertySpec::new("boolean"), false)
            .with_parameter("author", PropertySpec::new("string"), false)
    }

    #[test]
    fn test_tools_subdir_preferred_over_root() {
        let dir = functions_dir(&["tools/echo_tool.sh", "echo_tool.sh"]);
        let builder = CommandBuilder::new(dir.path());

        let script = builder.resolve_script("echo_tool").unwrap();
        assert_eq!(script, builder.functions_dir().join("tools").join("echo_tool.sh"));
    }

    #[test]
    fn test_extension_priority() {
        let dir = functions_dir(&["tools/demo.py", "tools/demo.js", "tools/demo"]);
        let builder = CommandBuilder::new(dir.path());

        let script = builder.resolve_script("demo").unwrap();
        assert!(script.ends_with("tools/demo.js"));
    }

    #[test]
    fn test_root_fallback_and_extensionless() {
        let dir = functions_dir(&["get_time"]);
        let builder = CommandBuilder::new(dir.path());

        let script = builder.resolve_script("get_time").unwrap();
        assert_eq!(script, builder.functions_dir().join("get_time"));
    }

    #[test]
    fn test_missing_script_is_tool_not_found() {
        let dir = functions_dir(&[]);
        let builder = CommandBuilder::new(dir.path());

        let err = builder
            .build(&ToolDefinition::new("ghost", ""), &ToolArguments::new())
            .unwrap_err();
        assert!(matches!(err, ToolError::ToolNotFound { ref tool, .. } if tool == "ghost"));
    }

    #[test]
    fn test_boolean_flags() {
        let dir = functions_dir(&["tools/git_log.sh"]);
        let builder = CommandBuilder::new(dir.path());

        let on = builder
            .build(&git_log(), &args(&[("all_branches", json!(true))]))
            .unwrap();
        assert_eq!(on.args(), ["--all-branches"]);

        let off = builder
            .build(&git_log(), &args(&[("all_branches", json!(false))]))
            .unwrap();
        assert!(off.args().is_empty());
    }

    #[test]
    fn test_value_options_are_two_tokens() {
        let dir = functions_dir(&["tools/git_log.sh"]);
        let builder = CommandBuilder::new(dir.path());

        let spec = builder
            .build(
                &git_log(),
                &args(&[("max_count", json!(5)), ("author", json!("Ada Lovelace"))]),
            )
            .unwrap();

        assert_eq!(spec.args(), ["--max-count", "5", "--author", "Ada Lovelace"]);
        assert!(spec.program().ends_with("tools/git_log.sh"));
    }

    #[test]
    fn test_undeclared_arguments_ignored() {
        let dir = functions_dir(&["tools/git_log.sh"]);
        let builder = CommandBuilder::new(dir.path());

        let spec = builder
            .build(&git_log(), &args(&[("rm_rf", json!("/")), ("author", json!("x"))]))
            .unwrap();

        assert_eq!(spec.args(), ["--author", "x"]);
    }

    #[test]
    fn test_non_string_values_use_json_text() {
        assert_eq!(value_to_arg(&json!("plain")), "plain");
        assert_eq!(value_to_arg(&json!(1.5)), "1.5");
        assert_eq!(value_to_arg(&json!(["a", "b"])), r#"["a","b"]"#);
    }

    #[test]
    fn test_truthiness() {
        assert!(is_truthy(&json!(true)));
        assert!(is_truthy(&json!(1)));
        assert!(is_truthy(&json!("yes")));
        assert!(!is_truthy(&json!(false)));
        assert!(!is_truthy(&json!(0)));
        assert!(!is_truthy(&json!("")));
        assert!(!is_truthy(&Value::Null));
    }
}
