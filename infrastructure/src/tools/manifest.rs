//! Functions manifest parser
//!
//! Reads the llm-functions `functions.json`. Two top-level shapes are
//! accepted:
//!
//! ```json
//! [{"name": "fs_cat", "description": "...", "parameters": {...}}]
//! {"functions": [{"name": "fs_cat", ...}]}
//! ```
//!
//! Entries are returned in file order without deduplication or field
//! validation; missing, null or mistyped fields take their neutral defaults.
//! An entry that is not an object is returned as
//! [`ManifestEntry::Malformed`] so the rest of the manifest still loads.

use fnbridge_domain::tool::{
    entities::{ManifestEntry, ToolDefinition},
    error::ManifestError,
};
use serde_json::Value;
use std::io::ErrorKind;
use std::path::Path;

/// Key holding the definitions array in the object form
const FUNCTIONS_KEY: &str = "functions";

/// Parser for the functions manifest
pub struct FunctionsManifest;

impl FunctionsManifest {
    /// Parse the manifest at `path`.
    pub fn parse(path: &Path) -> Result<Vec<ManifestEntry>, ManifestError> {
        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(ManifestError::NotFound {
                    path: path.to_path_buf(),
                });
            }
            Err(e) if e.kind() == ErrorKind::InvalidData => {
                return Err(ManifestError::Format {
                    path: path.to_path_buf(),
                    message: format!("not valid UTF-8: {}", e),
                });
            }
            Err(e) => {
                return Err(ManifestError::Read {
                    path: path.to_path_buf(),
                    source: e,
                });
            }
        };

        Self::parse_str(&content).map_err(|message| ManifestError::Format {
            path: path.to_path_buf(),
            message,
        })
    }

    /// Parse manifest content; the error is a description of what is wrong.
    pub fn parse_str(content: &str) -> Result<Vec<ManifestEntry>, String> {
        let data: Value =
            serde_json::from_str(content).map_err(|e| format!("invalid JSON: {}", e))?;

        let entries = match data {
            Value::Array(entries) => entries,
            Value::Object(mut map) => match map.remove(FUNCTIONS_KEY) {
                Some(Value::Array(entries)) => entries,
                Some(_) => return Err(format!("'{}' must be an array", FUNCTIONS_KEY)),
                None => {
                    return Err(format!(
                        "expected an array or an object with a '{}' key",
                        FUNCTIONS_KEY
                    ));
                }
            },
            other => {
                return Err(format!(
                    "expected an array or an object with a '{}' key, found {}",
                    FUNCTIONS_KEY,
                    json_type_name(&other)
                ));
            }
        };

        Ok(entries
            .into_iter()
            .enumerate()
            .map(|(index, entry)| match serde_json::from_value::<ToolDefinition>(entry) {
                Ok(definition) => ManifestEntry::Definition(definition),
                Err(e) => ManifestEntry::Malformed {
                    index,
                    reason: e.to_string(),
                },
            })
            .collect())
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::{NamedTempFile, tempdir};

    fn definitions(entries: Vec<ManifestEntry>) -> Vec<ToolDefinition> {
        entries
            .into_iter()
            .map(|entry| match entry {
                ManifestEntry::Definition(definition) => definition,
                other => panic!("unexpected entry: {:?}", other),
            })
            .collect()
    }

    fn manifest_file(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "{}", content).unwrap();
        file
    }

    #[test]
    fn test_parse_array_format() {
        let file = manifest_file(
            r#"[
                {
                    "name": "test_tool",
                    "description": "A test tool",
                    "parameters": {
                        "type": "object",
                        "properties": {
                            "input": {"type": "string", "description": "Input text"}
                        },
                        "required": ["input"]
                    }
                },
                {"name": "second"}
            ]"#,
        );

        let defs = definitions(FunctionsManifest::parse(file.path()).unwrap());

        assert_eq!(defs.len(), 2);
        assert_eq!(defs[0].name, "test_tool");
        assert_eq!(defs[0].description, "A test tool");
        assert_eq!(defs[0].parameters.required, vec!["input"]);
        assert_eq!(
            defs[0].parameters.properties.get("input").unwrap().description.as_deref(),
            Some("Input text")
        );
        assert_eq!(defs[1].name, "second");
    }

    #[test]
    fn test_parse_object_format() {
        let file = manifest_file(
            r#"{"functions": [{"name": "b_tool", "description": "B"}, {"name": "a_tool"}]}"#,
        );

        let defs = definitions(FunctionsManifest::parse(file.path()).unwrap());
        let names: Vec<_> = defs.iter().map(|d| d.name.as_str()).collect();

        assert_eq!(names, vec!["b_tool", "a_tool"]);
    }

    #[test]
    fn test_duplicates_are_kept() {
        let defs = FunctionsManifest::parse_str(r#"[{"name": "x"}, {"name": "x"}]"#).unwrap();
        assert_eq!(defs.len(), 2);
    }

    #[test]
    fn test_file_not_found() {
        let dir = tempdir().unwrap();
        let err = FunctionsManifest::parse(&dir.path().join("nonexistent.json")).unwrap_err();

        assert!(err.is_not_found());
    }

    #[test]
    fn test_invalid_json() {
        let file = manifest_file("{ invalid json }");
        let err = FunctionsManifest::parse(file.path()).unwrap_err();

        assert!(matches!(err, ManifestError::Format { .. }));
        assert!(err.to_string().contains("invalid JSON"));
    }

    #[test]
    fn test_unexpected_top_level_shapes() {
        for content in ["42", r#""functions""#, "null", r#"{"tools": []}"#, r#"{"functions": {}}"#]
        {
            let file = manifest_file(content);
            let err = FunctionsManifest::parse(file.path()).unwrap_err();
            assert!(
                matches!(err, ManifestError::Format { .. }),
                "expected format error for {}",
                content
            );
        }
    }

    #[test]
    fn test_non_object_entry_is_kept_as_malformed() {
        let entries = FunctionsManifest::parse_str(r#"[{"name": "ok"}, 7, {"name": "last"}]"#).unwrap();

        assert_eq!(entries.len(), 3);
        assert_eq!(entries[0].definition().unwrap().name, "ok");
        assert!(matches!(entries[1], ManifestEntry::Malformed { index: 1, .. }));
        assert_eq!(entries[2].definition().unwrap().name, "last");
    }

    #[test]
    fn test_union_type_does_not_drop_other_entries() {
        let defs = definitions(
            FunctionsManifest::parse_str(
                r#"[
                    {"name": "good", "description": "ok"},
                    {"name": "opt", "parameters": {"properties": {"q": {"type": ["string", "null"]}}}}
                ]"#,
            )
            .unwrap(),
        );

        assert_eq!(defs.len(), 2);
        assert_eq!(defs[0].name, "good");
        let q = defs[1].parameters.properties.get("q").unwrap();
        assert!(!q.is_boolean());
    }

    #[test]
    fn test_null_description_does_not_drop_other_entries() {
        let defs = definitions(
            FunctionsManifest::parse_str(r#"[{"name": "good"}, {"name": "nd", "description": null}]"#)
                .unwrap(),
        );

        assert_eq!(defs.len(), 2);
        assert_eq!(defs[1].name, "nd");
        assert_eq!(defs[1].describe(), "No description available");
    }
}
