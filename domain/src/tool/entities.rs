//! Tool domain entities

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Arguments supplied by the caller at invocation time (name → JSON value)
pub type ToolArguments = HashMap<String, Value>;

/// Fallback text when a tool has no description
const NO_DESCRIPTION: &str = "No description available";

/// Fallback text when a parameter has no description
const NO_PARAM_DESCRIPTION: &str = "No description";

/// Definition of a tool as declared in the functions manifest.
///
/// Fields are read leniently: a missing, `null` or wrongly typed value
/// takes the neutral default instead of failing the entry, so partially
/// specified entries still load.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolDefinition {
    /// Unique name of the tool; also the script file stem
    #[serde(deserialize_with = "lenient::string")]
    pub name: String,
    /// Human-readable description
    #[serde(deserialize_with = "lenient::string")]
    pub description: String,
    /// JSON-Schema-like parameter specification
    #[serde(deserialize_with = "lenient::or_default")]
    pub parameters: ParameterSchema,
}

/// One entry of the functions manifest, in file order
#[derive(Debug, Clone, PartialEq)]
pub enum ManifestEntry {
    Definition(ToolDefinition),
    /// Entry that is not a JSON object
    Malformed { index: usize, reason: String },
}

impl ManifestEntry {
    pub fn definition(&self) -> Option<&ToolDefinition> {
        match self {
            ManifestEntry::Definition(definition) => Some(definition),
            ManifestEntry::Malformed { .. } => None,
        }
    }
}

/// Parameter schema of a tool (`{"type": "object", "properties": ..., "required": [...]}`)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParameterSchema {
    /// Schema type, normally `"object"`
    #[serde(
        rename = "type",
        skip_serializing_if = "Option::is_none",
        deserialize_with = "lenient::opt_string"
    )]
    pub schema_type: Option<String>,
    /// Declared parameters, in manifest order
    pub properties: Properties,
    /// Names of parameters the caller must supply
    #[serde(deserialize_with = "lenient::string_list")]
    pub required: Vec<String>,
}

/// Declared parameters keyed by name, keeping manifest order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Properties(Vec<(String, PropertySpec)>);

impl Properties {
    pub fn get(&self, name: &str) -> Option<&PropertySpec> {
        self.0.iter().find(|(n, _)| n == name).map(|(_, spec)| spec)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Add a parameter; an existing one of the same name is replaced in place
    pub fn insert(&mut self, name: String, spec: PropertySpec) {
        match self.0.iter_mut().find(|(n, _)| *n == name) {
            Some((_, existing)) => *existing = spec,
            None => self.0.push((name, spec)),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &PropertySpec)> {
        self.0.iter().map(|(name, spec)| (name.as_str(), spec))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<'a> IntoIterator for &'a Properties {
    type Item = (&'a str, &'a PropertySpec);
    type IntoIter = Box<dyn Iterator<Item = Self::Item> + 'a>;

    fn into_iter(self) -> Self::IntoIter {
        Box::new(self.iter())
    }
}

impl Serialize for Properties {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_map(self.iter())
    }
}

impl<'de> Deserialize<'de> for Properties {
    /// Anything but an object yields no properties; a property that is not an
    /// object becomes an untyped one.
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let properties = match Value::deserialize(deserializer)? {
            Value::Object(map) => map
                .into_iter()
                .map(|(name, spec)| (name, serde_json::from_value(spec).unwrap_or_default()))
                .collect(),
            _ => Vec::new(),
        };
        Ok(Self(properties))
    }
}

/// Specification of a single parameter
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PropertySpec {
    /// Declared type: a name (`"string"`, `"boolean"`) or a union (`["string", "null"]`)
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub param_type: Option<Value>,
    /// Parameter description
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "lenient::opt_string"
    )]
    pub description: Option<String>,
    /// Any other schema keywords (`enum`, `items`, `default`, ...), kept verbatim
    #[serde(flatten)]
    pub extra: serde_json::Map<String, Value>,
}

impl ToolDefinition {
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            parameters: ParameterSchema::default(),
        }
    }

    pub fn with_parameter(
        mut self,
        name: impl Into<String>,
        spec: PropertySpec,
        required: bool,
    ) -> Self {
        let name = name.into();
        if required && !self.parameters.required.contains(&name) {
            self.parameters.required.push(name.clone());
        }
        self.parameters.properties.insert(name, spec);
        self
    }

    /// Check whether a parameter is listed as required
    pub fn is_required(&self, param: &str) -> bool {
        self.parameters.required.iter().any(|r| r == param)
    }

    /// Generate the help text handed to the host alongside the callable.
    ///
    /// ```text
    /// Echoes input
    ///
    /// Args:
    ///     message (string): Text to echo (required)
    /// ```
    pub fn describe(&self) -> String {
        let mut parts = vec![if self.description.is_empty() {
            NO_DESCRIPTION.to_string()
        } else {
            self.description.clone()
        }];

        if !self.parameters.properties.is_empty() {
            parts.push("\nArgs:".to_string());
            for (name, spec) in &self.parameters.properties {
                let marker = if self.is_required(name) {
                    "required"
                } else {
                    "optional"
                };
                parts.push(format!(
                    "    {} ({}): {} ({})",
                    name,
                    spec.type_name(),
                    spec.description.as_deref().unwrap_or(NO_PARAM_DESCRIPTION),
                    marker
                ));
            }
        }

        parts.join("\n")
    }
}

impl PropertySpec {
    pub fn new(param_type: impl Into<String>) -> Self {
        Self {
            param_type: Some(Value::String(param_type.into())),
            ..Default::default()
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Declared type for display, defaulting to "string"; unions are joined with `|`
    pub fn type_name(&self) -> String {
        match &self.param_type {
            None | Some(Value::Null) => "string".to_string(),
            Some(Value::String(name)) => name.clone(),
            Some(Value::Array(names)) => names
                .iter()
                .map(|name| name.as_str().map_or_else(|| name.to_string(), str::to_string))
                .collect::<Vec<_>>()
                .join(" | "),
            Some(other) => other.to_string(),
        }
    }

    /// Only an exact `"boolean"` type is a flag; unions take a value
    pub fn is_boolean(&self) -> bool {
        self.param_type.as_ref().and_then(Value::as_str) == Some("boolean")
    }
}

/// Deserializers that map null or wrongly typed manifest values to defaults
mod lenient {
    use serde::{Deserialize, Deserializer, de::DeserializeOwned};
    use serde_json::Value;

    pub fn string<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
        Ok(opt_string(deserializer)?.unwrap_or_default())
    }

    pub fn opt_string<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<String>, D::Error> {
        match Value::deserialize(deserializer)? {
            Value::String(s) => Ok(Some(s)),
            _ => Ok(None),
        }
    }

    /// Keeps the string items of an array
    pub fn string_list<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<String>, D::Error> {
        match Value::deserialize(deserializer)? {
            Value::Array(items) => Ok(items
                .into_iter()
                .filter_map(|item| match item {
                    Value::String(s) => Some(s),
                    _ => None,
                })
                .collect()),
            _ => Ok(Vec::new()),
        }
    }

    pub fn or_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
    where
        D: Deserializer<'de>,
        T: DeserializeOwned + Default,
    {
        Ok(serde_json::from_value(Value::deserialize(deserializer)?).unwrap_or_default())
    }
}

/// A call to a tool with arguments
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ToolCall {
    /// Name of the tool to call
    pub tool_name: String,
    /// Arguments passed to the tool
    pub arguments: ToolArguments,
}

impl ToolCall {
    pub fn new(tool_name: impl Into<String>) -> Self {
        Self {
            tool_name: tool_name.into(),
            arguments: HashMap::new(),
        }
    }

    pub fn with_arg(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.arguments.insert(key.into(), value.into());
        self
    }

    pub fn with_arguments(mut self, arguments: ToolArguments) -> Self {
        self.arguments.extend(arguments);
        self
    }

    /// Get a string argument
    pub fn get_string(&self, key: &str) -> Option<&str> {
        self.arguments.get(key).and_then(|v| v.as_str())
    }
}

/// A resolved command line: the script path followed by flag/value tokens
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSpec {
    program: PathBuf,
    args: Vec<String>,
}

impl CommandSpec {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
        }
    }

    /// Convert a parameter name to its command-line flag (`dry_run` → `--dry-run`)
    pub fn flag_name(param: &str) -> String {
        format!("--{}", param.replace('_', "-"))
    }

    /// Append a bare flag (`--verbose`)
    pub fn push_flag(&mut self, param: &str) {
        self.args.push(Self::flag_name(param));
    }

    /// Append a flag followed by its value as a separate token
    pub fn push_option(&mut self, param: &str, value: impl Into<String>) {
        self.args.push(Self::flag_name(param));
        self.args.push(value.into());
    }

    pub fn program(&self) -> &Path {
        &self.program
    }

    pub fn args(&self) -> &[String] {
        &self.args
    }

    /// All tokens, program first
    pub fn tokens(&self) -> Vec<String> {
        std::iter::once(self.program.to_string_lossy().into_owned())
            .chain(self.args.iter().cloned())
            .collect()
    }
}
