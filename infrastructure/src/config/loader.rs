//! Configuration loader with multi-source merging

use super::file_config::{FileFunctionsConfig, FunctionsConfig};
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Yaml},
};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Functions directory override (highest priority)
pub const FUNCTIONS_DIR_ENV: &str = "LLM_FUNCTIONS_DIR";

/// Functions directory override shared with aichat
pub const AICHAT_FUNCTIONS_DIR_ENV: &str = "AICHAT_FUNCTIONS_DIR";

/// Manifest path override
pub const FUNCTIONS_JSON_ENV: &str = "LLM_FUNCTIONS_JSON";

/// Environment variables as figment sees them (keys lowercased)
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct EnvOverrides {
    llm_functions_dir: Option<String>,
    aichat_functions_dir: Option<String>,
    llm_functions_json: Option<String>,
}

impl EnvOverrides {
    fn from_env() -> Self {
        Figment::new()
            .merge(Env::raw().only(&[
                FUNCTIONS_DIR_ENV,
                AICHAT_FUNCTIONS_DIR_ENV,
                FUNCTIONS_JSON_ENV,
            ]))
            .extract()
            .unwrap_or_else(|e| {
                warn!(error = %e, "Ignoring unreadable functions environment overrides");
                Self::default()
            })
    }

    fn apply(self, config: &mut FileFunctionsConfig) {
        let dir = [self.llm_functions_dir, self.aichat_functions_dir]
            .into_iter()
            .flatten()
            .find(|value| !value.trim().is_empty());
        if let Some(dir) = dir {
            config.functions_directory = Some(dir);
        }

        if let Some(json) = self.llm_functions_json.filter(|v| !v.trim().is_empty()) {
            config.functions_json = Some(json);
        }
    }
}

/// Configuration loader that handles file discovery and merging
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration from all sources with proper priority
    ///
    /// Priority (highest to lowest):
    /// 1. `LLM_FUNCTIONS_DIR`, then `AICHAT_FUNCTIONS_DIR`, and `LLM_FUNCTIONS_JSON`
    /// 2. Explicit config path if provided, else the global config file
    /// 3. Default values
    ///
    /// A config file that fails to parse or validate is ignored with a
    /// warning; loading never fails.
    pub fn load(config_path: Option<&Path>) -> FunctionsConfig {
        let path = config_path
            .map(Path::to_path_buf)
            .or_else(Self::global_config_path);

        let mut file_config = match path {
            Some(path) if path.exists() => Self::read_file(&path),
            Some(path) => {
                if config_path.is_some() {
                    warn!(path = %path.display(), "Config file not found, using defaults");
                }
                FileFunctionsConfig::default()
            }
            None => FileFunctionsConfig::default(),
        };

        EnvOverrides::from_env().apply(&mut file_config);
        file_config.resolve()
    }

    /// Defaults plus environment overrides (for --no-config)
    pub fn load_without_file() -> FunctionsConfig {
        let mut file_config = FileFunctionsConfig::default();
        EnvOverrides::from_env().apply(&mut file_config);
        file_config.resolve()
    }

    fn read_file(path: &Path) -> FileFunctionsConfig {
        let extracted = Figment::new()
            .merge(Serialized::defaults(FileFunctionsConfig::default()))
            .merge(Yaml::file(path))
            .extract::<FileFunctionsConfig>();

        let file_config = match extracted {
            Ok(config) => config,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Malformed config file, using defaults");
                return FileFunctionsConfig::default();
            }
        };

        if let Err(e) = file_config.validate() {
            warn!(path = %path.display(), error = %e, "Invalid config file, using defaults");
            return FileFunctionsConfig::default();
        }

        debug!(path = %path.display(), "Loaded config file");
        file_config
    }

    /// Get the global config file path
    ///
    /// `~/.config/io.datasette.llm/llm-functions.yaml` on every platform,
    /// regardless of `$XDG_CONFIG_HOME`
    pub fn global_config_path() -> Option<PathBuf> {
        dirs::home_dir().map(|home| {
            home.join(".config")
                .join("io.datasette.llm")
                .join("llm-functions.yaml")
        })
    }

    /// Print the config sources being used (for debugging)
    pub fn print_config_sources(config_path: Option<&Path>) {
        println!("Configuration sources (in priority order):");

        for var in [FUNCTIONS_DIR_ENV, AICHAT_FUNCTIONS_DIR_ENV, FUNCTIONS_JSON_ENV] {
            match std::env::var(var) {
                Ok(value) if !value.trim().is_empty() => {
                    println!("  [SET  ] Env:     {}={}", var, value)
                }
                _ => println!("  [     ] Env:     {}", var),
            }
        }

        let file = config_path
            .map(|p| ("Config: ", p.to_path_buf()))
            .or_else(|| Self::global_config_path().map(|p| ("Global: ", p)));
        if let Some((label, path)) = file {
            let marker = if path.exists() { "FOUND" } else { "     " };
            println!("  [{}] {} {}", marker, label, path.display());
        }

        println!("  [     ] Default: built-in defaults");
    }
}
