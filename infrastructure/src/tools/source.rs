//! File-backed manifest source

use fnbridge_application::ports::manifest_source::ManifestSource;
use fnbridge_domain::tool::{entities::ManifestEntry, error::ManifestError};
use std::path::{Path, PathBuf};

use super::manifest::FunctionsManifest;

/// Reads tool definitions from `functions.json` inside an llm-functions checkout
#[derive(Debug, Clone)]
pub struct FileManifestSource {
    functions_dir: PathBuf,
    manifest_path: PathBuf,
}

impl FileManifestSource {
    pub fn new(functions_dir: impl Into<PathBuf>, manifest_path: impl Into<PathBuf>) -> Self {
        Self {
            functions_dir: functions_dir.into(),
            manifest_path: manifest_path.into(),
        }
    }

    pub fn functions_dir(&self) -> &Path {
        &self.functions_dir
    }

    pub fn manifest_path(&self) -> &Path {
        &self.manifest_path
    }
}

impl ManifestSource for FileManifestSource {
    fn location(&self) -> String {
        self.manifest_path.display().to_string()
    }

    /// Both the functions directory and the manifest must exist
    fn is_available(&self) -> bool {
        self.functions_dir.is_dir() && self.manifest_path.exists()
    }

    fn load(&self) -> Result<Vec<ManifestEntry>, ManifestError> {
        FunctionsManifest::parse(&self.manifest_path)
    }
}
