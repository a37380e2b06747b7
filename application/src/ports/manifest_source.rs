//! Manifest Source port
//!
//! Where tool definitions come from. The file-backed implementation lives in
//! the infrastructure layer.

use fnbridge_domain::tool::{entities::ManifestEntry, error::ManifestError};

/// Port for loading tool definitions
pub trait ManifestSource: Send + Sync {
    /// Human-readable location of the manifest (for logging)
    fn location(&self) -> String;

    /// Whether the source is installed at all.
    ///
    /// An unavailable source yields an empty registration pass rather than
    /// an error.
    fn is_available(&self) -> bool;

    /// Load all manifest entries, in manifest order
    ///
    /// A malformed entry is returned as such rather than failing the load.
    fn load(&self) -> Result<Vec<ManifestEntry>, ManifestError>;
}
