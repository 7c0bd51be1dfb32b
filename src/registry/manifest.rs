//! Parser for `module.json` manifests.
//!
//! A manifest names a module, its version, the modules it depends on and the
//! default configuration handed to the module when it is loaded.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::graph::ModuleRecord;
use crate::version::{Version, VersionError};

/// Default file name searched for during discovery.
pub const MANIFEST_FILE_NAME: &str = "module.json";

/// Errors that can occur while reading a manifest.
#[derive(Debug, thiserror::Error)]
pub enum ManifestError {
    /// Failed to read the file from disk.
    #[error("Failed to read manifest: {0}")]
    IoError(#[from] std::io::Error),

    /// Failed to parse JSON content.
    #[error("Failed to parse manifest JSON: {0}")]
    JsonError(#[from] serde_json::Error),

    /// The manifest parsed but its content is unusable.
    #[error("Invalid manifest for '{id}': {reason}")]
    Invalid {
        /// Module id, or `<unnamed>` when the id itself is missing
        id: String,
        /// What is wrong with it
        reason: String,
    },

    /// The declared version could not be parsed.
    #[error("Invalid version in manifest for '{id}': {source}")]
    InvalidVersion {
        id: String,
        #[source]
        source: VersionError,
    },
}

/// Result type alias for manifest operations.
pub type ManifestResult<T> = Result<T, ManifestError>;

/// Contents of a `module.json` file.
///
/// # Example
///
/// ```
/// use modgraph::registry::ModuleManifest;
///
/// let manifest = ModuleManifest::parse_str(r#"{
///     "id": "loot-shortcuts",
///     "version": "1.2.0",
///     "dependencies": {"core-ui": "^1.0.0"}
/// }"#).unwrap();
///
/// assert!(manifest.enabled);
/// assert_eq!(manifest.dependencies["core-ui"], "^1.0.0");
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModuleManifest {
    /// Unique module id.
    pub id: String,

    /// Human-readable name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Module version (numeric, optionally with a pre-release suffix).
    pub version: String,

    /// A brief description of the module.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Whether the module should be activated.
    #[serde(default = "default_enabled")]
    pub enabled: bool,

    /// Required modules mapped to version constraints.
    #[serde(default)]
    pub dependencies: BTreeMap<String, String>,

    /// Default configuration passed to the module on load.
    #[serde(default)]
    pub config: serde_json::Map<String, serde_json::Value>,
}

fn default_enabled() -> bool {
    true
}

impl ModuleManifest {
    /// Creates a manifest with no dependencies and empty configuration.
    pub fn new(id: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: None,
            version: version.into(),
            description: None,
            enabled: true,
            dependencies: BTreeMap::new(),
            config: serde_json::Map::new(),
        }
    }

    /// Adds a dependency, replacing any earlier constraint on the same module.
    pub fn with_dependency(mut self, id: impl Into<String>, constraint: impl Into<String>) -> Self {
        self.dependencies.insert(id.into(), constraint.into());
        self
    }

    /// Sets the enabled flag.
    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    /// Adds a default configuration entry.
    pub fn with_config(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.config.insert(key.into(), value);
        self
    }

    /// Parses and validates a manifest from a JSON string.
    pub fn parse_str(content: &str) -> ManifestResult<Self> {
        let manifest: ModuleManifest = serde_json::from_str(content)?;
        manifest.validate()?;
        Ok(manifest)
    }

    /// Parses and validates a manifest file.
    pub fn parse_file(path: &Path) -> ManifestResult<Self> {
        let content = fs::read_to_string(path)?;
        Self::parse_str(&content)
    }

    /// Checks that the manifest can be registered.
    pub fn validate(&self) -> ManifestResult<()> {
        if self.id.trim().is_empty() {
            return Err(ManifestError::Invalid {
                id: "<unnamed>".to_string(),
                reason: "module id cannot be empty".to_string(),
            });
        }

        Version::parse(&self.version).map_err(|source| ManifestError::InvalidVersion {
            id: self.id.clone(),
            source,
        })?;

        if self.dependencies.contains_key(&self.id) {
            return Err(ManifestError::Invalid {
                id: self.id.clone(),
                reason: "module cannot depend on itself".to_string(),
            });
        }

        if let Some(empty) = self.dependencies.keys().find(|k| k.trim().is_empty()) {
            return Err(ManifestError::Invalid {
                id: self.id.clone(),
                reason: format!("dependency id '{}' is empty", empty),
            });
        }

        Ok(())
    }

    /// Returns the display name, falling back to the id.
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.id)
    }

    /// Returns the record used for dependency validation.
    pub fn record(&self) -> ModuleRecord {
        ModuleRecord::new(self.id.clone(), self.version.clone(), self.enabled)
    }
}
