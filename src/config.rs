//! Tool configuration.
//!
//! Settings are read from a JSON file (`modgraph.json` by default). Every
//! field is optional; command-line flags override what the file says.
//!
//! ```json
//! {
//!   "modules_dir": "extension/modules",
//!   "manifest_name": "module.json",
//!   "log_level": "debug",
//!   "strict": true,
//!   "modules": { "loot-shortcuts": { "hotkey": "K" } }
//! }
//! ```

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::loader::ModuleConfig;
use crate::registry::MANIFEST_FILE_NAME;

/// File looked for in the working directory when no config path is given.
pub const DEFAULT_CONFIG_FILE: &str = "modgraph.json";

/// Errors that can occur while loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file {}: {source}", .path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Result type alias for configuration loading.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Settings for the `modgraph` tool.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolConfig {
    /// Directory scanned for module manifests
    pub modules_dir: PathBuf,
    /// File name that marks a module directory
    pub manifest_name: String,
    /// Log filter used when `RUST_LOG` is unset
    pub log_level: Option<String>,
    /// Treat validation warnings as failures
    pub strict: bool,
    /// Per-module configuration layered over manifest defaults
    pub modules: HashMap<String, ModuleConfig>,
}

impl Default for ToolConfig {
    fn default() -> Self {
        Self {
            modules_dir: PathBuf::from("modules"),
            manifest_name: MANIFEST_FILE_NAME.to_string(),
            log_level: None,
            strict: false,
            modules: HashMap::new(),
        }
    }
}

impl ToolConfig {
    /// Loads configuration from `path`.
    pub fn from_file(path: &Path) -> ConfigResult<Self> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        serde_json::from_str(&content).map_err(|source| ConfigError::Json {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Loads `explicit` if given, otherwise `modgraph.json` from the working
    /// directory if present, otherwise the defaults.
    pub fn load(explicit: Option<&Path>) -> ConfigResult<Self> {
        match explicit {
            Some(path) => Self::from_file(path),
            None => {
                let default_path = Path::new(DEFAULT_CONFIG_FILE);
                if default_path.is_file() {
                    Self::from_file(default_path)
                } else {
                    Ok(Self::default())
                }
            }
        }
    }

    /// Returns the override map for one module, if configured.
    pub fn module_overrides(&self, id: &str) -> Option<&ModuleConfig> {
        self.modules.get(id)
    }
}
