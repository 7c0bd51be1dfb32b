//! Capabilities the loader drives: where modules come from and what a loaded
//! module must implement.

use std::collections::HashMap;
use std::fmt;

use anyhow::anyhow;
use async_trait::async_trait;

use crate::registry::ModuleManifest;

/// Configuration handed to a module, keyed by option name.
pub type ModuleConfig = serde_json::Map<String, serde_json::Value>;

/// A live module instance.
///
/// The loader calls `configure` then `init` when loading, `configure` again
/// when its configuration changes, and `teardown` before dropping it.
#[async_trait]
pub trait Module: Send + Sync {
    /// Applies configuration. Called before `init` and on every change.
    async fn configure(&mut self, _config: &ModuleConfig) -> anyhow::Result<()> {
        Ok(())
    }

    /// Starts the module. An error here fails this module and every module
    /// that depends on it, nothing else.
    async fn init(&mut self) -> anyhow::Result<()>;

    /// Releases whatever `init` acquired.
    async fn teardown(&mut self) -> anyhow::Result<()> {
        Ok(())
    }
}

/// Produces module instances from manifests.
///
/// Implementations may fetch code over the network, open a shared library,
/// or look the module up in a table compiled into the binary.
#[async_trait]
pub trait ModuleSource: Send + Sync {
    async fn fetch_module(&self, manifest: &ModuleManifest) -> anyhow::Result<Box<dyn Module>>;
}

type Factory = Box<dyn Fn() -> Box<dyn Module> + Send + Sync>;

/// A [`ModuleSource`] backed by factories registered at startup.
#[derive(Default)]
pub struct StaticSource {
    factories: HashMap<String, Factory>,
}

impl StaticSource {
    /// Creates a source with no factories.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers the factory used to build module `id`, replacing any earlier one.
    pub fn register<F>(&mut self, id: impl Into<String>, factory: F)
    where
        F: Fn() -> Box<dyn Module> + Send + Sync + 'static,
    {
        self.factories.insert(id.into(), Box::new(factory));
    }

    /// Builder form of [`StaticSource::register`].
    pub fn with<F>(mut self, id: impl Into<String>, factory: F) -> Self
    where
        F: Fn() -> Box<dyn Module> + Send + Sync + 'static,
    {
        self.register(id, factory);
        self
    }

    /// Returns true if a factory is registered for `id`.
    pub fn contains(&self, id: &str) -> bool {
        self.factories.contains_key(id)
    }
}

impl fmt::Debug for StaticSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut ids: Vec<&String> = self.factories.keys().collect();
        ids.sort();
        f.debug_struct("StaticSource").field("modules", &ids).finish()
    }
}

#[async_trait]
impl ModuleSource for StaticSource {
    async fn fetch_module(&self, manifest: &ModuleManifest) -> anyhow::Result<Box<dyn Module>> {
        let factory = self
            .factories
            .get(&manifest.id)
            .ok_or_else(|| anyhow!("no module registered for '{}'", manifest.id))?;
        Ok(factory())
    }
}

/// Merges `overrides` over `defaults`, key by key.
pub fn merge_config(defaults: &ModuleConfig, overrides: Option<&ModuleConfig>) -> ModuleConfig {
    let mut merged = defaults.clone();
    if let Some(overrides) = overrides {
        for (key, value) in overrides {
            merged.insert(key.clone(), value.clone());
        }
    }
    merged
}
