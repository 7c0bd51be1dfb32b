//! Module lifecycle management.
//!
//! The [`ModuleLoader`] turns a [`LoadPlan`] into running modules. Modules
//! are loaded one at a time in plan order, each after every dependency has
//! become active. A module that fails takes down only itself and the modules
//! that depend on it; unrelated modules in the same batch still load.
//!
//! ```text
//! Unloaded -> Loading -> Configured -> Active -> Unloaded
//!                 \           \
//!                  `-----------`--> Failed(reason)
//! ```

mod source;

pub use source::{merge_config, Module, ModuleConfig, ModuleSource, StaticSource};

use std::collections::{HashMap, HashSet};
use std::fmt;

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::registry::{LoadPlan, ModuleRegistry};

/// Errors returned by loader operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LoaderError {
    #[error("Module '{0}' is not registered")]
    NotRegistered(String),

    #[error("Module '{0}' is not active")]
    NotActive(String),

    #[error("Module '{id}' cannot load: dependency '{dependency}' is not active")]
    DependencyNotActive { id: String, dependency: String },

    #[error("Failed to fetch module '{id}': {reason}")]
    Fetch { id: String, reason: String },

    #[error("Module '{id}' failed to configure: {reason}")]
    Configure { id: String, reason: String },

    #[error("Module '{id}' failed to initialize: {reason}")]
    Init { id: String, reason: String },
}

/// Result type alias for loader operations.
pub type LoaderResult<T> = Result<T, LoaderError>;

/// Lifecycle state of a module.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum ModuleState {
    /// Not loaded, or torn down
    Unloaded,
    /// Being fetched from the source
    Loading,
    /// Configuration applied, `init` not yet finished
    Configured,
    /// Initialized and running
    Active,
    /// A lifecycle step failed
    Failed(String),
}

impl fmt::Display for ModuleState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unloaded => write!(f, "unloaded"),
            Self::Loading => write!(f, "loading"),
            Self::Configured => write!(f, "configured"),
            Self::Active => write!(f, "active"),
            Self::Failed(reason) => write!(f, "failed: {}", reason),
        }
    }
}

/// A module that did not load, with the reason.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LoadFailure {
    pub id: String,
    pub reason: String,
}

/// Outcome of a batch load.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct LoadReport {
    /// Modules that became active, in load order
    pub loaded: Vec<String>,
    /// Modules whose own lifecycle step failed
    pub failed: Vec<LoadFailure>,
    /// Modules not attempted because of a blocked or failed dependency
    pub skipped: Vec<LoadFailure>,
}

impl LoadReport {
    /// Returns true if nothing failed or was skipped.
    pub fn is_success(&self) -> bool {
        self.failed.is_empty() && self.skipped.is_empty()
    }
}

struct Slot {
    state: ModuleState,
    instance: Option<Box<dyn Module>>,
}

/// Loads, configures, reloads and tears down modules from a [`ModuleSource`].
pub struct ModuleLoader<S> {
    source: S,
    slots: HashMap<String, Slot>,
    /// Active modules in the order they became active
    active: Vec<String>,
    /// Per-module configuration layered over manifest defaults
    overrides: HashMap<String, ModuleConfig>,
}

impl<S: ModuleSource> ModuleLoader<S> {
    /// Creates a loader with nothing loaded.
    pub fn new(source: S) -> Self {
        Self {
            source,
            slots: HashMap::new(),
            active: Vec::new(),
            overrides: HashMap::new(),
        }
    }

    /// Sets configuration overrides applied when modules are loaded.
    pub fn with_overrides(mut self, overrides: HashMap<String, ModuleConfig>) -> Self {
        self.overrides = overrides;
        self
    }

    /// The source modules are fetched from.
    pub fn source(&self) -> &S {
        &self.source
    }

    /// Returns the current state of a module.
    pub fn state(&self, id: &str) -> ModuleState {
        self.slots
            .get(id)
            .map(|slot| slot.state.clone())
            .unwrap_or(ModuleState::Unloaded)
    }

    /// Returns true if `id` is loaded and initialized.
    pub fn is_active(&self, id: &str) -> bool {
        self.state(id) == ModuleState::Active
    }

    /// Returns active module ids in load order.
    pub fn active_modules(&self) -> &[String] {
        &self.active
    }

    /// Loads every module in `plan.order`.
    ///
    /// Blocked modules from the plan are reported as skipped. A module whose
    /// dependency failed during this batch is skipped as well.
    pub async fn load_all(&mut self, registry: &ModuleRegistry, plan: &LoadPlan) -> LoadReport {
        let mut report = LoadReport::default();

        for blocked in &plan.blocked {
            report.skipped.push(LoadFailure {
                id: blocked.id.clone(),
                reason: blocked.reason.clone(),
            });
        }

        for id in &plan.order {
            if self.is_active(id) {
                debug!("Module '{}' already active", id);
                continue;
            }

            match self.load(registry, id).await {
                Ok(()) => report.loaded.push(id.clone()),
                Err(e @ LoaderError::DependencyNotActive { .. }) => {
                    report.skipped.push(LoadFailure {
                        id: id.clone(),
                        reason: e.to_string(),
                    });
                }
                Err(e) => report.failed.push(LoadFailure {
                    id: id.clone(),
                    reason: e.to_string(),
                }),
            }
        }

        info!(
            "Loaded {} modules ({} failed, {} skipped)",
            report.loaded.len(),
            report.failed.len(),
            report.skipped.len()
        );
        report
    }

    /// Loads a single module whose dependencies are already active.
    ///
    /// Loading a module that is already active does nothing.
    pub async fn load(&mut self, registry: &ModuleRegistry, id: &str) -> LoaderResult<()> {
        let manifest = registry
            .get(id)
            .ok_or_else(|| LoaderError::NotRegistered(id.to_string()))?;

        if self.is_active(id) {
            debug!("Module '{}' already active", id);
            return Ok(());
        }

        if let Some((dependency, _)) = registry
            .graph()
            .get_dependencies(id)
            .into_iter()
            .find(|(dep, _)| !self.is_active(dep))
        {
            let err = LoaderError::DependencyNotActive {
                id: id.to_string(),
                dependency: dependency.to_string(),
            };
            warn!("{}", err);
            return Err(err);
        }

        info!("Loading module '{}' v{}", id, manifest.version);
        self.set_state(id, ModuleState::Loading);

        let mut instance = match self.source.fetch_module(manifest).await {
            Ok(instance) => instance,
            Err(e) => {
                return Err(self.fail(LoaderError::Fetch {
                    id: id.to_string(),
                    reason: format!("{:#}", e),
                }))
            }
        };

        let config = merge_config(&manifest.config, self.overrides.get(id));
        if let Err(e) = instance.configure(&config).await {
            return Err(self.fail(LoaderError::Configure {
                id: id.to_string(),
                reason: format!("{:#}", e),
            }));
        }
        self.set_state(id, ModuleState::Configured);

        if let Err(e) = instance.init().await {
            return Err(self.fail(LoaderError::Init {
                id: id.to_string(),
                reason: format!("{:#}", e),
            }));
        }

        self.slots.insert(
            id.to_string(),
            Slot {
                state: ModuleState::Active,
                instance: Some(instance),
            },
        );
        self.active.push(id.to_string());
        debug!("Module '{}' active", id);
        Ok(())
    }

    fn set_state(&mut self, id: &str, state: ModuleState) {
        self.slots
            .entry(id.to_string())
            .and_modify(|slot| slot.state = state.clone())
            .or_insert(Slot {
                state,
                instance: None,
            });
    }

    fn fail(&mut self, err: LoaderError) -> LoaderError {
        let id = match &err {
            LoaderError::Fetch { id, .. }
            | LoaderError::Configure { id, .. }
            | LoaderError::Init { id, .. }
            | LoaderError::DependencyNotActive { id, .. } => id.clone(),
            LoaderError::NotRegistered(id) | LoaderError::NotActive(id) => id.clone(),
        };
        warn!("{}", err);
        self.slots.insert(
            id,
            Slot {
                state: ModuleState::Failed(err.to_string()),
                instance: None,
            },
        );
        err
    }

    /// Sets the overrides used the next time `id` is loaded.
    ///
    /// Does not touch a running instance; use [`ModuleLoader::configure`] for that.
    pub fn set_overrides(&mut self, id: impl Into<String>, overrides: ModuleConfig) {
        self.overrides.insert(id.into(), overrides);
    }

    /// Replaces an active module's configuration overrides and re-applies them.
    ///
    /// The `configure` hook runs with the manifest defaults merged with the
    /// new overrides. A failing hook leaves the module active with the new
    /// overrides stored. An inactive module is an error and its stored
    /// overrides are left unchanged.
    pub async fn configure(
        &mut self,
        registry: &ModuleRegistry,
        id: &str,
        overrides: ModuleConfig,
    ) -> LoaderResult<()> {
        let manifest = registry
            .get(id)
            .ok_or_else(|| LoaderError::NotRegistered(id.to_string()))?;
        if !self.is_active(id) {
            return Err(LoaderError::NotActive(id.to_string()));
        }
        self.overrides.insert(id.to_string(), overrides);

        let config = merge_config(&manifest.config, self.overrides.get(id));
        let instance = self
            .slots
            .get_mut(id)
            .filter(|slot| slot.state == ModuleState::Active)
            .and_then(|slot| slot.instance.as_mut())
            .ok_or_else(|| LoaderError::NotActive(id.to_string()))?;

        instance
            .configure(&config)
            .await
            .map_err(|e| LoaderError::Configure {
                id: id.to_string(),
                reason: format!("{:#}", e),
            })?;

        debug!("Reconfigured module '{}'", id);
        Ok(())
    }

    /// Tears down a module and every active module that depends on it.
    ///
    /// Dependents go first, in reverse load order. Returns the ids unloaded,
    /// in the order they were torn down. Teardown errors are logged and the
    /// module is still considered unloaded.
    pub async fn unload(&mut self, registry: &ModuleRegistry, id: &str) -> LoaderResult<Vec<String>> {
        if !self.is_active(id) {
            return Err(LoaderError::NotActive(id.to_string()));
        }

        let mut targets: HashSet<String> = registry.graph().get_all_dependents(id);
        targets.insert(id.to_string());

        let order: Vec<String> = self
            .active
            .iter()
            .rev()
            .filter(|m| targets.contains(*m))
            .cloned()
            .collect();

        for module in &order {
            self.teardown(module).await;
        }
        self.active.retain(|m| !targets.contains(m));

        info!("Unloaded {:?}", order);
        Ok(order)
    }

    async fn teardown(&mut self, id: &str) {
        let Some(slot) = self.slots.get_mut(id) else {
            return;
        };

        if let Some(mut instance) = slot.instance.take() {
            if let Err(e) = instance.teardown().await {
                warn!("Module '{}' teardown failed: {:#}", id, e);
            }
        }
        slot.state = ModuleState::Unloaded;
    }

    /// Unloads a module and its dependents, then loads them all again.
    ///
    /// Manifest changes made in `registry` since the first load take effect.
    pub async fn reload(&mut self, registry: &ModuleRegistry, id: &str) -> LoaderResult<LoadReport> {
        let mut unloaded = self.unload(registry, id).await?;
        unloaded.reverse();

        let plan = LoadPlan {
            order: unloaded,
            ..LoadPlan::default()
        };
        Ok(self.load_all(registry, &plan).await)
    }

    /// Tears down every active module in reverse load order.
    pub async fn unload_all(&mut self) -> Vec<String> {
        let order: Vec<String> = self.active.iter().rev().cloned().collect();
        for module in &order {
            self.teardown(module).await;
        }
        self.active.clear();
        order
    }
}

impl<S> fmt::Debug for ModuleLoader<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModuleLoader")
            .field("active", &self.active)
            .field("tracked", &self.slots.len())
            .finish()
    }
}
