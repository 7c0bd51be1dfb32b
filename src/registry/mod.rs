//! Registry of known modules.
//!
//! The [`ModuleRegistry`] owns every registered [`ModuleManifest`] and the
//! [`DependencyGraph`] built from their declared dependencies. It is the
//! component callers ask for validation reports and load plans.
//!
//! # Example
//!
//! ```
//! use modgraph::registry::{ModuleManifest, ModuleRegistry};
//!
//! let mut registry = ModuleRegistry::new();
//! registry.register(ModuleManifest::new("B", "1.5.0")).unwrap();
//! registry
//!     .register(ModuleManifest::new("A", "1.0.0").with_dependency("B", "^1.0.0"))
//!     .unwrap();
//! registry
//!     .register(ModuleManifest::new("C", "1.0.0").with_dependency("A", "*"))
//!     .unwrap();
//!
//! assert_eq!(registry.load_order(["C", "A", "B"]).unwrap(), vec!["B", "A", "C"]);
//! assert!(registry.validate(["C", "A", "B"]).valid);
//! ```

pub mod discovery;
pub mod manifest;

pub use discovery::{discover_manifests, DiscoveredModule, DiscoveryFailure, DiscoveryReport};
pub use manifest::{ManifestError, ManifestResult, ModuleManifest, MANIFEST_FILE_NAME};

use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::{debug, info};

use crate::graph::{DependencyGraph, ModuleLookup, ModuleRecord, ResolveError, ValidationReport};

/// Errors returned by registry operations.
#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    /// The manifest failed validation.
    #[error(transparent)]
    Manifest(#[from] ManifestError),

    /// A module with the same id is already registered.
    #[error("Module '{0}' is already registered")]
    Duplicate(String),

    /// The module id is not registered.
    #[error("Module '{0}' is not registered")]
    NotFound(String),

    /// No load order exists for the registered modules.
    #[error(transparent)]
    Resolve(#[from] ResolveError),

    /// The modules directory does not exist.
    #[error("Modules directory not found: {}", .0.display())]
    DirectoryNotFound(PathBuf),
}

/// Result type alias for registry operations.
pub type RegistryResult<T> = Result<T, RegistryError>;

/// A module that a [`LoadPlan`] will not load.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BlockedModule {
    /// Module id
    pub id: String,
    /// Why the module was left out
    pub reason: String,
}

/// The outcome of planning a load: what to load, in which order, and why
/// anything was left out.
#[derive(Debug, Clone, Default, Serialize)]
pub struct LoadPlan {
    /// Modules to load, dependencies first
    pub order: Vec<String>,
    /// Modules excluded because they, or something they need, failed validation
    pub blocked: Vec<BlockedModule>,
    /// The validation report the plan was derived from
    pub report: ValidationReport,
}

impl LoadPlan {
    /// Returns true if `id` was blocked.
    pub fn is_blocked(&self, id: &str) -> bool {
        self.blocked.iter().any(|b| b.id == id)
    }
}

/// Catalog of registered modules and their dependency graph.
#[derive(Debug, Clone, Default)]
pub struct ModuleRegistry {
    /// Registered manifests by id
    manifests: HashMap<String, ModuleManifest>,
    /// Validation view of each manifest, kept in step with `manifests`
    records: HashMap<String, ModuleRecord>,
    /// Registration order
    order: Vec<String>,
    graph: DependencyGraph,
}

impl ModuleRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a registry from manifests, stopping at the first invalid one.
    pub fn from_manifests<I>(manifests: I) -> RegistryResult<Self>
    where
        I: IntoIterator<Item = ModuleManifest>,
    {
        let mut registry = Self::new();
        for manifest in manifests {
            registry.register(manifest)?;
        }
        Ok(registry)
    }

    /// Scans `modules_dir` and registers every valid manifest found.
    ///
    /// Manifests that fail to parse, or that reuse an id already seen, are
    /// recorded in the returned [`DiscoveryReport`] and skipped.
    pub fn scan(modules_dir: &Path, manifest_name: &str) -> RegistryResult<(Self, DiscoveryReport)> {
        let mut registry = Self::new();
        let report = registry.rescan(modules_dir, manifest_name)?;
        Ok((registry, report))
    }

    /// Discards every registration and rebuilds from `modules_dir`.
    pub fn rescan(
        &mut self,
        modules_dir: &Path,
        manifest_name: &str,
    ) -> RegistryResult<DiscoveryReport> {
        if !modules_dir.is_dir() {
            return Err(RegistryError::DirectoryNotFound(modules_dir.to_path_buf()));
        }

        self.clear();
        let mut report = discover_manifests(modules_dir, manifest_name);

        let discovered = std::mem::take(&mut report.modules);
        for found in discovered {
            match self.register(found.manifest.clone()) {
                Ok(()) => report.modules.push(found),
                Err(e) => report.fail(&found.path, e.to_string()),
            }
        }

        info!("Registry holds {} modules", self.len());
        Ok(report)
    }

    /// Registers a module and records its dependency edges.
    pub fn register(&mut self, manifest: ModuleManifest) -> RegistryResult<()> {
        manifest.validate()?;

        if self.manifests.contains_key(&manifest.id) {
            return Err(RegistryError::Duplicate(manifest.id));
        }

        Self::add_to_graph(&mut self.graph, &manifest);
        debug!(
            "Registered module '{}' v{} with {} dependencies",
            manifest.id,
            manifest.version,
            manifest.dependencies.len()
        );

        self.records.insert(manifest.id.clone(), manifest.record());
        self.order.push(manifest.id.clone());
        self.manifests.insert(manifest.id.clone(), manifest);
        Ok(())
    }

    fn add_to_graph(graph: &mut DependencyGraph, manifest: &ModuleManifest) {
        graph.add_module(&manifest.id);
        for (dependency, constraint) in &manifest.dependencies {
            graph.add_dependency(&manifest.id, dependency, constraint);
        }
    }

    /// Removes a module from the registry.
    ///
    /// Modules that still declare a dependency on it keep that edge, so later
    /// validation reports it as missing.
    pub fn unregister(&mut self, id: &str) -> RegistryResult<ModuleManifest> {
        let manifest = self
            .manifests
            .remove(id)
            .ok_or_else(|| RegistryError::NotFound(id.to_string()))?;
        self.records.remove(id);
        self.order.retain(|m| m != id);
        self.rebuild_graph();

        debug!("Unregistered module '{}'", id);
        Ok(manifest)
    }

    fn rebuild_graph(&mut self) {
        self.graph.clear();
        for id in &self.order {
            if let Some(manifest) = self.manifests.get(id) {
                Self::add_to_graph(&mut self.graph, manifest);
            }
        }
    }

    /// Switches a module on or off.
    pub fn set_enabled(&mut self, id: &str, enabled: bool) -> RegistryResult<()> {
        let manifest = self
            .manifests
            .get_mut(id)
            .ok_or_else(|| RegistryError::NotFound(id.to_string()))?;
        manifest.enabled = enabled;
        if let Some(record) = self.records.get_mut(id) {
            record.enabled = enabled;
        }
        Ok(())
    }

    /// Removes every module.
    pub fn clear(&mut self) {
        self.manifests.clear();
        self.records.clear();
        self.order.clear();
        self.graph.clear();
    }

    /// Gets a manifest by id.
    pub fn get(&self, id: &str) -> Option<&ModuleManifest> {
        self.manifests.get(id)
    }

    /// Checks if a module is registered.
    pub fn contains(&self, id: &str) -> bool {
        self.manifests.contains_key(id)
    }

    /// Returns the number of registered modules.
    pub fn len(&self) -> usize {
        self.manifests.len()
    }

    /// Checks if no module is registered.
    pub fn is_empty(&self) -> bool {
        self.manifests.is_empty()
    }

    /// Iterates manifests in registration order.
    pub fn manifests(&self) -> impl Iterator<Item = &ModuleManifest> + '_ {
        self.order.iter().filter_map(|id| self.manifests.get(id))
    }

    /// Returns module ids in registration order.
    pub fn ids(&self) -> Vec<String> {
        self.order.clone()
    }

    /// Returns the ids of enabled modules in registration order.
    pub fn enabled_ids(&self) -> Vec<String> {
        self.manifests()
            .filter(|m| m.enabled)
            .map(|m| m.id.clone())
            .collect()
    }

    /// Returns the validation records in registration order.
    pub fn records(&self) -> Vec<ModuleRecord> {
        self.order
            .iter()
            .filter_map(|id| self.records.get(id))
            .cloned()
            .collect()
    }

    /// The dependency graph built from registered manifests.
    pub fn graph(&self) -> &DependencyGraph {
        &self.graph
    }

    /// Validates `targets` against the registered modules.
    pub fn validate<I, S>(&self, targets: I) -> ValidationReport
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.graph.validate_dependencies(self, targets)
    }

    /// Computes a load order for `targets`.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::Resolve`] if the registered modules contain a
    /// dependency cycle.
    pub fn load_order<I, S>(&self, targets: I) -> RegistryResult<Vec<String>>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Ok(self.graph.resolve_dependency_order(targets)?)
    }

    /// Plans loading `targets` together with every registered module they
    /// need.
    ///
    /// Modules that fail validation are blocked, and so is every module that
    /// depends on a blocked one. Disabled dependencies are still loaded when
    /// something enabled needs them; validation reports them as warnings.
    pub fn plan<I, S>(&self, targets: I) -> RegistryResult<LoadPlan>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut expanded: Vec<String> = Vec::new();
        let mut seen: HashSet<String> = HashSet::new();
        for target in targets {
            let target = target.as_ref();
            if seen.insert(target.to_string()) {
                expanded.push(target.to_string());
            }
            let mut needed: Vec<String> = self
                .graph
                .get_all_dependencies(target)
                .into_iter()
                .filter(|dep| self.contains(dep))
                .collect();
            needed.sort();
            for dep in needed {
                if seen.insert(dep.clone()) {
                    expanded.push(dep);
                }
            }
        }

        let report = self.validate(&expanded);
        let resolved = self.load_order(&expanded)?;

        let mut blocked: Vec<BlockedModule> = Vec::new();
        let mut blocked_ids: HashSet<String> = report.invalid_modules.iter().cloned().collect();
        let mut order = Vec::with_capacity(resolved.len());

        for id in resolved {
            if blocked_ids.contains(&id) {
                blocked.push(BlockedModule {
                    id,
                    reason: "failed dependency validation".to_string(),
                });
                continue;
            }

            let failed_dep = self
                .graph
                .get_dependencies(&id)
                .into_iter()
                .map(|(dep, _)| dep)
                .find(|dep| blocked_ids.contains(*dep))
                .map(str::to_string);

            match failed_dep {
                Some(dep) => {
                    blocked_ids.insert(id.clone());
                    blocked.push(BlockedModule {
                        reason: format!("depends on blocked module '{}'", dep),
                        id,
                    });
                }
                None => order.push(id),
            }
        }

        if !blocked.is_empty() {
            info!("{} modules blocked from loading", blocked.len());
        }

        Ok(LoadPlan {
            order,
            blocked,
            report,
        })
    }
}

impl ModuleLookup for ModuleRegistry {
    fn lookup(&self, id: &str) -> Option<&ModuleRecord> {
        self.records.get(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn scenario(b_enabled: bool) -> ModuleRegistry {
        ModuleRegistry::from_manifests([
            ModuleManifest::new("A", "1.0.0").with_dependency("B", "^1.0.0"),
            ModuleManifest::new("B", "1.5.0").with_enabled(b_enabled),
            ModuleManifest::new("C", "1.0.0").with_dependency("A", "*"),
        ])
        .unwrap()
    }

    #[test]
    fn test_register_builds_graph() {
        let registry = scenario(true);
        assert_eq!(registry.len(), 3);
        assert_eq!(registry.graph().edge_count(), 2);
        assert_eq!(registry.ids(), vec!["A", "B", "C"]);
    }

    #[test]
    fn test_duplicate_rejected() {
        let mut registry = scenario(true);
        let err = registry.register(ModuleManifest::new("A", "2.0.0")).unwrap_err();
        assert!(matches!(err, RegistryError::Duplicate(id) if id == "A"));
    }

    #[test]
    fn test_invalid_manifest_rejected() {
        let mut registry = ModuleRegistry::new();
        let err = registry.register(ModuleManifest::new("x", "bad")).unwrap_err();
        assert!(matches!(err, RegistryError::Manifest(_)));
        assert!(registry.is_empty());
    }

    #[test]
    fn test_scenario_order_and_validation() {
        let registry = scenario(true);
        assert_eq!(registry.load_order(["C", "A", "B"]).unwrap(), vec!["B", "A", "C"]);

        let report = registry.validate(["C", "A", "B"]);
        assert!(report.valid);
        assert!(report.is_clean());
    }

    #[test]
    fn test_disabled_dependency_warns() {
        let registry = scenario(false);
        let report = registry.validate(["C", "A", "B"]);
        assert!(report.valid);
        assert_eq!(report.warnings.len(), 1);
        assert_eq!(registry.enabled_ids(), vec!["A", "C"]);
    }

    #[test]
    fn test_set_enabled_updates_validation() {
        let mut registry = scenario(true);
        registry.set_enabled("B", false).unwrap();
        assert_eq!(registry.validate(["A"]).warnings.len(), 1);
        assert!(!registry.get("B").unwrap().enabled);
        assert!(matches!(
            registry.set_enabled("nope", true),
            Err(RegistryError::NotFound(_))
        ));
    }

    #[test]
    fn test_unregister_keeps_dependent_edges() {
        let mut registry = scenario(true);
        let removed = registry.unregister("B").unwrap();
        assert_eq!(removed.id, "B");
        assert!(!registry.contains("B"));

        let report = registry.validate(["A"]);
        assert!(!report.valid);
        assert_eq!(report.missing_dependencies, vec!["B"]);
    }

    #[test]
    fn test_cycle_fails_resolution() {
        let registry = ModuleRegistry::from_manifests([
            ModuleManifest::new("A", "1.0.0").with_dependency("B", "*"),
            ModuleManifest::new("B", "1.0.0").with_dependency("A", "*"),
        ])
        .unwrap();

        let err = registry.load_order(["A", "B"]).unwrap_err();
        assert!(matches!(err, RegistryError::Resolve(_)));
        assert!(registry.plan(["A"]).is_err());
    }

    #[test]
    fn test_plan_pulls_in_dependencies() {
        let registry = scenario(true);
        let plan = registry.plan(["C"]).unwrap();
        assert_eq!(plan.order, vec!["B", "A", "C"]);
        assert!(plan.blocked.is_empty());
    }

    #[test]
    fn test_plan_blocks_invalid_module_and_dependents() {
        let registry = ModuleRegistry::from_manifests([
            ModuleManifest::new("A", "1.0.0").with_dependency("B", "^2.0.0"),
            ModuleManifest::new("B", "1.5.0"),
            ModuleManifest::new("C", "1.0.0").with_dependency("A", "*"),
            ModuleManifest::new("D", "1.0.0"),
        ])
        .unwrap();

        let plan = registry.plan(["C", "D"]).unwrap();
        assert_eq!(plan.order, vec!["B", "D"]);
        assert!(plan.is_blocked("A"));
        assert!(plan.is_blocked("C"));
        assert!(!plan.report.valid);

        let c = plan.blocked.iter().find(|b| b.id == "C").unwrap();
        assert!(c.reason.contains("'A'"));
    }

    #[test]
    fn test_plan_blocks_unknown_target() {
        let registry = scenario(true);
        let plan = registry.plan(["ghost", "B"]).unwrap();
        assert_eq!(plan.order, vec!["B"]);
        assert!(plan.is_blocked("ghost"));
    }

    #[test]
    fn test_scan_and_rescan() {
        let tmp = tempfile::tempdir().unwrap();
        let write = |dir: &str, body: &str| {
            let dir = tmp.path().join(dir);
            fs::create_dir_all(&dir).unwrap();
            fs::write(dir.join(MANIFEST_FILE_NAME), body).unwrap();
        };
        write("core", r#"{"id": "core", "version": "1.0.0"}"#);
        write(
            "ui",
            r#"{"id": "ui", "version": "1.0.0", "dependencies": {"core": "^1.0.0"}}"#,
        );
        write("ui-copy", r#"{"id": "ui", "version": "1.1.0"}"#);

        let (mut registry, report) = ModuleRegistry::scan(tmp.path(), MANIFEST_FILE_NAME).unwrap();
        assert_eq!(registry.len(), 2);
        assert_eq!(report.modules.len(), 2);
        assert_eq!(report.failures.len(), 1);
        assert!(report.failures[0].reason.contains("already registered"));

        fs::remove_dir_all(tmp.path().join("ui-copy")).unwrap();
        fs::remove_dir_all(tmp.path().join("core")).unwrap();
        let report = registry.rescan(tmp.path(), MANIFEST_FILE_NAME).unwrap();
        assert!(report.failures.is_empty());
        assert_eq!(registry.ids(), vec!["ui"]);
        assert_eq!(registry.validate(["ui"]).missing_dependencies, vec!["core"]);
    }

    #[test]
    fn test_scan_missing_directory() {
        let tmp = tempfile::tempdir().unwrap();
        let result = ModuleRegistry::scan(&tmp.path().join("absent"), MANIFEST_FILE_NAME);
        assert!(matches!(result, Err(RegistryError::DirectoryNotFound(_))));
    }
}
