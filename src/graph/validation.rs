//! Cross-checks requested modules against a catalog of available modules.
//!
//! Validation never fails. Every problem is collected into a
//! [`ValidationReport`] and the caller decides whether to abort or warn.

use super::DependencyGraph;
use crate::version::is_version_satisfied;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap, HashSet};

/// The catalog view of a module that validation needs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModuleRecord {
    /// Unique module id
    pub id: String,
    /// Installed version
    pub version: String,
    /// Whether the module is switched on
    pub enabled: bool,
}

impl ModuleRecord {
    /// Creates a new module record.
    pub fn new(id: impl Into<String>, version: impl Into<String>, enabled: bool) -> Self {
        Self {
            id: id.into(),
            version: version.into(),
            enabled,
        }
    }
}

/// Read-only lookup of module records by id.
pub trait ModuleLookup {
    /// Returns the record for `id`, if the module is known.
    fn lookup(&self, id: &str) -> Option<&ModuleRecord>;
}

impl ModuleLookup for HashMap<String, ModuleRecord> {
    fn lookup(&self, id: &str) -> Option<&ModuleRecord> {
        self.get(id)
    }
}

impl ModuleLookup for BTreeMap<String, ModuleRecord> {
    fn lookup(&self, id: &str) -> Option<&ModuleRecord> {
        self.get(id)
    }
}

impl ModuleLookup for [ModuleRecord] {
    fn lookup(&self, id: &str) -> Option<&ModuleRecord> {
        self.iter().find(|r| r.id == id)
    }
}

impl ModuleLookup for Vec<ModuleRecord> {
    fn lookup(&self, id: &str) -> Option<&ModuleRecord> {
        self.as_slice().lookup(id)
    }
}

/// Outcome of [`DependencyGraph::validate_dependencies`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationReport {
    /// True when no errors were found (warnings do not count)
    pub valid: bool,
    /// Problems that should stop a module from loading
    pub errors: Vec<String>,
    /// Informational problems, such as a disabled dependency
    pub warnings: Vec<String>,
    /// Dependencies that are not in the catalog, without duplicates
    pub missing_dependencies: Vec<String>,
    /// Requested modules that produced at least one error
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub invalid_modules: Vec<String>,
}

impl ValidationReport {
    /// Returns true if there are no errors and no warnings.
    pub fn is_clean(&self) -> bool {
        self.errors.is_empty() && self.warnings.is_empty()
    }
}

impl DependencyGraph {
    /// Checks each of `targets` and its declared dependencies against `registry`.
    ///
    /// - A target missing from the registry is an error; its dependencies are
    ///   not checked.
    /// - A dependency missing from the registry is an error and is listed in
    ///   `missing_dependencies`.
    /// - A dependency whose version does not satisfy the constraint is an error.
    /// - A dependency that is present and compatible but disabled is a warning.
    ///
    /// # Example
    ///
    /// ```rust
    /// use modgraph::graph::{DependencyGraph, ModuleRecord};
    ///
    /// let mut graph = DependencyGraph::new();
    /// graph.add_dependency("A", "Z", "^1.0.0");
    ///
    /// let registry = vec![ModuleRecord::new("A", "1.0.0", true)];
    /// let report = graph.validate_dependencies(&registry, ["A"]);
    ///
    /// assert!(!report.valid);
    /// assert_eq!(report.missing_dependencies, vec!["Z"]);
    /// ```
    pub fn validate_dependencies<R, I, S>(&self, registry: &R, targets: I) -> ValidationReport
    where
        R: ModuleLookup + ?Sized,
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut report = ValidationReport::default();
        let mut missing_seen = HashSet::new();

        for target in targets {
            let id = target.as_ref();
            if registry.lookup(id).is_none() {
                report.errors.push(format!("Module '{}' not found", id));
                report.invalid_modules.push(id.to_string());
                continue;
            }

            let errors_before = report.errors.len();
            for (dependency, constraint) in self.get_dependencies(id) {
                let Some(record) = registry.lookup(dependency) else {
                    if missing_seen.insert(dependency.to_string()) {
                        report.missing_dependencies.push(dependency.to_string());
                    }
                    report.errors.push(format!(
                        "Module '{}' depends on '{}', which is not available",
                        id, dependency
                    ));
                    continue;
                };

                if !is_version_satisfied(constraint, &record.version) {
                    report.errors.push(format!(
                        "Module '{}' requires '{}' {} but version {} is available",
                        id, dependency, constraint, record.version
                    ));
                } else if !record.enabled {
                    report.warnings.push(format!(
                        "Module '{}' depends on '{}', which is disabled",
                        id, dependency
                    ));
                }
            }

            if report.errors.len() > errors_before {
                report.invalid_modules.push(id.to_string());
            }
        }

        report.valid = report.errors.is_empty();
        report
    }
}
