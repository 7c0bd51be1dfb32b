//! Export functionality for load plans.
//!
//! This module provides exporters for writing a resolved load plan, its
//! validation findings and any dependency cycles in various formats: JSON,
//! CSV, and Markdown.

pub mod csv;
pub mod json;
pub mod markdown;

use crate::config::ToolConfig;
use crate::graph::{CycleInfo, ValidationReport};
use crate::loader::{merge_config, ModuleConfig};
use crate::registry::{BlockedModule, ModuleRegistry};
use std::io::{self, Write};

/// Export format options
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    /// JSON format - machine-readable, full data
    Json,
    /// CSV format - one row per planned module
    Csv,
    /// Markdown format - documentation/reporting
    Markdown,
}

impl std::str::FromStr for ExportFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "json" => Ok(ExportFormat::Json),
            "csv" => Ok(ExportFormat::Csv),
            "markdown" | "md" => Ok(ExportFormat::Markdown),
            _ => Err(format!(
                "Unknown export format: '{}'. Valid formats: json, csv, markdown",
                s
            )),
        }
    }
}

impl std::fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ExportFormat::Json => write!(f, "json"),
            ExportFormat::Csv => write!(f, "csv"),
            ExportFormat::Markdown => write!(f, "markdown"),
        }
    }
}

/// One module in the planned load order.
#[derive(Debug, Clone)]
pub struct PlannedModule {
    /// 1-based load position
    pub position: usize,
    pub id: String,
    pub version: String,
    pub enabled: bool,
    /// Direct dependencies with their constraints
    pub dependencies: Vec<(String, String)>,
    /// Effective configuration (manifest defaults plus overrides)
    pub config: ModuleConfig,
}

/// Data container for export operations.
///
/// Holds everything a report shows about one planning run.
#[derive(Debug, Clone)]
pub struct ExportData {
    /// Where the modules were discovered
    pub source: String,
    /// Number of registered modules
    pub registered: usize,
    /// Modules in load order
    pub modules: Vec<PlannedModule>,
    /// Modules left out of the plan
    pub blocked: Vec<BlockedModule>,
    /// Validation findings for the planned set
    pub validation: ValidationReport,
    /// Dependency cycles among registered modules
    pub cycles: Vec<CycleInfo>,
    /// Set when no order could be computed
    pub resolution_error: Option<String>,
}

impl ExportData {
    /// Plans `targets` against `registry` and collects the results.
    ///
    /// A dependency cycle does not fail the export; it is recorded in
    /// `resolution_error` and `cycles` and the module list stays empty.
    pub fn collect(
        source: impl Into<String>,
        registry: &ModuleRegistry,
        targets: &[String],
        config: &ToolConfig,
    ) -> Self {
        let cycles = registry.graph().cycles();
        let mut data = Self {
            source: source.into(),
            registered: registry.len(),
            modules: Vec::new(),
            blocked: Vec::new(),
            validation: registry.validate(targets),
            cycles,
            resolution_error: None,
        };

        match registry.plan(targets) {
            Ok(plan) => {
                data.modules = plan
                    .order
                    .iter()
                    .enumerate()
                    .filter_map(|(i, id)| {
                        let manifest = registry.get(id)?;
                        Some(PlannedModule {
                            position: i + 1,
                            id: id.clone(),
                            version: manifest.version.clone(),
                            enabled: manifest.enabled,
                            dependencies: manifest
                                .dependencies
                                .iter()
                                .map(|(d, c)| (d.clone(), c.clone()))
                                .collect(),
                            config: merge_config(&manifest.config, config.module_overrides(id)),
                        })
                    })
                    .collect();
                data.blocked = plan.blocked;
                data.validation = plan.report;
            }
            Err(e) => data.resolution_error = Some(e.to_string()),
        }

        data
    }

    /// Returns true if every requested module can be loaded cleanly.
    pub fn is_loadable(&self) -> bool {
        self.resolution_error.is_none() && self.blocked.is_empty() && self.validation.valid
    }
}

/// Trait for exporters.
pub trait Exporter {
    /// Export the data to the given writer.
    fn export<W: Write>(&self, data: &ExportData, writer: &mut W) -> io::Result<()>;
}

/// Export data in the specified format.
pub fn export<W: Write>(
    format: ExportFormat,
    data: &ExportData,
    writer: &mut W,
) -> io::Result<()> {
    match format {
        ExportFormat::Json => json::JsonExporter.export(data, writer),
        ExportFormat::Csv => csv::CsvExporter.export(data, writer),
        ExportFormat::Markdown => markdown::MarkdownExporter.export(data, writer),
    }
}

/// Export data to a string.
pub fn export_to_string(format: ExportFormat, data: &ExportData) -> io::Result<String> {
    let mut buffer = Vec::new();
    export(format, data, &mut buffer)?;
    String::from_utf8(buffer).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use crate::registry::ModuleManifest;
    use serde_json::json;

    pub fn registry() -> ModuleRegistry {
        ModuleRegistry::from_manifests([
            ModuleManifest::new("core, ui", "1.0.0").with_config("theme", json!("dark")),
            ModuleManifest::new("sidebar", "2.0.0").with_dependency("core, ui", "^1.0.0"),
            ModuleManifest::new("filters", "1.0.0").with_dependency("core, ui", "^2.0.0"),
        ])
        .unwrap()
    }

    pub fn data() -> ExportData {
        let targets: Vec<String> = vec!["sidebar".into(), "filters".into()];
        ExportData::collect("modules", &registry(), &targets, &ToolConfig::default())
    }

    pub fn cyclic_data() -> ExportData {
        let registry = ModuleRegistry::from_manifests([
            ModuleManifest::new("a", "1.0.0").with_dependency("b", "*"),
            ModuleManifest::new("b", "1.0.0").with_dependency("a", "*"),
        ])
        .unwrap();
        let targets: Vec<String> = vec!["a".into()];
        ExportData::collect("modules", &registry, &targets, &ToolConfig::default())
    }
}
