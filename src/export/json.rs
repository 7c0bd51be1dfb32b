//! JSON export implementation.
//!
//! Exports a load plan in JSON format for machine-readable output.

use super::{ExportData, Exporter};
use crate::graph::ValidationReport;
use crate::loader::ModuleConfig;
use crate::registry::BlockedModule;
use serde::Serialize;
use std::collections::BTreeMap;
use std::io::{self, Write};

/// JSON exporter implementation.
pub struct JsonExporter;

/// Serializable planned module for JSON output.
#[derive(Serialize)]
struct JsonModule<'a> {
    position: usize,
    id: &'a str,
    version: &'a str,
    enabled: bool,
    dependencies: BTreeMap<&'a str, &'a str>,
    #[serde(skip_serializing_if = "is_empty_config")]
    config: &'a ModuleConfig,
}

fn is_empty_config(config: &&ModuleConfig) -> bool {
    config.is_empty()
}

fn is_empty_slice<T>(items: &&[T]) -> bool {
    items.is_empty()
}

/// Serializable cycle info for JSON output.
#[derive(Serialize)]
struct JsonCycle<'a> {
    modules: &'a [String],
    path: String,
}

/// Summary statistics for JSON output.
#[derive(Serialize)]
struct JsonSummary {
    registered: usize,
    planned: usize,
    blocked: usize,
    errors: usize,
    warnings: usize,
    cycles: usize,
    loadable: bool,
}

/// Root JSON export structure.
#[derive(Serialize)]
struct JsonExport<'a> {
    source: &'a str,
    summary: JsonSummary,
    load_order: Vec<JsonModule<'a>>,
    #[serde(skip_serializing_if = "is_empty_slice")]
    blocked: &'a [BlockedModule],
    validation: &'a ValidationReport,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    circular_dependencies: Vec<JsonCycle<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    resolution_error: Option<&'a str>,
}

impl Exporter for JsonExporter {
    fn export<W: Write>(&self, data: &ExportData, writer: &mut W) -> io::Result<()> {
        let load_order = data
            .modules
            .iter()
            .map(|m| JsonModule {
                position: m.position,
                id: &m.id,
                version: &m.version,
                enabled: m.enabled,
                dependencies: m
                    .dependencies
                    .iter()
                    .map(|(d, c)| (d.as_str(), c.as_str()))
                    .collect(),
                config: &m.config,
            })
            .collect();

        let circular_dependencies = data
            .cycles
            .iter()
            .map(|c| JsonCycle {
                modules: &c.nodes,
                path: c.cycle_path(),
            })
            .collect();

        let export = JsonExport {
            source: &data.source,
            summary: JsonSummary {
                registered: data.registered,
                planned: data.modules.len(),
                blocked: data.blocked.len(),
                errors: data.validation.errors.len(),
                warnings: data.validation.warnings.len(),
                cycles: data.cycles.len(),
                loadable: data.is_loadable(),
            },
            load_order,
            blocked: &data.blocked,
            validation: &data.validation,
            circular_dependencies,
            resolution_error: data.resolution_error.as_deref(),
        };

        let json = serde_json::to_string_pretty(&export)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;

        writeln!(writer, "{}", json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::export::test_support;

    #[test]
    fn test_json_export_structure() {
        let mut output = Vec::new();
        JsonExporter
            .export(&test_support::data(), &mut output)
            .unwrap();

        let value: serde_json::Value = serde_json::from_slice(&output).unwrap();
        assert_eq!(value["summary"]["planned"], 2);
        assert_eq!(value["summary"]["blocked"], 1);
        assert_eq!(value["summary"]["loadable"], false);
        assert_eq!(value["load_order"][0]["id"], "core, ui");
        assert_eq!(value["load_order"][0]["config"]["theme"], "dark");
        assert_eq!(value["load_order"][1]["dependencies"]["core, ui"], "^1.0.0");
        assert_eq!(value["blocked"][0]["id"], "filters");
        assert_eq!(value["validation"]["valid"], false);
        assert!(value.get("circular_dependencies").is_none());
    }

    #[test]
    fn test_json_export_cycles() {
        let mut output = Vec::new();
        JsonExporter
            .export(&test_support::cyclic_data(), &mut output)
            .unwrap();

        let value: serde_json::Value = serde_json::from_slice(&output).unwrap();
        assert_eq!(value["summary"]["cycles"], 1);
        assert!(value["resolution_error"]
            .as_str()
            .unwrap()
            .contains("Circular dependency"));
        assert_eq!(value["load_order"].as_array().unwrap().len(), 0);
    }
}
