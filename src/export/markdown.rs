//! Markdown export implementation.
//!
//! Exports a load plan in Markdown format for documentation and reporting.

use super::{ExportData, Exporter};
use std::io::{self, Write};

/// Markdown exporter implementation.
pub struct MarkdownExporter;

impl Exporter for MarkdownExporter {
    fn export<W: Write>(&self, data: &ExportData, writer: &mut W) -> io::Result<()> {
        writeln!(writer, "# Module Load Plan")?;
        writeln!(writer)?;
        writeln!(writer, "**Source:** {}", data.source)?;
        writeln!(writer)?;

        // Summary section
        writeln!(writer, "## Summary")?;
        writeln!(writer)?;
        writeln!(writer, "| Metric | Count |")?;
        writeln!(writer, "|--------|-------|")?;
        writeln!(writer, "| Registered Modules | {} |", data.registered)?;
        writeln!(writer, "| Planned | {} |", data.modules.len())?;
        writeln!(writer, "| Blocked | {} |", data.blocked.len())?;
        writeln!(writer, "| Errors | {} |", data.validation.errors.len())?;
        writeln!(writer, "| Warnings | {} |", data.validation.warnings.len())?;
        writeln!(writer, "| Circular Dependencies | {} |", data.cycles.len())?;
        writeln!(writer)?;

        if let Some(error) = &data.resolution_error {
            writeln!(writer, "> **Resolution failed:** {}", error)?;
            writeln!(writer)?;
        }

        if !data.modules.is_empty() {
            writeln!(writer, "## Load Order")?;
            writeln!(writer)?;
            writeln!(writer, "| # | Module | Version | Enabled | Depends On |")?;
            writeln!(writer, "|---|--------|---------|---------|------------|")?;
            for module in &data.modules {
                let deps: Vec<String> = module
                    .dependencies
                    .iter()
                    .map(|(id, constraint)| format!("`{}` {}", id, constraint))
                    .collect();
                writeln!(
                    writer,
                    "| {} | {} | {} | {} | {} |",
                    module.position,
                    module.id,
                    module.version,
                    if module.enabled { "yes" } else { "no" },
                    if deps.is_empty() { "-".to_string() } else { deps.join(", ") }
                )?;
            }
            writeln!(writer)?;
        }

        if !data.blocked.is_empty() {
            writeln!(writer, "## Blocked Modules")?;
            writeln!(writer)?;
            for blocked in &data.blocked {
                writeln!(writer, "- **{}**: {}", blocked.id, blocked.reason)?;
            }
            writeln!(writer)?;
        }

        if !data.validation.errors.is_empty() {
            writeln!(writer, "## Errors")?;
            writeln!(writer)?;
            for error in &data.validation.errors {
                writeln!(writer, "- {}", error)?;
            }
            writeln!(writer)?;
        }

        if !data.validation.warnings.is_empty() {
            writeln!(writer, "## Warnings")?;
            writeln!(writer)?;
            for warning in &data.validation.warnings {
                writeln!(writer, "- {}", warning)?;
            }
            writeln!(writer)?;
        }

        if !data.cycles.is_empty() {
            writeln!(writer, "## Circular Dependencies")?;
            writeln!(writer)?;
            for cycle in &data.cycles {
                writeln!(writer, "- `{}`", cycle.cycle_path())?;
            }
            writeln!(writer)?;
        }

        Ok(())
    }
}
