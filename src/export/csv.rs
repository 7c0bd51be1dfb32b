//! CSV export implementation.
//!
//! Exports a load plan in CSV format for spreadsheet use: one row per
//! planned module followed by one row per blocked module.

use super::{ExportData, Exporter};
use std::io::{self, Write};

/// CSV exporter implementation.
pub struct CsvExporter;

impl CsvExporter {
    /// Escape a field value for CSV format.
    ///
    /// Wraps the value in quotes if it contains commas, quotes, or newlines.
    fn escape_field(value: &str) -> String {
        if value.contains(',') || value.contains('"') || value.contains('\n') {
            format!("\"{}\"", value.replace('"', "\"\""))
        } else {
            value.to_string()
        }
    }
}

impl Exporter for CsvExporter {
    fn export<W: Write>(&self, data: &ExportData, writer: &mut W) -> io::Result<()> {
        writeln!(writer, "position,id,version,enabled,status,dependencies")?;

        for module in &data.modules {
            let dependencies: Vec<String> = module
                .dependencies
                .iter()
                .map(|(id, constraint)| format!("{}@{}", id, constraint))
                .collect();

            writeln!(
                writer,
                "{},{},{},{},planned,{}",
                module.position,
                Self::escape_field(&module.id),
                Self::escape_field(&module.version),
                module.enabled,
                Self::escape_field(&dependencies.join(";"))
            )?;
        }

        // Blocked modules have no position or manifest details
        for blocked in &data.blocked {
            writeln!(
                writer,
                ",{},,,blocked,{}",
                Self::escape_field(&blocked.id),
                Self::escape_field(&blocked.reason)
            )?;
        }

        Ok(())
    }
}
