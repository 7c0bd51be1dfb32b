//! Module discovery.
//!
//! Walks a modules directory and parses every manifest file it finds.

use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};
use walkdir::WalkDir;

use super::manifest::ModuleManifest;

/// A manifest found on disk.
#[derive(Debug, Clone)]
pub struct DiscoveredModule {
    /// Path of the manifest file
    pub path: PathBuf,
    /// Parsed manifest
    pub manifest: ModuleManifest,
}

/// A manifest file that could not be used.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscoveryFailure {
    /// Path of the offending file or directory
    pub path: PathBuf,
    /// Read, parse or registration error
    pub reason: String,
}

/// Everything a directory scan turned up.
#[derive(Debug, Clone, Default)]
pub struct DiscoveryReport {
    /// Parsed manifests, sorted by path
    pub modules: Vec<DiscoveredModule>,
    /// Manifests that failed to read, parse or register
    pub failures: Vec<DiscoveryFailure>,
}

impl DiscoveryReport {
    pub(crate) fn fail(&mut self, path: &Path, reason: impl Into<String>) {
        let reason = reason.into();
        warn!("Skipping manifest {}: {}", path.display(), reason);
        self.failures.push(DiscoveryFailure {
            path: path.to_path_buf(),
            reason,
        });
    }
}

/// Scans `modules_dir` recursively for files called `manifest_name`.
///
/// Entries are visited in file-name order so repeated scans of the same tree
/// register modules in the same order. Unreadable entries and invalid
/// manifests are recorded as failures and do not abort the scan.
pub fn discover_manifests(modules_dir: &Path, manifest_name: &str) -> DiscoveryReport {
    info!("Discovering modules in {}", modules_dir.display());

    let mut report = DiscoveryReport::default();
    let walker = WalkDir::new(modules_dir)
        .follow_links(true)
        .sort_by_file_name()
        .into_iter();

    for entry in walker {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                let path = e.path().unwrap_or(modules_dir).to_path_buf();
                report.fail(&path, e.to_string());
                continue;
            }
        };

        if !entry.file_type().is_file() || entry.file_name() != manifest_name {
            continue;
        }

        match ModuleManifest::parse_file(entry.path()) {
            Ok(manifest) => {
                debug!("Found module '{}' at {}", manifest.id, entry.path().display());
                report.modules.push(DiscoveredModule {
                    path: entry.path().to_path_buf(),
                    manifest,
                });
            }
            Err(e) => report.fail(entry.path(), e.to_string()),
        }
    }

    info!(
        "Discovered {} modules ({} skipped)",
        report.modules.len(),
        report.failures.len()
    );
    report
}
