//! modgraph - Dependency resolution for pluggable extension modules
//!
//! This crate discovers module manifests, builds a dependency graph from
//! their declared version constraints, detects circular dependencies, and
//! computes the order in which modules must be loaded.

pub mod config;
pub mod export;
pub mod graph;
pub mod loader;
pub mod logging;
pub mod registry;
pub mod version;
