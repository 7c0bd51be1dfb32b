//! Graph module for module dependency modeling.
//!
//! This module provides the [`DependencyGraph`] struct for recording which
//! modules require which, detecting cycles, computing load orders, and
//! validating a requested set of modules against a catalog.
//!
//! # Example
//!
//! ```rust
//! use modgraph::graph::DependencyGraph;
//!
//! let mut graph = DependencyGraph::new();
//! graph.add_dependency("battle-mods", "core-ui", "^1.0.0");
//! graph.add_module("theme-picker");
//!
//! assert_eq!(graph.node_count(), 3);
//! assert_eq!(graph.edge_count(), 1);
//! ```

mod dependency_graph;
mod validation;

pub use dependency_graph::{CycleInfo, DependencyGraph, ResolveError, ResolveResult, ANY_VERSION};
pub use validation::{ModuleLookup, ModuleRecord, ValidationReport};
