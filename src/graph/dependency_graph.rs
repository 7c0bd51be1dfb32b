//! Dependency graph implementation using petgraph.
//!
//! Provides a directed graph of module dependencies where each edge carries
//! the version constraint the dependent declared. The graph answers cycle
//! queries, computes load orders and exposes transitive closures in both
//! directions.

use petgraph::algo::tarjan_scc;
use petgraph::stable_graph::{NodeIndex, StableDiGraph};
use petgraph::visit::{DfsPostOrder, EdgeRef, VisitMap};
use petgraph::Direction;
use std::collections::{BTreeMap, HashMap, HashSet};
use tracing::debug;

/// Constraint used when a dependency does not name a version range.
pub const ANY_VERSION: &str = "*";

/// Errors that can occur while resolving a load order.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ResolveError {
    /// The graph contains a cycle, so no load order exists.
    #[error("Circular dependency detected: {}", .cycle.cycle_path())]
    CircularDependency {
        /// The modules forming the cycle, in traversal order
        cycle: CycleInfo,
    },
}

/// Result type alias for resolution operations.
pub type ResolveResult<T> = Result<T, ResolveError>;

/// A directed graph representing module dependencies.
///
/// Nodes are module ids. An edge points from the dependent module to the
/// module it requires, and its weight is the version constraint. petgraph
/// keeps incoming and outgoing adjacency for every node, so the forward
/// edges and their reverse (dependents) view can never disagree.
///
/// Node iteration follows insertion order, which makes every traversal
/// deterministic for a given sequence of mutations.
///
/// # Example
///
/// ```rust
/// use modgraph::graph::DependencyGraph;
///
/// let mut graph = DependencyGraph::new();
/// graph.add_dependency("loot-buttons", "core-ui", "^1.0.0");
/// graph.add_dependency("core-ui", "storage", "*");
///
/// let order = graph
///     .resolve_dependency_order(["loot-buttons", "core-ui", "storage"])
///     .unwrap();
/// assert_eq!(order, vec!["storage", "core-ui", "loot-buttons"]);
/// ```
#[derive(Debug, Clone)]
pub struct DependencyGraph {
    /// The underlying directed graph; stable indices survive node removal
    graph: StableDiGraph<String, String>,
    /// Maps module ids to their node indices for O(1) lookup
    node_indices: HashMap<String, NodeIndex>,
}

impl Default for DependencyGraph {
    fn default() -> Self {
        Self::new()
    }
}

impl DependencyGraph {
    /// Creates a new empty dependency graph.
    pub fn new() -> Self {
        Self {
            graph: StableDiGraph::new(),
            node_indices: HashMap::new(),
        }
    }

    /// Creates a new graph with pre-allocated capacity.
    pub fn with_capacity(nodes: usize, edges: usize) -> Self {
        Self {
            graph: StableDiGraph::with_capacity(nodes, edges),
            node_indices: HashMap::with_capacity(nodes),
        }
    }

    /// Builds a graph from `(dependent, dependency, constraint)` triples.
    pub fn from_edges<I, S>(edges: I) -> Self
    where
        I: IntoIterator<Item = (S, S, S)>,
        S: AsRef<str>,
    {
        let mut graph = Self::new();
        for (dependent, dependency, constraint) in edges {
            graph.add_dependency(dependent.as_ref(), dependency.as_ref(), constraint.as_ref());
        }
        graph
    }

    /// Adds a module with no edges, returning its node index.
    ///
    /// If the module already exists its existing index is returned. Modules
    /// without dependencies must be added this way to take part in ordering
    /// queries that walk the whole graph.
    pub fn add_module(&mut self, id: &str) -> NodeIndex {
        if let Some(&idx) = self.node_indices.get(id) {
            return idx;
        }

        let idx = self.graph.add_node(id.to_string());
        self.node_indices.insert(id.to_string(), idx);
        idx
    }

    /// Records that `dependent` requires `dependency` at `constraint`.
    ///
    /// Both modules are added if missing. A second declaration for the same
    /// pair replaces the earlier constraint rather than adding a parallel edge.
    ///
    /// # Example
    ///
    /// ```rust
    /// use modgraph::graph::DependencyGraph;
    ///
    /// let mut graph = DependencyGraph::new();
    /// graph.add_dependency("sidebar", "core-ui", "^1.0.0");
    /// graph.add_dependency("sidebar", "core-ui", "^2.0.0");
    ///
    /// assert_eq!(graph.edge_count(), 1);
    /// assert_eq!(graph.constraint("sidebar", "core-ui"), Some("^2.0.0"));
    /// ```
    pub fn add_dependency(&mut self, dependent: &str, dependency: &str, constraint: &str) {
        let from = self.add_module(dependent);
        let to = self.add_module(dependency);

        match self.graph.find_edge(from, to) {
            Some(edge) => {
                if let Some(weight) = self.graph.edge_weight_mut(edge) {
                    *weight = constraint.to_string();
                }
            }
            None => {
                self.graph.add_edge(from, to, constraint.to_string());
            }
        }
    }

    /// Records an unconstrained dependency (`*`).
    pub fn add_dependency_any(&mut self, dependent: &str, dependency: &str) {
        self.add_dependency(dependent, dependency, ANY_VERSION);
    }

    /// Removes a module together with every edge that mentions it.
    ///
    /// Returns `false` if the module was not in the graph.
    pub fn remove_module(&mut self, id: &str) -> bool {
        match self.node_indices.remove(id) {
            Some(idx) => {
                self.graph.remove_node(idx);
                true
            }
            None => false,
        }
    }

    /// Removes every module and edge.
    pub fn clear(&mut self) {
        self.graph.clear();
        self.node_indices.clear();
    }

    /// Returns the constraint `dependent` declared on `dependency`, if any.
    pub fn constraint(&self, dependent: &str, dependency: &str) -> Option<&str> {
        let from = *self.node_indices.get(dependent)?;
        let to = *self.node_indices.get(dependency)?;
        self.graph
            .find_edge(from, to)
            .and_then(|edge| self.graph.edge_weight(edge))
            .map(String::as_str)
    }

    /// Gets the direct dependencies of a module with their constraints.
    ///
    /// # Example
    ///
    /// ```rust
    /// use modgraph::graph::DependencyGraph;
    ///
    /// let mut graph = DependencyGraph::new();
    /// graph.add_dependency("pet-calc", "stats", ">=2.0.0");
    ///
    /// assert_eq!(graph.get_dependencies("pet-calc"), vec![("stats", ">=2.0.0")]);
    /// assert!(graph.get_dependencies("stats").is_empty());
    /// ```
    pub fn get_dependencies(&self, id: &str) -> Vec<(&str, &str)> {
        let Some(&idx) = self.node_indices.get(id) else {
            return Vec::new();
        };

        self.graph
            .edges_directed(idx, Direction::Outgoing)
            .map(|edge| (self.graph[edge.target()].as_str(), edge.weight().as_str()))
            .collect()
    }

    /// Gets the modules that directly depend on `id`.
    pub fn get_dependents(&self, id: &str) -> HashSet<String> {
        let Some(&idx) = self.node_indices.get(id) else {
            return HashSet::new();
        };

        self.graph
            .neighbors_directed(idx, Direction::Incoming)
            .map(|n| self.graph[n].clone())
            .collect()
    }

    /// Gets every module `id` depends on, directly or transitively.
    ///
    /// Safe on cyclic graphs; if `id` sits on a cycle it appears in its own
    /// result.
    pub fn get_all_dependencies(&self, id: &str) -> HashSet<String> {
        self.closure(id, Direction::Outgoing)
    }

    /// Gets every module that depends on `id`, directly or transitively.
    pub fn get_all_dependents(&self, id: &str) -> HashSet<String> {
        self.closure(id, Direction::Incoming)
    }

    fn closure(&self, id: &str, direction: Direction) -> HashSet<String> {
        let Some(&start) = self.node_indices.get(id) else {
            return HashSet::new();
        };

        let mut visited = HashSet::new();
        let mut stack = vec![start];
        while let Some(node) = stack.pop() {
            for next in self.graph.neighbors_directed(node, direction) {
                if visited.insert(next) {
                    stack.push(next);
                }
            }
        }

        visited
            .into_iter()
            .map(|idx| self.graph[idx].clone())
            .collect()
    }

    /// Checks whether any module depends on itself, directly or through
    /// other modules.
    ///
    /// # Example
    ///
    /// ```rust
    /// use modgraph::graph::DependencyGraph;
    ///
    /// let mut graph = DependencyGraph::new();
    /// graph.add_dependency_any("a", "b");
    /// assert!(!graph.has_circular_dependencies());
    ///
    /// graph.add_dependency_any("b", "a");
    /// assert!(graph.has_circular_dependencies());
    /// ```
    pub fn has_circular_dependencies(&self) -> bool {
        self.find_cycle().is_some()
    }

    /// Depth-first search for a back edge.
    ///
    /// `visiting` holds the nodes on the current path, `visited` the nodes
    /// whose subtrees are fully explored. Reaching a node that is still
    /// `visiting` closes a cycle, which is returned as the path from that
    /// node to the current one.
    fn find_cycle(&self) -> Option<Vec<String>> {
        let mut visited: HashSet<NodeIndex> = HashSet::new();
        let mut visiting: HashSet<NodeIndex> = HashSet::new();

        for start in self.graph.node_indices() {
            if visited.contains(&start) {
                continue;
            }

            visiting.insert(start);
            let mut stack = vec![(start, self.graph.neighbors_directed(start, Direction::Outgoing))];

            loop {
                let next = match stack.last_mut() {
                    Some((_, neighbors)) => neighbors.next(),
                    None => break,
                };

                match next {
                    Some(next) if visiting.contains(&next) => {
                        let from = stack.iter().position(|(n, _)| *n == next).unwrap_or(0);
                        return Some(
                            stack[from..]
                                .iter()
                                .map(|(n, _)| self.graph[*n].clone())
                                .collect(),
                        );
                    }
                    Some(next) => {
                        if !visited.contains(&next) {
                            visiting.insert(next);
                            stack.push((next, self.graph.neighbors_directed(next, Direction::Outgoing)));
                        }
                    }
                    None => {
                        if let Some((done, _)) = stack.pop() {
                            visiting.remove(&done);
                            visited.insert(done);
                        }
                    }
                }
            }
        }

        None
    }

    /// Detects and returns all cycles in the graph.
    ///
    /// Each strongly connected component with more than one module, or a
    /// single module that depends on itself, is reported once.
    pub fn cycles(&self) -> Vec<CycleInfo> {
        tarjan_scc(&self.graph)
            .into_iter()
            .filter(|scc| match scc.as_slice() {
                [single] => self.graph.find_edge(*single, *single).is_some(),
                nodes => nodes.len() > 1,
            })
            .map(|scc| CycleInfo {
                nodes: scc.iter().map(|&idx| self.graph[idx].clone()).collect(),
            })
            .collect()
    }

    /// Returns the set of module ids that take part in any cycle.
    pub fn get_nodes_in_cycles(&self) -> HashSet<String> {
        self.cycles()
            .into_iter()
            .flat_map(|cycle| cycle.nodes)
            .collect()
    }

    /// Computes a load order for `module_ids`.
    ///
    /// Every dependency precedes its dependents. The traversal covers the
    /// whole graph, because requested modules may be linked through modules
    /// outside the request, and the result is then narrowed to the requested
    /// ids. Requested ids that the graph has never seen carry no constraints
    /// and are appended in the order given. Duplicates are ignored.
    ///
    /// # Errors
    ///
    /// Returns [`ResolveError::CircularDependency`] if the graph contains any
    /// cycle. No partial order is produced.
    pub fn resolve_dependency_order<I, S>(&self, module_ids: I) -> ResolveResult<Vec<String>>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        if let Some(nodes) = self.find_cycle() {
            let cycle = CycleInfo { nodes };
            debug!("Refusing to resolve load order: {}", cycle.cycle_path());
            return Err(ResolveError::CircularDependency { cycle });
        }

        let mut requested: Vec<String> = Vec::new();
        let mut seen: HashSet<String> = HashSet::new();
        for id in module_ids {
            let id = id.as_ref();
            if seen.insert(id.to_string()) {
                requested.push(id.to_string());
            }
        }

        let mut order: Vec<String> = self
            .global_order()
            .into_iter()
            .filter(|idx| seen.contains(&self.graph[*idx]))
            .map(|idx| self.graph[idx].clone())
            .collect();

        order.extend(
            requested
                .into_iter()
                .filter(|id| !self.node_indices.contains_key(id)),
        );

        debug!("Resolved load order: {:?}", order);
        Ok(order)
    }

    /// Post-order DFS over every node, roots visited in insertion order.
    ///
    /// Outgoing edges lead to dependencies, so a module is emitted only after
    /// everything it requires. Assumes the graph is acyclic.
    fn global_order(&self) -> Vec<NodeIndex> {
        let mut dfs = DfsPostOrder::empty(&self.graph);
        let mut order = Vec::with_capacity(self.graph.node_count());

        for start in self.graph.node_indices() {
            if dfs.discovered.is_visited(&start) {
                continue;
            }
            dfs.move_to(start);
            while let Some(node) = dfs.next(&self.graph) {
                order.push(node);
            }
        }

        order
    }

    /// Serializes the forward edges as `module -> {dependency -> constraint}`.
    ///
    /// Every module appears as a key, including those with no dependencies.
    pub fn export_graph(&self) -> BTreeMap<String, BTreeMap<String, String>> {
        self.graph
            .node_indices()
            .map(|idx| {
                let edges = self
                    .graph
                    .edges_directed(idx, Direction::Outgoing)
                    .map(|edge| (self.graph[edge.target()].clone(), edge.weight().clone()))
                    .collect();
                (self.graph[idx].clone(), edges)
            })
            .collect()
    }

    /// Iterates module ids in insertion order.
    pub fn modules(&self) -> impl Iterator<Item = &str> + '_ {
        self.graph.node_indices().map(move |idx| self.graph[idx].as_str())
    }

    /// Returns the number of modules in the graph.
    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    /// Returns the number of dependency edges in the graph.
    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Checks if the graph is empty.
    pub fn is_empty(&self) -> bool {
        self.graph.node_count() == 0
    }

    /// Checks if a module exists in the graph.
    pub fn contains(&self, id: &str) -> bool {
        self.node_indices.contains_key(id)
    }
}

/// Information about a detected circular dependency.
///
/// Contains the module ids that form the cycle.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct CycleInfo {
    /// The module ids in the cycle (the last depends back on the first)
    pub nodes: Vec<String>,
}

impl CycleInfo {
    /// Returns a formatted string representation of the cycle path.
    ///
    /// For example: "a -> b -> c -> a"
    pub fn cycle_path(&self) -> String {
        match self.nodes.first() {
            Some(first) => format!("{} -> {}", self.nodes.join(" -> "), first),
            None => String::new(),
        }
    }

    /// Returns the number of modules in the cycle.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Returns true if the cycle is empty (should not happen in practice).
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Returns true if `id` takes part in this cycle.
    pub fn contains(&self, id: &str) -> bool {
        self.nodes.iter().any(|n| n == id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn position(order: &[String], id: &str) -> usize {
        order
            .iter()
            .position(|m| m == id)
            .unwrap_or_else(|| panic!("{} missing from {:?}", id, order))
    }

    #[test]
    fn test_create_empty_graph() {
        let graph = DependencyGraph::new();
        assert_eq!(graph.node_count(), 0);
        assert_eq!(graph.edge_count(), 0);
        assert!(graph.is_empty());
        assert!(!graph.has_circular_dependencies());
    }

    #[test]
    fn test_add_module_is_idempotent() {
        let mut graph = DependencyGraph::new();
        let idx = graph.add_module("storage");
        let idx2 = graph.add_module("storage");
        assert_eq!(idx, idx2);
        assert_eq!(graph.node_count(), 1);
        assert!(graph.contains("storage"));
    }

    #[test]
    fn test_add_dependency_creates_both_directions() {
        let mut graph = DependencyGraph::new();
        graph.add_dependency("sidebar", "core-ui", "^1.0.0");

        assert_eq!(graph.node_count(), 2);
        assert_eq!(graph.get_dependencies("sidebar"), vec![("core-ui", "^1.0.0")]);
        assert!(graph.get_dependents("core-ui").contains("sidebar"));
        assert!(graph.get_dependents("sidebar").is_empty());
    }

    #[test]
    fn test_add_dependency_overwrites_constraint() {
        let mut graph = DependencyGraph::new();
        graph.add_dependency("a", "b", "^1.0.0");
        graph.add_dependency("a", "b", "~1.4.0");

        assert_eq!(graph.edge_count(), 1);
        assert_eq!(graph.constraint("a", "b"), Some("~1.4.0"));
        assert_eq!(graph.get_dependents("b").len(), 1);
    }

    #[test]
    fn test_add_dependency_any_uses_wildcard() {
        let mut graph = DependencyGraph::new();
        graph.add_dependency_any("a", "b");
        assert_eq!(graph.constraint("a", "b"), Some(ANY_VERSION));
    }

    #[test]
    fn test_remove_module_as_dependent_and_dependency() {
        let mut graph = DependencyGraph::new();
        graph.add_dependency_any("a", "b");
        graph.add_dependency_any("b", "c");
        graph.add_dependency_any("d", "b");

        assert!(graph.remove_module("b"));
        assert!(!graph.remove_module("b"));

        let exported = graph.export_graph();
        assert!(!exported.contains_key("b"));
        for deps in exported.values() {
            assert!(!deps.contains_key("b"));
        }
        assert!(graph.get_dependents("c").is_empty());
        assert!(graph.get_dependencies("a").is_empty());
        assert_eq!(graph.edge_count(), 0);
    }

    #[test]
    fn test_clear() {
        let mut graph = DependencyGraph::new();
        graph.add_dependency_any("a", "b");
        graph.clear();
        assert!(graph.is_empty());
        assert!(!graph.contains("a"));
        assert!(graph.export_graph().is_empty());
    }

    #[test]
    fn test_self_loop_is_a_cycle() {
        let mut graph = DependencyGraph::new();
        graph.add_dependency_any("a", "a");
        assert!(graph.has_circular_dependencies());

        let cycles = graph.cycles();
        assert_eq!(cycles.len(), 1);
        assert_eq!(cycles[0].cycle_path(), "a -> a");
    }

    #[test]
    fn test_long_cycle_detected() {
        let mut graph = DependencyGraph::new();
        graph.add_dependency_any("a", "b");
        graph.add_dependency_any("b", "c");
        graph.add_dependency_any("c", "d");
        assert!(!graph.has_circular_dependencies());

        graph.add_dependency_any("d", "a");
        assert!(graph.has_circular_dependencies());

        let in_cycles = graph.get_nodes_in_cycles();
        assert_eq!(in_cycles.len(), 4);
    }

    #[test]
    fn test_diamond_is_not_a_cycle() {
        let mut graph = DependencyGraph::new();
        graph.add_dependency_any("app", "left");
        graph.add_dependency_any("app", "right");
        graph.add_dependency_any("left", "base");
        graph.add_dependency_any("right", "base");

        assert!(!graph.has_circular_dependencies());
        assert!(graph.cycles().is_empty());
    }

    #[test]
    fn test_cycles_excludes_modules_hanging_off_a_cycle() {
        let mut graph = DependencyGraph::new();
        graph.add_dependency_any("a", "b");
        graph.add_dependency_any("b", "a");
        graph.add_dependency_any("a", "d");

        let nodes = graph.get_nodes_in_cycles();
        assert!(nodes.contains("a"));
        assert!(nodes.contains("b"));
        assert!(!nodes.contains("d"));
    }

    #[test]
    fn test_resolve_chain() {
        let mut graph = DependencyGraph::new();
        graph.add_dependency("A", "B", "^1.0.0");
        graph.add_dependency_any("C", "A");

        let order = graph.resolve_dependency_order(["C", "A", "B"]).unwrap();
        assert_eq!(order, vec!["B", "A", "C"]);
    }

    #[test]
    fn test_resolve_filters_to_requested_subset() {
        let mut graph = DependencyGraph::new();
        graph.add_dependency_any("ui", "storage");
        graph.add_dependency_any("storage", "runtime");

        // runtime links the two but is not requested
        let order = graph.resolve_dependency_order(["ui", "runtime"]).unwrap();
        assert_eq!(order, vec!["runtime", "ui"]);
    }

    #[test]
    fn test_resolve_appends_unknown_modules() {
        let mut graph = DependencyGraph::new();
        graph.add_dependency_any("a", "b");

        let order = graph
            .resolve_dependency_order(["standalone", "a", "b", "a"])
            .unwrap();
        assert_eq!(order, vec!["b", "a", "standalone"]);
    }

    #[test]
    fn test_resolve_rejects_cycles() {
        let mut graph = DependencyGraph::new();
        graph.add_dependency_any("A", "B");
        graph.add_dependency_any("B", "A");

        let err = graph.resolve_dependency_order(["A", "B"]).unwrap_err();
        let ResolveError::CircularDependency { cycle } = &err;
        assert!(cycle.contains("A"));
        assert!(cycle.contains("B"));
        assert!(err.to_string().starts_with("Circular dependency detected"));

        // graph untouched by the failed call
        assert_eq!(graph.edge_count(), 2);
    }

    #[test]
    fn test_resolve_is_repeatable() {
        let mut graph = DependencyGraph::new();
        graph.add_dependency_any("x", "y");
        graph.add_dependency_any("z", "y");
        graph.add_module("w");

        let first = graph.resolve_dependency_order(["x", "y", "z", "w"]).unwrap();
        let second = graph.resolve_dependency_order(["x", "y", "z", "w"]).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_get_all_dependencies() {
        let mut graph = DependencyGraph::new();
        graph.add_dependency_any("app", "ui");
        graph.add_dependency_any("ui", "storage");
        graph.add_dependency_any("ui", "events");
        graph.add_dependency_any("storage", "events");

        let deps = graph.get_all_dependencies("app");
        assert_eq!(deps.len(), 3);
        assert!(deps.contains("ui"));
        assert!(deps.contains("storage"));
        assert!(deps.contains("events"));
        assert!(graph.get_all_dependencies("events").is_empty());
        assert!(graph.get_all_dependencies("missing").is_empty());
    }

    #[test]
    fn test_get_all_dependencies_on_cycle_terminates() {
        let mut graph = DependencyGraph::new();
        graph.add_dependency_any("a", "b");
        graph.add_dependency_any("b", "a");

        let deps = graph.get_all_dependencies("a");
        assert_eq!(deps.len(), 2);
        assert!(deps.contains("a"));
    }

    #[test]
    fn test_get_all_dependents() {
        let mut graph = DependencyGraph::new();
        graph.add_dependency_any("app", "ui");
        graph.add_dependency_any("ui", "storage");
        graph.add_dependency_any("tools", "storage");

        let dependents = graph.get_all_dependents("storage");
        assert_eq!(dependents.len(), 3);
        assert!(dependents.contains("app"));
        assert!(graph.get_all_dependents("app").is_empty());
    }

    #[test]
    fn test_export_graph() {
        let mut graph = DependencyGraph::new();
        graph.add_dependency("a", "b", "^1.0.0");
        graph.add_dependency("a", "c", ">=2.0.0");

        let exported = graph.export_graph();
        assert_eq!(exported.len(), 3);
        assert_eq!(exported["a"]["b"], "^1.0.0");
        assert_eq!(exported["a"]["c"], ">=2.0.0");
        assert!(exported["b"].is_empty());
    }

    #[test]
    fn test_from_edges() {
        let graph = DependencyGraph::from_edges([("a", "b", "*"), ("b", "c", "^1.0.0")]);
        assert_eq!(graph.node_count(), 3);
        assert_eq!(graph.edge_count(), 2);
    }

    #[test]
    fn test_modules_in_insertion_order() {
        let mut graph = DependencyGraph::new();
        graph.add_module("first");
        graph.add_dependency_any("second", "third");
        let ids: Vec<&str> = graph.modules().collect();
        assert_eq!(ids, vec!["first", "second", "third"]);
    }

    #[test]
    fn test_cycle_info_path() {
        let cycle = CycleInfo {
            nodes: vec!["a".into(), "b".into(), "c".into()],
        };
        assert_eq!(cycle.cycle_path(), "a -> b -> c -> a");
        assert_eq!(cycle.len(), 3);
        assert!(CycleInfo { nodes: vec![] }.cycle_path().is_empty());
    }

    proptest! {
        // Edges only point from a higher index to a lower one, so every
        // generated graph is acyclic.
        #[test]
        fn prop_resolved_order_respects_edges(
            edges in proptest::collection::vec((1usize..24, 0usize..24), 0..60),
            requested in proptest::collection::hash_set(0usize..24, 0..24),
        ) {
            let mut graph = DependencyGraph::new();
            let mut declared = Vec::new();
            for (from, to) in edges {
                if to < from {
                    let (a, b) = (format!("m{}", from), format!("m{}", to));
                    graph.add_dependency_any(&a, &b);
                    declared.push((a, b));
                }
            }

            let requested: Vec<String> = requested.into_iter().map(|i| format!("m{}", i)).collect();
            let order = graph.resolve_dependency_order(&requested).unwrap();

            prop_assert_eq!(order.len(), requested.len());
            for id in &requested {
                prop_assert!(order.contains(id));
            }
            for (dependent, dependency) in &declared {
                if order.contains(dependent) && order.contains(dependency) {
                    prop_assert!(position(&order, dependency) < position(&order, dependent));
                }
            }
        }

        #[test]
        fn prop_back_edge_creates_cycle(len in 1usize..12) {
            let mut graph = DependencyGraph::new();
            for i in 1..len {
                graph.add_dependency_any(&format!("m{}", i), &format!("m{}", i - 1));
            }
            prop_assert!(!graph.has_circular_dependencies());

            graph.add_dependency_any("m0", &format!("m{}", len - 1));
            prop_assert!(graph.has_circular_dependencies());
            prop_assert!(graph.resolve_dependency_order(["m0"]).is_err());
        }
    }
}
