//! Interaction graph data model.
//!
//! - [`InteractionGraph`] — petgraph wrapper with ID ↔ NodeIndex mapping
//! - [`EdgeInsert`] — outcome of inserting one edge-list record
//!
//! Node identifiers are opaque strings (no case folding, no trimming beyond
//! what the loader does). The graph is undirected and unweighted; duplicate
//! edges collapse and self-loops are not stored.

use petgraph::graph::{NodeIndex, UnGraph};
use std::collections::HashMap;

/// What happened when an edge record was inserted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EdgeInsert {
    /// A new undirected edge was stored.
    Added,
    /// The edge already existed (in either direction).
    Duplicate,
    /// Both endpoints were the same node; the node is registered, the loop is not.
    SelfLoop,
}

// ============================================================================
// InteractionGraph — petgraph wrapper with ID mapping
// ============================================================================

/// Wrapper around `petgraph::UnGraph` with an ID → NodeIndex map.
///
/// Node indices are assigned in order of first appearance, so
/// [`nodes`](Self::nodes) iterates in edge-list order. Once built, the graph
/// is only ever borrowed immutably by the propagation engines.
#[derive(Debug, Clone)]
pub struct InteractionGraph {
    /// The underlying undirected graph (node weight = identifier)
    pub graph: UnGraph<String, ()>,
    /// Mapping from node ID to petgraph NodeIndex
    pub id_to_index: HashMap<String, NodeIndex>,
}

impl InteractionGraph {
    /// Create a new empty graph.
    pub fn new() -> Self {
        Self {
            graph: UnGraph::new_undirected(),
            id_to_index: HashMap::new(),
        }
    }

    /// Create a graph with pre-allocated capacity.
    pub fn with_capacity(nodes: usize, edges: usize) -> Self {
        Self {
            graph: UnGraph::with_capacity(nodes, edges),
            id_to_index: HashMap::with_capacity(nodes),
        }
    }

    /// Build a graph from `(a, b)` identifier pairs.
    pub fn from_edges<I, S>(edges: I) -> Self
    where
        I: IntoIterator<Item = (S, S)>,
        S: AsRef<str>,
    {
        let mut g = Self::new();
        for (a, b) in edges {
            g.add_edge(a.as_ref(), b.as_ref());
        }
        g
    }

    /// Add a node. Returns the existing index if the ID is already present.
    pub fn add_node(&mut self, id: &str) -> NodeIndex {
        if let Some(&idx) = self.id_to_index.get(id) {
            return idx;
        }
        let idx = self.graph.add_node(id.to_string());
        self.id_to_index.insert(id.to_string(), idx);
        idx
    }

    /// Add an undirected edge, registering both endpoints.
    pub fn add_edge(&mut self, a: &str, b: &str) -> EdgeInsert {
        let ia = self.add_node(a);
        let ib = self.add_node(b);
        if ia == ib {
            return EdgeInsert::SelfLoop;
        }
        if self.graph.find_edge(ia, ib).is_some() {
            return EdgeInsert::Duplicate;
        }
        self.graph.add_edge(ia, ib, ());
        EdgeInsert::Added
    }

    /// Get the NodeIndex for a given ID.
    pub fn get_index(&self, id: &str) -> Option<NodeIndex> {
        self.id_to_index.get(id).copied()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.id_to_index.contains_key(id)
    }

    /// Identifier stored at `idx`.
    pub fn node_id(&self, idx: NodeIndex) -> &str {
        &self.graph[idx]
    }

    /// All node IDs in insertion order.
    pub fn nodes(&self) -> impl Iterator<Item = &str> + '_ {
        self.graph.node_indices().map(move |idx| self.graph[idx].as_str())
    }

    /// Neighbor IDs of `id`. Unknown nodes have no neighbors.
    pub fn neighbors(&self, id: &str) -> Vec<&str> {
        match self.get_index(id) {
            Some(idx) => self
                .graph
                .neighbors(idx)
                .map(|n| self.graph[n].as_str())
                .collect(),
            None => Vec::new(),
        }
    }

    /// Neighbor indices of `idx`.
    pub fn neighbor_indices(&self, idx: NodeIndex) -> impl Iterator<Item = NodeIndex> + '_ {
        self.graph.neighbors(idx)
    }

    /// Number of distinct neighbors of `id` (0 for unknown nodes).
    pub fn degree(&self, id: &str) -> usize {
        self.get_index(id)
            .map(|idx| self.graph.neighbors(idx).count())
            .unwrap_or(0)
    }

    /// Degrees of every node, indexed by `NodeIndex::index()`.
    pub fn degrees(&self) -> Vec<usize> {
        self.graph
            .node_indices()
            .map(|idx| self.graph.neighbors(idx).count())
            .collect()
    }

    /// Number of nodes in the graph.
    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    /// Number of (deduplicated) edges in the graph.
    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }
}

impl Default for InteractionGraph {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Tests
// ============================================================================
