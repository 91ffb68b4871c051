//! The class inheritance graph of a translation unit.
//!
//! Nodes are record definitions (or first declarations when no definition
//! is visible); an edge `derived -> base` exists for every base specifier
//! that resolves to a record.

use crate::ids::DeclId;
use petgraph::algo::has_path_connecting;
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::EdgeRef;
use petgraph::Direction;
use std::collections::HashMap;

/// Directed graph of base-specifier edges.
#[derive(Debug, Clone, Default)]
pub struct InheritanceGraph {
    graph: DiGraph<DeclId, BaseEdge>,
    nodes: HashMap<DeclId, NodeIndex>,
}

/// An edge of the inheritance graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BaseEdge {
    /// Index of the base specifier within the derived record's base clause.
    pub specifier: usize,
    /// Whether the base is virtual.
    pub is_virtual: bool,
}

impl InheritanceGraph {
    /// Creates an empty graph.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds (or returns) the node for a record.
    pub fn add_record(&mut self, record: DeclId) -> NodeIndex {
        if let Some(&idx) = self.nodes.get(&record) {
            return idx;
        }
        let idx = self.graph.add_node(record);
        self.nodes.insert(record, idx);
        idx
    }

    /// Records that `derived` names `base` in its base clause.
    pub fn add_base(&mut self, derived: DeclId, base: DeclId, edge: BaseEdge) {
        let from = self.add_record(derived);
        let to = self.add_record(base);
        self.graph.add_edge(from, to, edge);
    }

    /// Returns `true` if `base` is a direct or indirect base of `derived`.
    ///
    /// A class is not derived from itself.
    pub fn is_derived_from(&self, derived: DeclId, base: DeclId) -> bool {
        if derived == base {
            return false;
        }
        match (self.nodes.get(&derived), self.nodes.get(&base)) {
            (Some(&from), Some(&to)) => has_path_connecting(&self.graph, from, to, None),
            _ => false,
        }
    }

    /// Returns the direct bases of `record` in base-clause order.
    pub fn direct_bases(&self, record: DeclId) -> Vec<(DeclId, BaseEdge)> {
        let Some(&idx) = self.nodes.get(&record) else {
            return Vec::new();
        };
        let mut bases: Vec<(DeclId, BaseEdge)> = self
            .graph
            .edges_directed(idx, Direction::Outgoing)
            .map(|e| (self.graph[e.target()], *e.weight()))
            .collect();
        bases.sort_by_key(|(_, edge)| edge.specifier);
        bases
    }

    /// Returns the records that name `record` as a direct base.
    pub fn direct_derived(&self, record: DeclId) -> Vec<DeclId> {
        let Some(&idx) = self.nodes.get(&record) else {
            return Vec::new();
        };
        let mut derived: Vec<DeclId> = self
            .graph
            .neighbors_directed(idx, Direction::Incoming)
            .map(|n| self.graph[n])
            .collect();
        derived.sort();
        derived.dedup();
        derived
    }

    /// Number of records in the graph.
    pub fn record_count(&self) -> usize {
        self.graph.node_count()
    }

    /// Number of base edges in the graph.
    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }
}
