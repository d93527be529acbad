//! Relationship graph: assembly from snapshots, name resolution and bounded BFS extraction.
//!
//! Nodes are people and parties; an undirected edge joins two nodes that share a
//! case or a decision. A built [`Graph`] is never mutated, so one instance can be
//! shared across concurrent queries while each query keeps its own traversal state.

mod builder;
mod fuzzy;
mod resolve;
mod subgraph;
mod wire;

pub use builder::{build_graph, BuildStats, DEFAULT_PARTY_KIND, PERSON_KIND};
pub use fuzzy::{default_process, ratio, token_set_ratio};
pub use resolve::{NameResolver, Resolution};
pub use subgraph::SubgraphExtractor;
pub use wire::{GraphPayload, ProfileData, ProfileNode, WireEdge, PROFILE_NODE_TYPE};

use std::collections::HashMap;

/// Sequential node identifier, assigned during one build.
pub type NodeId = usize;

/// A person or party in the graph.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node {
    pub id: NodeId,
    /// `"person"` for individuals, the lower-cased party type otherwise.
    pub kind: String,
    pub name: String,
}

/// Undirected edge stored with `source < target`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Edge {
    pub source: NodeId,
    pub target: NodeId,
}

impl Edge {
    pub fn new(a: NodeId, b: NodeId) -> Self {
        let (source, target) = if a <= b { (a, b) } else { (b, a) };
        Self { source, target }
    }

    /// Deterministic id derived from the canonical endpoint pair.
    pub fn id(&self) -> String {
        format!("{}-{}", self.source, self.target)
    }

    pub fn key(&self) -> (NodeId, NodeId) {
        (self.source, self.target)
    }
}

/// Immutable relationship graph built from one snapshot.
#[derive(Debug, Clone)]
pub struct Graph {
    nodes: Vec<Node>,
    edges: Vec<Edge>,
    /// Neighbors per node, sorted by id so traversal tie-breaks are reproducible.
    adjacency: Vec<Vec<NodeId>>,
    first_by_name: HashMap<String, NodeId>,
    stats: BuildStats,
}

impl Graph {
    /// Assemble a graph from nodes whose ids equal their position and canonical edges.
    pub(crate) fn from_parts(nodes: Vec<Node>, edges: Vec<Edge>, stats: BuildStats) -> Self {
        let mut adjacency = vec![Vec::new(); nodes.len()];
        for edge in &edges {
            adjacency[edge.source].push(edge.target);
            adjacency[edge.target].push(edge.source);
        }
        for neighbors in &mut adjacency {
            neighbors.sort_unstable();
        }

        let mut first_by_name = HashMap::with_capacity(nodes.len());
        for node in &nodes {
            first_by_name.entry(node.name.clone()).or_insert(node.id);
        }

        Self {
            nodes,
            edges,
            adjacency,
            first_by_name,
            stats,
        }
    }

    /// Nodes in insertion order (individuals first, then parties).
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    /// Edges in discovery order.
    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id)
    }

    pub fn neighbors(&self, id: NodeId) -> &[NodeId] {
        self.adjacency.get(id).map(Vec::as_slice).unwrap_or(&[])
    }

    /// The first node in node order carrying exactly `name`.
    pub fn first_node_named(&self, name: &str) -> Option<NodeId> {
        self.first_by_name.get(name).copied()
    }

    /// Display names in node order; this is the fuzzy matching corpus.
    pub fn names(&self) -> Vec<&str> {
        self.nodes.iter().map(|n| n.name.as_str()).collect()
    }

    pub fn stats(&self) -> &BuildStats {
        &self.stats
    }

    /// Number of connected components, isolated nodes included.
    pub fn component_count(&self) -> usize {
        let mut seen = vec![false; self.nodes.len()];
        let mut components = 0;
        for start in 0..self.nodes.len() {
            if seen[start] {
                continue;
            }
            components += 1;
            seen[start] = true;
            let mut stack = vec![start];
            while let Some(current) = stack.pop() {
                for &next in &self.adjacency[current] {
                    if !seen[next] {
                        seen[next] = true;
                        stack.push(next);
                    }
                }
            }
        }
        components
    }

    pub fn to_payload(&self) -> GraphPayload {
        GraphPayload::from_parts(&self.nodes, &self.edges)
    }
}

/// Result of an extraction; same shape as the full graph.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Subgraph {
    pub nodes: Vec<Node>,
    pub edges: Vec<Edge>,
}

impl Subgraph {
    pub fn node_ids(&self) -> Vec<NodeId> {
        self.nodes.iter().map(|n| n.id).collect()
    }

    pub fn to_payload(&self) -> GraphPayload {
        GraphPayload::from_parts(&self.nodes, &self.edges)
    }
}
