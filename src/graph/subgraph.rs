//! Bounded BFS extraction: single source, multi-source union and connecting paths.

use std::collections::{BTreeSet, HashMap, HashSet, VecDeque};

use super::{Edge, Graph, NameResolver, Node, NodeId, Subgraph};
use crate::error::{ArbgraphError, Result};

/// Parent-pointer tree produced by one bounded BFS.
struct BfsTree {
    /// Discovery order, source first.
    order: Vec<NodeId>,
    depth: HashMap<NodeId, usize>,
    parent: HashMap<NodeId, NodeId>,
}

impl BfsTree {
    /// Edges from every discovered node back to its parent, in discovery order.
    fn tree_edges(&self) -> impl Iterator<Item = Edge> + '_ {
        self.order
            .iter()
            .skip(1)
            .filter_map(|node| self.parent.get(node).map(|&p| Edge::new(p, *node)))
    }

    /// Walk parent pointers from `target` back to the source.
    fn path_to(&self, target: NodeId) -> Option<Vec<NodeId>> {
        if !self.depth.contains_key(&target) {
            return None;
        }
        let mut path = vec![target];
        let mut current = target;
        while let Some(&parent) = self.parent.get(&current) {
            path.push(parent);
            current = parent;
        }
        path.reverse();
        Some(path)
    }
}

/// Query engine over one immutable graph and its resolver.
///
/// Every call allocates its own traversal state, so a single extractor (or many
/// extractors over the same graph) can serve concurrent queries.
#[derive(Clone, Copy)]
pub struct SubgraphExtractor<'a> {
    graph: &'a Graph,
    resolver: &'a NameResolver,
}

impl<'a> SubgraphExtractor<'a> {
    pub fn new(graph: &'a Graph, resolver: &'a NameResolver) -> Self {
        Self { graph, resolver }
    }

    /// Resolve a query name, then pick the first node in graph order carrying
    /// the matched display name.
    pub fn locate(&self, name: &str) -> Option<NodeId> {
        let resolution = self.resolver.resolve(name)?;
        self.graph.first_node_named(&resolution.name)
    }

    /// Everything within `k` hops of `name`, with only the BFS tree edges.
    ///
    /// Two returned nodes that are adjacent in the full graph but not linked
    /// through the tree do not get an edge. Nodes come back in graph order.
    pub fn extract(&self, name: &str, k: usize) -> Result<Subgraph> {
        let source = self
            .locate(name)
            .ok_or_else(|| ArbgraphError::NameNotFound(name.to_string()))?;
        Ok(self.tree_subgraph(source, k))
    }

    /// Union of [`extract`](Self::extract) over every name that resolves.
    ///
    /// Nodes and edges keep their first occurrence; unresolved names are skipped.
    pub fn extract_union(&self, names: &[String], k: usize) -> Result<Subgraph> {
        let mut result = Subgraph::default();
        let mut seen_nodes = HashSet::new();
        let mut seen_edges = HashSet::new();
        let mut resolved = 0;

        for name in names {
            let source = match self.locate(name) {
                Some(id) => id,
                None => {
                    log::warn!("union: no node found for '{}', skipping", name);
                    continue;
                }
            };
            resolved += 1;

            let part = self.tree_subgraph(source, k);
            for node in part.nodes {
                if seen_nodes.insert(node.id) {
                    result.nodes.push(node);
                }
            }
            for edge in part.edges {
                if seen_edges.insert(edge.key()) {
                    result.edges.push(edge);
                }
            }
        }

        if resolved == 0 {
            return Err(ArbgraphError::NameNotFound(names.join(", ")));
        }
        Ok(result)
    }

    /// Shortest connecting paths (at most `k` hops) between every pair of targets.
    ///
    /// Never fails: with fewer than two distinct targets the result is just the
    /// targets that resolved. Pairs farther apart than `k` contribute nothing.
    pub fn extract_connecting(&self, names: &[String], k: usize) -> Subgraph {
        let mut targets: Vec<NodeId> = Vec::new();
        for name in names {
            match self.locate(name) {
                Some(id) if !targets.contains(&id) => targets.push(id),
                Some(_) => {}
                None => log::warn!("connect: no node found for '{}', skipping", name),
            }
        }

        let mut on_path: BTreeSet<NodeId> = targets.iter().copied().collect();
        let mut edges = Vec::new();

        if targets.len() < 2 {
            log::info!(
                "connect: {} distinct target(s) resolved, nothing to connect",
                targets.len()
            );
        } else {
            let mut seen_edges = HashSet::new();
            for (i, &from) in targets.iter().enumerate() {
                for &to in &targets[i + 1..] {
                    let path = match self.shortest_path(from, to, k) {
                        Some(path) => path,
                        None => continue,
                    };
                    for pair in path.windows(2) {
                        let edge = Edge::new(pair[0], pair[1]);
                        if seen_edges.insert(edge.key()) {
                            edges.push(edge);
                        }
                    }
                    on_path.extend(path);
                }
            }
        }

        Subgraph {
            nodes: self.collect_nodes(on_path),
            edges,
        }
    }

    fn tree_subgraph(&self, source: NodeId, k: usize) -> Subgraph {
        let tree = self.bounded_bfs(source, k, None);
        let edges = tree.tree_edges().collect();
        let ids: BTreeSet<NodeId> = tree.order.into_iter().collect();
        Subgraph {
            nodes: self.collect_nodes(ids),
            edges,
        }
    }

    /// One shortest path from `from` to `to` of at most `k` hops.
    fn shortest_path(&self, from: NodeId, to: NodeId, k: usize) -> Option<Vec<NodeId>> {
        self.bounded_bfs(from, k, Some(to)).path_to(to)
    }

    /// BFS from `source` that never expands past depth `k`. Neighbors are
    /// visited in ascending id order, so the first discoverer becomes the parent.
    fn bounded_bfs(&self, source: NodeId, k: usize, stop_at: Option<NodeId>) -> BfsTree {
        let mut tree = BfsTree {
            order: vec![source],
            depth: HashMap::from([(source, 0)]),
            parent: HashMap::new(),
        };
        if stop_at == Some(source) {
            return tree;
        }

        let mut queue = VecDeque::from([(source, 0usize)]);
        while let Some((current, depth)) = queue.pop_front() {
            if depth >= k {
                continue;
            }
            for &neighbor in self.graph.neighbors(current) {
                if tree.depth.contains_key(&neighbor) {
                    continue;
                }
                tree.depth.insert(neighbor, depth + 1);
                tree.parent.insert(neighbor, current);
                tree.order.push(neighbor);
                if stop_at == Some(neighbor) {
                    return tree;
                }
                queue.push_back((neighbor, depth + 1));
            }
        }
        tree
    }

    fn collect_nodes(&self, ids: impl IntoIterator<Item = NodeId>) -> Vec<Node> {
        ids.into_iter()
            .filter_map(|id| self.graph.node(id).cloned())
            .collect()
    }
}
