//! Graph assembly from the four snapshot collections.

use std::collections::{HashMap, HashSet};

use super::{Edge, Graph, Node, NodeId};
use crate::snapshot::Snapshot;

/// Kind assigned to every individual.
pub const PERSON_KIND: &str = "person";
/// Kind for parties whose type is absent.
pub const DEFAULT_PARTY_KIND: &str = "party";

/// Counters gathered while building; dangling references are tolerated, only counted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BuildStats {
    pub nodes: usize,
    pub edges: usize,
    /// Ids referenced by a case or decision that have no record, plus decisions
    /// whose case is missing.
    pub dangling_refs: usize,
    /// Pairs rejected because both ends are the same node (an id listed twice).
    pub self_pairs: usize,
}

/// Deduplicating edge list keyed by the canonical endpoint pair.
#[derive(Default)]
struct EdgeSet {
    seen: HashSet<(NodeId, NodeId)>,
    edges: Vec<Edge>,
    self_pairs: usize,
}

impl EdgeSet {
    fn add(&mut self, a: NodeId, b: NodeId) {
        if a == b {
            self.self_pairs += 1;
            return;
        }
        let edge = Edge::new(a, b);
        if self.seen.insert(edge.key()) {
            self.edges.push(edge);
        }
    }
}

/// Map source ids to node ids, dropping ids with no record.
fn resolve_ids(nodes: &HashMap<&str, NodeId>, ids: &[String]) -> Vec<NodeId> {
    ids.iter().filter_map(|id| nodes.get(id.as_str()).copied()).collect()
}

/// Build the relationship graph for one snapshot.
///
/// Node ids are handed out sequentially: individuals first, then parties, each
/// in source order. Edges come from three rules, applied in this order:
/// parties sharing a case, individuals sharing a decision, and every individual
/// on a decision paired with every party on that decision's case.
pub fn build_graph(snapshot: &Snapshot) -> Graph {
    let mut nodes = Vec::with_capacity(snapshot.individuals.len() + snapshot.parties.len());
    let mut individual_nodes: HashMap<&str, NodeId> = HashMap::new();
    let mut party_nodes: HashMap<&str, NodeId> = HashMap::new();

    for (id, individual) in snapshot.individuals.iter() {
        let node_id = nodes.len();
        individual_nodes.insert(id, node_id);
        nodes.push(Node {
            id: node_id,
            kind: PERSON_KIND.to_string(),
            name: individual.name.clone(),
        });
    }

    for (id, party) in snapshot.parties.iter() {
        let node_id = nodes.len();
        party_nodes.insert(id, node_id);
        nodes.push(Node {
            id: node_id,
            kind: party
                .party_type
                .as_deref()
                .map(str::to_lowercase)
                .unwrap_or_else(|| DEFAULT_PARTY_KIND.to_string()),
            name: party.name.clone(),
        });
    }

    let mut dangling_refs = 0;
    let mut edge_set = EdgeSet::default();

    // Party <-> Party via Case
    for case in snapshot.cases.values() {
        let parties = resolve_ids(&party_nodes, &case.party_ids);
        dangling_refs += case.party_ids.len() - parties.len();
        for (i, &a) in parties.iter().enumerate() {
            for &b in &parties[i + 1..] {
                edge_set.add(a, b);
            }
        }
    }

    // Individual <-> Individual via Decision
    let mut decision_individuals = Vec::with_capacity(snapshot.decisions.len());
    for decision in snapshot.decisions.values() {
        let individuals = resolve_ids(&individual_nodes, &decision.individual_ids);
        dangling_refs += decision.individual_ids.len() - individuals.len();
        for (i, &a) in individuals.iter().enumerate() {
            for &b in &individuals[i + 1..] {
                edge_set.add(a, b);
            }
        }
        decision_individuals.push(individuals);
    }

    // Individual <-> Party via the decision's case
    for (decision, individuals) in snapshot.decisions.values().zip(&decision_individuals) {
        let case_id = match decision.case_id.as_deref() {
            Some(id) => id,
            None => continue,
        };
        let case = match snapshot.cases.get(case_id) {
            Some(case) => case,
            None => {
                dangling_refs += 1;
                continue;
            }
        };
        let parties = resolve_ids(&party_nodes, &case.party_ids);
        for &individual in individuals {
            for &party in &parties {
                edge_set.add(individual, party);
            }
        }
    }

    let stats = BuildStats {
        nodes: nodes.len(),
        edges: edge_set.edges.len(),
        dangling_refs,
        self_pairs: edge_set.self_pairs,
    };
    log::debug!(
        "Built graph: {} nodes, {} edges, {} dangling references, {} self pairs skipped",
        stats.nodes,
        stats.edges,
        stats.dangling_refs,
        stats.self_pairs
    );

    Graph::from_parts(nodes, edge_set.edges, stats)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures;

    fn edge_ids(graph: &Graph) -> Vec<String> {
        graph.edges().iter().map(Edge::id).collect()
    }

    #[test]
    fn test_example_graph_nodes_and_edges() {
        let graph = build_graph(&fixtures::arbitration_snapshot());
        assert_eq!(graph.nodes().len(), 5);
        assert_eq!(graph.edges().len(), 10);
        // A=0 B=1 C=2 P=3 Q=4, rules applied party-party, individual-individual, chain
        assert_eq!(
            edge_ids(&graph),
            vec!["3-4", "0-1", "0-2", "1-2", "0-3", "0-4", "1-3", "1-4", "2-3", "2-4"]
        );
    }

    #[test]
    fn test_node_order_and_kinds() {
        let graph = build_graph(&fixtures::arbitration_snapshot());
        let names: Vec<_> = graph.names();
        assert_eq!(
            names,
            vec![
                "Ada Park",
                "Bo Lin",
                "Cy Ortiz",
                "Pinnacle Mining Ltd",
                "Republic of Quorra",
            ]
        );
        assert!(graph.nodes()[..3].iter().all(|n| n.kind == PERSON_KIND));
        assert_eq!(graph.nodes()[3].kind, "company");
        assert_eq!(graph.nodes()[4].kind, "state");
        assert!(graph.nodes().iter().enumerate().all(|(i, n)| n.id == i));
    }

    #[test]
    fn test_missing_party_type_defaults() {
        let parties = r#"{"p1": {"name": "Anon"}}"#;
        let snapshot = Snapshot::from_json_strs("{}", "{}", "{}", parties).unwrap();
        let graph = build_graph(&snapshot);
        assert_eq!(graph.nodes()[0].kind, DEFAULT_PARTY_KIND);
    }

    #[test]
    fn test_duplicate_pairs_deduplicated_across_rules() {
        // Both cases list the same two parties, two decisions share the same two individuals.
        let cases = r#"{
            "c1": {"title": "One", "party_ids": ["p1", "p2"]},
            "c2": {"title": "Two", "party_ids": ["p2", "p1"]}
        }"#;
        let decisions = r#"{
            "d1": {"case_id": "c1", "individual_ids": ["i1", "i2"]},
            "d2": {"case_id": "c2", "individual_ids": ["i2", "i1"]}
        }"#;
        let individuals = r#"{"i1": {"name": "I One"}, "i2": {"name": "I Two"}}"#;
        let parties = r#"{"p1": {"name": "P One"}, "p2": {"name": "P Two"}}"#;
        let snapshot = Snapshot::from_json_strs(cases, decisions, individuals, parties).unwrap();
        let graph = build_graph(&snapshot);

        let mut keys: Vec<_> = graph.edges().iter().map(Edge::key).collect();
        let total = keys.len();
        keys.sort_unstable();
        keys.dedup();
        assert_eq!(keys.len(), total);
        // p1-p2, i1-i2, and the four individual-party pairs
        assert_eq!(total, 6);
    }

    #[test]
    fn test_dangling_case_keeps_individual_edges() {
        let decisions = r#"{"d1": {"case_id": "missing", "individual_ids": ["i1", "i2"]}}"#;
        let individuals = r#"{"i1": {"name": "I One"}, "i2": {"name": "I Two"}}"#;
        let parties = r#"{"p1": {"name": "P One"}}"#;
        let snapshot = Snapshot::from_json_strs("{}", decisions, individuals, parties).unwrap();
        let graph = build_graph(&snapshot);

        assert_eq!(edge_ids(&graph), vec!["0-1"]);
        assert_eq!(graph.stats().dangling_refs, 1);
    }

    #[test]
    fn test_dangling_ids_dropped() {
        let cases = r#"{"c1": {"title": "T", "party_ids": ["p1", "ghost"]}}"#;
        let decisions = r#"{"d1": {"case_id": "c1", "individual_ids": ["i1", "nobody"]}}"#;
        let individuals = r#"{"i1": {"name": "I One"}}"#;
        let parties = r#"{"p1": {"name": "P One"}}"#;
        let snapshot = Snapshot::from_json_strs(cases, decisions, individuals, parties).unwrap();
        let graph = build_graph(&snapshot);

        assert_eq!(edge_ids(&graph), vec!["0-1"]);
        assert_eq!(graph.stats().dangling_refs, 2);
    }

    #[test]
    fn test_repeated_id_produces_no_self_loop() {
        let decisions = r#"{"d1": {"individual_ids": ["i1", "i1"]}}"#;
        let individuals = r#"{"i1": {"name": "I One"}}"#;
        let snapshot = Snapshot::from_json_strs("{}", decisions, individuals, "{}").unwrap();
        let graph = build_graph(&snapshot);

        assert!(graph.edges().is_empty());
        assert_eq!(graph.stats().self_pairs, 1);
    }

    #[test]
    fn test_empty_snapshot() {
        let graph = build_graph(&Snapshot::default());
        assert!(graph.nodes().is_empty());
        assert!(graph.edges().is_empty());
    }
}
