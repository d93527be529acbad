//! Display-name to node resolution: exact table first, token-set fuzzy fallback.

use std::collections::HashMap;

use super::fuzzy::token_set_ratio;
use super::{Graph, NodeId};

/// Outcome of resolving a query name.
#[derive(Debug, Clone, PartialEq)]
pub struct Resolution {
    /// The display name that matched (the query itself on an exact hit).
    pub name: String,
    /// Node recorded for `name` in the lookup table.
    pub node: NodeId,
    /// Similarity score, 100 for exact hits.
    pub score: f64,
    pub exact: bool,
}

/// Name lookup built once per graph.
///
/// The corpus is derived from the graph's own nodes, so it always matches the
/// snapshot the graph was built from.
#[derive(Debug, Clone)]
pub struct NameResolver {
    /// Last node seen wins when several nodes share a name.
    by_name: HashMap<String, NodeId>,
    /// Distinct names in first-seen node order; fuzzy ties go to the earliest.
    corpus: Vec<String>,
    fuzzy_cutoff: f64,
}

impl NameResolver {
    pub fn new(graph: &Graph, fuzzy_cutoff: f64) -> Self {
        let mut by_name = HashMap::with_capacity(graph.nodes().len());
        let mut corpus = Vec::with_capacity(graph.nodes().len());
        for node in graph.nodes() {
            if by_name.insert(node.name.clone(), node.id).is_none() {
                corpus.push(node.name.clone());
            }
        }
        Self {
            by_name,
            corpus,
            fuzzy_cutoff,
        }
    }

    pub fn resolve_exact(&self, name: &str) -> Option<NodeId> {
        self.by_name.get(name).copied()
    }

    /// Highest-scoring corpus name at or above the cutoff.
    pub fn best_match(&self, query: &str) -> Option<(&str, f64)> {
        let mut best: Option<(&str, f64)> = None;
        for candidate in &self.corpus {
            let score = token_set_ratio(query, candidate);
            if best.map_or(true, |(_, top)| score > top) {
                best = Some((candidate.as_str(), score));
            }
        }
        best.filter(|&(_, score)| score >= self.fuzzy_cutoff)
    }

    pub fn resolve_fuzzy(&self, name: &str) -> Option<NodeId> {
        self.best_match(name)
            .and_then(|(candidate, _)| self.resolve_exact(candidate))
    }

    /// Exact lookup, falling back to the single best fuzzy candidate.
    pub fn resolve(&self, name: &str) -> Option<Resolution> {
        if let Some(node) = self.resolve_exact(name) {
            return Some(Resolution {
                name: name.to_string(),
                node,
                score: 100.0,
                exact: true,
            });
        }

        let (candidate, score) = self.best_match(name)?;
        let node = self.resolve_exact(candidate)?;
        log::debug!("Resolved '{}' to '{}' (score {:.1})", name, candidate, score);
        Some(Resolution {
            name: candidate.to_string(),
            node,
            score,
            exact: false,
        })
    }

    /// The fuzzy corpus, one entry per distinct display name.
    pub fn corpus(&self) -> &[String] {
        &self.corpus
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures;
    use crate::graph::build_graph;
    use crate::snapshot::Snapshot;

    fn resolver(cutoff: f64) -> NameResolver {
        NameResolver::new(&build_graph(&fixtures::arbitration_snapshot()), cutoff)
    }

    #[test]
    fn test_exact_resolution() {
        let r = resolver(0.0);
        assert_eq!(r.resolve_exact("Bo Lin"), Some(1));
        let res = r.resolve("Pinnacle Mining Ltd").unwrap();
        assert!(res.exact);
        assert_eq!(res.node, 3);
        assert_eq!(res.score, 100.0);
    }

    #[test]
    fn test_fuzzy_fallback() {
        let r = resolver(0.0);
        assert_eq!(r.resolve_exact("quorra"), None);
        let res = r.resolve("quorra").unwrap();
        assert!(!res.exact);
        assert_eq!(res.name, "Republic of Quorra");
        assert_eq!(res.node, 4);
        assert_eq!(r.resolve_fuzzy("park, ada"), Some(0));
    }

    #[test]
    fn test_cutoff_rejects_weak_match() {
        let r = resolver(90.0);
        assert!(r.resolve("Zygmunt Xavier").is_none());
        assert!(r.resolve_fuzzy("Zygmunt Xavier").is_none());
    }

    #[test]
    fn test_empty_corpus_resolves_nothing() {
        let r = NameResolver::new(&build_graph(&Snapshot::default()), 0.0);
        assert!(r.resolve("anyone").is_none());
    }

    #[test]
    fn test_duplicate_names_last_write_wins() {
        let individuals = r#"{"x": {"name": "Sam Lee"}, "y": {"name": "Sam Lee"}}"#;
        let snapshot = Snapshot::from_json_strs("{}", "{}", individuals, "{}").unwrap();
        let r = NameResolver::new(&build_graph(&snapshot), 0.0);
        assert_eq!(r.resolve_exact("Sam Lee"), Some(1));
        assert_eq!(r.corpus(), &["Sam Lee".to_string()]);
    }

    #[test]
    fn test_fuzzy_tie_goes_to_earliest_name() {
        let individuals = r#"{"x": {"name": "Lee Alpha"}, "y": {"name": "Lee Beta"}}"#;
        let snapshot = Snapshot::from_json_strs("{}", "{}", individuals, "{}").unwrap();
        let r = NameResolver::new(&build_graph(&snapshot), 0.0);
        // "lee" is a subset of both names, both score 100
        assert_eq!(r.resolve("lee").unwrap().name, "Lee Alpha");
    }
}
