//! Owned graph context: the current snapshot, its graph and resolver, and the
//! build/refresh lifecycle around them.
//!
//! Queries take an `Arc` to the current [`LoadedGraph`] and run without holding
//! any lock, so a refresh swapping in a new graph never blocks or disturbs
//! queries already in flight.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, RwLock};

use chrono::{DateTime, Utc};

use crate::cache::{QueryKey, QueryMode, SubgraphCache};
use crate::config::QueryConfig;
use crate::error::{ArbgraphError, Result};
use crate::graph::{build_graph, Graph, NameResolver, Subgraph, SubgraphExtractor};
use crate::lookup::case_title_for_name;
use crate::snapshot::Snapshot;

/// One built snapshot; never mutated after construction.
pub struct LoadedGraph {
    pub snapshot: Snapshot,
    pub graph: Graph,
    pub resolver: NameResolver,
    pub fingerprint: String,
    pub built_at: DateTime<Utc>,
}

impl LoadedGraph {
    pub fn build(snapshot: Snapshot, fingerprint: String, fuzzy_cutoff: f64) -> Self {
        let graph = build_graph(&snapshot);
        let resolver = NameResolver::new(&graph, fuzzy_cutoff);
        Self {
            snapshot,
            graph,
            resolver,
            fingerprint,
            built_at: Utc::now(),
        }
    }

    pub fn extractor(&self) -> SubgraphExtractor<'_> {
        SubgraphExtractor::new(&self.graph, &self.resolver)
    }
}

pub struct GraphContext {
    data_dir: PathBuf,
    options: QueryConfig,
    current: RwLock<Arc<LoadedGraph>>,
    /// Held for a whole refresh so two rebuilds cannot interleave.
    refresh_lock: Mutex<()>,
    cache: Option<SubgraphCache>,
}

impl GraphContext {
    /// Load the snapshot in `data_dir` and build the first graph.
    pub fn load(data_dir: &Path, options: QueryConfig) -> Result<Self> {
        let (snapshot, fingerprint) = Snapshot::load_dir_with_fingerprint(data_dir)?;
        let loaded = LoadedGraph::build(snapshot, fingerprint, options.fuzzy_cutoff);
        log::info!(
            "Graph ready: {} nodes, {} edges",
            loaded.graph.nodes().len(),
            loaded.graph.edges().len()
        );
        Ok(Self::from_loaded(data_dir, options, loaded))
    }

    /// Wrap an already built graph, e.g. one assembled in memory.
    pub fn from_loaded(data_dir: &Path, options: QueryConfig, loaded: LoadedGraph) -> Self {
        let cache =
            (options.cache_capacity > 0).then(|| SubgraphCache::new(options.cache_capacity));
        Self {
            data_dir: data_dir.to_path_buf(),
            options,
            current: RwLock::new(Arc::new(loaded)),
            refresh_lock: Mutex::new(()),
            cache,
        }
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    pub fn options(&self) -> &QueryConfig {
        &self.options
    }

    pub fn current(&self) -> Arc<LoadedGraph> {
        self.current
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    /// Rebuild from disk if the snapshot files changed. Returns whether a new
    /// graph was swapped in. On error the previous graph stays current.
    pub fn refresh(&self) -> Result<bool> {
        let _guard = self.refresh_lock.lock().unwrap_or_else(|e| e.into_inner());

        // Cheap check first; the rebuild below re-reads and re-hashes the files
        // it actually parses.
        if Snapshot::fingerprint(&self.data_dir)? == self.current().fingerprint {
            log::debug!("Snapshot unchanged, skipping rebuild");
            return Ok(false);
        }

        let (snapshot, fingerprint) = Snapshot::load_dir_with_fingerprint(&self.data_dir)?;
        if fingerprint == self.current().fingerprint {
            log::debug!("Snapshot reverted while loading, skipping rebuild");
            return Ok(false);
        }

        let loaded = Arc::new(LoadedGraph::build(
            snapshot,
            fingerprint,
            self.options.fuzzy_cutoff,
        ));
        log::info!(
            "Graph rebuilt: {} nodes, {} edges",
            loaded.graph.nodes().len(),
            loaded.graph.edges().len()
        );

        *self.current.write().unwrap_or_else(|e| e.into_inner()) = loaded;
        if let Some(cache) = &self.cache {
            cache.clear();
        }
        Ok(true)
    }

    /// Apply the default radius and enforce `max_k`.
    pub fn radius(&self, k: Option<usize>) -> Result<usize> {
        let k = k.unwrap_or(self.options.default_k);
        if k > self.options.max_k {
            return Err(ArbgraphError::InvalidInput(format!(
                "k = {} exceeds the maximum radius of {}",
                k, self.options.max_k
            )));
        }
        Ok(k)
    }

    pub fn subgraph(&self, name: &str, k: Option<usize>) -> Result<Subgraph> {
        let k = self.radius(k)?;
        self.cached(QueryMode::Single, vec![name.to_string()], k, |loaded| {
            loaded.extractor().extract(name, k)
        })
    }

    pub fn union(&self, names: &[String], k: Option<usize>) -> Result<Subgraph> {
        let k = self.radius(k)?;
        self.cached(QueryMode::Union, names.to_vec(), k, |loaded| {
            loaded.extractor().extract_union(names, k)
        })
    }

    /// Only fails on an invalid radius; unresolvable names degrade the result.
    pub fn connecting(&self, names: &[String], k: Option<usize>) -> Result<Subgraph> {
        let k = self.radius(k)?;
        self.cached(QueryMode::Connecting, names.to_vec(), k, |loaded| {
            Ok(loaded.extractor().extract_connecting(names, k))
        })
    }

    pub fn case_title(&self, name: &str) -> Result<String> {
        case_title_for_name(&self.current().snapshot, name)
    }

    fn cached<F>(&self, mode: QueryMode, names: Vec<String>, k: usize, run: F) -> Result<Subgraph>
    where
        F: FnOnce(&LoadedGraph) -> Result<Subgraph>,
    {
        let loaded = self.current();
        let cache = match &self.cache {
            Some(cache) => cache,
            None => return run(&loaded),
        };

        let key = QueryKey {
            fingerprint: loaded.fingerprint.clone(),
            mode,
            names,
            k,
        };
        if let Some(hit) = cache.get(&key) {
            return Ok(hit);
        }
        let subgraph = run(&loaded)?;
        cache.put(key, subgraph.clone());
        Ok(subgraph)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures;
    use crate::snapshot::PARTIES_FILE;
    use tempfile::TempDir;

    fn load(temp: &TempDir, options: QueryConfig) -> GraphContext {
        fixtures::write_arbitration_snapshot(temp.path());
        GraphContext::load(temp.path(), options).unwrap()
    }

    #[test]
    fn test_load_builds_graph() {
        let temp = TempDir::new().unwrap();
        let ctx = load(&temp, QueryConfig::default());
        let current = ctx.current();
        assert_eq!(current.graph.nodes().len(), 5);
        assert_eq!(current.graph.edges().len(), 10);
        assert_eq!(current.fingerprint.len(), 64);
    }

    #[test]
    fn test_queries_use_default_radius() {
        let temp = TempDir::new().unwrap();
        let ctx = load(&temp, QueryConfig::default());
        let sub = ctx.subgraph("Ada Park", None).unwrap();
        assert_eq!(sub.nodes.len(), 5);
        assert_eq!(sub.edges.len(), 4);
    }

    #[test]
    fn test_radius_above_max_rejected() {
        let temp = TempDir::new().unwrap();
        let options = QueryConfig {
            max_k: 3,
            ..QueryConfig::default()
        };
        let ctx = load(&temp, options);
        assert!(matches!(ctx.radius(Some(4)), Err(ArbgraphError::InvalidInput(_))));
        assert_eq!(ctx.radius(Some(3)).unwrap(), 3);
        assert!(ctx.connecting(&["Ada Park".to_string()], Some(9)).is_err());
    }

    #[test]
    fn test_refresh_skips_unchanged_snapshot() {
        let temp = TempDir::new().unwrap();
        let ctx = load(&temp, QueryConfig::default());
        assert!(!ctx.refresh().unwrap());
    }

    #[test]
    fn test_refresh_swaps_graph_and_keeps_old_arc_valid() {
        let temp = TempDir::new().unwrap();
        let ctx = load(&temp, QueryConfig::default());
        let before = ctx.current();
        let cached = ctx.subgraph("Ada Park", Some(1)).unwrap();
        assert_eq!(cached.nodes.len(), 5);

        std::fs::write(temp.path().join(PARTIES_FILE), "{}").unwrap();
        assert!(ctx.refresh().unwrap());

        let after = ctx.current();
        assert_eq!(after.graph.nodes().len(), 3);
        assert_eq!(before.graph.nodes().len(), 5);
        assert_ne!(before.fingerprint, after.fingerprint);

        let fresh = ctx.subgraph("Ada Park", Some(1)).unwrap();
        assert_eq!(fresh.nodes.len(), 3);
    }

    #[test]
    fn test_refresh_failure_keeps_previous_graph() {
        let temp = TempDir::new().unwrap();
        let ctx = load(&temp, QueryConfig::default());
        std::fs::write(temp.path().join(PARTIES_FILE), "{broken").unwrap();
        assert!(ctx.refresh().is_err());
        assert_eq!(ctx.current().graph.nodes().len(), 5);
    }

    #[test]
    fn test_concurrent_refreshes_settle_on_newest_snapshot() {
        for _ in 0..8 {
            let temp = TempDir::new().unwrap();
            let ctx = load(&temp, QueryConfig::default());
            std::fs::write(temp.path().join(PARTIES_FILE), "{}").unwrap();

            let results: Vec<bool> = std::thread::scope(|scope| {
                let handles: Vec<_> = (0..2)
                    .map(|_| scope.spawn(|| ctx.refresh().unwrap()))
                    .collect();
                handles.into_iter().map(|h| h.join().unwrap()).collect()
            });

            // Exactly one refresh rebuilds; the other sees the new fingerprint.
            assert_eq!(results.iter().filter(|r| **r).count(), 1);
            let current = ctx.current();
            assert_eq!(current.graph.nodes().len(), 3);
            assert_eq!(current.fingerprint, Snapshot::fingerprint(temp.path()).unwrap());
            assert!(!ctx.refresh().unwrap());
        }
    }

    #[test]
    fn test_refresh_back_to_original_snapshot() {
        let temp = TempDir::new().unwrap();
        let ctx = load(&temp, QueryConfig::default());
        let original = std::fs::read(temp.path().join(PARTIES_FILE)).unwrap();

        std::fs::write(temp.path().join(PARTIES_FILE), "{}").unwrap();
        assert!(ctx.refresh().unwrap());
        std::fs::write(temp.path().join(PARTIES_FILE), original).unwrap();
        assert!(ctx.refresh().unwrap());
        assert_eq!(ctx.current().graph.nodes().len(), 5);
        assert!(!ctx.refresh().unwrap());
    }

    #[test]
    fn test_cache_disabled_still_answers() {
        let temp = TempDir::new().unwrap();
        let options = QueryConfig {
            cache_capacity: 0,
            ..QueryConfig::default()
        };
        let ctx = load(&temp, options);
        let names = vec!["Ada Park".to_string(), "Republic of Quorra".to_string()];
        let sub = ctx.connecting(&names, Some(1)).unwrap();
        assert_eq!(sub.edges.len(), 1);
    }

    #[test]
    fn test_not_found_is_not_cached_as_success() {
        let temp = TempDir::new().unwrap();
        let options = QueryConfig {
            fuzzy_cutoff: 95.0,
            ..QueryConfig::default()
        };
        let ctx = load(&temp, options);
        assert!(ctx.subgraph("Zygmunt Xavier", Some(1)).is_err());
        assert!(ctx.subgraph("Zygmunt Xavier", Some(1)).is_err());
    }

    #[test]
    fn test_case_title() {
        let temp = TempDir::new().unwrap();
        let ctx = load(&temp, QueryConfig::default());
        assert_eq!(
            ctx.case_title("Cy Ortiz").unwrap(),
            "Pinnacle Mining Ltd v. Republic of Quorra"
        );
    }
}
