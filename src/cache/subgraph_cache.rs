use lru::LruCache;
use std::num::NonZeroUsize;
use std::sync::Mutex;

use crate::graph::Subgraph;

/// Which extractor produced a cached result
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum QueryMode {
    Single,
    Union,
    Connecting,
}

/// Cache key: the query plus the fingerprint of the snapshot it ran against.
///
/// Keying on the fingerprint means a result computed against an older graph can
/// never be served after a refresh, even if it lands in the cache late.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct QueryKey {
    pub fingerprint: String,
    pub mode: QueryMode,
    pub names: Vec<String>,
    pub k: usize,
}

/// Thread-safe LRU cache for subgraph query results
///
/// Repeated queries against the same snapshot skip the traversal entirely.
pub struct SubgraphCache {
    cache: Mutex<LruCache<QueryKey, Subgraph>>,
}

impl SubgraphCache {
    /// Create a new cache holding up to `capacity` results (at least one)
    pub fn new(capacity: usize) -> Self {
        let cap = NonZeroUsize::new(capacity.max(1)).unwrap_or(NonZeroUsize::MIN);
        Self {
            cache: Mutex::new(LruCache::new(cap)),
        }
    }

    pub fn get(&self, key: &QueryKey) -> Option<Subgraph> {
        self.cache
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .get(key)
            .cloned()
    }

    pub fn put(&self, key: QueryKey, subgraph: Subgraph) {
        self.cache
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .put(key, subgraph);
    }

    /// Drop every entry (called after a snapshot refresh)
    pub fn clear(&self) {
        self.cache.lock().unwrap_or_else(|e| e.into_inner()).clear();
    }

    pub fn len(&self) -> usize {
        self.cache.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
