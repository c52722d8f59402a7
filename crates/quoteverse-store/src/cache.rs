use lru::LruCache;
use quoteverse_core::models::{QueryKey, Quote};
use std::num::NonZeroUsize;

/// Hit/miss counters for a [`QueryCache`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub entries: usize,
}

/// Memoized backend results keyed by normalized query.
///
/// Bounded with least-recently-used eviction; a capacity of zero keeps every
/// entry for the life of the cache.
#[derive(Debug)]
pub struct QueryCache {
    entries: LruCache<QueryKey, Vec<Quote>>,
    bounded: bool,
    hits: u64,
    misses: u64,
}

impl QueryCache {
    pub fn new(capacity: usize) -> Self {
        let (entries, bounded) = match NonZeroUsize::new(capacity) {
            Some(cap) => (LruCache::new(cap), true),
            None => (LruCache::unbounded(), false),
        };
        Self {
            entries,
            bounded,
            hits: 0,
            misses: 0,
        }
    }

    pub fn unbounded() -> Self {
        Self::new(0)
    }

    /// Look up a query, marking it as recently used
    pub fn get(&mut self, key: &QueryKey) -> Option<Vec<Quote>> {
        match self.entries.get(key) {
            Some(results) => {
                self.hits += 1;
                tracing::debug!(query = %key, results = results.len(), "query cache hit");
                Some(results.clone())
            }
            None => {
                self.misses += 1;
                None
            }
        }
    }

    /// Look up without touching recency or counters
    pub fn peek(&self, key: &QueryKey) -> Option<&[Quote]> {
        self.entries.peek(key).map(Vec::as_slice)
    }

    /// Store results verbatim, replacing any previous entry for `key`
    pub fn put(&mut self, key: QueryKey, results: Vec<Quote>) {
        let full = self.bounded && self.entries.len() == self.entries.cap().get();
        if full && !self.entries.contains(&key) {
            if let Some((evicted, _)) = self.entries.peek_lru() {
                tracing::trace!(query = %evicted, "evicting least recently used query");
            }
        }
        self.entries.put(key, results);
    }

    pub fn contains(&self, key: &QueryKey) -> bool {
        self.entries.contains(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Maximum number of entries, `None` when unbounded
    pub fn capacity(&self) -> Option<usize> {
        self.bounded.then(|| self.entries.cap().get())
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits,
            misses: self.misses,
            entries: self.entries.len(),
        }
    }
}
