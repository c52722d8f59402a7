//! Bounded, deduplicated set of displayed quotes with change notification.
//!
//! The store is a cheap-to-clone handle around shared state guarded by a
//! single lock. Listeners are snapshotted and the lock released before any
//! listener runs, so a listener may subscribe, unsubscribe, or read the store
//! without deadlocking or disturbing the current round of notifications.

use quoteverse_core::models::{Quote, QuoteId};
use std::collections::HashSet;
use std::fmt;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard, Weak};

type Listener = Arc<dyn Fn(&[Quote]) + Send + Sync>;

struct Inner {
    quotes: Vec<Quote>,
    max_size: usize,
    listeners: Vec<(u64, Listener)>,
    next_listener_id: u64,
}

/// Canonical set of quotes currently on the map
#[derive(Clone)]
pub struct PointStore {
    inner: Arc<RwLock<Inner>>,
}

impl fmt::Debug for PointStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = self.read();
        f.debug_struct("PointStore")
            .field("len", &inner.quotes.len())
            .field("max_size", &inner.max_size)
            .field("listeners", &inner.listeners.len())
            .finish()
    }
}

impl PointStore {
    /// Create an empty store holding at most `max_size` quotes
    pub fn new(max_size: usize) -> Self {
        Self {
            inner: Arc::new(RwLock::new(Inner {
                quotes: Vec::new(),
                max_size,
                listeners: Vec::new(),
                next_listener_id: 0,
            })),
        }
    }

    // A poisoned lock only means a listener panicked elsewhere; the data
    // itself is never left half-written, so keep serving it.
    fn read(&self) -> RwLockReadGuard<'_, Inner> {
        self.inner.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Inner> {
        self.inner.write().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn max_size(&self) -> usize {
        self.read().max_size
    }

    pub fn len(&self) -> usize {
        self.read().quotes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.read().quotes.is_empty()
    }

    /// Snapshot of the current sequence, in insertion order
    pub fn quotes(&self) -> Vec<Quote> {
        self.read().quotes.clone()
    }

    pub fn contains(&self, id: &QuoteId) -> bool {
        self.read().quotes.iter().any(|q| &q.id == id)
    }

    pub fn get(&self, id: &QuoteId) -> Option<Quote> {
        self.read().quotes.iter().find(|q| &q.id == id).cloned()
    }

    /// Replace the whole set, as done by the initial bulk load.
    ///
    /// Later duplicates of an id are dropped and the result is cut to the
    /// store bound. Subscribers are always notified.
    pub fn replace_all(&self, quotes: Vec<Quote>) {
        {
            let mut inner = self.write();
            let max_size = inner.max_size;
            let mut seen = HashSet::new();
            inner.quotes = quotes
                .into_iter()
                .filter(|q| seen.insert(q.id.clone()))
                .take(max_size)
                .collect();
            tracing::debug!(count = inner.quotes.len(), "replaced point set");
        }
        self.notify();
    }

    /// Merge search results into the set.
    ///
    /// Results already present (or repeated within `results`) are ignored.
    /// When nothing is new the store is untouched and nobody is notified.
    /// Otherwise room is made by evicting existing quotes oldest-first,
    /// taking quotes that are not part of `results` before those that are,
    /// and the new quotes are appended in result order. If the new quotes
    /// alone exceed `max_size`, only the first `max_size` of them are kept.
    /// `max_size` can tighten the store's own bound but never loosen it.
    ///
    /// Returns the number of quotes added.
    pub fn update_with_similar(&self, results: &[Quote], max_size: usize) -> usize {
        let added = {
            let mut inner = self.write();
            let max_size = max_size.min(inner.max_size);

            let present: HashSet<&QuoteId> = inner.quotes.iter().map(|q| &q.id).collect();
            let mut seen = HashSet::new();
            let mut new_quotes: Vec<Quote> = results
                .iter()
                .filter(|q| !present.contains(&q.id) && seen.insert(&q.id))
                .cloned()
                .collect();
            new_quotes.truncate(max_size);
            if new_quotes.is_empty() {
                return 0;
            }

            let room = max_size - new_quotes.len();
            let overflow = inner.quotes.len().saturating_sub(room);
            if overflow > 0 {
                let matched: HashSet<&QuoteId> = results.iter().map(|q| &q.id).collect();
                let evicted: HashSet<QuoteId> = inner
                    .quotes
                    .iter()
                    .filter(|q| !matched.contains(&q.id))
                    .chain(inner.quotes.iter().filter(|q| matched.contains(&q.id)))
                    .take(overflow)
                    .map(|q| q.id.clone())
                    .collect();
                inner.quotes.retain(|q| !evicted.contains(&q.id));
                tracing::debug!(evicted = evicted.len(), "evicted quotes to make room");
            }

            let added = new_quotes.len();
            inner.quotes.extend(new_quotes);
            debug_assert!(invariants_hold(&inner.quotes, max_size));
            tracing::debug!(added, total = inner.quotes.len(), "merged similar quotes");
            added
        };

        self.notify();
        added
    }

    /// Register a listener called with the full sequence after every change
    pub fn subscribe<F>(&self, listener: F) -> Subscription
    where
        F: Fn(&[Quote]) + Send + Sync + 'static,
    {
        let mut inner = self.write();
        let id = inner.next_listener_id;
        inner.next_listener_id += 1;
        inner.listeners.push((id, Arc::new(listener)));
        Subscription {
            id,
            store: Arc::downgrade(&self.inner),
        }
    }

    pub fn subscriber_count(&self) -> usize {
        self.read().listeners.len()
    }

    fn notify(&self) {
        let (quotes, listeners): (Vec<Quote>, Vec<Listener>) = {
            let inner = self.read();
            (
                inner.quotes.clone(),
                inner.listeners.iter().map(|(_, l)| Arc::clone(l)).collect(),
            )
        };
        for listener in listeners {
            listener(&quotes);
        }
    }
}

/// Handle returned by [`PointStore::subscribe`]
#[derive(Debug)]
pub struct Subscription {
    id: u64,
    store: Weak<RwLock<Inner>>,
}

impl Subscription {
    /// Stop receiving notifications. Calling this more than once is harmless.
    pub fn unsubscribe(&self) {
        if let Some(inner) = self.store.upgrade() {
            let mut inner = inner.write().unwrap_or_else(PoisonError::into_inner);
            inner.listeners.retain(|(id, _)| *id != self.id);
        }
    }
}

/// Length bound and id uniqueness
pub fn invariants_hold(quotes: &[Quote], max_size: usize) -> bool {
    let mut seen = HashSet::new();
    quotes.len() <= max_size && quotes.iter().all(|q| seen.insert(&q.id))
}
