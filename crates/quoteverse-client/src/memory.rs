//! In-process quote backend for offline use and tests

use async_trait::async_trait;
use quoteverse_core::error::{QuoteverseError, Result};
use quoteverse_core::models::{Coords, Quote, SearchMode, SearchRequest};
use quoteverse_core::ports::QuoteBackend;
use std::collections::HashSet;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Quote backend over a fixed corpus held in memory.
///
/// Quote-mode similarity is word-overlap distance (one minus the Jaccard
/// index of lowercase tokens); author and book lookups are case-insensitive
/// substring matches.
#[derive(Debug, Default)]
pub struct MemoryQuoteBackend {
    quotes: Vec<Quote>,
    calls: AtomicUsize,
}

impl MemoryQuoteBackend {
    pub fn new(quotes: Vec<Quote>) -> Self {
        Self {
            quotes,
            calls: AtomicUsize::new(0),
        }
    }

    /// Load a corpus from a JSON array of quotes
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let quotes: Vec<Quote> = serde_json::from_str(&content)?;
        tracing::info!(path = %path.display(), count = quotes.len(), "loaded offline corpus");
        Ok(Self::new(quotes))
    }

    pub fn len(&self) -> usize {
        self.quotes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.quotes.is_empty()
    }

    /// Number of backend calls served so far
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn record_call(&self) {
        self.calls.fetch_add(1, Ordering::SeqCst);
    }

    fn nearest(&self, text: &str, k: usize, max_distance: f64) -> Vec<Quote> {
        let query = tokens(text);
        let mut scored: Vec<(f64, &Quote)> = self
            .quotes
            .iter()
            .map(|q| (token_distance(&query, &tokens(&q.text)), q))
            .filter(|(distance, _)| *distance <= max_distance)
            .collect();
        scored.sort_by(|a, b| a.0.total_cmp(&b.0));

        scored
            .into_iter()
            .take(k)
            .map(|(distance, q)| q.clone().with_distance(distance))
            .collect()
    }

    fn lookup(&self, mode: SearchMode, text: &str, k: usize) -> Vec<Quote> {
        let needle = text.to_lowercase();
        self.quotes
            .iter()
            .filter(|q| {
                let field = match mode {
                    SearchMode::Author => q.author.as_deref(),
                    SearchMode::Book => q.book.as_deref(),
                    SearchMode::Quote => Some(q.text.as_str()),
                };
                field.is_some_and(|f| f.to_lowercase().contains(&needle))
            })
            .take(k)
            .cloned()
            .collect()
    }
}

#[async_trait]
impl QuoteBackend for MemoryQuoteBackend {
    async fn fetch_existing(&self, count: usize, _randomize: bool) -> Result<Vec<Quote>> {
        self.record_call();
        Ok(self.quotes.iter().take(count).cloned().collect())
    }

    async fn search(&self, request: &SearchRequest) -> Result<Vec<Quote>> {
        self.record_call();
        let results = match request.mode {
            SearchMode::Quote => {
                self.nearest(&request.text, request.k, request.max_distance.unwrap_or(1.0))
            }
            mode => self.lookup(mode, &request.text, request.k),
        };
        tracing::debug!(query = %request.text, mode = %request.mode, results = results.len(), "memory search");
        Ok(results)
    }

    async fn similarity(&self, text: &str, k: usize, max_distance: f64) -> Result<Vec<Quote>> {
        self.record_call();
        Ok(self.nearest(text, k, max_distance))
    }

    async fn coordinates(&self, text: &str) -> Result<Coords> {
        self.record_call();
        let placed: Vec<Coords> = self
            .nearest(text, 5, 1.0)
            .into_iter()
            .filter_map(|q| q.coords)
            .collect();
        if placed.is_empty() {
            return Err(QuoteverseError::MalformedResponse {
                endpoint: "memory".to_string(),
                reason: "no placed quotes to project against".to_string(),
            });
        }

        let n = placed.len() as f64;
        let (sx, sy) = placed.iter().fold((0.0, 0.0), |(x, y), c| (x + c.x, y + c.y));
        Ok(Coords::new(sx / n, sy / n))
    }

    fn name(&self) -> &str {
        "memory"
    }
}

fn tokens(text: &str) -> HashSet<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
        .map(str::to_lowercase)
        .collect()
}

fn token_distance(a: &HashSet<String>, b: &HashSet<String>) -> f64 {
    let union = a.union(b).count();
    if union == 0 {
        return 1.0;
    }
    1.0 - a.intersection(b).count() as f64 / union as f64
}
