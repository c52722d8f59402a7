//! Port definitions for the remote search backend

use async_trait::async_trait;

use crate::error::Result;
use crate::models::{Coords, Quote, SearchRequest};

/// Port for the quote search service
///
/// The backend owns ranking; callers treat every method as an opaque
/// request/response. Any failure is reported as a transport error with no
/// partial results.
#[async_trait]
pub trait QuoteBackend: Send + Sync {
    /// Bulk-load quotes for the initial map
    ///
    /// # Arguments
    /// * `count` - Maximum number of quotes to return
    /// * `randomize` - Ask the backend for a random sample instead of a fixed prefix
    async fn fetch_existing(&self, count: usize, randomize: bool) -> Result<Vec<Quote>>;

    /// Run a ranked search in the given mode
    async fn search(&self, request: &SearchRequest) -> Result<Vec<Quote>>;

    /// Nearest neighbors of a free-text quote, each carrying a distance
    async fn similarity(&self, text: &str, k: usize, max_distance: f64) -> Result<Vec<Quote>>;

    /// Project an ad-hoc text into world space
    async fn coordinates(&self, text: &str) -> Result<Coords>;

    /// Human-readable name of the backend, used in logs
    fn name(&self) -> &str;
}
