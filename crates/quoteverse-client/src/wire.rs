//! Response envelopes returned by the quote service

use quoteverse_core::error::{QuoteverseError, Result};
use quoteverse_core::models::{Coords, Quote};
use serde::Deserialize;

/// Every response wraps its payload in `{"data": ...}`
#[derive(Debug, Deserialize)]
pub(crate) struct Envelope<T> {
    pub data: T,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ExistingQuotes {
    pub quotes: Vec<Quote>,
}

/// Batch endpoints answer one entry per submitted query
#[derive(Debug, Deserialize)]
pub(crate) struct Queries<T> {
    pub queries: Vec<T>,
}

impl<T> Queries<T> {
    /// The answer for the single query we sent
    pub fn into_first(self, endpoint: &str) -> Result<T> {
        self.queries
            .into_iter()
            .next()
            .ok_or_else(|| QuoteverseError::MalformedResponse {
                endpoint: endpoint.to_string(),
                reason: "response contained no query results".to_string(),
            })
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct SimilarQuotes {
    pub similar_quotes: Vec<Quote>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct MatchedQuotes {
    pub quotes: Vec<Quote>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ProjectedQuery {
    pub coords: Coords,
}
