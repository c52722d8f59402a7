use quoteverse_core::models::Quote;
use quoteverse_engine::{Primitive, SessionStatus};
use serde::Serialize;
use std::collections::BTreeMap;

/// One effective configuration value
#[derive(Debug, Serialize)]
pub struct ConfigEntry {
    pub value: String,
    pub source: String,
}

/// Output for config command
#[derive(Debug, Serialize)]
pub struct ConfigOutput {
    pub values: BTreeMap<String, ConfigEntry>,
}

/// A plotted point
#[derive(Debug, Serialize)]
pub struct PointItem {
    pub id: String,
    pub x: f64,
    pub y: f64,
    pub author: String,
}

impl PointItem {
    pub fn new(primitive: &Primitive, quote: Option<&Quote>) -> Self {
        Self {
            id: primitive.id.to_string(),
            x: primitive.position.x,
            y: primitive.position.y,
            author: quote.map(|q| q.author_or_unknown().to_string()).unwrap_or_default(),
        }
    }
}

/// Output for load command
#[derive(Debug, Serialize)]
pub struct LoadOutput {
    pub backend: String,
    pub loaded: usize,
    pub plotted: usize,
    pub unplaced: usize,
    pub scale: f64,
    pub points: Vec<PointItem>,
}

/// One ranked search result
#[derive(Debug, Serialize)]
pub struct ResultItem {
    pub rank: usize,
    pub id: String,
    pub distance: Option<f64>,
    pub author: String,
    pub book: Option<String>,
    pub text: String,
}

impl ResultItem {
    pub fn from_ranked(results: &[Quote]) -> Vec<Self> {
        results
            .iter()
            .enumerate()
            .map(|(i, q)| Self {
                rank: i + 1,
                id: q.id.to_string(),
                distance: q.distance,
                author: q.author_or_unknown().to_string(),
                book: q.book.clone(),
                text: q.text.clone(),
            })
            .collect()
    }
}

/// Output for search command
#[derive(Debug, Serialize)]
pub struct SearchOutput {
    pub query: String,
    pub mode: String,
    pub added: usize,
    pub points: usize,
    pub message: Option<String>,
    pub results: Vec<ResultItem>,
}

/// Output for the explore `:status` command
#[derive(Debug, Serialize)]
pub struct StatusOutput {
    pub points: usize,
    pub highlighted: usize,
    pub results: usize,
    pub mode: String,
    pub state: String,
    pub cache_entries: usize,
    pub cache_hits: u64,
    pub cache_misses: u64,
    pub scale: f64,
}

impl From<SessionStatus> for StatusOutput {
    fn from(status: SessionStatus) -> Self {
        Self {
            points: status.points,
            highlighted: status.highlighted,
            results: status.results,
            mode: status.mode.to_string(),
            state: format!("{:?}", status.state),
            cache_entries: status.cache.entries,
            cache_hits: status.cache.hits,
            cache_misses: status.cache.misses,
            scale: status.scale,
        }
    }
}
