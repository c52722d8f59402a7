use serde::{Deserialize, Serialize};
use std::fmt;

/// Stable identifier of a quote within a session.
///
/// The backend has served both numeric and string ids, so both are accepted
/// on the wire and normalized to their string form.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "RawQuoteId", into = "String")]
pub struct QuoteId(pub String);

impl QuoteId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for QuoteId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for QuoteId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<u64> for QuoteId {
    fn from(id: u64) -> Self {
        Self(id.to_string())
    }
}

impl From<QuoteId> for String {
    fn from(id: QuoteId) -> Self {
        id.0
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawQuoteId {
    Number(u64),
    Text(String),
}

impl From<RawQuoteId> for QuoteId {
    fn from(raw: RawQuoteId) -> Self {
        match raw {
            RawQuoteId::Number(n) => QuoteId(n.to_string()),
            RawQuoteId::Text(s) => QuoteId(s),
        }
    }
}

/// Position of a quote in world space.
///
/// Serialized as a two-element `[x, y]` array, matching the backend.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "[f64; 2]", into = "[f64; 2]")]
pub struct Coords {
    pub x: f64,
    pub y: f64,
}

impl Coords {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

impl From<[f64; 2]> for Coords {
    fn from([x, y]: [f64; 2]) -> Self {
        Self { x, y }
    }
}

impl From<Coords> for [f64; 2] {
    fn from(c: Coords) -> Self {
        [c.x, c.y]
    }
}

/// A short text item placed in the 2-D map.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Quote {
    /// Unique identifier
    pub id: QuoteId,

    /// Quote text
    pub text: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub book: Option<String>,

    /// World-space position. Author and book searches may omit it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub coords: Option<Coords>,

    /// Similarity distance attached by a quote-mode search (lower = closer)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub distance: Option<f64>,
}

impl Quote {
    pub fn new(id: impl Into<QuoteId>, text: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            text: text.into(),
            author: None,
            book: None,
            coords: None,
            distance: None,
        }
    }

    pub fn with_author(mut self, author: impl Into<String>) -> Self {
        self.author = Some(author.into());
        self
    }

    pub fn with_book(mut self, book: impl Into<String>) -> Self {
        self.book = Some(book.into());
        self
    }

    pub fn with_coords(mut self, x: f64, y: f64) -> Self {
        self.coords = Some(Coords::new(x, y));
        self
    }

    pub fn with_distance(mut self, distance: f64) -> Self {
        self.distance = Some(distance);
        self
    }

    /// Author name for display, `"Unknown"` when absent.
    pub fn author_or_unknown(&self) -> &str {
        self.author.as_deref().unwrap_or("Unknown")
    }

    /// Raw similarity strength in `[0, 1]`-ish space: `1 - distance`.
    ///
    /// Results without a distance (author/book searches) count as exact
    /// matches.
    pub fn similarity_strength(&self) -> f64 {
        self.distance.map(|d| 1.0 - d).unwrap_or(1.0)
    }
}

impl From<String> for QuoteId {
    fn from(id: String) -> Self {
        Self(id)
    }
}
