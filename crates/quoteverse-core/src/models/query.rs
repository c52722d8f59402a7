use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use super::Quote;
use crate::error::QuoteverseError;

/// Hint shown when the search box is empty.
pub const EMPTY_INPUT_HINT: &str =
    "Type in the search bar to look for quotes. Press Enter to submit.";

/// Shown when a search returned nothing.
pub const NO_RESULTS_MESSAGE: &str = "No results found.";

/// What the free-text query is matched against
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchMode {
    /// Semantic similarity against quote text
    #[default]
    Quote,
    /// Author name lookup
    Author,
    /// Book title lookup
    Book,
}

impl SearchMode {
    pub const ALL: [SearchMode; 3] = [SearchMode::Quote, SearchMode::Author, SearchMode::Book];

    pub fn as_str(&self) -> &'static str {
        match self {
            SearchMode::Quote => "quote",
            SearchMode::Author => "author",
            SearchMode::Book => "book",
        }
    }

    /// Placeholder text for the search input in this mode
    pub fn placeholder(&self) -> &'static str {
        match self {
            SearchMode::Quote => "Search for a quote...",
            SearchMode::Author => "Search by author name...",
            SearchMode::Book => "Search by book title...",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            SearchMode::Quote => "Search by quote",
            SearchMode::Author => "Search by author",
            SearchMode::Book => "Search by book",
        }
    }

    /// Only similarity searches carry a distance cutoff and per-item distances.
    pub fn uses_distance(&self) -> bool {
        matches!(self, SearchMode::Quote)
    }
}

impl fmt::Display for SearchMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SearchMode {
    type Err = QuoteverseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "quote" | "quotes" => Ok(SearchMode::Quote),
            "author" | "authors" => Ok(SearchMode::Author),
            "book" | "books" => Ok(SearchMode::Book),
            _ => Err(QuoteverseError::UnknownSearchMode(s.to_string())),
        }
    }
}

/// Normalized identity of a query: the trimmed input text plus the mode it
/// was issued under.
///
/// Used both for request dedupe and as the cache key. The same text under a
/// different mode is a different query.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct QueryKey {
    pub mode: SearchMode,
    pub text: String,
}

impl QueryKey {
    pub fn new(mode: SearchMode, raw: &str) -> Self {
        Self {
            mode,
            text: raw.trim().to_string(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }
}

impl fmt::Display for QueryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.mode, self.text)
    }
}

/// A fully parameterized backend search
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchRequest {
    pub text: String,
    pub mode: SearchMode,
    /// Number of neighbors to return
    pub k: usize,
    /// Distance cutoff, only sent for quote-mode searches
    pub max_distance: Option<f64>,
}

impl SearchRequest {
    pub fn new(key: &QueryKey, k: usize, max_distance: f64) -> Self {
        Self {
            text: key.text.clone(),
            mode: key.mode,
            k,
            max_distance: key.mode.uses_distance().then_some(max_distance),
        }
    }
}

/// Order results for a side list: closest first, distance-less items last,
/// otherwise stable.
pub fn rank_for_display(results: &[Quote]) -> Vec<Quote> {
    let mut ranked = results.to_vec();
    ranked.sort_by(|a, b| match (a.distance, b.distance) {
        (Some(x), Some(y)) => x.partial_cmp(&y).unwrap_or(Ordering::Equal),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    });
    ranked
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_key_trims_input() {
        let key = QueryKey::new(SearchMode::Quote, "   to be or not to be \n");
        assert_eq!(key.text, "to be or not to be");
        assert!(!key.is_empty());
        assert!(QueryKey::new(SearchMode::Author, "   ").is_empty());
    }

    #[test]
    fn test_query_key_distinguishes_modes() {
        let a = QueryKey::new(SearchMode::Quote, "Austen");
        let b = QueryKey::new(SearchMode::Author, "Austen");
        assert_ne!(a, b);
        assert_eq!(b.to_string(), "author:Austen");
    }

    #[test]
    fn test_parse_search_mode() {
        assert_eq!("quote".parse::<SearchMode>().unwrap(), SearchMode::Quote);
        assert_eq!("AUTHOR".parse::<SearchMode>().unwrap(), SearchMode::Author);
        assert_eq!(" books ".parse::<SearchMode>().unwrap(), SearchMode::Book);
        assert!("poem".parse::<SearchMode>().is_err());
    }

    #[test]
    fn test_search_request_only_sends_distance_for_quotes() {
        let quote = SearchRequest::new(&QueryKey::new(SearchMode::Quote, "love"), 50, 0.55);
        let book = SearchRequest::new(&QueryKey::new(SearchMode::Book, "Emma"), 20, 0.55);

        assert_eq!(quote.max_distance, Some(0.55));
        assert_eq!(book.max_distance, None);
        assert_eq!(book.k, 20);
    }

    #[test]
    fn test_rank_for_display() {
        let results = vec![
            Quote::new("a", "a"),
            Quote::new("b", "b").with_distance(0.4),
            Quote::new("c", "c").with_distance(0.1),
        ];

        let ranked = rank_for_display(&results);
        let ids: Vec<&str> = ranked.iter().map(|q| q.id.as_str()).collect();
        assert_eq!(ids, vec!["c", "b", "a"]);
    }
}
