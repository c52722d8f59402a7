use async_trait::async_trait;
use quoteverse_core::error::{QuoteverseError, Result};
use quoteverse_core::models::{Coords, Quote, SearchMode, SearchRequest};
use quoteverse_core::ports::QuoteBackend;
use reqwest::Url;
use serde::de::DeserializeOwned;

use crate::wire::{Envelope, ExistingQuotes, MatchedQuotes, ProjectedQuery, Queries, SimilarQuotes};

const SIMILAR_ENDPOINT: &str = "/get-similar-quotes/";
const SEARCH_ENDPOINT: &str = "/search-quotes/";
const COORDINATES_ENDPOINT: &str = "/get-coordinates/";

/// Quote service reached over HTTP + JSON
#[derive(Debug, Clone)]
pub struct HttpQuoteBackend {
    /// Service root (e.g., "https://quoteverse-backend.onrender.com/quotes")
    base_url: String,

    /// HTTP client
    client: reqwest::Client,
}

impl HttpQuoteBackend {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(base_url, reqwest::Client::new())
    }

    /// Use a preconfigured client (timeouts, proxies, ...)
    pub fn with_client(base_url: impl Into<String>, client: reqwest::Client) -> Self {
        let base_url: String = base_url.into();
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// `GET {base}/?count=..&randomize=..`
    pub fn existing_url(&self, count: usize, randomize: bool) -> Result<Url> {
        self.url("/", &[("count", count.to_string()), ("randomize", randomize.to_string())])
    }

    /// Endpoint and query string for a search in the request's mode
    pub fn search_url(&self, request: &SearchRequest) -> Result<Url> {
        match request.mode {
            SearchMode::Quote => {
                let mut params = vec![("k", request.k.to_string())];
                if let Some(max_distance) = request.max_distance {
                    params.push(("max_distance", max_distance.to_string()));
                }
                self.url(SIMILAR_ENDPOINT, &params)
            }
            SearchMode::Author | SearchMode::Book => self.url(
                SEARCH_ENDPOINT,
                &[
                    ("search_by", request.mode.as_str().to_string()),
                    ("k", request.k.to_string()),
                    ("strict", "false".to_string()),
                ],
            ),
        }
    }

    fn url(&self, path: &str, params: &[(&str, String)]) -> Result<Url> {
        let raw = format!("{}{}", self.base_url, path);
        Url::parse_with_params(&raw, params).map_err(|e| QuoteverseError::ConfigInvalid {
            key: "base_url".to_string(),
            reason: format!("'{}' is not a valid URL: {}", raw, e),
        })
    }

    async fn get_json<T: DeserializeOwned>(&self, url: Url) -> Result<T> {
        tracing::debug!(%url, "GET");
        let response = self.client.get(url.clone()).send().await;
        Self::decode(url, response).await
    }

    /// Batch endpoints take a JSON array of query strings
    async fn post_json<T: DeserializeOwned>(&self, url: Url, text: &str) -> Result<T> {
        tracing::debug!(%url, "POST");
        let response = self
            .client
            .post(url.clone())
            .header(reqwest::header::ACCEPT, "application/json")
            .json(&[text])
            .send()
            .await;
        Self::decode(url, response).await
    }

    async fn decode<T: DeserializeOwned>(
        url: Url,
        response: reqwest::Result<reqwest::Response>,
    ) -> Result<T> {
        let endpoint = url.path().to_string();

        let response = response.map_err(|e| {
            tracing::warn!(endpoint = %endpoint, error = %e, "quote service unreachable");
            QuoteverseError::Transport {
                endpoint: endpoint.clone(),
                reason: e.to_string(),
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            tracing::warn!(endpoint = %endpoint, status = status.as_u16(), "quote service error");
            return Err(QuoteverseError::HttpStatus {
                endpoint,
                status: status.as_u16(),
            });
        }

        let envelope: Envelope<T> =
            response.json().await.map_err(|e| QuoteverseError::MalformedResponse {
                endpoint: endpoint.clone(),
                reason: e.to_string(),
            })?;
        Ok(envelope.data)
    }
}

#[async_trait]
impl QuoteBackend for HttpQuoteBackend {
    async fn fetch_existing(&self, count: usize, randomize: bool) -> Result<Vec<Quote>> {
        let data: ExistingQuotes = self.get_json(self.existing_url(count, randomize)?).await?;
        tracing::info!(count = data.quotes.len(), "fetched existing quotes");
        Ok(data.quotes)
    }

    async fn search(&self, request: &SearchRequest) -> Result<Vec<Quote>> {
        let url = self.search_url(request)?;
        match request.mode {
            SearchMode::Quote => {
                let data: Queries<SimilarQuotes> = self.post_json(url, &request.text).await?;
                Ok(data.into_first(SIMILAR_ENDPOINT)?.similar_quotes)
            }
            SearchMode::Author | SearchMode::Book => {
                let data: Queries<MatchedQuotes> = self.post_json(url, &request.text).await?;
                Ok(data.into_first(SEARCH_ENDPOINT)?.quotes)
            }
        }
    }

    async fn similarity(&self, text: &str, k: usize, max_distance: f64) -> Result<Vec<Quote>> {
        let url = self.url(
            SIMILAR_ENDPOINT,
            &[("k", k.to_string()), ("max_distance", max_distance.to_string())],
        )?;
        let data: Queries<SimilarQuotes> = self.post_json(url, text).await?;
        Ok(data.into_first(SIMILAR_ENDPOINT)?.similar_quotes)
    }

    async fn coordinates(&self, text: &str) -> Result<Coords> {
        let url = self.url(COORDINATES_ENDPOINT, &[])?;
        let data: Queries<ProjectedQuery> = self.post_json(url, text).await?;
        Ok(data.into_first(COORDINATES_ENDPOINT)?.coords)
    }

    fn name(&self) -> &str {
        &self.base_url
    }
}
