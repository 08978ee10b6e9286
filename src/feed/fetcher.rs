use crate::feed::types::{Article, Category};
use crate::util::{read_limited_bytes, ReadBodyError};
use serde::Deserialize;
use std::time::Duration;
use thiserror::Error;
use url::Url;

/// Default page size requested from the aggregator.
pub const DEFAULT_PAGE_SIZE: u32 = 80;

const MAX_RESPONSE_SIZE: usize = 10 * 1024 * 1024; // 10MB
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Headlines are always requested in the source language; translation
/// happens client-side.
const SOURCE_LANGUAGE: &str = "en";

/// Value of `data.status` on a successful response.
const STATUS_OK: &str = "ok";

/// Errors that can occur while retrieving headlines.
#[derive(Debug, Error)]
pub enum FetchError {
    /// Network-level error (DNS, connection, TLS, etc.)
    #[error("Request failed: {0}")]
    Network(#[from] reqwest::Error),
    /// Request exceeded the 30-second timeout
    #[error("Request timed out")]
    Timeout,
    /// HTTP response with non-2xx status code
    #[error("HTTP error: status {0}")]
    HttpStatus(u16),
    /// Payload present but not the expected envelope
    #[error("Invalid response: {0}")]
    Protocol(String),
    /// Response body exceeded the 10MB size limit
    #[error("Response too large")]
    ResponseTooLarge,
    /// Configured base URL could not be used
    #[error("Invalid base URL: {0}")]
    InvalidBaseUrl(#[from] url::ParseError),
}

#[derive(Debug, Deserialize)]
struct Envelope {
    data: HeadlinesPayload,
}

#[derive(Debug, Deserialize)]
struct HeadlinesPayload {
    status: String,
    #[serde(default)]
    articles: Vec<Article>,
    #[serde(default)]
    message: Option<String>,
}

/// Client for the headline aggregator.
///
/// Cheap to clone: `reqwest::Client` is reference counted internally.
#[derive(Debug, Clone)]
pub struct NewsFetcher {
    client: reqwest::Client,
    base_url: String,
}

impl NewsFetcher {
    pub fn new(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
        }
    }

    /// Fetch the first page of headlines for a category.
    pub async fn fetch(&self, category: Category) -> Result<Vec<Article>, FetchError> {
        self.fetch_page(category, 1, DEFAULT_PAGE_SIZE).await
    }

    /// Fetch one page of headlines.
    ///
    /// # Errors
    ///
    /// - [`FetchError::Network`] / [`FetchError::Timeout`] - transport failure
    /// - [`FetchError::HttpStatus`] - non-2xx response
    /// - [`FetchError::Protocol`] - body is not the expected envelope or
    ///   `data.status` is not `"ok"`
    /// - [`FetchError::ResponseTooLarge`] - body exceeded 10MB
    ///
    /// No retry is attempted; callers re-trigger on their own.
    pub async fn fetch_page(
        &self,
        category: Category,
        page: u32,
        page_size: u32,
    ) -> Result<Vec<Article>, FetchError> {
        let url = self.headlines_url(category, page, page_size)?;
        tracing::debug!(url = %url, "Requesting headlines");

        let response = tokio::time::timeout(REQUEST_TIMEOUT, self.client.get(url).send())
            .await
            .map_err(|_| FetchError::Timeout)?
            .map_err(FetchError::Network)?;

        if !response.status().is_success() {
            return Err(FetchError::HttpStatus(response.status().as_u16()));
        }

        let bytes = read_limited_bytes(response, MAX_RESPONSE_SIZE).await?;
        let articles = parse_headlines(&bytes)?;

        tracing::info!(
            category = %category,
            page,
            count = articles.len(),
            "Fetched headlines"
        );
        Ok(articles)
    }

    fn headlines_url(&self, category: Category, page: u32, page_size: u32) -> Result<Url, FetchError> {
        let endpoint = format!("{}/top-headlines", self.base_url.trim_end_matches('/'));
        let page = page.max(1).to_string();
        let page_size = page_size.to_string();
        let url = Url::parse_with_params(
            &endpoint,
            [
                ("category", category.name()),
                ("language", SOURCE_LANGUAGE),
                ("page", page.as_str()),
                ("pageSize", page_size.as_str()),
            ],
        )?;
        Ok(url)
    }
}

impl From<ReadBodyError> for FetchError {
    fn from(e: ReadBodyError) -> Self {
        match e {
            ReadBodyError::TooLarge { .. } => FetchError::ResponseTooLarge,
            ReadBodyError::Network(e) => FetchError::Network(e),
        }
    }
}

/// Decode the aggregator envelope and check its status marker.
fn parse_headlines(bytes: &[u8]) -> Result<Vec<Article>, FetchError> {
    let envelope: Envelope =
        serde_json::from_slice(bytes).map_err(|e| FetchError::Protocol(e.to_string()))?;

    if envelope.data.status != STATUS_OK {
        let detail = envelope
            .data
            .message
            .unwrap_or_else(|| format!("status \"{}\"", envelope.data.status));
        return Err(FetchError::Protocol(detail));
    }

    Ok(envelope.data.articles)
}
