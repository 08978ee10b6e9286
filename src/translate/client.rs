use super::Language;
use crate::util::{read_limited_bytes, ReadBodyError};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;
use url::Url;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(20);
const MAX_RESPONSE_SIZE: usize = 1024 * 1024; // 1MB

#[derive(Debug, Error)]
pub enum TranslateError {
    #[error("Request timed out after 20s")]
    Timeout,
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),
    #[error("HTTP error: status {0}")]
    HttpStatus(u16),
    #[error("Malformed translation response: {0}")]
    Malformed(String),
    #[error("No translation API key configured")]
    MissingKey,
    #[error("Insecure base URL: HTTPS required (except localhost for testing)")]
    InsecureBaseUrl,
}

#[derive(Serialize)]
struct TranslateRequest<'a> {
    q: &'a str,
    target: &'a str,
    format: &'a str,
}

#[derive(Deserialize)]
struct TranslateResponse {
    data: TranslateData,
}

#[derive(Deserialize)]
struct TranslateData {
    translations: Vec<Translation>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct Translation {
    translated_text: String,
}

/// Single-string client for the translation service.
#[derive(Clone)]
pub struct TranslateClient {
    client: reqwest::Client,
    base_url: String,
    api_key: Option<SecretString>,
}

impl std::fmt::Debug for TranslateClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TranslateClient")
            .field("base_url", &self.base_url)
            .field("api_key", &self.api_key.as_ref().map(|_| "[REDACTED]"))
            .finish()
    }
}

impl TranslateClient {
    pub fn new(
        client: reqwest::Client,
        base_url: impl Into<String>,
        api_key: Option<SecretString>,
    ) -> Self {
        Self {
            client,
            base_url: base_url.into(),
            api_key,
        }
    }

    pub fn has_key(&self) -> bool {
        self.api_key.is_some()
    }

    /// Translate one string into `target`.
    ///
    /// The API key travels as the `key` query parameter, so it is only ever
    /// sent over HTTPS (plain HTTP is accepted for localhost only).
    pub async fn translate_text(
        &self,
        text: &str,
        target: Language,
    ) -> Result<String, TranslateError> {
        let key = self.api_key.as_ref().ok_or(TranslateError::MissingKey)?;
        let base = self.base_url.as_str();

        let url = Url::parse_with_params(base, [("key", key.expose_secret())])
            .map_err(|_| TranslateError::InsecureBaseUrl)?;
        if url.scheme() != "https" && !is_local_http(&url) {
            tracing::error!(base_url = %base, "Rejecting non-HTTPS translation base URL");
            return Err(TranslateError::InsecureBaseUrl);
        }

        let body = serde_json::to_vec(&TranslateRequest {
            q: text,
            target: target.code(),
            format: "text",
        })
        .map_err(|e| TranslateError::Malformed(e.to_string()))?;

        let request = self
            .client
            .post(url)
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .body(body);

        let response = tokio::time::timeout(REQUEST_TIMEOUT, request.send())
            .await
            .map_err(|_| TranslateError::Timeout)?
            .map_err(TranslateError::Network)?;

        if !response.status().is_success() {
            return Err(TranslateError::HttpStatus(response.status().as_u16()));
        }

        let bytes = read_limited_bytes(response, MAX_RESPONSE_SIZE).await?;
        parse_translation(&bytes)
    }
}

impl From<ReadBodyError> for TranslateError {
    fn from(e: ReadBodyError) -> Self {
        match e {
            ReadBodyError::TooLarge { .. } => TranslateError::Malformed("response too large".to_string()),
            ReadBodyError::Network(e) => TranslateError::Network(e),
        }
    }
}

/// Plain HTTP is only allowed against the local machine.
fn is_local_http(url: &Url) -> bool {
    url.scheme() == "http" && matches!(url.host_str(), Some("localhost" | "127.0.0.1"))
}

fn parse_translation(bytes: &[u8]) -> Result<String, TranslateError> {
    let parsed: TranslateResponse =
        serde_json::from_slice(bytes).map_err(|e| TranslateError::Malformed(e.to_string()))?;
    parsed
        .data
        .translations
        .into_iter()
        .next()
        .map(|t| t.translated_text)
        .ok_or_else(|| TranslateError::Malformed("empty translations array".to_string()))
}
