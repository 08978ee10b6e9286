use thiserror::Error;
use url::Url;

/// Maximum URL length handed to the system browser.
const MAX_OPEN_URL_LEN: usize = 2048;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum UrlValidationError {
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
    #[error("Unsupported scheme: {0} (only http/https allowed)")]
    UnsupportedScheme(String),
    #[error("URL has no host")]
    MissingHost,
    #[error("URL too long")]
    TooLong,
}

/// Validate an article link before passing it to the system browser.
///
/// Only absolute http(s) URLs with a host are accepted; anything else could
/// be interpreted by the platform opener as a file path or command.
pub fn validate_url_for_open(url_str: &str) -> Result<Url, UrlValidationError> {
    let trimmed = url_str.trim();
    if trimmed.len() > MAX_OPEN_URL_LEN {
        return Err(UrlValidationError::TooLong);
    }

    let url = Url::parse(trimmed)?;
    match url.scheme() {
        "http" | "https" => {}
        scheme => return Err(UrlValidationError::UnsupportedScheme(scheme.to_owned())),
    }
    if url.host_str().map_or(true, str::is_empty) {
        return Err(UrlValidationError::MissingHost);
    }
    Ok(url)
}
