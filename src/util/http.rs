use futures::StreamExt;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ReadBodyError {
    #[error("response exceeds {limit} bytes")]
    TooLarge { limit: usize },
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),
}

/// Read a response body, refusing anything over `limit` bytes.
pub async fn read_limited_bytes(
    response: reqwest::Response,
    limit: usize,
) -> Result<Vec<u8>, ReadBodyError> {
    // Fast path: check Content-Length header
    if let Some(len) = response.content_length() {
        if len > limit as u64 {
            return Err(ReadBodyError::TooLarge { limit });
        }
    }

    let mut bytes = Vec::new();
    let mut stream = response.bytes_stream();

    while let Some(chunk) = stream.next().await {
        let chunk = chunk?;
        if bytes.len().saturating_add(chunk.len()) > limit {
            return Err(ReadBodyError::TooLarge { limit });
        }
        bytes.extend_from_slice(&chunk);
    }

    Ok(bytes)
}
