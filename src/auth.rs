//! Login and signup against the account backend.

use crate::session::StoredCredential;
use crate::util::{read_limited_bytes, ReadBodyError};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
const MAX_RESPONSE_SIZE: usize = 64 * 1024; // 64KB

/// Characters that satisfy the special-character rule.
pub const SPECIAL_CHARS: &str = "!@#$%^&*(),.?\":{}|<>";

pub const MIN_PASSWORD_LEN: usize = 7;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Request timed out")]
    Timeout,
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),
    #[error("Invalid credentials. Please try again.")]
    InvalidCredentials,
    #[error("HTTP error: status {0}")]
    HttpStatus(u16),
    #[error("Malformed response: {0}")]
    Malformed(String),
    #[error("Password does not meet the requirements: {}", format_missing(.0))]
    WeakPassword(Vec<Requirement>),
}

impl From<ReadBodyError> for AuthError {
    fn from(e: ReadBodyError) -> Self {
        match e {
            ReadBodyError::TooLarge { .. } => AuthError::Malformed("response too large".to_string()),
            ReadBodyError::Network(e) => AuthError::Network(e),
        }
    }
}

fn format_missing(missing: &[Requirement]) -> String {
    missing
        .iter()
        .map(|r| r.describe())
        .collect::<Vec<_>>()
        .join(", ")
}

// ============================================================================
// Password Rules
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Requirement {
    MinLength,
    Uppercase,
    SpecialChar,
    Digit,
}

impl Requirement {
    pub const ALL: [Requirement; 4] = [
        Requirement::MinLength,
        Requirement::Uppercase,
        Requirement::SpecialChar,
        Requirement::Digit,
    ];

    pub fn describe(self) -> &'static str {
        match self {
            Self::MinLength => "minimum length of 7 characters",
            Self::Uppercase => "one uppercase letter",
            Self::SpecialChar => "one special character",
            Self::Digit => "one number",
        }
    }
}

/// Which password rules a candidate satisfies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PasswordRequirements {
    pub min_length: bool,
    pub has_uppercase: bool,
    pub has_special_char: bool,
    pub has_number: bool,
}

impl PasswordRequirements {
    pub fn check(password: &str) -> Self {
        Self {
            min_length: password.chars().count() >= MIN_PASSWORD_LEN,
            has_uppercase: password.chars().any(|c| c.is_ascii_uppercase()),
            has_special_char: password.chars().any(|c| SPECIAL_CHARS.contains(c)),
            has_number: password.chars().any(|c| c.is_ascii_digit()),
        }
    }

    pub fn is_met(&self) -> bool {
        self.missing().is_empty()
    }

    pub fn missing(&self) -> Vec<Requirement> {
        [
            (self.min_length, Requirement::MinLength),
            (self.has_uppercase, Requirement::Uppercase),
            (self.has_special_char, Requirement::SpecialChar),
            (self.has_number, Requirement::Digit),
        ]
        .into_iter()
        .filter_map(|(ok, req)| (!ok).then_some(req))
        .collect()
    }
}

// ============================================================================
// Client
// ============================================================================

#[derive(Serialize)]
struct LoginRequest<'a> {
    username: &'a str,
    password: &'a str,
}

#[derive(Serialize)]
struct SignupRequest<'a> {
    username: &'a str,
    email: &'a str,
    password: &'a str,
}

#[derive(Deserialize)]
struct LoginResponse {
    token: String,
}

#[derive(Debug, Clone)]
pub struct AuthClient {
    client: reqwest::Client,
    base_url: String,
}

impl AuthClient {
    pub fn new(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
        }
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url.trim_end_matches('/'), path)
    }

    async fn post(&self, path: &str, body: Vec<u8>) -> Result<reqwest::Response, AuthError> {
        let request = self
            .client
            .post(self.endpoint(path))
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .body(body);

        tokio::time::timeout(REQUEST_TIMEOUT, request.send())
            .await
            .map_err(|_| AuthError::Timeout)?
            .map_err(AuthError::Network)
    }

    /// Exchange username and password for a session token.
    pub async fn login(
        &self,
        username: &str,
        password: &SecretString,
    ) -> Result<StoredCredential, AuthError> {
        let body = serde_json::to_vec(&LoginRequest {
            username,
            password: password.expose_secret(),
        })
        .map_err(|e| AuthError::Malformed(e.to_string()))?;

        let response = self.post("login", body).await?;
        let status = response.status();
        if status == reqwest::StatusCode::UNAUTHORIZED
            || status == reqwest::StatusCode::BAD_REQUEST
            || status == reqwest::StatusCode::NOT_FOUND
        {
            return Err(AuthError::InvalidCredentials);
        }
        if !status.is_success() {
            return Err(AuthError::HttpStatus(status.as_u16()));
        }

        let bytes = read_limited_bytes(response, MAX_RESPONSE_SIZE).await?;
        let parsed: LoginResponse =
            serde_json::from_slice(&bytes).map_err(|e| AuthError::Malformed(e.to_string()))?;
        if parsed.token.is_empty() {
            return Err(AuthError::Malformed("empty token".to_string()));
        }

        tracing::info!(username, "Logged in");
        Ok(StoredCredential {
            username: username.to_string(),
            token: SecretString::from(parsed.token),
        })
    }

    /// Create an account. Password rules are checked before any request.
    pub async fn signup(
        &self,
        username: &str,
        email: &str,
        password: &SecretString,
    ) -> Result<(), AuthError> {
        let requirements = PasswordRequirements::check(password.expose_secret());
        if !requirements.is_met() {
            return Err(AuthError::WeakPassword(requirements.missing()));
        }

        let body = serde_json::to_vec(&SignupRequest {
            username,
            email,
            password: password.expose_secret(),
        })
        .map_err(|e| AuthError::Malformed(e.to_string()))?;

        let response = self.post("signup", body).await?;
        if !response.status().is_success() {
            return Err(AuthError::HttpStatus(response.status().as_u16()));
        }

        tracing::info!(username, "Signed up");
        Ok(())
    }
}
