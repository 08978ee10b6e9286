//! Signed-in user and the on-disk credential store.
//!
//! The credential is opaque to the dashboard: its presence is what admits a
//! user, its contents are never inspected.

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

// ============================================================================
// Session Gate
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub username: String,
}

/// Outcome of checking whether the dashboard may run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Admission {
    Allow,
    /// No signed-in user; show the entry screen instead.
    Redirect,
}

pub fn admit(user: Option<&User>) -> Admission {
    match user {
        Some(_) => Admission::Allow,
        None => Admission::Redirect,
    }
}

#[derive(Debug, Clone, Default)]
pub struct Session {
    pub user: Option<User>,
}

impl Session {
    pub fn signed_in(username: impl Into<String>) -> Self {
        Self {
            user: Some(User {
                username: username.into(),
            }),
        }
    }

    pub fn admit(&self) -> Admission {
        admit(self.user.as_ref())
    }

    pub fn clear(&mut self) {
        self.user = None;
    }
}

// ============================================================================
// Credential Store
// ============================================================================

#[derive(Debug, Error)]
pub enum CredentialError {
    #[error("Failed to access credential file: {0}")]
    Io(#[from] std::io::Error),
    #[error("Corrupt credential file: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("Failed to encode credentials: {0}")]
    Encode(#[from] toml::ser::Error),
}

/// Token plus the username it was issued for.
pub struct StoredCredential {
    pub username: String,
    pub token: SecretString,
}

impl std::fmt::Debug for StoredCredential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StoredCredential")
            .field("username", &self.username)
            .field("token", &"[REDACTED]")
            .finish()
    }
}

#[derive(Serialize, Deserialize)]
struct CredentialFile {
    username: String,
    token: String,
}

/// Credential persisted at `~/.config/newsfeed/session.toml`.
#[derive(Debug, Clone)]
pub struct CredentialStore {
    path: PathBuf,
}

impl CredentialStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the stored credential. A missing file means signed out.
    pub fn load(&self) -> Result<Option<StoredCredential>, CredentialError> {
        let content = match std::fs::read_to_string(&self.path) {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        let file: CredentialFile = toml::from_str(&content)?;
        if file.token.is_empty() {
            return Ok(None);
        }
        Ok(Some(StoredCredential {
            username: file.username,
            token: SecretString::from(file.token),
        }))
    }

    /// Persist a credential, readable by the owner only.
    pub fn save(&self, credential: &StoredCredential) -> Result<(), CredentialError> {
        let encoded = toml::to_string(&CredentialFile {
            username: credential.username.clone(),
            token: credential.token.expose_secret().to_string(),
        })?;

        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&self.path, encoded)?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            std::fs::set_permissions(&self.path, std::fs::Permissions::from_mode(0o600))?;
        }

        tracing::info!(username = %credential.username, "Saved credentials");
        Ok(())
    }

    /// Remove the stored credential. Already absent is not an error.
    pub fn clear(&self) -> Result<(), CredentialError> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => {
                tracing::info!(path = %self.path.display(), "Cleared credentials");
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    /// Session for whatever is currently stored; corrupt files count as
    /// signed out.
    pub fn session(&self) -> Session {
        match self.load() {
            Ok(Some(cred)) => Session::signed_in(cred.username),
            Ok(None) => Session::default(),
            Err(e) => {
                tracing::warn!(error = %e, "Ignoring unreadable credential file");
                Session::default()
            }
        }
    }
}
