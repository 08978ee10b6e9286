//! Configuration file parser for ~/.config/newsfeed/config.toml.
//!
//! The config file is optional: a missing or empty file yields
//! `Config::default()`. Unknown keys are accepted but logged as warnings so
//! typos don't go unnoticed.
use secrecy::SecretString;
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;
use thiserror::Error;

/// Env var that overrides `translate_api_key` from the config file.
pub const TRANSLATE_KEY_ENV: &str = "NEWSFEED_TRANSLATE_API_KEY";

// ============================================================================
// Error Types
// ============================================================================

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid TOML in config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Config file too large: {0}")]
    TooLarge(String),
}

// ============================================================================
// Configuration Structs
// ============================================================================

/// Top-level application configuration.
///
/// Every field has a default, so any subset of keys may be given.
/// `translate_api_key` is masked in Debug output.
#[derive(Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    /// "light" or "dark".
    pub theme: String,

    /// Category shown on startup (e.g. "Technology").
    pub default_category: String,

    /// Language code shown on startup (e.g. "en", "fr").
    pub default_language: String,

    /// Headlines requested per fetch.
    pub page_size: u32,

    /// Maximum translation requests in flight.
    pub translation_concurrency: usize,

    pub headlines_base_url: String,
    pub translate_base_url: String,
    pub auth_base_url: String,

    /// Translation service key. `NEWSFEED_TRANSLATE_API_KEY` takes precedence.
    pub translate_api_key: Option<String>,

    /// Keybinding overrides. Keys are action names, values are key strings.
    pub keybindings: HashMap<String, String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            theme: "light".to_string(),
            default_category: "General".to_string(),
            default_language: "en".to_string(),
            page_size: crate::feed::DEFAULT_PAGE_SIZE,
            translation_concurrency: crate::translate::DEFAULT_CONCURRENCY,
            headlines_base_url: "https://news-aggregator-backend-h2br.onrender.com".to_string(),
            translate_base_url: "https://translation.googleapis.com/language/translate/v2"
                .to_string(),
            auth_base_url: "https://news-aggregator-login-backend.onrender.com".to_string(),
            translate_api_key: None,
            keybindings: HashMap::new(),
        }
    }
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("theme", &self.theme)
            .field("default_category", &self.default_category)
            .field("default_language", &self.default_language)
            .field("page_size", &self.page_size)
            .field("translation_concurrency", &self.translation_concurrency)
            .field("headlines_base_url", &self.headlines_base_url)
            .field("translate_base_url", &self.translate_base_url)
            .field("auth_base_url", &self.auth_base_url)
            .field(
                "translate_api_key",
                &self.translate_api_key.as_ref().map(|_| "[REDACTED]"),
            )
            .field("keybindings", &self.keybindings)
            .finish()
    }
}

impl Config {
    /// Maximum config file size (1 MB).
    const MAX_FILE_SIZE: u64 = 1_048_576;

    const KNOWN_KEYS: [&'static str; 10] = [
        "theme",
        "default_category",
        "default_language",
        "page_size",
        "translation_concurrency",
        "headlines_base_url",
        "translate_base_url",
        "auth_base_url",
        "translate_api_key",
        "keybindings",
    ];

    /// Load configuration from a TOML file.
    ///
    /// - Missing file → `Ok(Config::default())`
    /// - Empty file → `Ok(Config::default())`
    /// - Invalid TOML → `Err(ConfigError::Parse)` with line number info
    /// - Unknown keys → accepted, logged as warning
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        match std::fs::metadata(path) {
            Ok(meta) if meta.len() > Self::MAX_FILE_SIZE => {
                return Err(ConfigError::TooLarge(format!(
                    "Config file is {} bytes (max {} bytes)",
                    meta.len(),
                    Self::MAX_FILE_SIZE
                )));
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "No config file found, using defaults");
                return Ok(Self::default());
            }
            Err(e) => return Err(ConfigError::Io(e)),
            Ok(_) => {}
        }

        let content = match std::fs::read_to_string(path) {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Ok(Self::default());
            }
            Err(e) => return Err(ConfigError::Io(e)),
        };

        Self::parse(&content)
    }

    /// Parse config from TOML text.
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }

        if let Ok(raw) = content.parse::<toml::Table>() {
            for key in raw.keys() {
                if !Self::KNOWN_KEYS.contains(&key.as_str()) {
                    tracing::warn!(key = %key, "Unknown key in config file, ignoring");
                }
            }
        }

        let config: Config = toml::from_str(content)?;
        tracing::info!(theme = %config.theme, "Loaded configuration");
        Ok(config)
    }

    /// Resolve the translation key: env var first, then config file.
    pub fn translate_key(&self) -> Option<SecretString> {
        let from_env = std::env::var(TRANSLATE_KEY_ENV).ok();
        self.translate_key_with(from_env)
    }

    fn translate_key_with(&self, from_env: Option<String>) -> Option<SecretString> {
        from_env
            .filter(|k| !k.trim().is_empty())
            .or_else(|| self.translate_api_key.clone())
            .filter(|k| !k.trim().is_empty())
            .map(SecretString::from)
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::ExposeSecret;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.theme, "light");
        assert_eq!(config.default_category, "General");
        assert_eq!(config.default_language, "en");
        assert_eq!(config.page_size, 80);
        assert_eq!(config.translation_concurrency, 8);
        assert!(config.keybindings.is_empty());
        assert!(config.translate_api_key.is_none());
    }

    #[test]
    fn test_missing_file_returns_default() {
        let path = Path::new("/tmp/newsfeed_test_nonexistent_config.toml");
        let config = Config::load(path).unwrap();
        assert_eq!(config.theme, "light");
    }

    #[test]
    fn test_empty_file_returns_default() {
        let dir = std::env::temp_dir().join("newsfeed_config_test_empty");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("config.toml");
        std::fs::write(&path, "  \n").unwrap();

        let config = Config::load(&path).unwrap();
        assert_eq!(config.page_size, 80);

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_partial_config_uses_defaults_for_missing() {
        let config = Config::parse("theme = \"dark\"\ndefault_language = \"fr\"\n").unwrap();
        assert_eq!(config.theme, "dark");
        assert_eq!(config.default_language, "fr");
        assert_eq!(config.default_category, "General");
        assert_eq!(config.translation_concurrency, 8);
    }

    #[test]
    fn test_full_config() {
        let content = r#"
theme = "dark"
default_category = "Sports"
default_language = "de"
page_size = 40
translation_concurrency = 2
headlines_base_url = "http://localhost:9000"
translate_base_url = "http://localhost:9001/translate"
auth_base_url = "http://localhost:9002"
translate_api_key = "test-key-123"

[keybindings]
quit = "Ctrl+q"
refresh = "F5"
"#;
        let config = Config::parse(content).unwrap();
        assert_eq!(config.default_category, "Sports");
        assert_eq!(config.page_size, 40);
        assert_eq!(config.translation_concurrency, 2);
        assert_eq!(config.auth_base_url, "http://localhost:9002");
        assert_eq!(config.translate_api_key.as_deref(), Some("test-key-123"));
        assert_eq!(
            config.keybindings.get("refresh").map(String::as_str),
            Some("F5")
        );
    }

    #[test]
    fn test_invalid_toml_is_error() {
        let result = Config::parse("theme = [unterminated");
        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_unknown_keys_are_accepted() {
        let config = Config::parse("them = \"dark\"\n").unwrap();
        assert_eq!(config.theme, "light");
    }

    #[test]
    fn test_too_large_file_rejected() {
        let dir = std::env::temp_dir().join("newsfeed_config_test_large");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("config.toml");
        let padding = "#".repeat(Config::MAX_FILE_SIZE as usize + 1);
        std::fs::write(&path, padding).unwrap();

        assert!(matches!(Config::load(&path), Err(ConfigError::TooLarge(_))));

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_debug_masks_api_key() {
        let config = Config {
            translate_api_key: Some("super-secret".to_string()),
            ..Default::default()
        };
        let debug = format!("{:?}", config);
        assert!(!debug.contains("super-secret"));
        assert!(debug.contains("[REDACTED]"));
    }

    #[test]
    fn test_env_key_takes_precedence() {
        let config = Config {
            translate_api_key: Some("from-file".to_string()),
            ..Default::default()
        };
        let key = config.translate_key_with(Some("from-env".to_string())).unwrap();
        assert_eq!(key.expose_secret(), "from-env");

        let key = config.translate_key_with(None).unwrap();
        assert_eq!(key.expose_secret(), "from-file");

        let blank = Config {
            translate_api_key: Some(" ".to_string()),
            ..Default::default()
        };
        assert!(blank.translate_key_with(Some(String::new())).is_none());
    }
}
