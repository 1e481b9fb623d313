//! Configuration file parser for `config.toml`.
//!
//! The config file is optional; a missing file yields `Config::default()`.
//! Unknown keys are ignored by serde, though we log a warning for each one in
//! case it is a typo. `CONTENT_MODE_SECRET` in the environment takes precedence
//! over `content_mode_secret` in the file.
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Deserializer};
use std::path::Path;
use thiserror::Error;

/// Environment variable holding the content-mode token.
pub const CONTENT_MODE_SECRET_ENV: &str = "CONTENT_MODE_SECRET";

// ============================================================================
// Error Types
// ============================================================================

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid TOML in config file: {0}")]
    Parse(#[from] toml::de::Error),

    /// Config file exceeds maximum allowed size.
    #[error("Config file too large: {0}")]
    TooLarge(String),

    /// An upstream URL setting is not an absolute http(s) URL.
    #[error("Invalid URL for `{field}`: {reason}")]
    InvalidUrl { field: &'static str, reason: String },
}

// ============================================================================
// Configuration Structs
// ============================================================================

/// Channel-level metadata written into every generated feed.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct FeedMetadata {
    pub title: String,
    pub description: String,
    /// Channel link; also identifies the feed.
    pub link: String,
    pub language: String,
    /// Channel image (logo) URL.
    pub image: String,
    pub copyright: String,
    pub author_name: String,
    pub author_email: String,
}

impl Default for FeedMetadata {
    fn default() -> Self {
        Self {
            title: "STUST 布告欄 RSS".to_string(),
            description: "南臺科技大學布告欄最新消息".to_string(),
            link: DEFAULT_LISTING_URL.to_string(),
            language: "zh-TW".to_string(),
            image: "https://www.stust.edu.tw/tc/images/about/logo.png".to_string(),
            copyright: "All rights reserved 2025, 小麥".to_string(),
            author_name: "小麥".to_string(),
            author_email: "a302854888@gmail.com".to_string(),
        }
    }
}

const DEFAULT_LISTING_URL: &str = "https://news.stust.edu.tw/User/RwdNewsList.aspx";

/// Top-level service configuration.
///
/// All fields use `#[serde(default)]` so any subset of keys can be specified.
///
/// Custom Debug impl masks `content_mode_secret` so it never reaches logs.
#[derive(Deserialize)]
#[serde(default)]
pub struct Config {
    /// Socket address the HTTP server binds to.
    pub bind_address: String,

    /// The bulletin listing page.
    pub listing_url: String,

    /// Absolute base that replaces the listing's leading `../` in announcement links.
    pub base_url: String,

    /// Per-request timeout for upstream fetches, in seconds.
    pub request_timeout_secs: u64,

    /// Token that enables content-mode when sent in the `content-mode-token` header.
    #[serde(deserialize_with = "deserialize_secret")]
    pub content_mode_secret: Option<SecretString>,

    pub feed: FeedMetadata,
}

fn deserialize_secret<'de, D>(deserializer: D) -> Result<Option<SecretString>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.map(SecretString::from))
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind_address: "127.0.0.1:8787".to_string(),
            listing_url: DEFAULT_LISTING_URL.to_string(),
            base_url: "https://news.stust.edu.tw/".to_string(),
            request_timeout_secs: 30,
            content_mode_secret: None,
            feed: FeedMetadata::default(),
        }
    }
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("bind_address", &self.bind_address)
            .field("listing_url", &self.listing_url)
            .field("base_url", &self.base_url)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field(
                "content_mode_secret",
                &self.content_mode_secret.as_ref().map(|_| "[REDACTED]"),
            )
            .field("feed", &self.feed)
            .finish()
    }
}

impl Config {
    /// Maximum config file size (1 MB).
    const MAX_FILE_SIZE: u64 = 1_048_576;

    /// Load configuration from a TOML file, then apply environment overrides.
    ///
    /// - Missing file → defaults
    /// - Empty file → defaults
    /// - Invalid TOML → `Err(ConfigError::Parse)` with line number info
    /// - Unknown keys → accepted, logged as warning
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let secret_from_env = std::env::var(CONTENT_MODE_SECRET_ENV).ok();
        let config = Self::load_file(path)?;
        Ok(config.with_secret_override(secret_from_env))
    }

    fn load_file(path: &Path) -> Result<Self, ConfigError> {
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
                tracing::debug!(path = %path.display(), "Config file disappeared, using defaults");
                return Ok(Self::default());
            }
            Err(e) => return Err(ConfigError::Io(e)),
        };

        if content.trim().is_empty() {
            tracing::debug!(path = %path.display(), "Config file is empty, using defaults");
            return Ok(Self::default());
        }

        if let Ok(raw) = content.parse::<toml::Table>() {
            let known_keys = [
                "bind_address",
                "listing_url",
                "base_url",
                "request_timeout_secs",
                "content_mode_secret",
                "feed",
            ];
            for key in raw.keys() {
                if !known_keys.contains(&key.as_str()) {
                    tracing::warn!(key = %key, "Unknown key in config file, ignoring");
                }
            }
        }

        let config: Config = toml::from_str(&content)?;
        config.validate_urls()?;
        tracing::info!(path = %path.display(), listing_url = %config.listing_url, "Loaded configuration");
        Ok(config)
    }

    /// Rejects upstream URLs that reqwest could never fetch.
    ///
    /// `base_url` is prefixed verbatim onto relative hrefs, so it must also end
    /// with `/`.
    fn validate_urls(&self) -> Result<(), ConfigError> {
        for (field, value) in [("listing_url", &self.listing_url), ("base_url", &self.base_url)] {
            let parsed = url::Url::parse(value).map_err(|e| ConfigError::InvalidUrl {
                field,
                reason: e.to_string(),
            })?;
            if !matches!(parsed.scheme(), "http" | "https") {
                return Err(ConfigError::InvalidUrl {
                    field,
                    reason: format!("unsupported scheme '{}'", parsed.scheme()),
                });
            }
        }
        if !self.base_url.ends_with('/') {
            return Err(ConfigError::InvalidUrl {
                field: "base_url",
                reason: "must end with '/'".to_string(),
            });
        }
        Ok(())
    }

    /// Applies the environment secret (if any) and discards empty secrets.
    fn with_secret_override(mut self, secret_from_env: Option<String>) -> Self {
        if let Some(secret) = secret_from_env {
            self.content_mode_secret = Some(SecretString::from(secret));
        }
        if self
            .content_mode_secret
            .as_ref()
            .is_some_and(|s| s.expose_secret().is_empty())
        {
            tracing::warn!("Empty content-mode secret configured, content-mode disabled");
            self.content_mode_secret = None;
        }
        if self.content_mode_secret.is_none() {
            tracing::info!("No content-mode secret configured, feeds will omit page content");
        }
        self
    }

    /// Whether `token` unlocks content-mode. Plain equality: this is a feature
    /// switch, not an authentication boundary.
    pub fn content_mode_enabled(&self, token: Option<&str>) -> bool {
        match (&self.content_mode_secret, token) {
            (Some(secret), Some(token)) => secret.expose_secret() == token,
            _ => false,
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
