//! Configuration file parser for the bridge (TOML).
//!
//! The config file is optional; a missing file yields `Config::default()`.
//! Unknown keys are ignored by serde, though we log a warning for each one
//! since they are usually typos.
use crate::feed::cache::{DEFAULT_CAPACITY, DEFAULT_TTL};
use crate::feed::DEFAULT_TIMEOUT;
use secrecy::SecretString;
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

/// Environment variable that overrides `secret` from the file
pub const SECRET_ENV_VAR: &str = "FEEDBRIDGE_SECRET";

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

    /// Neither the file nor the environment provides a secret.
    #[error("No identity secret configured (set `secret` or FEEDBRIDGE_SECRET)")]
    MissingSecret,
}

// ============================================================================
// Configuration Structs
// ============================================================================

/// Bridge configuration.
///
/// All fields use `#[serde(default)]` so any subset of keys can be specified.
/// Missing keys fall back to `Default::default()`.
///
/// Custom Debug impl masks `secret`: every feed identity is derived from it.
#[derive(Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Process-wide secret all feed keys are derived from.
    /// The `FEEDBRIDGE_SECRET` env var takes precedence.
    pub secret: Option<String>,

    /// Per-request timeout in seconds for probes and fetches.
    pub timeout_secs: u64,

    /// Maximum number of parsed feeds kept in memory.
    pub cache_capacity: usize,

    /// Minutes a parsed feed stays fresh in the cache.
    pub cache_ttl_minutes: u64,

    /// Maximum number of feeds checked at the same time.
    pub concurrency: usize,

    /// User-Agent header sent with every request.
    pub user_agent: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            secret: None,
            timeout_secs: DEFAULT_TIMEOUT.as_secs(),
            cache_capacity: DEFAULT_CAPACITY,
            cache_ttl_minutes: DEFAULT_TTL.as_secs() / 60,
            concurrency: 10,
            user_agent: concat!("feedbridge/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

/// Mask the secret in Debug output to prevent leakage into logs.
impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("secret", &self.secret.as_ref().map(|_| "[REDACTED]"))
            .field("timeout_secs", &self.timeout_secs)
            .field("cache_capacity", &self.cache_capacity)
            .field("cache_ttl_minutes", &self.cache_ttl_minutes)
            .field("concurrency", &self.concurrency)
            .field("user_agent", &self.user_agent)
            .finish()
    }
}

impl Config {
    /// Maximum config file size (1 MB).
    const MAX_FILE_SIZE: u64 = 1_048_576;

    const KNOWN_KEYS: [&'static str; 6] = [
        "secret",
        "timeout_secs",
        "cache_capacity",
        "cache_ttl_minutes",
        "concurrency",
        "user_agent",
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
                // File deleted between metadata and read
                tracing::debug!(path = %path.display(), "Config file disappeared, using defaults");
                return Ok(Self::default());
            }
            Err(e) => return Err(ConfigError::Io(e)),
        };

        Self::parse(&content)
    }

    /// Parse configuration from TOML text.
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
        tracing::info!(
            timeout_secs = config.timeout_secs,
            cache_capacity = config.cache_capacity,
            "Loaded configuration"
        );
        Ok(config)
    }

    /// Returns the identity secret, preferring `FEEDBRIDGE_SECRET` over the
    /// file.
    ///
    /// # Errors
    ///
    /// [`ConfigError::MissingSecret`] when neither source provides a
    /// non-empty value.
    pub fn secret(&self) -> Result<SecretString, ConfigError> {
        Self::pick_secret(std::env::var(SECRET_ENV_VAR).ok(), self.secret.clone())
    }

    fn pick_secret(
        env: Option<String>,
        file: Option<String>,
    ) -> Result<SecretString, ConfigError> {
        env.filter(|s| !s.is_empty())
            .or(file.filter(|s| !s.is_empty()))
            .map(SecretString::from)
            .ok_or(ConfigError::MissingSecret)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs.max(1))
    }

    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_minutes.saturating_mul(60))
    }
}

// ============================================================================
// Tests
// ============================================================================
