//! Catalog configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Mode
//! - `ECLAT_OFFLINE_MODE` - `true` to use local storage instead of the remote
//!   service (default: `false`)
//!
//! ## Required when online
//! - `ECLAT_BACKEND_URL` - Base URL of the hosted backend (tables, storage, auth)
//! - `ECLAT_BACKEND_API_KEY` - API key sent with every backend request
//!
//! ## Required when offline
//! - `ECLAT_OFFLINE_ADMIN_TOKEN` - Bearer token granting the admin role
//!
//! ## Optional
//! - `ECLAT_STORAGE_BUCKET` - Object storage bucket for images (default: product-images)
//! - `ECLAT_LOCAL_STORE_DIR` - Directory for local storage (default: .eclat-store)
//! - `ECLAT_HTTP_TIMEOUT_SECS` - Remote request timeout (default: 15)

use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};
use thiserror::Error;
use url::Url;

use crate::mode::BackendMode;

const DEFAULT_STORAGE_BUCKET: &str = "product-images";
const DEFAULT_LOCAL_STORE_DIR: &str = ".eclat-store";
const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 15;
const MIN_TOKEN_LENGTH: usize = 24;
const MIN_ENTROPY_BITS_PER_CHAR: f64 = 3.3;

/// Blocklist of common placeholder patterns (case-insensitive)
const PLACEHOLDER_PATTERNS: &[&str] = &[
    "your-",
    "changeme",
    "replace",
    "placeholder",
    "example",
    "password",
    "xxx",
    "todo",
    "admin-token",
];

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
    #[error("Insecure secret in {0}: {1}")]
    InsecureSecret(String, String),
}

/// Catalog configuration.
#[derive(Debug, Clone)]
pub struct CatalogConfig {
    /// Backing store selection and its settings
    pub backend: BackendConfig,
    /// Directory holding local storage (offline data and search history)
    pub local_store_dir: PathBuf,
    /// Timeout applied to every remote request
    pub http_timeout: Duration,
}

/// Backing-store specific settings.
///
/// The variant is the mode: there is no way to build an online
/// configuration without remote credentials.
#[derive(Debug, Clone)]
pub enum BackendConfig {
    /// Hosted backend service.
    Remote(RemoteConfig),
    /// Local persistent storage.
    Local(OfflineConfig),
}

/// Hosted backend configuration.
///
/// Implements `Debug` manually to redact the API key.
#[derive(Clone)]
pub struct RemoteConfig {
    /// Base URL (e.g. `https://abc.backend.example`)
    pub base_url: Url,
    /// API key sent as `apikey` and bearer token
    pub api_key: SecretString,
    /// Bucket holding product images
    pub storage_bucket: String,
}

impl std::fmt::Debug for RemoteConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RemoteConfig")
            .field("base_url", &self.base_url.as_str())
            .field("api_key", &"[REDACTED]")
            .field("storage_bucket", &self.storage_bucket)
            .finish()
    }
}

/// Offline mode configuration.
#[derive(Clone)]
pub struct OfflineConfig {
    /// Bearer token that grants the admin role offline
    pub admin_token: SecretString,
}

impl std::fmt::Debug for OfflineConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OfflineConfig")
            .field("admin_token", &"[REDACTED]")
            .finish()
    }
}

impl CatalogConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or invalid, or
    /// if the offline admin token fails validation.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();
        Self::from_lookup(&|key| std::env::var(key).ok())
    }

    /// Load configuration from an in-memory map of variables.
    ///
    /// # Errors
    ///
    /// Same as [`CatalogConfig::from_env`].
    pub fn from_vars(vars: &HashMap<String, String>) -> Result<Self, ConfigError> {
        Self::from_lookup(&|key| vars.get(key).cloned())
    }

    fn from_lookup(lookup: &dyn Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mode = lookup("ECLAT_OFFLINE_MODE")
            .map_or(Ok(BackendMode::Remote), |v| BackendMode::from_offline_flag(&v))
            .map_err(|e| ConfigError::InvalidEnvVar("ECLAT_OFFLINE_MODE".to_string(), e))?;

        let backend = match mode {
            BackendMode::Remote => BackendConfig::Remote(RemoteConfig::from_lookup(lookup)?),
            BackendMode::Local => BackendConfig::Local(OfflineConfig::from_lookup(lookup)?),
        };

        let local_store_dir = PathBuf::from(
            lookup("ECLAT_LOCAL_STORE_DIR").unwrap_or_else(|| DEFAULT_LOCAL_STORE_DIR.to_string()),
        );

        let http_timeout = match lookup("ECLAT_HTTP_TIMEOUT_SECS") {
            Some(raw) => raw.parse::<u64>().map(Duration::from_secs).map_err(|e| {
                ConfigError::InvalidEnvVar("ECLAT_HTTP_TIMEOUT_SECS".to_string(), e.to_string())
            })?,
            None => Duration::from_secs(DEFAULT_HTTP_TIMEOUT_SECS),
        };

        Ok(Self {
            backend,
            local_store_dir,
            http_timeout,
        })
    }

    /// The backing-store mode this configuration selects.
    #[must_use]
    pub const fn mode(&self) -> BackendMode {
        match self.backend {
            BackendConfig::Remote(_) => BackendMode::Remote,
            BackendConfig::Local(_) => BackendMode::Local,
        }
    }
}

impl RemoteConfig {
    fn from_lookup(lookup: &dyn Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let raw_url = required(lookup, "ECLAT_BACKEND_URL")?;
        let base_url = Url::parse(&raw_url)
            .map_err(|e| ConfigError::InvalidEnvVar("ECLAT_BACKEND_URL".to_string(), e.to_string()))?;
        if !matches!(base_url.scheme(), "http" | "https") {
            return Err(ConfigError::InvalidEnvVar(
                "ECLAT_BACKEND_URL".to_string(),
                format!("unsupported scheme {}", base_url.scheme()),
            ));
        }

        Ok(Self {
            base_url,
            api_key: SecretString::from(required(lookup, "ECLAT_BACKEND_API_KEY")?),
            storage_bucket: lookup("ECLAT_STORAGE_BUCKET")
                .unwrap_or_else(|| DEFAULT_STORAGE_BUCKET.to_string()),
        })
    }
}

impl OfflineConfig {
    fn from_lookup(lookup: &dyn Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let token = SecretString::from(required(lookup, "ECLAT_OFFLINE_ADMIN_TOKEN")?);
        validate_token(&token, "ECLAT_OFFLINE_ADMIN_TOKEN")?;
        Ok(Self { admin_token: token })
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get a required variable.
fn required(lookup: &dyn Fn(&str) -> Option<String>, key: &str) -> Result<String, ConfigError> {
    lookup(key)
        .filter(|v| !v.trim().is_empty())
        .ok_or_else(|| ConfigError::MissingEnvVar(key.to_string()))
}

/// Calculate Shannon entropy in bits per character.
fn shannon_entropy(s: &str) -> f64 {
    if s.is_empty() {
        return 0.0;
    }

    let mut freq: HashMap<char, usize> = HashMap::new();
    for c in s.chars() {
        *freq.entry(c).or_insert(0) += 1;
    }

    #[allow(clippy::cast_precision_loss)] // String length will never exceed f64 precision
    let len = s.chars().count() as f64;
    freq.values()
        .map(|&count| {
            #[allow(clippy::cast_precision_loss)] // Character count will never exceed f64 precision
            let p = count as f64 / len;
            -p * p.log2()
        })
        .sum()
}

/// Validate that a token is long, not a placeholder, and has sufficient entropy.
fn validate_token(token: &SecretString, var_name: &str) -> Result<(), ConfigError> {
    let value = token.expose_secret();
    if value.chars().count() < MIN_TOKEN_LENGTH {
        return Err(ConfigError::InsecureSecret(
            var_name.to_string(),
            format!("must be at least {MIN_TOKEN_LENGTH} characters"),
        ));
    }

    let lower = value.to_lowercase();
    if let Some(pattern) = PLACEHOLDER_PATTERNS.iter().find(|p| lower.contains(*p)) {
        return Err(ConfigError::InsecureSecret(
            var_name.to_string(),
            format!("appears to be a placeholder (contains '{pattern}')"),
        ));
    }

    let entropy = shannon_entropy(value);
    if entropy < MIN_ENTROPY_BITS_PER_CHAR {
        return Err(ConfigError::InsecureSecret(
            var_name.to_string(),
            format!(
                "entropy too low ({entropy:.2} bits/char, need >= {MIN_ENTROPY_BITS_PER_CHAR:.1}). Use a randomly generated token."
            ),
        ));
    }

    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    const GOOD_TOKEN: &str = "aB3$xY9!mK2@nL5#pQ7&rT0*uW4^zC6";

    fn vars(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect()
    }

    #[test]
    fn test_defaults_to_remote_mode() {
        let config = CatalogConfig::from_vars(&vars(&[
            ("ECLAT_BACKEND_URL", "https://abc.backend.example"),
            ("ECLAT_BACKEND_API_KEY", "key"),
        ]))
        .unwrap();

        assert_eq!(config.mode(), BackendMode::Remote);
        assert_eq!(config.local_store_dir, PathBuf::from(".eclat-store"));
        assert_eq!(config.http_timeout, Duration::from_secs(15));
        let BackendConfig::Remote(remote) = config.backend else {
            panic!("expected remote backend");
        };
        assert_eq!(remote.storage_bucket, "product-images");
    }

    #[test]
    fn test_remote_requires_credentials() {
        let err = CatalogConfig::from_vars(&vars(&[("ECLAT_BACKEND_URL", "https://x.example")]))
            .unwrap_err();
        assert!(matches!(err, ConfigError::MissingEnvVar(ref k) if k == "ECLAT_BACKEND_API_KEY"));
    }

    #[test]
    fn test_remote_rejects_bad_url() {
        let err = CatalogConfig::from_vars(&vars(&[
            ("ECLAT_BACKEND_URL", "ftp://x.example"),
            ("ECLAT_BACKEND_API_KEY", "key"),
        ]))
        .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEnvVar(_, _)));
    }

    #[test]
    fn test_offline_mode_needs_no_remote_settings() {
        let config = CatalogConfig::from_vars(&vars(&[
            ("ECLAT_OFFLINE_MODE", "true"),
            ("ECLAT_OFFLINE_ADMIN_TOKEN", GOOD_TOKEN),
            ("ECLAT_LOCAL_STORE_DIR", "/tmp/eclat"),
        ]))
        .unwrap();
        assert_eq!(config.mode(), BackendMode::Local);
        assert_eq!(config.local_store_dir, PathBuf::from("/tmp/eclat"));
    }

    #[test]
    fn test_offline_token_rejects_placeholder() {
        let err = CatalogConfig::from_vars(&vars(&[
            ("ECLAT_OFFLINE_MODE", "1"),
            ("ECLAT_OFFLINE_ADMIN_TOKEN", "changeme-changeme-changeme-123"),
        ]))
        .unwrap_err();
        assert!(matches!(err, ConfigError::InsecureSecret(_, _)));
    }

    #[test]
    fn test_offline_token_rejects_low_entropy() {
        let token = SecretString::from("a".repeat(40));
        assert!(validate_token(&token, "T").is_err());
    }

    #[test]
    fn test_invalid_timeout() {
        let err = CatalogConfig::from_vars(&vars(&[
            ("ECLAT_OFFLINE_MODE", "true"),
            ("ECLAT_OFFLINE_ADMIN_TOKEN", GOOD_TOKEN),
            ("ECLAT_HTTP_TIMEOUT_SECS", "soon"),
        ]))
        .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEnvVar(ref k, _) if k == "ECLAT_HTTP_TIMEOUT_SECS"));
    }

    #[test]
    fn test_shannon_entropy() {
        assert!((shannon_entropy("") - 0.0).abs() < f64::EPSILON);
        assert!((shannon_entropy("ab") - 1.0).abs() < 0.01);
        assert!(shannon_entropy(GOOD_TOKEN) > 3.3);
    }

    #[test]
    fn test_remote_config_debug_redacts_key() {
        let config = RemoteConfig {
            base_url: Url::parse("https://abc.backend.example").unwrap(),
            api_key: SecretString::from("super_secret_api_key"),
            storage_bucket: "product-images".to_string(),
        };
        let debug_output = format!("{config:?}");
        assert!(debug_output.contains("abc.backend.example"));
        assert!(debug_output.contains("[REDACTED]"));
        assert!(!debug_output.contains("super_secret_api_key"));
    }
}
