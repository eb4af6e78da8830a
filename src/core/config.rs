use crate::core::errors::KeyError;
use crate::crypto::random::RetryPolicy;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

pub const ENV_KEYGEN_MAX_ATTEMPTS: &str = "ION_KEYS_KEYGEN_MAX_ATTEMPTS";
pub const ENV_COMPRESSED: &str = "ION_KEYS_COMPRESSED";
pub const ENV_LOG: &str = "ION_KEYS_LOG";

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// `tracing` filter directive used when `RUST_LOG` is unset
    #[serde(default = "LoggingConfig::default_filter")]
    pub filter: String,
}

impl LoggingConfig {
    fn default_filter() -> String {
        "info".to_string()
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self { filter: Self::default_filter() }
    }
}

/// Key core configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyCoreConfig {
    /// Retry budget for private key generation
    #[serde(default)]
    pub keygen: RetryPolicy,

    /// Compression flag for freshly generated keys
    #[serde(default = "KeyCoreConfig::default_compressed")]
    pub compressed_by_default: bool,

    #[serde(default)]
    pub logging: LoggingConfig,
}

impl KeyCoreConfig {
    fn default_compressed() -> bool {
        true
    }

    pub fn from_toml_str(s: &str) -> Result<Self, KeyError> {
        Ok(toml::from_str(s)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, KeyError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .map_err(|e| KeyError::Config(format!("{}: {}", path.display(), e)))?;
        Self::from_toml_str(&content)
    }

    /// Apply `ION_KEYS_*` environment overrides on top of this config.
    pub fn from_env_overrides(self) -> Result<Self, KeyError> {
        self.with_overrides(|name| std::env::var(name).ok())
    }

    fn with_overrides<F>(mut self, lookup: F) -> Result<Self, KeyError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(v) = lookup(ENV_KEYGEN_MAX_ATTEMPTS) {
            let attempts: u32 = v.trim().parse().map_err(|_| {
                KeyError::Config(format!(
                    "{} must be a positive integer, got {:?}",
                    ENV_KEYGEN_MAX_ATTEMPTS, v
                ))
            })?;
            self.keygen = RetryPolicy::new(attempts);
        }
        if let Some(v) = lookup(ENV_COMPRESSED) {
            self.compressed_by_default = match v.trim().to_ascii_lowercase().as_str() {
                "1" | "true" | "yes" => true,
                "0" | "false" | "no" => false,
                _ => {
                    return Err(KeyError::Config(format!(
                        "{} must be a boolean, got {:?}",
                        ENV_COMPRESSED, v
                    )))
                }
            };
        }
        if let Some(v) = lookup(ENV_LOG) {
            self.logging.filter = v;
        }
        Ok(self)
    }
}

impl Default for KeyCoreConfig {
    fn default() -> Self {
        Self {
            keygen: RetryPolicy::default(),
            compressed_by_default: Self::default_compressed(),
            logging: LoggingConfig::default(),
        }
    }
}
