//! config
//!
//! Configuration for provider construction.
//!
//! # Sources
//!
//! Located at (in order of precedence):
//! 1. An explicit path passed to [`BridgeConfig::load`]
//! 2. `$GITBRIDGE_CONFIG` if set
//! 3. Built-in defaults
//!
//! Values are validated after parsing; an unknown provider key or a zero
//! timeout is rejected before any provider is built.
//!
//! # Example
//!
//! ```toml
//! provider = "cli"
//! binary = "git"
//! timeout_secs = 60
//! allow_subprocess = true
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use thiserror::Error;

use crate::provider::ProviderKind;

/// Environment variable naming an explicit config file.
pub const CONFIG_ENV: &str = "GITBRIDGE_CONFIG";

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The config file could not be read.
    #[error("failed to read config {path}: {source}")]
    Io {
        /// Path that failed to read
        path: PathBuf,
        /// Underlying I/O error
        source: std::io::Error,
    },

    /// The config file is not valid TOML for the schema.
    #[error("failed to parse config {path}: {source}")]
    Parse {
        /// Path that failed to parse
        path: PathBuf,
        /// Underlying TOML error
        source: toml::de::Error,
    },

    /// A parsed value is out of range or unknown.
    #[error("invalid config value: {0}")]
    InvalidValue(String),
}

/// Provider-construction configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct BridgeConfig {
    /// Preferred provider kind key ("cli", "mock")
    pub provider: Option<String>,

    /// Path or name of the git binary
    pub binary: PathBuf,

    /// Per-invocation timeout in seconds
    pub timeout_secs: u64,

    /// Whether this runtime may spawn subprocesses. Edge-sandboxed runtimes
    /// set this to false, which disables the CLI provider entirely.
    pub allow_subprocess: bool,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            provider: None,
            binary: PathBuf::from("git"),
            timeout_secs: 60,
            allow_subprocess: true,
        }
    }
}

impl BridgeConfig {
    /// Load configuration from `path`, or from `$GITBRIDGE_CONFIG`, or
    /// defaults when neither is present.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let resolved = match path {
            Some(p) => Some(p.to_path_buf()),
            None => std::env::var_os(CONFIG_ENV).map(PathBuf::from),
        };

        let config = match resolved {
            Some(path) => {
                let text = std::fs::read_to_string(&path).map_err(|source| ConfigError::Io {
                    path: path.clone(),
                    source,
                })?;
                toml::from_str(&text).map_err(|source| ConfigError::Parse { path, source })?
            }
            None => Self::default(),
        };

        config.validate()?;
        Ok(config)
    }

    /// Validate parsed values.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(key) = &self.provider {
            if ProviderKind::from_key(key).is_none() {
                return Err(ConfigError::InvalidValue(format!(
                    "unknown provider '{key}', must be one of: cli, mock"
                )));
            }
        }
        if self.timeout_secs == 0 {
            return Err(ConfigError::InvalidValue(
                "timeout_secs must be positive".to_string(),
            ));
        }
        if self.binary.as_os_str().is_empty() {
            return Err(ConfigError::InvalidValue(
                "binary must not be empty".to_string(),
            ));
        }
        Ok(())
    }

    /// The preferred provider kind, when configured.
    pub fn preferred_kind(&self) -> Option<ProviderKind> {
        self.provider.as_deref().and_then(ProviderKind::from_key)
    }

    /// Per-invocation timeout as a duration.
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Short digest of the fields that affect provider behavior, used in
    /// the factory's cache key so distinct configurations never share an
    /// instance.
    pub fn digest(&self) -> String {
        let mut hasher = Sha256::new();
        hasher.update(self.binary.display().to_string().as_bytes());
        hasher.update(b"\x1f");
        hasher.update(self.timeout_secs.to_le_bytes());
        let hash = hasher.finalize();
        hex::encode(&hash[..4])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let config = BridgeConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.binary, PathBuf::from("git"));
        assert!(config.allow_subprocess);
    }

    #[test]
    fn parses_full_schema() {
        let config: BridgeConfig = toml::from_str(
            r#"
            provider = "cli"
            binary = "/usr/bin/git"
            timeout_secs = 10
            allow_subprocess = false
            "#,
        )
        .unwrap();
        assert_eq!(config.preferred_kind(), Some(ProviderKind::Cli));
        assert_eq!(config.timeout(), Duration::from_secs(10));
        assert!(!config.allow_subprocess);
    }

    #[test]
    fn unknown_provider_is_rejected() {
        let config = BridgeConfig {
            provider: Some("svn".to_string()),
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidValue(_))
        ));
    }

    #[test]
    fn zero_timeout_is_rejected() {
        let config = BridgeConfig {
            timeout_secs: 0,
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidValue(_))
        ));
    }

    #[test]
    fn unknown_fields_are_rejected() {
        let parsed: Result<BridgeConfig, _> = toml::from_str("surprise = true");
        assert!(parsed.is_err());
    }

    #[test]
    fn digest_distinguishes_configurations() {
        let a = BridgeConfig::default();
        let b = BridgeConfig {
            timeout_secs: 5,
            ..Default::default()
        };
        assert_ne!(a.digest(), b.digest());
        assert_eq!(a.digest(), BridgeConfig::default().digest());
    }

    #[test]
    fn load_without_sources_yields_defaults() {
        // No explicit path; the env var is absent in the test environment.
        if std::env::var_os(CONFIG_ENV).is_none() {
            let config = BridgeConfig::load(None).unwrap();
            assert_eq!(config, BridgeConfig::default());
        }
    }
}
