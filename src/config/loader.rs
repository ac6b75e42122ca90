//! Configuration file loading.
//!
//! Configuration is read from TOML files. Without an explicit file, two
//! locations are tried in order and later values override earlier ones:
//!
//! 1. `/etc/manwe/config.toml`
//! 2. `$XDG_CONFIG_HOME/manwe/config.toml` (or `~/.config/manwe/config.toml`)
//!
//! A missing default file is skipped. An explicit file must exist.
//! `MANWE_API_ROOT` and `MANWE_TOKEN` in the environment override both.
//!
//! ```toml
//! api_root = "https://varda.example.com/api"
//! token = "d3b07384d113edec"
//! collection_cache_size = 20
//! verify_certificate = "/etc/ssl/certs/varda-ca.pem"
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use super::{ApiRoot, CertificateVerification, ManweConfig, Token};
use crate::error::ConfigError;

const SYSTEM_CONFIGURATION: &str = "/etc/manwe/config.toml";

/// Settings as they appear in a configuration file.
///
/// Every setting is optional. Durations are given in whole seconds.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConfigFile {
    /// Varda API root endpoint.
    pub api_root: Option<ApiRoot>,
    /// Varda API authentication token.
    pub token: Option<Token>,
    /// Number of resources to query per collection request.
    pub collection_cache_size: Option<u64>,
    /// Size of chunks written when downloading data, in bytes.
    pub data_buffer_size: Option<usize>,
    /// Time to wait between polling task state.
    pub task_poll_wait: Option<u64>,
    /// Certificate verification: a boolean or a CA bundle path.
    pub verify_certificate: Option<CertificateVerification>,
    /// Per-request timeout.
    pub request_timeout: Option<u64>,
    /// Attempts for GET requests.
    pub max_tries: Option<u32>,
    /// Wait between GET attempts.
    pub retry_wait: Option<u64>,
}

impl ConfigFile {
    /// Reads and parses a single configuration file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::ReadFailed`] if the file cannot be read and
    /// [`ConfigError::ParseFailed`] if it is not valid configuration TOML.
    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadFailed {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        Self::parse(&contents).map_err(|e| match e {
            ConfigError::ParseFailed { message, .. } => ConfigError::ParseFailed {
                path: path.display().to_string(),
                message,
            },
            other => other,
        })
    }

    /// Parses configuration from TOML text.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::ParseFailed`] on invalid TOML, unknown keys, or
    /// invalid values.
    pub fn parse(contents: &str) -> Result<Self, ConfigError> {
        toml::from_str(contents).map_err(|e| ConfigError::ParseFailed {
            path: String::new(),
            message: e.message().to_string(),
        })
    }

    /// Returns `self` with every setting present in `other` overridden.
    #[must_use]
    pub fn merge(self, other: Self) -> Self {
        Self {
            api_root: other.api_root.or(self.api_root),
            token: other.token.or(self.token),
            collection_cache_size: other.collection_cache_size.or(self.collection_cache_size),
            data_buffer_size: other.data_buffer_size.or(self.data_buffer_size),
            task_poll_wait: other.task_poll_wait.or(self.task_poll_wait),
            verify_certificate: other.verify_certificate.or(self.verify_certificate),
            request_timeout: other.request_timeout.or(self.request_timeout),
            max_tries: other.max_tries.or(self.max_tries),
            retry_wait: other.retry_wait.or(self.retry_wait),
        }
    }

    /// Applies `MANWE_API_ROOT` and `MANWE_TOKEN` overrides looked up
    /// through `lookup`.
    ///
    /// # Errors
    ///
    /// Returns an error if an override holds an invalid value.
    pub fn apply_overrides(
        &mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<(), ConfigError> {
        if let Some(value) = lookup("MANWE_API_ROOT") {
            self.api_root = Some(ApiRoot::new(value)?);
        }
        if let Some(value) = lookup("MANWE_TOKEN") {
            self.token = Some(Token::new(value)?);
        }
        Ok(())
    }

    /// Validates the settings and builds a [`ManweConfig`].
    ///
    /// # Errors
    ///
    /// Returns an error if a numeric setting is out of range.
    pub fn into_config(self) -> Result<ManweConfig, ConfigError> {
        let mut builder = ManweConfig::builder();
        if let Some(api_root) = self.api_root {
            builder = builder.api_root(api_root);
        }
        if let Some(token) = self.token {
            builder = builder.token(token);
        }
        if let Some(size) = self.collection_cache_size {
            builder = builder.collection_cache_size(size);
        }
        if let Some(size) = self.data_buffer_size {
            builder = builder.data_buffer_size(size);
        }
        if let Some(secs) = self.task_poll_wait {
            builder = builder.task_poll_wait(Duration::from_secs(secs));
        }
        if let Some(verify) = self.verify_certificate {
            builder = builder.verify_certificate(verify);
        }
        if let Some(secs) = self.request_timeout {
            builder = builder.request_timeout(Duration::from_secs(secs));
        }
        if let Some(tries) = self.max_tries {
            builder = builder.max_tries(tries);
        }
        if let Some(secs) = self.retry_wait {
            builder = builder.retry_wait(Duration::from_secs(secs));
        }
        builder.build()
    }
}

/// Returns the system-wide configuration file location.
#[must_use]
pub fn system_config_path() -> PathBuf {
    PathBuf::from(SYSTEM_CONFIGURATION)
}

/// Returns the per-user configuration file location, if a home or XDG
/// config directory is known.
#[must_use]
pub fn user_config_path() -> Option<PathBuf> {
    let base = std::env::var_os("XDG_CONFIG_HOME")
        .filter(|dir| !dir.is_empty())
        .map(PathBuf::from)
        .or_else(|| std::env::var_os("HOME").map(|home| PathBuf::from(home).join(".config")))?;
    Some(base.join("manwe").join("config.toml"))
}

/// Loads the configuration.
///
/// With `path` set, only that file is read. Otherwise the system and user
/// files are read if present. Environment overrides are applied last.
///
/// # Errors
///
/// Returns [`ConfigError`] if a file cannot be read or parsed, or a value
/// is invalid.
///
/// # Example
///
/// ```no_run
/// use manwe::load_config;
///
/// let config = load_config(None).expect("configuration");
/// println!("Using {}", config.api_root());
/// ```
pub fn load_config(path: Option<&Path>) -> Result<ManweConfig, ConfigError> {
    let mut file = match path {
        Some(path) => ConfigFile::from_path(path)?,
        None => {
            let mut merged = ConfigFile::default();
            let candidates = std::iter::once(system_config_path()).chain(user_config_path());
            for candidate in candidates {
                if candidate.is_file() {
                    tracing::debug!(path = %candidate.display(), "Reading configuration file");
                    merged = merged.merge(ConfigFile::from_path(&candidate)?);
                }
            }
            merged
        }
    };

    file.apply_overrides(|key| std::env::var(key).ok())?;
    file.into_config()
}
