//! Client configuration.
//!
//! # Overview
//!
//! - [`ManweConfig`]: all settings used by a [`Session`](crate::Session)
//! - [`ManweConfigBuilder`]: builder with the documented defaults
//! - [`ApiRoot`], [`Token`]: validated newtypes
//! - [`CertificateVerification`]: TLS verification policy
//! - [`load_config`]: reads TOML configuration files from the standard locations
//!
//! # Example
//!
//! ```rust
//! use manwe::{ManweConfig, ApiRoot, Token};
//!
//! let config = ManweConfig::builder()
//!     .api_root(ApiRoot::new("https://varda.example.com/api").unwrap())
//!     .token(Token::new("d3b07384d113edec").unwrap())
//!     .collection_cache_size(50)
//!     .build()
//!     .unwrap();
//!
//! assert_eq!(config.collection_cache_size(), 50);
//! ```

mod loader;
mod newtypes;

pub use loader::{load_config, system_config_path, user_config_path, ConfigFile};
pub use newtypes::{ApiRoot, CertificateVerification, Token};

use std::time::Duration;

use crate::error::ConfigError;

/// Default Varda API root endpoint.
pub const DEFAULT_API_ROOT: &str = "http://127.0.0.1:5000";

/// Default number of resources requested per collection page.
pub const DEFAULT_COLLECTION_CACHE_SIZE: u64 = 20;

/// Default buffer size in bytes for data source downloads.
pub const DEFAULT_DATA_BUFFER_SIZE: usize = 1024 * 1024;

/// Default time to wait between polls of a task's state.
pub const DEFAULT_TASK_POLL_WAIT: Duration = Duration::from_secs(2);

/// Default per-request timeout.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Default number of attempts for idempotent requests.
pub const DEFAULT_MAX_TRIES: u32 = 3;

/// Default fixed wait between attempts.
pub const DEFAULT_RETRY_WAIT: Duration = Duration::from_secs(1);

/// Configuration for a Manwë session.
///
/// `ManweConfig` is `Clone`, `Send`, and `Sync`.
#[derive(Clone, Debug)]
pub struct ManweConfig {
    api_root: ApiRoot,
    token: Option<Token>,
    collection_cache_size: u64,
    data_buffer_size: usize,
    task_poll_wait: Duration,
    verify_certificate: CertificateVerification,
    request_timeout: Duration,
    max_tries: u32,
    retry_wait: Duration,
}

impl ManweConfig {
    /// Creates a new builder for constructing a `ManweConfig`.
    #[must_use]
    pub fn builder() -> ManweConfigBuilder {
        ManweConfigBuilder::new()
    }

    /// Returns the API root.
    #[must_use]
    pub const fn api_root(&self) -> &ApiRoot {
        &self.api_root
    }

    /// Returns the authentication token, if configured.
    #[must_use]
    pub const fn token(&self) -> Option<&Token> {
        self.token.as_ref()
    }

    /// Returns the number of resources requested per collection page.
    #[must_use]
    pub const fn collection_cache_size(&self) -> u64 {
        self.collection_cache_size
    }

    /// Returns the download buffer size in bytes.
    #[must_use]
    pub const fn data_buffer_size(&self) -> usize {
        self.data_buffer_size
    }

    /// Returns the wait between task state polls.
    #[must_use]
    pub const fn task_poll_wait(&self) -> Duration {
        self.task_poll_wait
    }

    /// Returns the certificate verification policy.
    #[must_use]
    pub const fn verify_certificate(&self) -> &CertificateVerification {
        &self.verify_certificate
    }

    /// Returns the per-request timeout.
    #[must_use]
    pub const fn request_timeout(&self) -> Duration {
        self.request_timeout
    }

    /// Returns the number of attempts made for GET requests.
    #[must_use]
    pub const fn max_tries(&self) -> u32 {
        self.max_tries
    }

    /// Returns the fixed wait between GET attempts.
    #[must_use]
    pub const fn retry_wait(&self) -> Duration {
        self.retry_wait
    }
}

impl Default for ManweConfig {
    fn default() -> Self {
        Self {
            api_root: ApiRoot::default(),
            token: None,
            collection_cache_size: DEFAULT_COLLECTION_CACHE_SIZE,
            data_buffer_size: DEFAULT_DATA_BUFFER_SIZE,
            task_poll_wait: DEFAULT_TASK_POLL_WAIT,
            verify_certificate: CertificateVerification::Enabled,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            max_tries: DEFAULT_MAX_TRIES,
            retry_wait: DEFAULT_RETRY_WAIT,
        }
    }
}

// Verify ManweConfig is Send + Sync at compile time
const _: fn() = || {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<ManweConfig>();
};

/// Builder for constructing [`ManweConfig`] instances.
///
/// No field is required. Unset fields take the defaults listed as constants
/// in this module.
#[derive(Debug, Default)]
pub struct ManweConfigBuilder {
    api_root: Option<ApiRoot>,
    token: Option<Token>,
    collection_cache_size: Option<u64>,
    data_buffer_size: Option<usize>,
    task_poll_wait: Option<Duration>,
    verify_certificate: Option<CertificateVerification>,
    request_timeout: Option<Duration>,
    max_tries: Option<u32>,
    retry_wait: Option<Duration>,
}

impl ManweConfigBuilder {
    /// Creates a new builder with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the API root.
    #[must_use]
    pub fn api_root(mut self, api_root: ApiRoot) -> Self {
        self.api_root = Some(api_root);
        self
    }

    /// Sets the authentication token.
    #[must_use]
    pub fn token(mut self, token: Token) -> Self {
        self.token = Some(token);
        self
    }

    /// Sets the number of resources requested per collection page.
    #[must_use]
    pub const fn collection_cache_size(mut self, size: u64) -> Self {
        self.collection_cache_size = Some(size);
        self
    }

    /// Sets the download buffer size in bytes.
    #[must_use]
    pub const fn data_buffer_size(mut self, size: usize) -> Self {
        self.data_buffer_size = Some(size);
        self
    }

    /// Sets the wait between task state polls.
    #[must_use]
    pub const fn task_poll_wait(mut self, wait: Duration) -> Self {
        self.task_poll_wait = Some(wait);
        self
    }

    /// Sets the certificate verification policy.
    #[must_use]
    pub fn verify_certificate(mut self, verify: CertificateVerification) -> Self {
        self.verify_certificate = Some(verify);
        self
    }

    /// Sets the per-request timeout.
    #[must_use]
    pub const fn request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = Some(timeout);
        self
    }

    /// Sets the number of attempts for GET requests.
    ///
    /// POST and PATCH requests are always attempted exactly once.
    #[must_use]
    pub const fn max_tries(mut self, tries: u32) -> Self {
        self.max_tries = Some(tries);
        self
    }

    /// Sets the fixed wait between GET attempts.
    #[must_use]
    pub const fn retry_wait(mut self, wait: Duration) -> Self {
        self.retry_wait = Some(wait);
        self
    }

    /// Builds the [`ManweConfig`].
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidValue`] if `collection_cache_size`,
    /// `data_buffer_size`, or `max_tries` is zero.
    pub fn build(self) -> Result<ManweConfig, ConfigError> {
        let collection_cache_size = self
            .collection_cache_size
            .unwrap_or(DEFAULT_COLLECTION_CACHE_SIZE);
        if collection_cache_size == 0 {
            return Err(ConfigError::InvalidValue {
                setting: "collection_cache_size",
                value: 0,
                reason: "must be at least 1",
            });
        }

        let data_buffer_size = self.data_buffer_size.unwrap_or(DEFAULT_DATA_BUFFER_SIZE);
        if data_buffer_size == 0 {
            return Err(ConfigError::InvalidValue {
                setting: "data_buffer_size",
                value: 0,
                reason: "must be at least 1",
            });
        }

        let max_tries = self.max_tries.unwrap_or(DEFAULT_MAX_TRIES);
        if max_tries == 0 {
            return Err(ConfigError::InvalidValue {
                setting: "max_tries",
                value: 0,
                reason: "must be at least 1",
            });
        }

        Ok(ManweConfig {
            api_root: self.api_root.unwrap_or_default(),
            token: self.token,
            collection_cache_size,
            data_buffer_size,
            task_poll_wait: self.task_poll_wait.unwrap_or(DEFAULT_TASK_POLL_WAIT),
            verify_certificate: self.verify_certificate.unwrap_or_default(),
            request_timeout: self.request_timeout.unwrap_or(DEFAULT_REQUEST_TIMEOUT),
            max_tries,
            retry_wait: self.retry_wait.unwrap_or(DEFAULT_RETRY_WAIT),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_provides_defaults() {
        let config = ManweConfig::builder().build().unwrap();

        assert_eq!(config.api_root().as_ref(), DEFAULT_API_ROOT);
        assert!(config.token().is_none());
        assert_eq!(config.collection_cache_size(), 20);
        assert_eq!(config.data_buffer_size(), 1024 * 1024);
        assert_eq!(config.task_poll_wait(), Duration::from_secs(2));
        assert_eq!(config.verify_certificate(), &CertificateVerification::Enabled);
        assert_eq!(config.max_tries(), 3);
    }

    #[test]
    fn test_default_matches_builder() {
        let built = ManweConfig::builder().build().unwrap();
        let default = ManweConfig::default();
        assert_eq!(built.api_root(), default.api_root());
        assert_eq!(built.collection_cache_size(), default.collection_cache_size());
        assert_eq!(built.request_timeout(), default.request_timeout());
    }

    #[test]
    fn test_builder_rejects_zero_page_size() {
        let result = ManweConfig::builder().collection_cache_size(0).build();
        assert!(matches!(
            result,
            Err(ConfigError::InvalidValue {
                setting: "collection_cache_size",
                ..
            })
        ));
    }

    #[test]
    fn test_builder_rejects_zero_tries() {
        let result = ManweConfig::builder().max_tries(0).build();
        assert!(matches!(
            result,
            Err(ConfigError::InvalidValue {
                setting: "max_tries",
                ..
            })
        ));
    }

    #[test]
    fn test_builder_with_all_fields() {
        let config = ManweConfig::builder()
            .api_root(ApiRoot::new("https://varda.example.com").unwrap())
            .token(Token::new("abc").unwrap())
            .collection_cache_size(5)
            .data_buffer_size(4096)
            .task_poll_wait(Duration::from_millis(10))
            .verify_certificate(CertificateVerification::Disabled)
            .request_timeout(Duration::from_secs(5))
            .max_tries(1)
            .retry_wait(Duration::from_millis(1))
            .build()
            .unwrap();

        assert_eq!(config.api_root().host_name(), "varda.example.com");
        assert_eq!(config.token().map(AsRef::as_ref), Some("abc"));
        assert_eq!(config.collection_cache_size(), 5);
        assert_eq!(config.data_buffer_size(), 4096);
        assert_eq!(config.verify_certificate(), &CertificateVerification::Disabled);
        assert_eq!(config.max_tries(), 1);
    }

    #[test]
    fn test_debug_output_masks_token() {
        let config = ManweConfig::builder()
            .token(Token::new("super-secret").unwrap())
            .build()
            .unwrap();
        let debug_str = format!("{config:?}");
        assert!(debug_str.contains("ManweConfig"));
        assert!(!debug_str.contains("super-secret"));
    }
}
