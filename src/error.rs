//! Configuration error types.
//!
//! All configuration constructors return `Result<T, ConfigError>` so that a
//! bad value is reported before any request is sent to the server.
//!
//! # Example
//!
//! ```rust
//! use manwe::{ApiRoot, ConfigError};
//!
//! let result = ApiRoot::new("127.0.0.1:5000");
//! assert!(matches!(result, Err(ConfigError::InvalidApiRoot { .. })));
//! ```

use thiserror::Error;

/// Errors that can occur while building or loading the client configuration.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// The API root is not an absolute HTTP(S) URL.
    #[error("Invalid API root '{url}'. Expected an absolute URL such as 'https://varda.example.com/api'.")]
    InvalidApiRoot {
        /// The value that was provided.
        url: String,
    },

    /// The authentication token is empty.
    #[error("Authentication token cannot be empty. Remove the setting or provide a valid token.")]
    EmptyToken,

    /// A numeric setting is outside its accepted range.
    #[error("Invalid value {value} for '{setting}': {reason}")]
    InvalidValue {
        /// Name of the setting.
        setting: &'static str,
        /// The rejected value.
        value: u64,
        /// Why the value was rejected.
        reason: &'static str,
    },

    /// A configuration file exists but could not be read.
    #[error("Could not open configuration file \"{path}\": {message}")]
    ReadFailed {
        /// Path of the configuration file.
        path: String,
        /// Underlying I/O error message.
        message: String,
    },

    /// A configuration file could not be parsed.
    #[error("Could not parse configuration file \"{path}\": {message}")]
    ParseFailed {
        /// Path of the configuration file.
        path: String,
        /// Parser error message.
        message: String,
    },

    /// The HTTP client could not be initialized.
    #[error("Could not initialize HTTP client: {message}")]
    HttpClient {
        /// Reason reported by the TLS or HTTP stack.
        message: String,
    },

    /// The log level is not one of trace, debug, info, warn, or error.
    #[error("Invalid log level '{level}'. Must be one of: trace, debug, info, warn, error")]
    InvalidLogLevel {
        /// The value that was provided.
        level: String,
    },

    /// The CA bundle used for certificate verification could not be loaded.
    #[error("Could not load CA bundle \"{path}\": {message}")]
    InvalidCaBundle {
        /// Path of the CA bundle.
        path: String,
        /// Reason the bundle was rejected.
        message: String,
    },
}
