//! Transport error types.
//!
//! - [`HttpResponseError`]: non-2xx responses from the server
//! - [`MaxHttpRetriesExceededError`]: a GET failed transiently on every attempt
//! - [`InvalidHttpRequestError`]: a request failed validation before sending
//! - [`HttpError`]: unified error type for the transport layer
//!
//! These errors stay inside the transport layer. The session converts them
//! into [`ResourceError`](crate::resources::ResourceError) before they reach
//! callers.

use std::path::PathBuf;

use thiserror::Error;

/// Error returned when the server responds with a non-successful status.
///
/// Varda error documents look like
/// `{"error": {"code": "not_found", "message": "..."}}`; `error_code` and
/// `message` are taken from that document when present.
///
/// # Example
///
/// ```rust
/// use manwe::clients::HttpResponseError;
///
/// let error = HttpResponseError {
///     code: 403,
///     error_code: Some("forbidden".to_string()),
///     message: "Not allowed to create sample".to_string(),
/// };
///
/// assert_eq!(error.to_string(), "Not allowed to create sample");
/// ```
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct HttpResponseError {
    /// The HTTP status code of the response.
    pub code: u16,
    /// Machine-readable error code reported by the server.
    pub error_code: Option<String>,
    /// Human-readable error message.
    pub message: String,
}

/// Error returned when every attempt of a retried request failed.
#[derive(Debug, Error)]
#[error("Exceeded maximum retry count of {tries}. Last error: {message}")]
pub struct MaxHttpRetriesExceededError {
    /// The number of attempts that were made.
    pub tries: u32,
    /// Description of the last failure.
    pub message: String,
}

/// Error returned when an HTTP request fails validation.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum InvalidHttpRequestError {
    /// A request body was provided without specifying the body type.
    #[error("Cannot set a body without also setting body_type.")]
    MissingBodyType,

    /// A POST or PATCH request was made without a body.
    #[error("Cannot use {method} without specifying data.")]
    MissingBody {
        /// The HTTP method that requires a body.
        method: String,
    },

    /// A non-idempotent request was configured to be retried.
    #[error("Cannot retry {method} requests.")]
    RetryNotAllowed {
        /// The HTTP method.
        method: String,
    },
}

/// Unified error type for the transport layer.
#[derive(Debug, Error)]
pub enum HttpError {
    /// A non-2xx response.
    #[error(transparent)]
    Response(#[from] HttpResponseError),

    /// Retry attempts exhausted.
    #[error(transparent)]
    MaxRetries(#[from] MaxHttpRetriesExceededError),

    /// Request validation failed.
    #[error(transparent)]
    InvalidRequest(#[from] InvalidHttpRequestError),

    /// Network or connection error.
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// A local file for a multipart upload could not be read.
    #[error("Could not read \"{}\": {source}", path.display())]
    File {
        /// The file that could not be read.
        path: PathBuf,
        /// The I/O error.
        #[source]
        source: std::io::Error,
    },
}

impl HttpError {
    /// Returns `true` for failures worth retrying on an idempotent request:
    /// timeouts and connection failures, including a body cut off in transit.
    #[must_use]
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Network(e) => {
                e.is_timeout() || e.is_connect() || e.is_request() || e.is_body()
            }
            _ => false,
        }
    }
}
