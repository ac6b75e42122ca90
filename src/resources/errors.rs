//! Resource-level error types.
//!
//! [`ResourceError`] is the error every [`Session`](crate::Session) and
//! resource operation returns. Transport errors are converted at the session
//! boundary so callers never see [`HttpError`] directly.
//!
//! # Error Mapping
//!
//! | Transport failure                  | `ResourceError` variant |
//! |------------------------------------|-------------------------|
//! | 404 response                       | `NotFound`              |
//! | Any other non-2xx response         | `Remote`                |
//! | Network failure, exhausted retries | `Transport`             |
//! | Unreadable upload file             | `Upload`                |
//!
//! # Example
//!
//! ```rust
//! use manwe::resources::{RemoteErrorKind, ResourceError};
//!
//! let error = ResourceError::Remote {
//!     code: 403,
//!     error_code: Some("forbidden".to_string()),
//!     message: "Not allowed to create sample".to_string(),
//! };
//! assert_eq!(error.kind(), Some(RemoteErrorKind::Forbidden));
//! ```

use std::path::Path;

use thiserror::Error;

use crate::clients::HttpError;
use crate::error::ConfigError;

/// Classification of non-2xx responses by status code.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RemoteErrorKind {
    /// 400: the request was malformed or failed validation.
    BadRequest,
    /// 401: no valid token was sent.
    Unauthorized,
    /// 403: the token's user lacks a required role.
    Forbidden,
    /// 406: the server cannot produce JSON for the request.
    NotAcceptable,
    /// 416: the requested item range does not exist.
    UnsatisfiableRange,
    /// Any other status code.
    Other,
}

impl RemoteErrorKind {
    /// Classifies an HTTP status code.
    #[must_use]
    pub const fn from_status(code: u16) -> Self {
        match code {
            400 => Self::BadRequest,
            401 => Self::Unauthorized,
            403 => Self::Forbidden,
            406 => Self::NotAcceptable,
            416 => Self::UnsatisfiableRange,
            _ => Self::Other,
        }
    }
}

/// Errors returned by session and resource operations.
#[derive(Debug, Error)]
pub enum ResourceError {
    /// The resource does not exist on the server (HTTP 404).
    ///
    /// A tracked resource that received this error is marked invalid and
    /// every further operation on it fails with this variant.
    #[error("Resource does not exist: \"{uri}\"")]
    NotFound {
        /// URI of the missing resource.
        uri: String,
    },

    /// The server rejected the request.
    #[error("{message}")]
    Remote {
        /// The HTTP status code.
        code: u16,
        /// Machine-readable error code from the server's error document.
        error_code: Option<String>,
        /// Human-readable error message.
        message: String,
    },

    /// The request could not be delivered.
    #[error("Could not reach \"{uri}\": {message}")]
    Transport {
        /// URI of the request.
        uri: String,
        /// Description of the network failure.
        message: String,
    },

    /// A file could not be uploaded.
    #[error("Could not upload \"{path}\": {message}")]
    Upload {
        /// Local path of the file.
        path: String,
        /// Why the upload failed.
        message: String,
    },

    /// Downloaded data could not be received or written.
    #[error("Could not download \"{uri}\": {message}")]
    Download {
        /// URI of the data.
        uri: String,
        /// Why the download failed.
        message: String,
    },

    /// The configuration is invalid.
    #[error(transparent)]
    Configuration(#[from] ConfigError),

    /// A successful response did not have the expected shape.
    #[error("Unexpected response from \"{uri}\": {message}")]
    InvalidResponse {
        /// URI of the request.
        uri: String,
        /// What was missing or malformed.
        message: String,
    },

    /// A server-side task finished with an error.
    #[error("Task for \"{uri}\" failed: {message}")]
    TaskFailed {
        /// URI of the resource the task belongs to.
        uri: String,
        /// Machine-readable error code reported for the task.
        code: String,
        /// Human-readable error message.
        message: String,
    },
}

impl ResourceError {
    /// Converts a transport error for a request to `uri`.
    #[must_use]
    pub fn from_http(error: HttpError, uri: &str) -> Self {
        match error {
            HttpError::Response(e) if e.code == 404 => Self::NotFound {
                uri: uri.to_string(),
            },
            HttpError::Response(e) => Self::Remote {
                code: e.code,
                error_code: e.error_code,
                message: e.message,
            },
            HttpError::File { path, source } => Self::Upload {
                path: path.display().to_string(),
                message: source.to_string(),
            },
            HttpError::Network(_) | HttpError::MaxRetries(_) | HttpError::InvalidRequest(_) => {
                Self::Transport {
                    uri: uri.to_string(),
                    message: error.to_string(),
                }
            }
        }
    }

    /// Converts a transport error for a request that uploads `path`.
    ///
    /// Network failures become [`ResourceError::Upload`]; server responses
    /// keep their usual mapping.
    #[must_use]
    pub fn from_upload(error: HttpError, uri: &str, path: &Path) -> Self {
        match error {
            HttpError::Network(_) | HttpError::MaxRetries(_) => Self::Upload {
                path: path.display().to_string(),
                message: error.to_string(),
            },
            other => Self::from_http(other, uri),
        }
    }

    /// Creates an [`InvalidResponse`](Self::InvalidResponse) error.
    pub(crate) fn invalid_response(uri: &str, message: impl Into<String>) -> Self {
        Self::InvalidResponse {
            uri: uri.to_string(),
            message: message.into(),
        }
    }

    /// Returns the classification of a [`Remote`](Self::Remote) error.
    #[must_use]
    pub const fn kind(&self) -> Option<RemoteErrorKind> {
        match self {
            Self::Remote { code, .. } => Some(RemoteErrorKind::from_status(*code)),
            _ => None,
        }
    }

    /// Returns `true` for [`NotFound`](Self::NotFound).
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

// Verify ResourceError is Send + Sync at compile time
const _: fn() = || {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<ResourceError>();
};

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clients::{HttpResponseError, InvalidHttpRequestError, MaxHttpRetriesExceededError};
    use std::path::PathBuf;

    fn response_error(code: u16) -> HttpError {
        HttpError::Response(HttpResponseError {
            code,
            error_code: Some("some_code".to_string()),
            message: "Something went wrong".to_string(),
        })
    }

    #[test]
    fn test_404_maps_to_not_found_with_uri() {
        let error = ResourceError::from_http(response_error(404), "/samples/3");
        assert!(error.is_not_found());
        assert_eq!(error.to_string(), "Resource does not exist: \"/samples/3\"");
    }

    #[test]
    fn test_other_status_maps_to_remote() {
        let error = ResourceError::from_http(response_error(400), "/samples/");
        match error {
            ResourceError::Remote {
                code,
                error_code,
                message,
            } => {
                assert_eq!(code, 400);
                assert_eq!(error_code.as_deref(), Some("some_code"));
                assert_eq!(message, "Something went wrong");
            }
            other => panic!("Expected Remote, got {other:?}"),
        }
    }

    #[test]
    fn test_kind_classifies_status_codes() {
        for (code, kind) in [
            (400, RemoteErrorKind::BadRequest),
            (401, RemoteErrorKind::Unauthorized),
            (403, RemoteErrorKind::Forbidden),
            (406, RemoteErrorKind::NotAcceptable),
            (416, RemoteErrorKind::UnsatisfiableRange),
            (500, RemoteErrorKind::Other),
        ] {
            let error = ResourceError::from_http(response_error(code), "/");
            assert_eq!(error.kind(), Some(kind), "status {code}");
        }
    }

    #[test]
    fn test_kind_is_none_for_non_remote_errors() {
        let error = ResourceError::NotFound {
            uri: "/users/1".to_string(),
        };
        assert_eq!(error.kind(), None);
    }

    #[test]
    fn test_retries_exhausted_maps_to_transport() {
        let error = ResourceError::from_http(
            HttpError::MaxRetries(MaxHttpRetriesExceededError {
                tries: 3,
                message: "operation timed out".to_string(),
            }),
            "/samples/",
        );
        assert!(matches!(error, ResourceError::Transport { ref uri, .. } if uri == "/samples/"));
    }

    #[test]
    fn test_invalid_request_maps_to_transport() {
        let error = ResourceError::from_http(
            HttpError::InvalidRequest(InvalidHttpRequestError::MissingBodyType),
            "/groups/",
        );
        assert!(matches!(error, ResourceError::Transport { .. }));
    }

    #[test]
    fn test_file_error_maps_to_upload() {
        let error = ResourceError::from_http(
            HttpError::File {
                path: PathBuf::from("/data/missing.vcf"),
                source: std::io::Error::new(std::io::ErrorKind::NotFound, "No such file"),
            },
            "/data_sources/",
        );
        match error {
            ResourceError::Upload { path, message } => {
                assert_eq!(path, "/data/missing.vcf");
                assert!(message.contains("No such file"));
            }
            other => panic!("Expected Upload, got {other:?}"),
        }
    }

    #[test]
    fn test_upload_keeps_remote_mapping_for_responses() {
        let error = ResourceError::from_upload(
            response_error(413),
            "/data_sources/",
            Path::new("/data/big.vcf"),
        );
        assert!(matches!(error, ResourceError::Remote { code: 413, .. }));
    }

    #[test]
    fn test_configuration_error_is_transparent() {
        let error = ResourceError::from(ConfigError::EmptyToken);
        assert_eq!(error.to_string(), ConfigError::EmptyToken.to_string());
    }
}
