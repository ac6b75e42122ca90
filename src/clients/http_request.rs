//! HTTP request types.
//!
//! This module provides the [`HttpRequest`] type and its builder for
//! constructing requests to the Varda API.

use std::collections::HashMap;
use std::fmt;
use std::path::PathBuf;

use crate::clients::errors::InvalidHttpRequestError;

/// HTTP methods used by the Varda API.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HttpMethod {
    /// Retrieve a resource or collection page.
    Get,
    /// Create a resource in a collection.
    Post,
    /// Partially update a resource.
    Patch,
    /// Remove a resource.
    Delete,
}

impl HttpMethod {
    /// Returns `true` if repeating the request has no additional effect.
    #[must_use]
    pub const fn is_idempotent(self) -> bool {
        matches!(self, Self::Get | Self::Delete)
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Get => write!(f, "get"),
            Self::Post => write!(f, "post"),
            Self::Patch => write!(f, "patch"),
            Self::Delete => write!(f, "delete"),
        }
    }
}

/// Encoding of the request body.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DataType {
    /// JSON document (`application/json`).
    Json,
    /// `multipart/form-data`: top-level body entries are sent as text parts,
    /// files as file parts.
    Multipart,
}

impl DataType {
    /// Returns the MIME type string for this data type.
    #[must_use]
    pub const fn as_content_type(&self) -> &'static str {
        match self {
            Self::Json => "application/json",
            Self::Multipart => "multipart/form-data",
        }
    }
}

/// A local file sent as one part of a multipart request.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FilePart {
    /// Form field name.
    pub field: String,
    /// Path of the file to read.
    pub path: PathBuf,
}

impl FilePart {
    /// Creates a file part for `path` under the form field `field`.
    #[must_use]
    pub fn new(field: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self {
            field: field.into(),
            path: path.into(),
        }
    }

    /// Returns the file name sent with the part.
    #[must_use]
    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map_or_else(|| "data".to_string(), |name| name.to_string_lossy().into_owned())
    }
}

/// An HTTP request to be sent to the Varda API.
///
/// Use [`HttpRequest::builder`] to construct requests.
///
/// # Example
///
/// ```rust
/// use manwe::clients::{HttpRequest, HttpMethod, DataType};
/// use serde_json::json;
///
/// let get_request = HttpRequest::builder(HttpMethod::Get, "/samples/")
///     .header("Range", "items=0-19")
///     .tries(3)
///     .build()
///     .unwrap();
///
/// let patch_request = HttpRequest::builder(HttpMethod::Patch, "/samples/3")
///     .body(json!({"active": true}))
///     .body_type(DataType::Json)
///     .build()
///     .unwrap();
/// ```
#[derive(Clone, Debug)]
pub struct HttpRequest {
    /// The HTTP method for this request.
    pub http_method: HttpMethod,
    /// The URI, absolute or relative to the API root.
    pub path: String,
    /// The request body, if any.
    pub body: Option<serde_json::Value>,
    /// The encoding of the body.
    pub body_type: Option<DataType>,
    /// Files attached to a multipart body.
    pub files: Vec<FilePart>,
    /// Query parameters, in order. Keys may repeat.
    pub query: Vec<(String, String)>,
    /// Additional headers to include in the request.
    pub extra_headers: Option<HashMap<String, String>>,
    /// Number of times to attempt the request (default: 1).
    pub tries: u32,
}

impl HttpRequest {
    /// Creates a new builder for constructing an `HttpRequest`.
    #[must_use]
    pub fn builder(method: HttpMethod, path: impl Into<String>) -> HttpRequestBuilder {
        HttpRequestBuilder::new(method, path)
    }

    /// Validates the request.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidHttpRequestError`] if:
    /// - `body` or `files` is set but `body_type` is `None`, or files are
    ///   attached to a non-multipart body
    /// - `http_method` is `Post` or `Patch` but `body` is `None`
    /// - `tries` is greater than one for a non-idempotent method
    pub fn verify(&self) -> Result<(), InvalidHttpRequestError> {
        if (self.body.is_some() || !self.files.is_empty()) && self.body_type.is_none() {
            return Err(InvalidHttpRequestError::MissingBodyType);
        }
        if !self.files.is_empty() && self.body_type != Some(DataType::Multipart) {
            return Err(InvalidHttpRequestError::MissingBodyType);
        }

        if matches!(self.http_method, HttpMethod::Post | HttpMethod::Patch) && self.body.is_none()
        {
            return Err(InvalidHttpRequestError::MissingBody {
                method: self.http_method.to_string(),
            });
        }

        if self.tries > 1 && !self.http_method.is_idempotent() {
            return Err(InvalidHttpRequestError::RetryNotAllowed {
                method: self.http_method.to_string(),
            });
        }

        Ok(())
    }
}

/// Builder for constructing [`HttpRequest`] instances.
#[derive(Debug)]
pub struct HttpRequestBuilder {
    http_method: HttpMethod,
    path: String,
    body: Option<serde_json::Value>,
    body_type: Option<DataType>,
    files: Vec<FilePart>,
    query: Vec<(String, String)>,
    extra_headers: Option<HashMap<String, String>>,
    tries: u32,
}

impl HttpRequestBuilder {
    fn new(method: HttpMethod, path: impl Into<String>) -> Self {
        Self {
            http_method: method,
            path: path.into(),
            body: None,
            body_type: None,
            files: Vec::new(),
            query: Vec::new(),
            extra_headers: None,
            tries: 1,
        }
    }

    /// Sets the request body.
    ///
    /// When setting a body, you must also set the body type via [`body_type`](Self::body_type).
    #[must_use]
    pub fn body(mut self, body: impl Into<serde_json::Value>) -> Self {
        self.body = Some(body.into());
        self
    }

    /// Sets the encoding of the request body.
    #[must_use]
    pub const fn body_type(mut self, body_type: DataType) -> Self {
        self.body_type = Some(body_type);
        self
    }

    /// Attaches a file to a multipart body.
    #[must_use]
    pub fn file(mut self, part: FilePart) -> Self {
        self.files.push(part);
        self
    }

    /// Appends query parameters.
    #[must_use]
    pub fn query(mut self, query: impl IntoIterator<Item = (String, String)>) -> Self {
        self.query.extend(query);
        self
    }

    /// Appends a single query parameter.
    #[must_use]
    pub fn query_param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((key.into(), value.into()));
        self
    }

    /// Adds a single extra header.
    #[must_use]
    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.extra_headers
            .get_or_insert_with(HashMap::new)
            .insert(key.into(), value.into());
        self
    }

    /// Sets the number of times to attempt the request.
    ///
    /// Default is 1 (no retries). Only idempotent requests may be retried.
    #[must_use]
    pub const fn tries(mut self, tries: u32) -> Self {
        self.tries = tries;
        self
    }

    /// Builds the [`HttpRequest`], validating it in the process.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidHttpRequestError`] if the request fails validation.
    pub fn build(self) -> Result<HttpRequest, InvalidHttpRequestError> {
        let request = HttpRequest {
            http_method: self.http_method,
            path: self.path,
            body: self.body,
            body_type: self.body_type,
            files: self.files,
            query: self.query,
            extra_headers: self.extra_headers,
            tries: self.tries,
        };
        request.verify()?;
        Ok(request)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_http_method_display() {
        assert_eq!(HttpMethod::Get.to_string(), "get");
        assert_eq!(HttpMethod::Post.to_string(), "post");
        assert_eq!(HttpMethod::Patch.to_string(), "patch");
        assert_eq!(HttpMethod::Delete.to_string(), "delete");
    }

    #[test]
    fn test_only_get_and_delete_are_idempotent() {
        assert!(HttpMethod::Get.is_idempotent());
        assert!(HttpMethod::Delete.is_idempotent());
        assert!(!HttpMethod::Post.is_idempotent());
        assert!(!HttpMethod::Patch.is_idempotent());
    }

    #[test]
    fn test_data_type_content_type() {
        assert_eq!(DataType::Json.as_content_type(), "application/json");
        assert_eq!(DataType::Multipart.as_content_type(), "multipart/form-data");
    }

    #[test]
    fn test_builder_creates_valid_get_request() {
        let request = HttpRequest::builder(HttpMethod::Get, "/samples/")
            .build()
            .unwrap();

        assert_eq!(request.http_method, HttpMethod::Get);
        assert_eq!(request.path, "/samples/");
        assert!(request.body.is_none());
        assert!(request.files.is_empty());
        assert_eq!(request.tries, 1);
    }

    #[test]
    fn test_verify_requires_body_for_post_and_patch() {
        let result = HttpRequest::builder(HttpMethod::Post, "/samples/").build();
        assert!(matches!(
            result,
            Err(InvalidHttpRequestError::MissingBody { method }) if method == "post"
        ));

        let result = HttpRequest::builder(HttpMethod::Patch, "/samples/1").build();
        assert!(matches!(
            result,
            Err(InvalidHttpRequestError::MissingBody { method }) if method == "patch"
        ));
    }

    #[test]
    fn test_verify_requires_body_type_when_body_present() {
        let result = HttpRequest::builder(HttpMethod::Post, "/groups/")
            .body(json!({"name": "x"}))
            .build();
        assert!(matches!(result, Err(InvalidHttpRequestError::MissingBodyType)));
    }

    #[test]
    fn test_verify_requires_multipart_for_files() {
        let result = HttpRequest::builder(HttpMethod::Post, "/data_sources/")
            .body(json!({"name": "x"}))
            .body_type(DataType::Json)
            .file(FilePart::new("data", "/tmp/a.vcf"))
            .build();
        assert!(matches!(result, Err(InvalidHttpRequestError::MissingBodyType)));

        let result = HttpRequest::builder(HttpMethod::Post, "/data_sources/")
            .body(json!({"name": "x"}))
            .body_type(DataType::Multipart)
            .file(FilePart::new("data", "/tmp/a.vcf"))
            .build();
        assert!(result.is_ok());
    }

    #[test]
    fn test_verify_rejects_retried_post() {
        let result = HttpRequest::builder(HttpMethod::Post, "/groups/")
            .body(json!({"name": "x"}))
            .body_type(DataType::Json)
            .tries(3)
            .build();
        assert!(matches!(
            result,
            Err(InvalidHttpRequestError::RetryNotAllowed { method }) if method == "post"
        ));
    }

    #[test]
    fn test_builder_keeps_repeated_query_params_in_order() {
        let request = HttpRequest::builder(HttpMethod::Get, "/samples/")
            .query_param("groups", "/groups/1")
            .query_param("groups", "/groups/2")
            .build()
            .unwrap();

        assert_eq!(
            request.query,
            vec![
                ("groups".to_string(), "/groups/1".to_string()),
                ("groups".to_string(), "/groups/2".to_string()),
            ]
        );
    }

    #[test]
    fn test_builder_with_extra_headers() {
        let request = HttpRequest::builder(HttpMethod::Get, "/samples/")
            .header("Range", "items=0-19")
            .build()
            .unwrap();

        let headers = request.extra_headers.unwrap();
        assert_eq!(headers.get("Range"), Some(&"items=0-19".to_string()));
    }

    #[test]
    fn test_file_part_name() {
        let part = FilePart::new("data", "/data/runs/sample.vcf.gz");
        assert_eq!(part.file_name(), "sample.vcf.gz");
    }
}
