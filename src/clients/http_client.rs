//! HTTP client for Varda API communication.
//!
//! This module provides the [`HttpClient`] type for making authenticated
//! requests to the Varda API with retries for idempotent requests.

use std::collections::HashMap;
use std::future::Future;
use std::time::Duration;

use crate::clients::errors::{
    HttpError, HttpResponseError, MaxHttpRetriesExceededError,
};
use crate::clients::http_request::{DataType, HttpMethod, HttpRequest};
use crate::clients::http_response::HttpResponse;
use crate::config::{ApiRoot, CertificateVerification, ManweConfig};
use crate::error::ConfigError;

/// Library version from Cargo.toml.
pub const SDK_VERSION: &str = env!("CARGO_PKG_VERSION");

/// HTTP client for making requests to the Varda API.
///
/// The client handles:
/// - URI resolution against the configured API root
/// - Default headers including User-Agent and the `Token` authorization
/// - Bounded retries with a fixed wait for timeouts and connection failures
///   on idempotent requests (POST and PATCH are never retried)
/// - Error document parsing for non-2xx responses
///
/// # Thread Safety
///
/// `HttpClient` is `Send + Sync`.
///
/// # Example
///
/// ```rust,ignore
/// use manwe::clients::{HttpClient, HttpRequest, HttpMethod};
/// use manwe::ManweConfig;
///
/// let client = HttpClient::new(&ManweConfig::default())?;
///
/// let request = HttpRequest::builder(HttpMethod::Get, "/")
///     .tries(3)
///     .build()
///     .unwrap();
///
/// let response = client.request(request).await?;
/// ```
#[derive(Debug)]
pub struct HttpClient {
    /// The internal reqwest HTTP client.
    client: reqwest::Client,
    /// Root all relative URIs are resolved against.
    api_root: ApiRoot,
    /// Default headers to include in all requests.
    default_headers: HashMap<String, String>,
    /// Fixed wait between attempts.
    retry_wait: Duration,
}

// Verify HttpClient is Send + Sync at compile time
const _: fn() = || {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<HttpClient>();
};

impl HttpClient {
    /// Creates a new HTTP client from the configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidCaBundle`] if a configured CA bundle
    /// cannot be read or parsed, and [`ConfigError::HttpClient`] if the TLS
    /// stack cannot be initialized.
    pub fn new(config: &ManweConfig) -> Result<Self, ConfigError> {
        let user_agent = format!("manwe/{SDK_VERSION}");

        let mut default_headers = HashMap::new();
        default_headers.insert("User-Agent".to_string(), user_agent);
        default_headers.insert("Accept".to_string(), "application/json".to_string());

        if let Some(token) = config.token() {
            default_headers.insert(
                "Authorization".to_string(),
                format!("Token {}", token.as_ref()),
            );
        }

        let mut builder = reqwest::Client::builder()
            .use_rustls_tls()
            .timeout(config.request_timeout());

        match config.verify_certificate() {
            CertificateVerification::Enabled => {}
            CertificateVerification::Disabled => {
                tracing::warn!("TLS certificate verification is disabled");
                builder = builder.danger_accept_invalid_certs(true);
            }
            CertificateVerification::CaBundle(path) => {
                let invalid = |message: String| ConfigError::InvalidCaBundle {
                    path: path.display().to_string(),
                    message,
                };
                let pem = std::fs::read(path).map_err(|e| invalid(e.to_string()))?;
                let certificate =
                    reqwest::Certificate::from_pem(&pem).map_err(|e| invalid(e.to_string()))?;
                builder = builder.add_root_certificate(certificate);
            }
        }

        let client = builder.build().map_err(|e| ConfigError::HttpClient {
            message: e.to_string(),
        })?;

        Ok(Self {
            client,
            api_root: config.api_root().clone(),
            default_headers,
            retry_wait: config.retry_wait(),
        })
    }

    /// Returns the API root for this client.
    #[must_use]
    pub const fn api_root(&self) -> &ApiRoot {
        &self.api_root
    }

    /// Returns the default headers for this client.
    #[must_use]
    pub const fn default_headers(&self) -> &HashMap<String, String> {
        &self.default_headers
    }

    /// Sends a request and parses the JSON response body.
    ///
    /// The body is read as part of each attempt, so a retried request is
    /// also retried when the connection fails while the body arrives.
    ///
    /// # Errors
    ///
    /// Returns [`HttpError`] if:
    /// - Request validation fails (`InvalidRequest`)
    /// - An attached file cannot be read (`File`)
    /// - A network error occurs (`Network`)
    /// - A non-2xx response is received (`Response`)
    /// - Every attempt of a retried request failed (`MaxRetries`)
    pub async fn request(&self, request: HttpRequest) -> Result<HttpResponse, HttpError> {
        let request = &request;
        self.with_retries(request, move |attempt| self.attempt_json(request, attempt))
            .await
    }

    /// Sends a request and returns the raw response for streaming.
    ///
    /// Used for blob downloads, where the body is not JSON. Error handling
    /// and retries are the same as for [`request`](Self::request), except
    /// that they end once the response headers arrive.
    ///
    /// # Errors
    ///
    /// Returns [`HttpError`] under the same conditions as [`request`](Self::request).
    pub async fn request_raw(&self, request: HttpRequest) -> Result<reqwest::Response, HttpError> {
        let request = &request;
        self.with_retries(request, move |attempt| self.attempt(request, attempt))
            .await
    }

    /// Runs `attempt` until it succeeds or fails for good. Only transient
    /// failures are retried, up to the request's number of tries.
    async fn with_retries<T, F, Fut>(
        &self,
        request: &HttpRequest,
        mut attempt: F,
    ) -> Result<T, HttpError>
    where
        F: FnMut(u32) -> Fut,
        Fut: Future<Output = Result<T, HttpError>>,
    {
        request.verify()?;

        let mut tries: u32 = 0;
        loop {
            tries += 1;

            let error = match attempt(tries).await {
                Ok(value) => return Ok(value),
                Err(error) => error,
            };

            if !error.is_transient() || request.tries <= 1 {
                return Err(error);
            }
            if tries >= request.tries {
                return Err(HttpError::MaxRetries(MaxHttpRetriesExceededError {
                    tries: request.tries,
                    message: error.to_string(),
                }));
            }
            tracing::warn!(
                path = %request.path,
                attempt = tries,
                error = %error,
                "Transient failure, retrying in {:?}",
                self.retry_wait
            );
            tokio::time::sleep(self.retry_wait).await;
        }
    }

    /// One attempt of [`request`](Self::request): send and read the body.
    async fn attempt_json(
        &self,
        request: &HttpRequest,
        attempt: u32,
    ) -> Result<HttpResponse, HttpError> {
        let res = self.attempt(request, attempt).await?;

        let code = res.status().as_u16();
        let headers = Self::parse_response_headers(res.headers());
        let body_text = res.text().await?;
        let body = Self::parse_body(&body_text);

        Ok(HttpResponse::new(code, headers, body))
    }

    /// Sends the request once. Non-2xx responses become `Response` errors.
    async fn attempt(
        &self,
        request: &HttpRequest,
        attempt: u32,
    ) -> Result<reqwest::Response, HttpError> {
        let url = self.api_root.resolve(&request.path);

        let mut req_builder = match request.http_method {
            HttpMethod::Get => self.client.get(&url),
            HttpMethod::Post => self.client.post(&url),
            HttpMethod::Patch => self.client.patch(&url),
            HttpMethod::Delete => self.client.delete(&url),
        };

        let mut headers = self.default_headers.clone();
        if request.body_type == Some(DataType::Json) {
            headers.insert(
                "Content-Type".to_string(),
                DataType::Json.as_content_type().to_string(),
            );
        }
        if let Some(extra) = &request.extra_headers {
            for (key, value) in extra {
                headers.insert(key.clone(), value.clone());
            }
        }
        for (key, value) in &headers {
            req_builder = req_builder.header(key, value);
        }

        if !request.query.is_empty() {
            req_builder = req_builder.query(&request.query);
        }

        match request.body_type {
            Some(DataType::Json) => {
                if let Some(body) = &request.body {
                    req_builder = req_builder.body(body.to_string());
                }
            }
            Some(DataType::Multipart) => {
                req_builder = req_builder.multipart(Self::multipart_form(request).await?);
            }
            None => {}
        }

        tracing::debug!(method = %request.http_method, url = %url, attempt, "Sending request");

        let res = req_builder.send().await?;

        let code = res.status().as_u16();
        if res.status().is_success() {
            return Ok(res);
        }

        let body_text = res.text().await.unwrap_or_default();
        let body = Self::parse_body(&body_text);
        Err(HttpError::Response(Self::serialize_error(code, &body)))
    }

    /// Builds a multipart form from the request's top-level body entries and
    /// attached files.
    async fn multipart_form(request: &HttpRequest) -> Result<reqwest::multipart::Form, HttpError> {
        let mut form = reqwest::multipart::Form::new();

        if let Some(serde_json::Value::Object(fields)) = &request.body {
            for (key, value) in fields {
                let text = match value {
                    serde_json::Value::Null => continue,
                    serde_json::Value::String(s) => s.clone(),
                    other => other.to_string(),
                };
                form = form.text(key.clone(), text);
            }
        }

        for part in &request.files {
            let bytes = tokio::fs::read(&part.path)
                .await
                .map_err(|source| HttpError::File {
                    path: part.path.clone(),
                    source,
                })?;
            tracing::debug!(path = %part.path.display(), size = bytes.len(), "Attaching file");
            form = form.part(
                part.field.clone(),
                reqwest::multipart::Part::bytes(bytes).file_name(part.file_name()),
            );
        }

        Ok(form)
    }

    /// Parses response headers into a `HashMap`.
    fn parse_response_headers(
        headers: &reqwest::header::HeaderMap,
    ) -> HashMap<String, Vec<String>> {
        let mut result: HashMap<String, Vec<String>> = HashMap::new();
        for (name, value) in headers {
            let key = name.as_str().to_lowercase();
            let value = value.to_str().unwrap_or_default().to_string();
            result.entry(key).or_default().push(value);
        }
        result
    }

    /// Parses a body as JSON, keeping non-JSON text under `raw_body`.
    fn parse_body(body_text: &str) -> serde_json::Value {
        if body_text.trim().is_empty() {
            return serde_json::json!({});
        }
        serde_json::from_str(body_text)
            .unwrap_or_else(|_| serde_json::json!({ "raw_body": body_text }))
    }

    /// Extracts the error code and message from a Varda error document.
    fn serialize_error(code: u16, body: &serde_json::Value) -> HttpResponseError {
        let error = body.get("error");
        let error_code = error
            .and_then(|e| e.get("code"))
            .and_then(serde_json::Value::as_str)
            .map(String::from);
        let message = error
            .and_then(|e| e.get("message"))
            .and_then(serde_json::Value::as_str)
            .map(String::from)
            .or_else(|| error.and_then(serde_json::Value::as_str).map(String::from))
            .unwrap_or_else(|| {
                reqwest::StatusCode::from_u16(code)
                    .ok()
                    .and_then(|status| status.canonical_reason())
                    .map_or_else(|| format!("HTTP status {code}"), String::from)
            });

        HttpResponseError {
            code,
            error_code,
            message,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Token;
    use serde_json::json;

    fn create_test_config(token: Option<&str>) -> ManweConfig {
        let mut builder = ManweConfig::builder()
            .api_root(ApiRoot::new("http://varda.test/api").unwrap());
        if let Some(token) = token {
            builder = builder.token(Token::new(token).unwrap());
        }
        builder.build().unwrap()
    }

    #[test]
    fn test_client_construction() {
        let client = HttpClient::new(&create_test_config(None)).unwrap();
        assert_eq!(client.api_root().as_ref(), "http://varda.test/api");
    }

    #[test]
    fn test_user_agent_header_format() {
        let client = HttpClient::new(&create_test_config(None)).unwrap();
        let user_agent = client.default_headers().get("User-Agent").unwrap();
        assert!(user_agent.starts_with("manwe/"));
    }

    #[test]
    fn test_token_header_injection() {
        let client = HttpClient::new(&create_test_config(Some("abc123"))).unwrap();
        assert_eq!(
            client.default_headers().get("Authorization"),
            Some(&"Token abc123".to_string())
        );
    }

    #[test]
    fn test_no_authorization_header_without_token() {
        let client = HttpClient::new(&create_test_config(None)).unwrap();
        assert!(client.default_headers().get("Authorization").is_none());
    }

    #[test]
    fn test_accept_header_is_json() {
        let client = HttpClient::new(&create_test_config(None)).unwrap();
        assert_eq!(
            client.default_headers().get("Accept"),
            Some(&"application/json".to_string())
        );
    }

    #[test]
    fn test_missing_ca_bundle_is_config_error() {
        let config = ManweConfig::builder()
            .verify_certificate(CertificateVerification::CaBundle(
                "/nonexistent/ca.pem".into(),
            ))
            .build()
            .unwrap();
        let result = HttpClient::new(&config);
        assert!(matches!(result, Err(ConfigError::InvalidCaBundle { .. })));
    }

    #[test]
    fn test_serialize_error_reads_varda_error_document() {
        let body = json!({"error": {"code": "forbidden", "message": "Not allowed"}});
        let error = HttpClient::serialize_error(403, &body);
        assert_eq!(error.code, 403);
        assert_eq!(error.error_code.as_deref(), Some("forbidden"));
        assert_eq!(error.message, "Not allowed");
    }

    #[test]
    fn test_serialize_error_falls_back_to_status_reason() {
        let error = HttpClient::serialize_error(502, &json!({}));
        assert_eq!(error.message, "Bad Gateway");
        assert!(error.error_code.is_none());
    }

    #[test]
    fn test_parse_body_keeps_non_json_text() {
        assert_eq!(HttpClient::parse_body(""), json!({}));
        assert_eq!(HttpClient::parse_body("{\"a\": 1}"), json!({"a": 1}));
        assert_eq!(
            HttpClient::parse_body("<html>oops</html>"),
            json!({"raw_body": "<html>oops</html>"})
        );
    }

    #[test]
    fn test_client_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<HttpClient>();
    }
}
