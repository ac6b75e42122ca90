//! HTTP transport for Varda API communication.
//!
//! This module provides the foundational HTTP layer: request building,
//! authentication headers, URI resolution, response and error document
//! parsing, and retries.
//!
//! # Overview
//!
//! - [`HttpClient`]: the async HTTP client
//! - [`HttpRequest`]: a request to be sent to the API
//! - [`HttpResponse`]: a parsed response
//! - [`ContentRange`]: the item range reported for collection pages
//! - [`HttpMethod`]: GET, POST, PATCH, DELETE
//! - [`DataType`]: JSON or multipart bodies
//!
//! # Retry Behavior
//!
//! - **Timeouts and connection failures** on GET and DELETE requests are
//!   retried up to `tries` attempts with a fixed wait between attempts.
//! - **POST and PATCH** are attempted once; a request configured otherwise
//!   fails validation.
//! - **Non-2xx responses** are returned immediately without retry.
//!
//! The default `tries` is 1. The session uses the configured
//! `max_tries` for every GET it sends.

mod errors;
mod http_client;
mod http_request;
mod http_response;

pub use errors::{
    HttpError, HttpResponseError, InvalidHttpRequestError, MaxHttpRetriesExceededError,
};
pub use http_client::{HttpClient, SDK_VERSION};
pub use http_request::{DataType, FilePart, HttpMethod, HttpRequest, HttpRequestBuilder};
pub use http_response::{ContentRange, HttpResponse};
