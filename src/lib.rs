//! # Manwë
//!
//! A Rust client for the Varda variant frequency database, with a command
//! line interface built on top of it.
//!
//! ## Overview
//!
//! This crate provides:
//! - Typed configuration via [`ManweConfig`] and [`ManweConfigBuilder`],
//!   loaded from TOML files with [`load_config`]
//! - A [`Session`] that discovers the API endpoints and creates resources
//! - Lazily loaded resource proxies with dirty tracking via
//!   [`TrackedResource`]
//! - Paginated collections with server-side filtering via
//!   [`Collection`](resources::Collection)
//! - Multi-step import and annotation workflows in [`import`]
//! - An async HTTP client with retries for idempotent requests
//!
//! ## Quick Start
//!
//! ```rust
//! use manwe::{ManweConfig, ApiRoot, Token};
//!
//! let config = ManweConfig::builder()
//!     .api_root(ApiRoot::new("https://varda.example.com/api").unwrap())
//!     .token(Token::new("d3b07384d113edec").unwrap())
//!     .build()
//!     .unwrap();
//! ```
//!
//! ## Working With Resources
//!
//! ```rust,ignore
//! use manwe::{load_config, Session};
//! use manwe::resources::{Sample, SampleCreateParams, SampleListParams};
//!
//! let session = Session::new(load_config(None)?)?;
//!
//! // Create a sample; the returned proxy is loaded on first access
//! let mut sample = session.create(&SampleCreateParams::new("Trio")).await?;
//! sample.ensure_loaded(&session).await?;
//!
//! // Local edits are sent with save()
//! sample.set_active(true);
//! sample.save(&session).await?;
//!
//! // Iterate over the public samples
//! let mut samples = session.samples(&SampleListParams {
//!     public: Some(true),
//!     ..SampleListParams::default()
//! });
//! while let Some(sample) = samples.next().await? {
//!     println!("{}: {:?}", sample.uri(), sample.name);
//! }
//! ```
//!
//! ## Design Principles
//!
//! - **No global state**: configuration is passed to the session explicitly
//! - **Fail fast**: configuration values are validated on construction
//! - **Thread-safe**: [`Session`] and [`ManweConfig`] are `Send + Sync`
//! - **Async-first**: built on Tokio

pub mod cli;
pub mod clients;
pub mod config;
pub mod error;
pub mod import;
pub mod logging;
pub mod resources;
pub mod session;

// Re-export public types at crate root for convenience
pub use config::{
    load_config, ApiRoot, CertificateVerification, ManweConfig, ManweConfigBuilder, Token,
};
pub use error::ConfigError;
pub use resources::{ResourceError, ResourceState, TrackedResource};
pub use session::Session;

// Re-export HTTP client types
pub use clients::{
    ContentRange, DataType, FilePart, HttpClient, HttpError, HttpMethod, HttpRequest,
    HttpRequestBuilder, HttpResponse, HttpResponseError, InvalidHttpRequestError,
    MaxHttpRetriesExceededError,
};
