//! Session for interfacing with the Varda API.
//!
//! A [`Session`] holds the configuration and HTTP client, discovers the
//! collection endpoints from the API root, and is the factory for resource
//! proxies and collections.
//!
//! # Example
//!
//! ```rust,ignore
//! use manwe::{load_config, Session};
//! use manwe::resources::SampleListParams;
//!
//! let session = Session::new(load_config(None)?)?;
//!
//! let mut samples = session.samples(&SampleListParams::default());
//! while let Some(sample) = samples.next().await? {
//!     println!("{}", sample.uri());
//! }
//! ```

use std::collections::HashMap;

use serde_json::Value;
use tokio::io::{AsyncWrite, AsyncWriteExt, BufWriter};
use tokio::sync::OnceCell;

use crate::clients::{DataType, HttpClient, HttpMethod, HttpRequest, HttpRequestBuilder, HttpResponse};
use crate::config::ManweConfig;
use crate::resources::{
    Annotation, Collection, Coverage, CoverageListParams, CreateParams, DataSource,
    DataSourceListParams, Group, Resource, ResourceError, Sample, SampleListParams,
    TrackedResource, User, Variant, Variation, VariationListParams,
};

/// Session for interfacing with the Varda API.
///
/// Every request carries the configured token; the server keeps no session
/// state. Requests are sent one at a time and each operation completes
/// before it returns.
///
/// # Thread Safety
///
/// `Session` is `Send + Sync` and can be shared by reference. The resource
/// proxies it hands out are not synchronized; mutate each from one task.
#[derive(Debug)]
pub struct Session {
    config: ManweConfig,
    client: HttpClient,
    endpoints: OnceCell<HashMap<String, String>>,
}

// Verify Session is Send + Sync at compile time
const _: fn() = || {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<Session>();
};

impl Session {
    /// Creates a session.
    ///
    /// No request is sent; endpoints are discovered on first use.
    ///
    /// # Errors
    ///
    /// Returns [`ResourceError::Configuration`] if the HTTP client cannot
    /// be built from the configuration.
    pub fn new(config: ManweConfig) -> Result<Self, ResourceError> {
        let client = HttpClient::new(&config)?;
        Ok(Self {
            config,
            client,
            endpoints: OnceCell::new(),
        })
    }

    /// Returns the configuration.
    #[must_use]
    pub const fn config(&self) -> &ManweConfig {
        &self.config
    }

    /// Returns the HTTP client.
    #[must_use]
    pub const fn client(&self) -> &HttpClient {
        &self.client
    }

    /// Returns the URI of an endpoint listed in the API root document, such
    /// as `sample_collection`.
    ///
    /// The root document is fetched once per session.
    ///
    /// # Errors
    ///
    /// Returns [`ResourceError`] if the root document cannot be fetched or
    /// does not list the endpoint.
    pub async fn endpoint(&self, key: &str) -> Result<String, ResourceError> {
        let endpoints = self
            .endpoints
            .get_or_try_init(|| self.discover_endpoints())
            .await?;

        endpoints.get(key).cloned().ok_or_else(|| {
            ResourceError::invalid_response(
                self.config.api_root().as_ref(),
                format!("no '{key}' endpoint"),
            )
        })
    }

    async fn discover_endpoints(&self) -> Result<HashMap<String, String>, ResourceError> {
        let response = self.get("/").await?;

        let root = response
            .body
            .get("root")
            .and_then(Value::as_object)
            .ok_or_else(|| {
                ResourceError::invalid_response(
                    self.config.api_root().as_ref(),
                    "missing 'root' document",
                )
            })?;

        let endpoints: HashMap<String, String> = root
            .iter()
            .filter_map(|(key, value)| {
                let uri = match value {
                    Value::String(uri) => uri.as_str(),
                    Value::Object(object) => object.get("uri")?.as_str()?,
                    _ => return None,
                };
                Some((key.clone(), uri.to_string()))
            })
            .collect();

        tracing::debug!(count = endpoints.len(), "Discovered API endpoints");
        Ok(endpoints)
    }

    // ---- Requests ----

    /// Sends a GET request, retried on transient failures.
    pub(crate) async fn get(&self, uri: &str) -> Result<HttpResponse, ResourceError> {
        self.get_with_query(uri, Vec::new()).await
    }

    /// Sends a GET request with query parameters.
    pub(crate) async fn get_with_query(
        &self,
        uri: &str,
        query: Vec<(String, String)>,
    ) -> Result<HttpResponse, ResourceError> {
        let builder = HttpRequest::builder(HttpMethod::Get, uri)
            .query(query)
            .tries(self.config.max_tries());
        self.make_request(uri, builder).await
    }

    /// Sends a GET request for a collection page.
    pub(crate) async fn get_page(
        &self,
        uri: &str,
        query: Vec<(String, String)>,
        range: String,
    ) -> Result<HttpResponse, ResourceError> {
        let builder = HttpRequest::builder(HttpMethod::Get, uri)
            .query(query)
            .header("Range", range)
            .tries(self.config.max_tries());
        self.make_request(uri, builder).await
    }

    /// Sends a PATCH request with a JSON body. Never retried.
    pub(crate) async fn patch(&self, uri: &str, body: Value) -> Result<HttpResponse, ResourceError> {
        let builder = HttpRequest::builder(HttpMethod::Patch, uri)
            .body(body)
            .body_type(DataType::Json);
        self.make_request(uri, builder).await
    }

    async fn make_request(
        &self,
        uri: &str,
        builder: HttpRequestBuilder,
    ) -> Result<HttpResponse, ResourceError> {
        let request = builder
            .build()
            .map_err(|e| ResourceError::from_http(e.into(), uri))?;

        self.client
            .request(request)
            .await
            .map_err(|e| ResourceError::from_http(e, uri))
    }

    // ---- Resources ----

    /// Returns an unmaterialized proxy for the resource of kind `T` at `uri`.
    #[must_use]
    pub fn resource<T: Resource>(&self, uri: impl Into<String>) -> TrackedResource<T> {
        TrackedResource::from_uri(uri)
    }

    /// Fetches the resource of kind `T` at `uri`.
    ///
    /// # Errors
    ///
    /// Returns [`ResourceError::NotFound`] if the resource does not exist,
    /// or any error of the underlying request.
    pub async fn fetch<T: Resource>(
        &self,
        uri: impl Into<String>,
    ) -> Result<TrackedResource<T>, ResourceError> {
        let mut resource: TrackedResource<T> = TrackedResource::from_uri(uri);
        resource.ensure_loaded(self).await?;
        Ok(resource)
    }

    /// Returns a proxy for the annotation at `uri`. No request is sent.
    #[must_use]
    pub fn annotation(&self, uri: impl Into<String>) -> TrackedResource<Annotation> {
        self.resource(uri)
    }

    /// Returns a proxy for the coverage at `uri`. No request is sent.
    #[must_use]
    pub fn coverage(&self, uri: impl Into<String>) -> TrackedResource<Coverage> {
        self.resource(uri)
    }

    /// Returns a proxy for the data source at `uri`. No request is sent.
    #[must_use]
    pub fn data_source(&self, uri: impl Into<String>) -> TrackedResource<DataSource> {
        self.resource(uri)
    }

    /// Returns a proxy for the group at `uri`. No request is sent.
    #[must_use]
    pub fn group(&self, uri: impl Into<String>) -> TrackedResource<Group> {
        self.resource(uri)
    }

    /// Returns a proxy for the sample at `uri`. No request is sent.
    #[must_use]
    pub fn sample(&self, uri: impl Into<String>) -> TrackedResource<Sample> {
        self.resource(uri)
    }

    /// Returns a proxy for the user at `uri`. No request is sent.
    #[must_use]
    pub fn user(&self, uri: impl Into<String>) -> TrackedResource<User> {
        self.resource(uri)
    }

    /// Returns a proxy for the variant at `uri`. No request is sent.
    #[must_use]
    pub fn variant(&self, uri: impl Into<String>) -> TrackedResource<Variant> {
        self.resource(uri)
    }

    /// Returns a proxy for the variation at `uri`. No request is sent.
    #[must_use]
    pub fn variation(&self, uri: impl Into<String>) -> TrackedResource<Variation> {
        self.resource(uri)
    }

    // ---- Collections ----

    /// Returns a collection of resources of kind `T` filtered by `query`.
    #[must_use]
    pub fn collection<T: Resource>(&self, query: Vec<(String, String)>) -> Collection<'_, T> {
        Collection::new(self, query)
    }

    #[must_use]
    pub fn annotations(&self) -> Collection<'_, Annotation> {
        self.collection(Vec::new())
    }

    #[must_use]
    pub fn coverages(&self, params: &CoverageListParams) -> Collection<'_, Coverage> {
        self.collection(params.to_query())
    }

    #[must_use]
    pub fn data_sources(&self, params: &DataSourceListParams) -> Collection<'_, DataSource> {
        self.collection(params.to_query())
    }

    #[must_use]
    pub fn groups(&self) -> Collection<'_, Group> {
        self.collection(Vec::new())
    }

    #[must_use]
    pub fn samples(&self, params: &SampleListParams) -> Collection<'_, Sample> {
        self.collection(params.to_query())
    }

    #[must_use]
    pub fn users(&self) -> Collection<'_, User> {
        self.collection(Vec::new())
    }

    #[must_use]
    pub fn variants(&self) -> Collection<'_, Variant> {
        self.collection(Vec::new())
    }

    #[must_use]
    pub fn variations(&self, params: &VariationListParams) -> Collection<'_, Variation> {
        self.collection(params.to_query())
    }

    // ---- Operations ----

    /// Creates a resource and returns an unmaterialized proxy for it.
    ///
    /// The request is sent once and never retried. With an upload, the
    /// file is sent as multipart form data.
    ///
    /// # Errors
    ///
    /// Returns [`ResourceError::Upload`] if the file to upload cannot be
    /// read or sent, [`ResourceError::Remote`] if the server rejects the
    /// request, and [`ResourceError::InvalidResponse`] if the response has
    /// no `Location` header.
    pub async fn create<P: CreateParams>(
        &self,
        params: &P,
    ) -> Result<TrackedResource<P::Resource>, ResourceError> {
        let uri = self.endpoint(&P::Resource::collection_key()).await?;
        let upload = params.upload();

        let mut builder = HttpRequest::builder(HttpMethod::Post, &uri).body(params.to_body());
        builder = match &upload {
            Some(part) => builder.body_type(DataType::Multipart).file(part.clone()),
            None => builder.body_type(DataType::Json),
        };

        let request = builder
            .build()
            .map_err(|e| ResourceError::from_http(e.into(), &uri))?;

        let response = self.client.request(request).await.map_err(|e| match &upload {
            Some(part) => ResourceError::from_upload(e, &uri, &part.path),
            None => ResourceError::from_http(e, &uri),
        })?;

        let location = response
            .location()
            .ok_or_else(|| ResourceError::invalid_response(&uri, "missing Location header"))?;

        tracing::info!(uri = %location, "Created {}", P::Resource::NAME.to_lowercase());
        Ok(TrackedResource::from_uri(location))
    }

    /// Writes the data of a data source to `writer`.
    ///
    /// The data source is fetched first if needed. Data is received in
    /// chunks and written through a buffer of `data_buffer_size` bytes.
    /// Returns the number of bytes written.
    ///
    /// # Errors
    ///
    /// Returns [`ResourceError::Download`] if the data cannot be received or
    /// written, or any error of the underlying requests.
    pub async fn download_data_source<W>(
        &self,
        data_source: &mut TrackedResource<DataSource>,
        writer: W,
    ) -> Result<u64, ResourceError>
    where
        W: AsyncWrite + Unpin,
    {
        data_source.ensure_loaded(self).await?;
        let uri = data_source
            .data
            .as_ref()
            .map(|data| data.uri().to_string())
            .ok_or_else(|| {
                ResourceError::invalid_response(data_source.uri(), "data source without data")
            })?;

        let request = HttpRequest::builder(HttpMethod::Get, &uri)
            .header("Accept", "*/*")
            .tries(self.config.max_tries())
            .build()
            .map_err(|e| ResourceError::from_http(e.into(), &uri))?;
        let mut response = self
            .client
            .request_raw(request)
            .await
            .map_err(|e| ResourceError::from_http(e, &uri))?;

        let download_failed = |message: String| ResourceError::Download {
            uri: uri.clone(),
            message,
        };

        let mut output = BufWriter::with_capacity(self.config.data_buffer_size(), writer);
        let mut written: u64 = 0;
        while let Some(chunk) = response
            .chunk()
            .await
            .map_err(|e| download_failed(e.to_string()))?
        {
            output
                .write_all(&chunk)
                .await
                .map_err(|e| download_failed(e.to_string()))?;
            written += chunk.len() as u64;
        }
        output
            .flush()
            .await
            .map_err(|e| download_failed(e.to_string()))?;

        tracing::debug!(uri = %uri, bytes = written, "Downloaded data");
        Ok(written)
    }
}
