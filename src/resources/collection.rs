//! Paginated resource collections.
//!
//! A [`Collection`] lists the resources of one kind, optionally filtered,
//! fetching one page per request as items are consumed. Pages are requested
//! with a `Range: items=<first>-<last>` header and the server reports the
//! position and collection size in `Content-Range`.
//!
//! Collections are forward-only. To iterate again, create a new collection;
//! it starts over with fresh requests.
//!
//! # Example
//!
//! ```rust,ignore
//! let mut samples = session.samples(&SampleListParams::default());
//! while let Some(sample) = samples.next().await? {
//!     println!("{} {:?}", sample.uri(), sample.name);
//! }
//! ```

use std::collections::VecDeque;

use serde_json::Value;

use crate::resources::{RemoteErrorKind, Resource, ResourceError, TrackedResource};
use crate::session::Session;

/// A lazily paginated sequence of resources of kind `T`.
#[derive(Debug)]
pub struct Collection<'a, T> {
    session: &'a Session,
    query: Vec<(String, String)>,
    page_size: u64,
    next_start: Option<u64>,
    buffer: VecDeque<TrackedResource<T>>,
    size: u64,
}

impl<'a, T: Resource> Collection<'a, T> {
    /// Creates a collection filtered by `query`.
    ///
    /// No request is sent until the first call to [`next`](Self::next).
    #[must_use]
    pub fn new(session: &'a Session, query: Vec<(String, String)>) -> Self {
        Self {
            session,
            query,
            page_size: session.config().collection_cache_size(),
            next_start: Some(0),
            buffer: VecDeque::new(),
            size: 0,
        }
    }

    /// Returns the collection size as last reported by the server.
    ///
    /// This is 0 until the first page has been fetched. Resources may be
    /// added or removed while iterating, so the number of items produced can
    /// differ.
    #[must_use]
    pub const fn size(&self) -> u64 {
        self.size
    }

    /// Returns the next resource, fetching a page when needed.
    ///
    /// Returns `Ok(None)` at the end of the collection.
    ///
    /// # Errors
    ///
    /// Returns [`ResourceError`] if a page request fails. The collection
    /// cannot be resumed after an error.
    pub async fn next(&mut self) -> Result<Option<TrackedResource<T>>, ResourceError> {
        if self.buffer.is_empty() {
            if let Err(error) = self.fetch_page().await {
                self.next_start = None;
                return Err(error);
            }
        }
        Ok(self.buffer.pop_front())
    }

    /// Consumes the remaining resources into a vector.
    ///
    /// # Errors
    ///
    /// Returns [`ResourceError`] if any page request fails.
    pub async fn try_collect(mut self) -> Result<Vec<TrackedResource<T>>, ResourceError> {
        let mut items = Vec::new();
        while let Some(item) = self.next().await? {
            items.push(item);
        }
        Ok(items)
    }

    async fn fetch_page(&mut self) -> Result<(), ResourceError> {
        let Some(start) = self.next_start else {
            return Ok(());
        };

        let collection_key = T::collection_key();
        let uri = self.session.endpoint(&collection_key).await?;
        let end = start.saturating_add(self.page_size.saturating_sub(1));
        let range = format!("items={start}-{end}");

        let response = match self
            .session
            .get_page(&uri, self.query.clone(), range)
            .await
        {
            Ok(response) => response,
            Err(error) if error.kind() == Some(RemoteErrorKind::UnsatisfiableRange) => {
                tracing::debug!(uri = %uri, "Empty collection");
                self.size = 0;
                self.next_start = None;
                return Ok(());
            }
            Err(error) => return Err(error),
        };

        let items = response
            .body
            .get(&collection_key)
            .and_then(|collection| collection.get("items"))
            .and_then(Value::as_array)
            .ok_or_else(|| {
                ResourceError::invalid_response(&uri, format!("missing '{collection_key}.items'"))
            })?;

        for item in items {
            self.buffer
                .push_back(TrackedResource::from_document(item.clone(), &uri)?);
        }

        if let Some(total) = response.content_range.and_then(|range| range.total) {
            self.size = total;
        }

        self.next_start = match response.content_range {
            _ if items.is_empty() => None,
            Some(range) if range.has_more() => range.next_start(),
            Some(_) => None,
            None => start.checked_add(items.len() as u64),
        };

        tracing::debug!(
            uri = %uri,
            start,
            received = items.len(),
            size = self.size,
            "Fetched collection page"
        );
        Ok(())
    }
}
