//! Lazy loading and dirty tracking for server resources.
//!
//! This module provides [`TrackedResource<T>`], a local proxy for one server
//! resource. It holds the resource URI, the field values known locally, the
//! names of fields modified since the last fetch or save, and whether the
//! full representation has been fetched.
//!
//! # States
//!
//! ```text
//! Unmaterialized --ensure_loaded/refresh--> Materialized
//! Materialized   --set_*-->                 Dirty
//! Dirty          --save/refresh-->          Materialized
//! any            --404-->                   Invalid
//! ```
//!
//! Field values are read through `Deref`. Fields of a resource that has not
//! been fetched read as `None`; call [`TrackedResource::ensure_loaded`] first.
//! Only mutable fields have setters, defined per resource kind. Setting a
//! field never sends a request; [`TrackedResource::save`] sends the modified
//! fields as a partial update.
//!
//! # Example
//!
//! ```rust,ignore
//! let mut sample = session.sample("/samples/3");
//! sample.ensure_loaded(&session).await?;
//! println!("{:?}", sample.name);
//!
//! sample.set_active(true);
//! assert!(sample.is_dirty());
//!
//! sample.save(&session).await?;
//! assert!(!sample.is_dirty());
//! ```

use std::collections::BTreeSet;
use std::fmt;
use std::ops::Deref;

use serde_json::{Map, Value};

use crate::resources::{Resource, ResourceError, Task, Tasked};
use crate::session::Session;

/// Lifecycle state of a [`TrackedResource`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ResourceState {
    /// Only the URI (and any locally set fields) is known.
    Unmaterialized,
    /// Field values match the server's as of the last fetch or save.
    Materialized,
    /// Some fields were set locally and not yet saved.
    Dirty,
    /// The server reported that the resource does not exist.
    Invalid,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Loaded {
    No,
    Yes,
    Gone,
}

/// A server resource with lazily fetched fields and dirty tracking.
///
/// `TrackedResource` implements `Deref<Target = T>` but not `DerefMut`, so
/// every modification goes through a setter that records the field as
/// dirty.
#[derive(Clone, Debug)]
pub struct TrackedResource<T> {
    uri: String,
    resource: T,
    dirty: BTreeSet<&'static str>,
    loaded: Loaded,
}

impl<T: Resource> TrackedResource<T> {
    /// Creates an unmaterialized proxy for the resource at `uri`.
    ///
    /// No request is sent.
    #[must_use]
    pub fn from_uri(uri: impl Into<String>) -> Self {
        Self {
            uri: uri.into(),
            resource: T::default(),
            dirty: BTreeSet::new(),
            loaded: Loaded::No,
        }
    }

    /// Creates a materialized proxy from a resource representation.
    ///
    /// The representation must contain the resource's `uri`.
    ///
    /// # Errors
    ///
    /// Returns [`ResourceError::InvalidResponse`] if the representation has
    /// no `uri` or does not match `T`. `source` names the request it came
    /// from.
    pub fn from_document(document: Value, source: &str) -> Result<Self, ResourceError> {
        let uri = document
            .get("uri")
            .and_then(Value::as_str)
            .map(String::from)
            .ok_or_else(|| {
                ResourceError::invalid_response(source, format!("{} without uri", T::NAME))
            })?;
        let resource = decode::<T>(document, source)?;

        Ok(Self {
            uri,
            resource,
            dirty: BTreeSet::new(),
            loaded: Loaded::Yes,
        })
    }

    /// Returns the resource URI.
    #[must_use]
    pub fn uri(&self) -> &str {
        &self.uri
    }

    /// Returns the lifecycle state.
    #[must_use]
    pub fn state(&self) -> ResourceState {
        match self.loaded {
            Loaded::Gone => ResourceState::Invalid,
            _ if !self.dirty.is_empty() => ResourceState::Dirty,
            Loaded::Yes => ResourceState::Materialized,
            Loaded::No => ResourceState::Unmaterialized,
        }
    }

    /// Returns `true` if the full representation has been fetched.
    #[must_use]
    pub fn is_materialized(&self) -> bool {
        self.loaded == Loaded::Yes
    }

    /// Returns `true` if there are unsaved changes.
    #[must_use]
    pub fn is_dirty(&self) -> bool {
        !self.dirty.is_empty()
    }

    /// Returns the names of fields set since the last fetch or save.
    pub fn dirty_fields(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.dirty.iter().copied()
    }

    /// Returns the values of the dirty fields, as sent by [`save`](Self::save).
    #[must_use]
    pub fn changed_fields(&self) -> Value {
        let Ok(Value::Object(current)) = serde_json::to_value(&self.resource) else {
            return Value::Object(Map::new());
        };

        Value::Object(
            current
                .into_iter()
                .filter(|(key, _)| self.dirty.contains(key.as_str()))
                .collect(),
        )
    }

    /// Consumes the proxy, returning the field values.
    #[must_use]
    pub fn into_inner(self) -> T {
        self.resource
    }

    /// Applies a modification and marks `field` dirty.
    ///
    /// The field is marked even if the new value equals the old one.
    pub(crate) fn update(&mut self, field: &'static str, apply: impl FnOnce(&mut T)) {
        apply(&mut self.resource);
        self.dirty.insert(field);
    }

    /// Fetches the representation if it has not been fetched yet.
    ///
    /// Fields set locally keep their local values and stay dirty.
    ///
    /// # Errors
    ///
    /// Returns [`ResourceError::NotFound`] if the resource does not exist,
    /// or any error of the underlying request.
    pub async fn ensure_loaded(&mut self, session: &Session) -> Result<(), ResourceError> {
        match self.loaded {
            Loaded::Yes => Ok(()),
            Loaded::Gone => Err(self.not_found()),
            Loaded::No => {
                let mut fetched = self.fetch_document(session).await?;
                if let Ok(Value::Object(local)) = serde_json::to_value(&self.resource) {
                    for (key, value) in local {
                        if self.dirty.contains(key.as_str()) {
                            fetched.insert(key, value);
                        }
                    }
                }
                self.resource = decode::<T>(Value::Object(fetched), &self.uri)?;
                self.loaded = Loaded::Yes;
                Ok(())
            }
        }
    }

    /// Fetches the representation again, replacing all field values.
    ///
    /// Unsaved changes are discarded and the dirty set is cleared. Call
    /// [`save`](Self::save) first to keep them.
    ///
    /// # Errors
    ///
    /// Returns [`ResourceError::NotFound`] if the resource does not exist,
    /// or any error of the underlying request.
    pub async fn refresh(&mut self, session: &Session) -> Result<(), ResourceError> {
        if self.loaded == Loaded::Gone {
            return Err(self.not_found());
        }

        let fetched = self.fetch_document(session).await?;
        self.resource = decode::<T>(Value::Object(fetched), &self.uri)?;
        self.dirty.clear();
        self.loaded = Loaded::Yes;
        Ok(())
    }

    /// Sends the dirty fields to the server as a partial update.
    ///
    /// Without dirty fields no request is sent. On success the dirty set is
    /// cleared and any fields returned by the server are merged; on failure
    /// it is left unchanged.
    ///
    /// # Errors
    ///
    /// Returns [`ResourceError::Remote`] if the server rejects the update,
    /// [`ResourceError::NotFound`] if the resource does not exist, or any
    /// error of the underlying request.
    pub async fn save(&mut self, session: &Session) -> Result<(), ResourceError> {
        if self.loaded == Loaded::Gone {
            return Err(self.not_found());
        }
        if self.dirty.is_empty() {
            return Ok(());
        }

        let changes = self.changed_fields();
        tracing::debug!(uri = %self.uri, fields = ?self.dirty, "Saving {}", T::NAME);

        let response = match session.patch(&self.uri, changes).await {
            Ok(response) => response,
            Err(error) => {
                if error.is_not_found() {
                    self.loaded = Loaded::Gone;
                }
                return Err(error);
            }
        };

        if let Some(Value::Object(returned)) = response.body.get(T::KEY) {
            if let Ok(Value::Object(mut current)) = serde_json::to_value(&self.resource) {
                for (key, value) in returned {
                    current.insert(key.clone(), value.clone());
                }
                self.resource = decode::<T>(Value::Object(current), &self.uri)?;
            }
        }

        self.dirty.clear();
        Ok(())
    }

    async fn fetch_document(&mut self, session: &Session) -> Result<Map<String, Value>, ResourceError> {
        let response = match session.get(&self.uri).await {
            Ok(response) => response,
            Err(error) => {
                if error.is_not_found() {
                    self.loaded = Loaded::Gone;
                }
                return Err(error);
            }
        };

        match response.body.get(T::KEY) {
            Some(Value::Object(document)) => Ok(document.clone()),
            _ => Err(ResourceError::invalid_response(
                &self.uri,
                format!("missing '{}' document", T::KEY),
            )),
        }
    }

    fn not_found(&self) -> ResourceError {
        ResourceError::NotFound {
            uri: self.uri.clone(),
        }
    }
}

impl<T: Tasked> TrackedResource<T> {
    /// Refreshes the resource until its task is done.
    ///
    /// The resource is refreshed immediately and then every
    /// `task_poll_wait`. Like [`refresh`](Self::refresh), this discards
    /// unsaved changes.
    ///
    /// # Errors
    ///
    /// Returns [`ResourceError::TaskFailed`] if the task finished with an
    /// error, or any error of the underlying requests.
    pub async fn wait_for_task(&mut self, session: &Session) -> Result<Task, ResourceError> {
        loop {
            self.refresh(session).await?;
            let task = self.resource.task().cloned().unwrap_or_default();

            if let Some(error) = task.error {
                return Err(ResourceError::TaskFailed {
                    uri: self.uri.clone(),
                    code: error.code,
                    message: error.message,
                });
            }
            if task.done {
                return Ok(task);
            }

            tracing::debug!(uri = %self.uri, progress = ?task.progress, "Waiting for task");
            tokio::time::sleep(session.config().task_poll_wait()).await;
        }
    }
}

fn decode<T: Resource>(document: Value, source: &str) -> Result<T, ResourceError> {
    serde_json::from_value(document).map_err(|e| {
        ResourceError::invalid_response(source, format!("malformed {}: {e}", T::NAME))
    })
}

impl<T> Deref for TrackedResource<T> {
    type Target = T;

    fn deref(&self) -> &Self::Target {
        &self.resource
    }
}

impl<T> fmt::Display for TrackedResource<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.uri)
    }
}
