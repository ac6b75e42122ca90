//! Traits implemented by every resource kind.
//!
//! A resource kind is a plain struct with one `Option` field per API field,
//! deriving serde. Implementing [`Resource`] connects it to its key in the
//! Varda API, from which everything else is derived:
//!
//! - the response document key (`sample` in `{"sample": {...}}`)
//! - the root document entry pointing at its collection (`sample_collection`)
//! - the key of the item list in collection pages
//!
//! # Example
//!
//! ```rust,ignore
//! use manwe::resources::Resource;
//! use serde::{Deserialize, Serialize};
//!
//! #[derive(Clone, Debug, Default, Serialize, Deserialize)]
//! #[serde(default)]
//! pub struct Group {
//!     pub name: Option<String>,
//! }
//!
//! impl Resource for Group {
//!     const KEY: &'static str = "group";
//!     const NAME: &'static str = "Group";
//! }
//! ```

use std::fmt::Debug;

use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;

use crate::clients::FilePart;
use crate::resources::Task;

/// A kind of server resource.
///
/// # Required Bounds
///
/// `Default` provides the field values of a resource that has not been
/// fetched yet. Every field should therefore be an `Option` (or a
/// collection) and the struct should carry `#[serde(default)]`.
pub trait Resource:
    Serialize + DeserializeOwned + Default + Clone + Debug + Send + Sync + Sized
{
    /// Key of this kind in the Varda API (e.g. `"data_source"`).
    const KEY: &'static str;

    /// Human readable name used in messages (e.g. `"Data source"`).
    const NAME: &'static str;

    /// Returns the root document entry for this kind's collection.
    #[must_use]
    fn collection_key() -> String {
        format!("{}_collection", Self::KEY)
    }
}

/// Arguments for creating a resource.
///
/// Each resource kind has one implementation; its associated `Resource`
/// type lets [`Session::create`](crate::Session::create) infer what is
/// being created.
pub trait CreateParams: Send + Sync {
    /// The kind of resource this creates.
    type Resource: Resource;

    /// Returns the request body.
    fn to_body(&self) -> Value;

    /// Returns a file to upload with the request, if any.
    ///
    /// A create request with an upload is sent as multipart form data.
    fn upload(&self) -> Option<FilePart> {
        None
    }
}

/// A resource kind whose creation starts a server-side task.
pub trait Tasked: Resource {
    /// Returns the task state, if known.
    fn task(&self) -> Option<&Task>;
}
