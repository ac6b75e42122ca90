//! Varda resources.
//!
//! This module maps the resources of the Varda API to typed local proxies.
//!
//! # Overview
//!
//! - [`Resource`]: implemented by each resource kind, connecting it to its
//!   API key
//! - [`TrackedResource`]: a proxy for one resource with lazy loading and
//!   dirty tracking
//! - [`Collection`]: a lazily paginated list of resources
//! - [`CreateParams`]: arguments for creating a resource of some kind
//! - [`ResourceError`]: the error type of every resource operation
//!
//! # Resource Kinds
//!
//! | Kind           | Key           | Task | Mutable fields                          |
//! |----------------|---------------|------|-----------------------------------------|
//! | [`Annotation`] | `annotation`  | yes  |                                         |
//! | [`Coverage`]   | `coverage`    | yes  |                                         |
//! | [`DataSource`] | `data_source` | no   | `name`                                  |
//! | [`Group`]      | `group`       | no   | `name`                                  |
//! | [`Sample`]     | `sample`      | no   | all but `user` and `added`              |
//! | [`User`]       | `user`        | no   | `password`, `name`, `email`, `roles`    |
//! | [`Variant`]    | `variant`     | no   |                                         |
//! | [`Variation`]  | `variation`   | yes  |                                         |

mod annotation;
mod collection;
mod coverage;
mod data_source;
mod errors;
mod fields;
mod group;
mod resource;
mod sample;
mod tracking;
mod user;
mod variant;
mod variation;

pub use annotation::{Annotation, AnnotationCreateParams};
pub use collection::Collection;
pub use coverage::{Coverage, CoverageCreateParams, CoverageListParams};
pub use data_source::{
    DataSource, DataSourceCreateParams, DataSourceInput, DataSourceListParams, Filetype,
};
pub use errors::{RemoteErrorKind, ResourceError};
pub use fields::{queries_to_json, Link, Queries, Task, TaskError, VariantFrequency};
pub use group::{Group, GroupCreateParams};
pub use resource::{CreateParams, Resource, Tasked};
pub use sample::{Sample, SampleCreateParams, SampleListParams};
pub use tracking::{ResourceState, TrackedResource};
pub use user::{User, UserCreateParams, USER_ROLES};
pub use variant::{Variant, VariantCreateParams};
pub use variation::{Variation, VariationCreateParams, VariationListParams};
