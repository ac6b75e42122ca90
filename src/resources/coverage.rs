//! Coverage resources.
//!
//! A coverage links a BED data source with covered regions to a sample.
//! Creating one starts a server-side import task.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::resources::{CreateParams, Link, Resource, Task, Tasked};

/// A set of covered regions imported for a sample.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Coverage {
    /// Sample the coverage is part of.
    pub sample: Option<Link>,
    /// Data source the regions are imported from.
    pub data_source: Option<Link>,
    /// Import task.
    pub task: Option<Task>,
}

impl Resource for Coverage {
    const KEY: &'static str = "coverage";
    const NAME: &'static str = "Coverage";
}

impl Tasked for Coverage {
    fn task(&self) -> Option<&Task> {
        self.task.as_ref()
    }
}

/// Arguments for creating a coverage.
#[derive(Clone, Debug)]
pub struct CoverageCreateParams {
    pub sample: Link,
    pub data_source: Link,
}

impl CreateParams for CoverageCreateParams {
    type Resource = Coverage;

    fn to_body(&self) -> Value {
        json!({
            "sample": self.sample,
            "data_source": self.data_source,
        })
    }
}

/// Filters for listing coverages.
#[derive(Clone, Debug, Default)]
pub struct CoverageListParams {
    /// Only coverages of this sample.
    pub sample: Option<Link>,
}

impl CoverageListParams {
    /// Returns the query parameters for these filters.
    #[must_use]
    pub fn to_query(&self) -> Vec<(String, String)> {
        self.sample
            .iter()
            .map(|sample| ("sample".to_string(), sample.uri().to_string()))
            .collect()
    }
}
