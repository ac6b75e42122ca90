//! Annotation resources.
//!
//! An annotation computes, for every variant or region in a data source, the
//! observed frequencies over the samples selected by each query. The result
//! is written to a new data source.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::resources::fields::queries_to_json;
use crate::resources::{CreateParams, Link, Queries, Resource, Task, Tasked};

/// An annotation of a data source.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Annotation {
    /// Data source that was annotated.
    pub original_data_source: Option<Link>,
    /// Data source with the annotated result.
    pub annotated_data_source: Option<Link>,
    /// Annotation task.
    pub task: Option<Task>,
}

impl Resource for Annotation {
    const KEY: &'static str = "annotation";
    const NAME: &'static str = "Annotation";
}

impl Tasked for Annotation {
    fn task(&self) -> Option<&Task> {
        self.task.as_ref()
    }
}

/// Arguments for creating an annotation.
///
/// Query names must be alphanumeric; expressions use Varda's query syntax,
/// e.g. `*` for all samples or `sample:/samples/3`.
#[derive(Clone, Debug)]
pub struct AnnotationCreateParams {
    /// Data source to annotate.
    pub data_source: Link,
    /// Human readable annotation name.
    pub name: Option<String>,
    /// Queries to calculate frequencies over.
    pub queries: Queries,
}

impl AnnotationCreateParams {
    #[must_use]
    pub fn new(data_source: Link, queries: Queries) -> Self {
        Self {
            data_source,
            name: None,
            queries,
        }
    }
}

impl CreateParams for AnnotationCreateParams {
    type Resource = Annotation;

    fn to_body(&self) -> Value {
        let mut body = json!({
            "data_source": self.data_source,
            "queries": queries_to_json(&self.queries),
        });
        if let Some(name) = &self.name {
            body["name"] = json!(name);
        }
        body
    }
}
