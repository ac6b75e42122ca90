//! Variation resources.
//!
//! A variation links a VCF data source to a sample. Creating one starts a
//! server-side task importing the observed variants.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::resources::{CreateParams, Link, Resource, Task, Tasked};

/// A set of observed variants imported for a sample.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Variation {
    /// Sample the variation is part of.
    pub sample: Option<Link>,
    /// Data source the variants are imported from.
    pub data_source: Option<Link>,
    /// Import task.
    pub task: Option<Task>,
}

impl Resource for Variation {
    const KEY: &'static str = "variation";
    const NAME: &'static str = "Variation";
}

impl Tasked for Variation {
    fn task(&self) -> Option<&Task> {
        self.task.as_ref()
    }
}

/// Arguments for creating a variation.
#[derive(Clone, Debug)]
pub struct VariationCreateParams {
    /// Sample the variation is part of.
    pub sample: Link,
    /// Data source with the variants, a VCF file.
    pub data_source: Link,
    /// Discard entries marked as filtered (default: `true`).
    pub skip_filtered: bool,
    /// Use per-sample genotype information (default: `true`).
    pub use_genotypes: bool,
    /// Derive genotypes from likelihood scores instead of reported
    /// genotypes (default: `false`).
    pub prefer_genotype_likelihoods: bool,
}

impl VariationCreateParams {
    /// Creates parameters with default import options.
    #[must_use]
    pub const fn new(sample: Link, data_source: Link) -> Self {
        Self {
            sample,
            data_source,
            skip_filtered: true,
            use_genotypes: true,
            prefer_genotype_likelihoods: false,
        }
    }
}

impl CreateParams for VariationCreateParams {
    type Resource = Variation;

    fn to_body(&self) -> Value {
        json!({
            "sample": self.sample,
            "data_source": self.data_source,
            "skip_filtered": self.skip_filtered,
            "use_genotypes": self.use_genotypes,
            "prefer_genotype_likelihoods": self.prefer_genotype_likelihoods,
        })
    }
}

/// Filters for listing variations.
#[derive(Clone, Debug, Default)]
pub struct VariationListParams {
    /// Only variations of this sample.
    pub sample: Option<Link>,
}

impl VariationListParams {
    /// Returns the query parameters for these filters.
    #[must_use]
    pub fn to_query(&self) -> Vec<(String, String)> {
        self.sample
            .iter()
            .map(|sample| ("sample".to_string(), sample.uri().to_string()))
            .collect()
    }
}
