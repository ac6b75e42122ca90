//! Variant resources.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::resources::fields::queries_to_json;
use crate::resources::{
    CreateParams, Queries, Resource, ResourceError, TrackedResource, VariantFrequency,
};
use crate::session::Session;

/// A genomic variant.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Variant {
    /// Chromosome name.
    pub chromosome: Option<String>,
    /// Position of the variant on the chromosome.
    pub position: Option<u64>,
    /// Reference allele.
    pub reference: Option<String>,
    /// Observed allele.
    pub observed: Option<String>,
}

impl Resource for Variant {
    const KEY: &'static str = "variant";
    const NAME: &'static str = "Variant";
}

impl TrackedResource<Variant> {
    /// Returns the observed frequencies of this variant over the samples
    /// selected by each query, keyed by query name.
    ///
    /// The queries are sent as a JSON-encoded `queries` query parameter.
    ///
    /// # Errors
    ///
    /// Returns [`ResourceError`] if the request fails or the response has
    /// no `variant.annotations` document.
    pub async fn annotate(
        &self,
        session: &Session,
        queries: &Queries,
    ) -> Result<BTreeMap<String, VariantFrequency>, ResourceError> {
        let query = vec![("queries".to_string(), queries_to_json(queries).to_string())];
        let response = session.get_with_query(self.uri(), query).await?;

        let annotations = response
            .body
            .get(Variant::KEY)
            .and_then(|variant| variant.get("annotations"))
            .cloned()
            .ok_or_else(|| {
                ResourceError::invalid_response(self.uri(), "missing 'variant.annotations'")
            })?;

        serde_json::from_value(annotations).map_err(|e| {
            ResourceError::invalid_response(self.uri(), format!("malformed annotations: {e}"))
        })
    }
}

/// Arguments for creating a variant.
#[derive(Clone, Debug)]
pub struct VariantCreateParams {
    pub chromosome: String,
    pub position: u64,
    pub reference: String,
    pub observed: String,
}

impl CreateParams for VariantCreateParams {
    type Resource = Variant;

    fn to_body(&self) -> Value {
        json!({
            "chromosome": self.chromosome,
            "position": self.position,
            "reference": self.reference,
            "observed": self.observed,
        })
    }
}
