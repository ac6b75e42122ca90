//! Sample resources.
//!
//! A sample is a set of individuals whose variants (variations) and covered
//! regions (coverages) are imported into Varda. Samples must be activated
//! before their data is used in frequency calculations.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::resources::fields::deserialize_timestamp;
use crate::resources::{CreateParams, Link, Resource, TrackedResource};

/// A sample.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Sample {
    /// Owner of the sample.
    pub user: Option<Link>,
    /// Human readable sample name.
    pub name: Option<String>,
    /// Number of individuals in the sample.
    pub pool_size: Option<u32>,
    /// `true` if the sample has a coverage profile.
    pub coverage_profile: Option<bool>,
    /// `true` if the sample is public.
    pub public: Option<bool>,
    /// Human readable notes in Markdown format.
    pub notes: Option<String>,
    /// Groups the sample is part of.
    pub groups: Option<Vec<Link>>,
    /// `true` if the sample is active.
    pub active: Option<bool>,
    /// Date and time the sample was added.
    #[serde(deserialize_with = "deserialize_timestamp")]
    pub added: Option<DateTime<Utc>>,
}

impl Resource for Sample {
    const KEY: &'static str = "sample";
    const NAME: &'static str = "Sample";
}

impl TrackedResource<Sample> {
    /// Sets the sample name.
    pub fn set_name(&mut self, name: impl Into<String>) {
        let name = name.into();
        self.update("name", |sample| sample.name = Some(name));
    }

    /// Sets the number of individuals.
    pub fn set_pool_size(&mut self, pool_size: u32) {
        self.update("pool_size", |sample| sample.pool_size = Some(pool_size));
    }

    /// Sets whether the sample has a coverage profile.
    pub fn set_coverage_profile(&mut self, coverage_profile: bool) {
        self.update("coverage_profile", |sample| {
            sample.coverage_profile = Some(coverage_profile);
        });
    }

    /// Sets whether the sample is public.
    pub fn set_public(&mut self, public: bool) {
        self.update("public", |sample| sample.public = Some(public));
    }

    /// Sets the notes.
    pub fn set_notes(&mut self, notes: impl Into<String>) {
        let notes = notes.into();
        self.update("notes", |sample| sample.notes = Some(notes));
    }

    /// Replaces the groups.
    pub fn set_groups(&mut self, groups: impl IntoIterator<Item = Link>) {
        let mut groups: Vec<Link> = groups.into_iter().collect();
        groups.sort();
        groups.dedup();
        self.update("groups", |sample| sample.groups = Some(groups));
    }

    /// Sets whether the sample is active.
    pub fn set_active(&mut self, active: bool) {
        self.update("active", |sample| sample.active = Some(active));
    }
}

/// Arguments for creating a sample.
#[derive(Clone, Debug)]
pub struct SampleCreateParams {
    /// Human readable sample name.
    pub name: String,
    /// Number of individuals (default: 1).
    pub pool_size: u32,
    /// Whether the sample has a coverage profile (default: `true`).
    pub coverage_profile: bool,
    /// Whether the sample is public (default: `false`).
    pub public: bool,
    /// Human readable notes in Markdown format.
    pub notes: Option<String>,
    /// Groups the sample is part of.
    pub groups: Vec<Link>,
}

impl SampleCreateParams {
    /// Creates parameters with default values for everything but the name.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            pool_size: 1,
            coverage_profile: true,
            public: false,
            notes: None,
            groups: Vec::new(),
        }
    }
}

impl CreateParams for SampleCreateParams {
    type Resource = Sample;

    fn to_body(&self) -> Value {
        let mut body = json!({
            "name": self.name,
            "pool_size": self.pool_size,
            "coverage_profile": self.coverage_profile,
            "public": self.public,
            "groups": self.groups,
        });
        if let Some(notes) = &self.notes {
            body["notes"] = json!(notes);
        }
        body
    }
}

/// Filters for listing samples.
#[derive(Clone, Debug, Default)]
pub struct SampleListParams {
    /// Only samples in all of these groups.
    pub groups: Vec<Link>,
    /// Only public (or non-public) samples.
    pub public: Option<bool>,
    /// Only samples owned by this user.
    pub user: Option<Link>,
}

impl SampleListParams {
    /// Returns the query parameters for these filters.
    #[must_use]
    pub fn to_query(&self) -> Vec<(String, String)> {
        let mut query: Vec<(String, String)> = self
            .groups
            .iter()
            .map(|group| ("groups".to_string(), group.uri().to_string()))
            .collect();
        if let Some(public) = self.public {
            query.push(("public".to_string(), public.to_string()));
        }
        if let Some(user) = &self.user {
            query.push(("user".to_string(), user.uri().to_string()));
        }
        query
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sample_deserializes_from_api_representation() {
        let sample: Sample = serde_json::from_value(json!({
            "uri": "/samples/3",
            "user": {"uri": "/users/1"},
            "name": "1KG",
            "pool_size": 1092,
            "coverage_profile": false,
            "public": true,
            "notes": null,
            "groups": [{"uri": "/groups/2"}],
            "active": true,
            "added": "2014-03-12T14:02:31.123456"
        }))
        .unwrap();

        assert_eq!(sample.user, Some(Link::new("/users/1")));
        assert_eq!(sample.pool_size, Some(1092));
        assert_eq!(sample.groups, Some(vec![Link::new("/groups/2")]));
        assert!(sample.notes.is_none());
        assert!(sample.added.is_some());
    }

    #[test]
    fn test_create_body_uses_defaults() {
        let body = SampleCreateParams::new("Test sample").to_body();
        assert_eq!(
            body,
            json!({
                "name": "Test sample",
                "pool_size": 1,
                "coverage_profile": true,
                "public": false,
                "groups": []
            })
        );
    }

    #[test]
    fn test_create_body_includes_notes_and_group_uris() {
        let mut params = SampleCreateParams::new("Trio");
        params.pool_size = 3;
        params.notes = Some("*Family* trio".to_string());
        params.groups = vec![Link::new("/groups/1")];

        let body = params.to_body();
        assert_eq!(body["notes"], "*Family* trio");
        assert_eq!(body["groups"], json!(["/groups/1"]));
        assert_eq!(body["pool_size"], 3);
    }

    #[test]
    fn test_list_params_repeat_groups() {
        let params = SampleListParams {
            groups: vec![Link::new("/groups/1"), Link::new("/groups/2")],
            public: Some(true),
            user: Some(Link::new("/users/4")),
        };
        assert_eq!(
            params.to_query(),
            vec![
                ("groups".to_string(), "/groups/1".to_string()),
                ("groups".to_string(), "/groups/2".to_string()),
                ("public".to_string(), "true".to_string()),
                ("user".to_string(), "/users/4".to_string()),
            ]
        );
        assert!(SampleListParams::default().to_query().is_empty());
    }

    #[test]
    fn test_setters_mark_fields_dirty() {
        let mut sample = TrackedResource::<Sample>::from_uri("/samples/3");
        sample.set_active(true);
        sample.set_groups([Link::new("/groups/2"), Link::new("/groups/1"), Link::new("/groups/2")]);

        assert_eq!(sample.active, Some(true));
        assert_eq!(
            sample.changed_fields(),
            json!({"active": true, "groups": ["/groups/1", "/groups/2"]})
        );
    }
}
