//! Field types shared by resource kinds.
//!
//! Varda represents links to other resources as `{"uri": "..."}` objects in
//! responses but expects plain URI strings in requests. [`Link`] accepts both
//! forms and always serializes as a string.

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{json, Value};

/// A link to another resource, identified by its URI.
///
/// # Example
///
/// ```rust
/// use manwe::resources::Link;
///
/// let from_object: Link = serde_json::from_str(r#"{"uri": "/users/1"}"#).unwrap();
/// let from_string: Link = serde_json::from_str(r#""/users/1""#).unwrap();
/// assert_eq!(from_object, from_string);
/// assert_eq!(serde_json::to_string(&from_object).unwrap(), r#""/users/1""#);
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Link(String);

impl Link {
    /// Creates a link to `uri`.
    #[must_use]
    pub fn new(uri: impl Into<String>) -> Self {
        Self(uri.into())
    }

    /// Returns the linked URI.
    #[must_use]
    pub fn uri(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Link {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Link {
    fn from(uri: &str) -> Self {
        Self::new(uri)
    }
}

impl From<String> for Link {
    fn from(uri: String) -> Self {
        Self(uri)
    }
}

impl Serialize for Link {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for Link {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum LinkRepr {
            Object { uri: String },
            Uri(String),
        }

        match LinkRepr::deserialize(deserializer)? {
            LinkRepr::Object { uri } | LinkRepr::Uri(uri) => Ok(Self(uri)),
        }
    }
}

/// Deserializes an optional timestamp.
///
/// Varda reports timestamps in ISO 8601, with or without a UTC offset.
/// Timestamps without an offset are taken to be UTC.
pub(crate) fn deserialize_timestamp<'de, D>(
    deserializer: D,
) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let Some(value) = Option::<String>::deserialize(deserializer)? else {
        return Ok(None);
    };
    parse_timestamp(&value)
        .map(Some)
        .ok_or_else(|| serde::de::Error::custom(format!("invalid timestamp '{value}'")))
}

fn parse_timestamp(value: &str) -> Option<DateTime<Utc>> {
    if let Ok(parsed) = DateTime::parse_from_rfc3339(value) {
        return Some(parsed.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .map(|naive| naive.and_utc())
}

/// State of a server-side import or annotation task.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Task {
    /// `true` once the task has finished, successfully or not.
    pub done: bool,
    /// Task state as reported by the server (`waiting`, `running`, ...).
    pub state: Option<String>,
    /// Progress percentage, when the task is running.
    pub progress: Option<u32>,
    /// Set when the task failed.
    pub error: Option<TaskError>,
}

impl Task {
    /// Returns `true` if the task finished without error.
    #[must_use]
    pub const fn succeeded(&self) -> bool {
        self.done && self.error.is_none()
    }
}

/// Failure reported for a task.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TaskError {
    /// Machine-readable error code.
    pub code: String,
    /// Human-readable error message.
    pub message: String,
}

/// Sample queries keyed by name, with query expressions as values.
pub type Queries = BTreeMap<String, String>;

/// Encodes queries the way Varda expects them: a list of
/// `{"name": ..., "expression": ...}` objects.
#[must_use]
pub fn queries_to_json(queries: &Queries) -> Value {
    Value::Array(
        queries
            .iter()
            .map(|(name, expression)| json!({"name": name, "expression": expression}))
            .collect(),
    )
}

/// Observed frequency of a variant over the samples matched by one query.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VariantFrequency {
    /// Number of individuals with coverage at the variant position.
    pub coverage: u64,
    /// Frequency of the variant.
    pub frequency: f64,
    /// Frequency of heterozygous observations.
    pub frequency_het: f64,
    /// Frequency of homozygous observations.
    pub frequency_hom: f64,
}
