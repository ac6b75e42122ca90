//! Data source resources.
//!
//! A data source is a file of variants (VCF), regions (BED), or annotated
//! variants (CSV) stored on the server. It is created either by uploading a
//! local file or by referring to a file already on the server's filesystem.

use std::fmt;
use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::clients::FilePart;
use crate::resources::fields::deserialize_timestamp;
use crate::resources::{CreateParams, Link, Resource, TrackedResource};

/// File type of a data source.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Filetype {
    /// Regions in BED format.
    Bed,
    /// Variants in VCF format.
    Vcf,
    /// Annotated variants as comma-separated values.
    Csv,
}

impl Filetype {
    /// Returns the name used by the API.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Bed => "bed",
            Self::Vcf => "vcf",
            Self::Csv => "csv",
        }
    }
}

impl fmt::Display for Filetype {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A data source.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DataSource {
    /// Human readable data source name.
    pub name: Option<String>,
    /// Owner of the data source.
    pub user: Option<Link>,
    /// Location of the data blob.
    pub data: Option<Link>,
    /// File type of the data.
    pub filetype: Option<Filetype>,
    /// `true` if the data is compressed with gzip.
    pub gzipped: Option<bool>,
    /// Date and time the data source was added.
    #[serde(deserialize_with = "deserialize_timestamp")]
    pub added: Option<DateTime<Utc>>,
}

impl Resource for DataSource {
    const KEY: &'static str = "data_source";
    const NAME: &'static str = "Data source";
}

impl TrackedResource<DataSource> {
    /// Sets the data source name.
    pub fn set_name(&mut self, name: impl Into<String>) {
        let name = name.into();
        self.update("name", |data_source| data_source.name = Some(name));
    }
}

/// Where the data of a new data source comes from.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DataSourceInput {
    /// Upload this local file.
    Upload(PathBuf),
    /// Use this file on the server's filesystem.
    LocalFile(String),
}

/// Arguments for creating a data source.
#[derive(Clone, Debug)]
pub struct DataSourceCreateParams {
    /// Human readable data source name.
    pub name: String,
    /// File type of the data.
    pub filetype: Filetype,
    /// Whether the data is compressed with gzip.
    pub gzipped: bool,
    /// Source of the data.
    pub input: DataSourceInput,
}

impl DataSourceCreateParams {
    /// Creates parameters for uncompressed data.
    #[must_use]
    pub fn new(name: impl Into<String>, filetype: Filetype, input: DataSourceInput) -> Self {
        Self {
            name: name.into(),
            filetype,
            gzipped: false,
            input,
        }
    }
}

impl CreateParams for DataSourceCreateParams {
    type Resource = DataSource;

    fn to_body(&self) -> Value {
        let mut body = json!({
            "name": self.name,
            "filetype": self.filetype,
            "gzipped": self.gzipped,
        });
        if let DataSourceInput::LocalFile(local_file) = &self.input {
            body["local_file"] = json!(local_file);
        }
        body
    }

    fn upload(&self) -> Option<FilePart> {
        match &self.input {
            DataSourceInput::Upload(path) => Some(FilePart::new("data", path.clone())),
            DataSourceInput::LocalFile(_) => None,
        }
    }
}

/// Filters for listing data sources.
#[derive(Clone, Debug, Default)]
pub struct DataSourceListParams {
    /// Only data sources owned by this user.
    pub user: Option<Link>,
}

impl DataSourceListParams {
    /// Returns the query parameters for these filters.
    #[must_use]
    pub fn to_query(&self) -> Vec<(String, String)> {
        self.user
            .iter()
            .map(|user| ("user".to_string(), user.uri().to_string()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_data_source_deserializes_blob_link() {
        let data_source: DataSource = serde_json::from_value(json!({
            "uri": "/data_sources/7",
            "name": "Variants from file \"a.vcf\"",
            "user": {"uri": "/users/1"},
            "data": {"uri": "/data_sources/7/data"},
            "filetype": "vcf",
            "gzipped": false,
            "added": "2014-01-01T00:00:00"
        }))
        .unwrap();

        assert_eq!(data_source.data, Some(Link::new("/data_sources/7/data")));
        assert_eq!(data_source.filetype, Some(Filetype::Vcf));
    }

    #[test]
    fn test_upload_body_has_no_local_file() {
        let mut params = DataSourceCreateParams::new(
            "Regions",
            Filetype::Bed,
            DataSourceInput::Upload(PathBuf::from("/data/regions.bed.gz")),
        );
        params.gzipped = true;

        assert_eq!(
            params.to_body(),
            json!({"name": "Regions", "filetype": "bed", "gzipped": true})
        );
        assert_eq!(
            params.upload(),
            Some(FilePart::new("data", "/data/regions.bed.gz"))
        );
    }

    #[test]
    fn test_local_file_body() {
        let params = DataSourceCreateParams::new(
            "Variants",
            Filetype::Vcf,
            DataSourceInput::LocalFile("/srv/varda/a.vcf".to_string()),
        );

        assert_eq!(params.to_body()["local_file"], "/srv/varda/a.vcf");
        assert!(params.upload().is_none());
    }

    #[test]
    fn test_list_params() {
        let params = DataSourceListParams {
            user: Some(Link::new("/users/3")),
        };
        assert_eq!(
            params.to_query(),
            vec![("user".to_string(), "/users/3".to_string())]
        );
    }

    #[test]
    fn test_filetype_names() {
        assert_eq!(Filetype::Csv.to_string(), "csv");
        assert_eq!(serde_json::to_value(Filetype::Bed).unwrap(), json!("bed"));
    }
}
