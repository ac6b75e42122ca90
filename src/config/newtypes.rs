//! Validated newtype wrappers for configuration values.
//!
//! These wrappers validate their contents on construction so that an invalid
//! configuration file is rejected with a clear message instead of surfacing
//! as an obscure transport failure later on.

use crate::error::ConfigError;
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::path::PathBuf;

/// A validated Varda API root URL.
///
/// Only absolute `http` and `https` URLs with a non-empty host are accepted.
/// Trailing slashes are removed so that server-relative URIs can be joined
/// onto the root without doubling the separator.
///
/// # Example
///
/// ```rust
/// use manwe::ApiRoot;
///
/// let root = ApiRoot::new("https://varda.example.com/api/").unwrap();
/// assert_eq!(root.as_ref(), "https://varda.example.com/api");
/// assert_eq!(root.host_name(), "varda.example.com");
/// assert_eq!(root.resolve("/samples/3"), "https://varda.example.com/api/samples/3");
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ApiRoot {
    url: String,
    host_start: usize,
    host_end: usize,
}

impl ApiRoot {
    /// Creates a new validated API root.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidApiRoot`] if the URL has no `http` or
    /// `https` scheme or no host.
    pub fn new(url: impl Into<String>) -> Result<Self, ConfigError> {
        let url = url.into();
        let url = url.trim().trim_end_matches('/').to_string();
        let invalid = || ConfigError::InvalidApiRoot { url: url.clone() };

        let scheme_end = url.find("://").ok_or_else(invalid)?;
        let scheme = url[..scheme_end].to_ascii_lowercase();
        if scheme != "http" && scheme != "https" {
            return Err(invalid());
        }

        let host_start = scheme_end + 3;
        let remainder = &url[host_start..];
        let host_end = remainder
            .find([':', '/', '?', '#'])
            .map_or(url.len(), |i| host_start + i);
        if host_end == host_start {
            return Err(invalid());
        }

        Ok(Self {
            url,
            host_start,
            host_end,
        })
    }

    /// Returns the host name portion of the URL.
    #[must_use]
    pub fn host_name(&self) -> &str {
        &self.url[self.host_start..self.host_end]
    }

    /// Resolves a URI as returned by the server against this root.
    ///
    /// Absolute URIs are returned unchanged. Server-relative URIs (starting
    /// with `/`) are appended to the root.
    #[must_use]
    pub fn resolve(&self, uri: &str) -> String {
        if uri.contains("://") {
            uri.to_string()
        } else if let Some(relative) = uri.strip_prefix('/') {
            format!("{}/{relative}", self.url)
        } else {
            format!("{}/{uri}", self.url)
        }
    }
}

impl Default for ApiRoot {
    fn default() -> Self {
        Self {
            url: super::DEFAULT_API_ROOT.to_string(),
            host_start: "http://".len(),
            host_end: "http://127.0.0.1".len(),
        }
    }
}

impl AsRef<str> for ApiRoot {
    fn as_ref(&self) -> &str {
        &self.url
    }
}

impl fmt::Display for ApiRoot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.url)
    }
}

impl Serialize for ApiRoot {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.url)
    }
}

impl<'de> Deserialize<'de> for ApiRoot {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::new(s).map_err(de::Error::custom)
    }
}

/// A Varda API authentication token.
///
/// The `Debug` implementation masks the value so tokens never end up in log
/// output.
///
/// # Example
///
/// ```rust
/// use manwe::Token;
///
/// let token = Token::new("d3b07384d113edec").unwrap();
/// assert_eq!(format!("{:?}", token), "Token(*****)");
/// ```
#[derive(Clone, PartialEq, Eq)]
pub struct Token(String);

impl Token {
    /// Creates a new token.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::EmptyToken`] if the token is empty.
    pub fn new(token: impl Into<String>) -> Result<Self, ConfigError> {
        let token = token.into().trim().to_string();
        if token.is_empty() {
            return Err(ConfigError::EmptyToken);
        }
        Ok(Self(token))
    }
}

impl AsRef<str> for Token {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Token(*****)")
    }
}

impl<'de> Deserialize<'de> for Token {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::new(s).map_err(de::Error::custom)
    }
}

/// How the server's TLS certificate is verified.
///
/// In configuration files this is either a boolean or the path to a PEM
/// bundle with trusted CA certificates.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(from = "VerifySetting")]
pub enum CertificateVerification {
    /// Verify against the built-in root certificates.
    #[default]
    Enabled,
    /// Accept any certificate.
    Disabled,
    /// Verify against the CA certificates in this PEM file.
    CaBundle(PathBuf),
}

#[derive(Deserialize)]
#[serde(untagged)]
enum VerifySetting {
    Flag(bool),
    Bundle(PathBuf),
}

impl From<VerifySetting> for CertificateVerification {
    fn from(setting: VerifySetting) -> Self {
        match setting {
            VerifySetting::Flag(true) => Self::Enabled,
            VerifySetting::Flag(false) => Self::Disabled,
            VerifySetting::Bundle(path) => Self::CaBundle(path),
        }
    }
}
