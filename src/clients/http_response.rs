//! HTTP response types.
//!
//! This module provides the [`HttpResponse`] type and the [`ContentRange`]
//! header used by Varda for collection pagination.

use std::collections::HashMap;

/// A parsed `Content-Range` header for item ranges.
///
/// Varda answers a `Range: items=0-19` request with
/// `Content-Range: items 0-19/45`. The total may be `*` when unknown.
///
/// # Example
///
/// ```rust
/// use manwe::clients::ContentRange;
///
/// let range = ContentRange::parse("items 20-39/45").unwrap();
/// assert_eq!(range.first, 20);
/// assert_eq!(range.last, 39);
/// assert_eq!(range.total, Some(45));
/// assert!(range.has_more());
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ContentRange {
    /// Index of the first item in the response.
    pub first: u64,
    /// Index of the last item in the response (inclusive).
    pub last: u64,
    /// Total number of items in the collection, if reported.
    pub total: Option<u64>,
}

impl ContentRange {
    /// Parses a header value of the form `items <first>-<last>/<total>`.
    ///
    /// Returns `None` for other units or malformed values.
    #[must_use]
    pub fn parse(header_value: &str) -> Option<Self> {
        let rest = header_value.trim().strip_prefix("items")?.trim_start();
        let (span, total) = rest.split_once('/')?;
        let (first, last) = span.trim().split_once('-')?;

        let first = first.trim().parse().ok()?;
        let last = last.trim().parse().ok()?;
        if last < first {
            return None;
        }

        let total = match total.trim() {
            "*" => None,
            value => Some(value.parse().ok()?),
        };

        Some(Self { first, last, total })
    }

    /// Returns `true` if items remain after this range.
    ///
    /// Without a known total the range cannot tell, and `true` is returned
    /// so that iteration continues until an empty page. A range ending at
    /// `u64::MAX` has nothing after it.
    #[must_use]
    pub fn has_more(&self) -> bool {
        self.next_start()
            .is_some_and(|next| self.total.map_or(true, |total| next < total))
    }

    /// Returns the index of the first item after this range, if there can
    /// be one.
    #[must_use]
    pub const fn next_start(&self) -> Option<u64> {
        self.last.checked_add(1)
    }
}

/// An HTTP response from the Varda API.
#[derive(Clone, Debug)]
pub struct HttpResponse {
    /// The HTTP status code.
    pub code: u16,
    /// Response headers, keyed by lowercase name (headers may repeat).
    pub headers: HashMap<String, Vec<String>>,
    /// The parsed response body.
    pub body: serde_json::Value,
    /// Parsed `Content-Range` header, if present.
    pub content_range: Option<ContentRange>,
}

impl HttpResponse {
    /// Creates a new `HttpResponse`, parsing the `Content-Range` header.
    #[must_use]
    pub fn new(code: u16, headers: HashMap<String, Vec<String>>, body: serde_json::Value) -> Self {
        let content_range = headers
            .get("content-range")
            .and_then(|values| values.first())
            .and_then(|value| ContentRange::parse(value));

        Self {
            code,
            headers,
            body,
            content_range,
        }
    }

    /// Returns `true` if the response status code is in the 2xx range.
    #[must_use]
    pub const fn is_ok(&self) -> bool {
        self.code >= 200 && self.code <= 299
    }

    /// Returns the first value of a header, by case-insensitive name.
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .get(&name.to_ascii_lowercase())
            .and_then(|values| values.first())
            .map(String::as_str)
    }

    /// Returns the `Location` header, set on responses to resource creation.
    #[must_use]
    pub fn location(&self) -> Option<&str> {
        self.header("location")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_is_ok_returns_true_for_2xx() {
        for code in 200..=299 {
            let response = HttpResponse::new(code, HashMap::new(), json!({}));
            assert!(response.is_ok(), "Expected is_ok() to be true for code {code}");
        }
    }

    #[test]
    fn test_is_ok_returns_false_for_4xx_and_5xx() {
        for code in [400, 401, 403, 404, 416, 500, 503] {
            let response = HttpResponse::new(code, HashMap::new(), json!({}));
            assert!(!response.is_ok());
        }
    }

    #[test]
    fn test_content_range_parsing() {
        let range = ContentRange::parse("items 0-19/45").unwrap();
        assert_eq!(
            range,
            ContentRange {
                first: 0,
                last: 19,
                total: Some(45)
            }
        );
        assert!(range.has_more());

        let range = ContentRange::parse("items 40-44/45").unwrap();
        assert!(!range.has_more());

        let range = ContentRange::parse("items 0-19/*").unwrap();
        assert_eq!(range.total, None);
        assert!(range.has_more());
    }

    #[test]
    fn test_content_range_ending_at_max_has_no_more() {
        let range = ContentRange::parse("items 0-18446744073709551615/*").unwrap();
        assert_eq!(range.next_start(), None);
        assert!(!range.has_more());
    }

    #[test]
    fn test_content_range_rejects_malformed_values() {
        assert!(ContentRange::parse("bytes 0-19/45").is_none());
        assert!(ContentRange::parse("items 0-19").is_none());
        assert!(ContentRange::parse("items a-b/45").is_none());
        assert!(ContentRange::parse("items 19-0/45").is_none());
        assert!(ContentRange::parse("items 0-19/x").is_none());
    }

    #[test]
    fn test_content_range_header_is_parsed_on_construction() {
        let mut headers = HashMap::new();
        headers.insert("content-range".to_string(), vec!["items 0-1/2".to_string()]);

        let response = HttpResponse::new(206, headers, json!({}));
        assert_eq!(
            response.content_range,
            Some(ContentRange {
                first: 0,
                last: 1,
                total: Some(2)
            })
        );
    }

    #[test]
    fn test_location_header() {
        let mut headers = HashMap::new();
        headers.insert(
            "location".to_string(),
            vec!["http://varda.test/samples/3".to_string()],
        );

        let response = HttpResponse::new(201, headers, json!({}));
        assert_eq!(response.location(), Some("http://varda.test/samples/3"));
        assert_eq!(response.header("Location"), Some("http://varda.test/samples/3"));
    }

    #[test]
    fn test_missing_headers() {
        let response = HttpResponse::new(200, HashMap::new(), json!({}));
        assert!(response.location().is_none());
        assert!(response.content_range.is_none());
    }
}
