//! Header and query-string merging and formatting.
//!
//! # Merge policies
//!
//! | Part | Policy |
//! |------|--------|
//! | Headers | Client headers, then endpoint headers; names lowercased, endpoint wins on collision |
//! | Query | Client parameters, then endpoint parameters; duplicates kept |
//!
//! # Examples
//!
//! ```
//! use std::collections::BTreeMap;
//! use typed_rest::protocol::{format_query, merge_headers};
//! use typed_rest::QueryParameter;
//!
//! let client = BTreeMap::from([("X".to_string(), "a".to_string()), ("Y".to_string(), "c".to_string())]);
//! let endpoint = BTreeMap::from([("X".to_string(), "b".to_string())]);
//! let merged = merge_headers(&client, &endpoint);
//! assert_eq!(merged["x"], "b");
//! assert_eq!(merged["y"], "c");
//!
//! let query = format_query(&[QueryParameter::new("a", "1"), QueryParameter::flag("b")]);
//! assert_eq!(query.as_deref(), Some("a=1&b"));
//! ```

use crate::error::BuildError;
use crate::types::QueryParameter;
use http::{HeaderMap, HeaderName, HeaderValue};
use std::collections::BTreeMap;

/// Merge client-level headers with endpoint headers.
///
/// Names are lowercased, so keys differing only in case collapse into one;
/// endpoint values win.
pub fn merge_headers(
    client: &BTreeMap<String, String>,
    endpoint: &BTreeMap<String, String>,
) -> BTreeMap<String, String> {
    let mut merged = BTreeMap::new();
    for (key, value) in client.iter().chain(endpoint) {
        merged.insert(key.to_ascii_lowercase(), value.clone());
    }
    merged
}

/// Convert a header mapping into an [`HeaderMap`].
///
/// # Errors
///
/// Returns [`BuildError::InvalidHeader`] naming the first header whose name
/// or value is not valid HTTP.
pub fn to_header_map(headers: &BTreeMap<String, String>) -> Result<HeaderMap, BuildError> {
    let mut map = HeaderMap::with_capacity(headers.len());
    for (key, value) in headers {
        let invalid = || BuildError::InvalidHeader { name: key.clone() };
        let name = HeaderName::from_bytes(key.as_bytes()).map_err(|_| invalid())?;
        let value = HeaderValue::from_str(value).map_err(|_| invalid())?;
        map.insert(name, value);
    }
    Ok(map)
}

/// Join parameters into a query string, `None` when there are none.
pub fn format_query(params: &[QueryParameter]) -> Option<String> {
    if params.is_empty() {
        return None;
    }
    Some(
        params
            .iter()
            .map(QueryParameter::to_query_fragment)
            .collect::<Vec<_>>()
            .join("&"),
    )
}

/// Concatenate client and endpoint query parameters, client first.
pub fn merge_query(client: &[QueryParameter], endpoint: &[QueryParameter]) -> Vec<QueryParameter> {
    client.iter().chain(endpoint).cloned().collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn map(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_merge_headers_endpoint_wins() {
        let merged = merge_headers(&map(&[("X", "a"), ("Y", "c")]), &map(&[("X", "b")]));
        assert_eq!(merged, map(&[("x", "b"), ("y", "c")]));
    }

    #[test]
    fn test_merge_headers_case_insensitive() {
        let merged = merge_headers(
            &map(&[("Authorization", "Bearer old")]),
            &map(&[("authorization", "Bearer new")]),
        );
        assert_eq!(merged, map(&[("authorization", "Bearer new")]));
    }

    #[test]
    fn test_merge_headers_empty_endpoint() {
        let client = map(&[("Accept", "application/json")]);
        assert_eq!(
            merge_headers(&client, &BTreeMap::new()),
            map(&[("accept", "application/json")])
        );
    }

    #[test]
    fn test_to_header_map() {
        let headers = to_header_map(&map(&[("Accept", "text/plain")])).unwrap();
        assert_eq!(headers["accept"], "text/plain");
    }

    #[test]
    fn test_to_header_map_invalid_name() {
        let err = to_header_map(&map(&[("bad header", "x")])).unwrap_err();
        assert!(matches!(err, BuildError::InvalidHeader { name } if name == "bad header"));
    }

    #[test]
    fn test_to_header_map_invalid_value() {
        let err = to_header_map(&map(&[("X-Note", "line\nbreak")])).unwrap_err();
        assert!(matches!(err, BuildError::InvalidHeader { .. }));
    }

    #[test]
    fn test_merge_query_keeps_order_and_duplicates() {
        let client = vec![QueryParameter::new("key", "k"), QueryParameter::new("a", "1")];
        let endpoint = vec![QueryParameter::new("a", "2")];
        let merged = merge_query(&client, &endpoint);
        assert_eq!(format_query(&merged).as_deref(), Some("key=k&a=1&a=2"));
    }

    #[test]
    fn test_format_query_empty() {
        assert_eq!(format_query(&[]), None);
    }
}
