//! Core value types shared across the request pipeline.
//!
//! | Type | Role |
//! |------|------|
//! | [`QueryParameter`] | One `key[=value]` query item |
//! | [`EndpointPort`] | Port choice of an endpoint |
//! | [`RestRequest`] | Fully resolved outgoing request |
//! | [`ResponseMeta`] | Status, headers and URL of a response |

use bytes::Bytes;
use http::{HeaderMap, HeaderName, HeaderValue, Method};
use url::{form_urlencoded, Url};

/// A single query item.
///
/// Values built with [`QueryParameter::new`] are form-encoded when the
/// request is built. [`QueryParameter::encoded`] encodes at construction
/// and the result is appended verbatim.
///
/// ```
/// use typed_rest::QueryParameter;
///
/// let plain = QueryParameter::new("q", "a b");
/// assert_eq!(plain.to_query_fragment(), "q=a+b");
///
/// let flag = QueryParameter::flag("verbose");
/// assert_eq!(flag.to_query_fragment(), "verbose");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct QueryParameter {
    key: String,
    value: Option<String>,
    encoded: bool,
}

impl QueryParameter {
    /// A `key=value` item.
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: Some(value.into()),
            encoded: false,
        }
    }

    /// A bare `key` item without value.
    pub fn flag(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: None,
            encoded: false,
        }
    }

    /// A `key=value` item percent-encoded now rather than at build time.
    pub fn encoded(key: &str, value: Option<&str>) -> Self {
        Self {
            key: encode_component(key),
            value: value.map(encode_component),
            encoded: true,
        }
    }

    /// The key, encoded if the item was built with [`QueryParameter::encoded`].
    pub fn key(&self) -> &str {
        &self.key
    }

    /// The value, if any.
    pub fn value(&self) -> Option<&str> {
        self.value.as_deref()
    }

    /// Whether key and value are already percent-encoded.
    pub fn is_encoded(&self) -> bool {
        self.encoded
    }

    /// Render as it appears in a query string.
    pub fn to_query_fragment(&self) -> String {
        let encode = |s: &str| {
            if self.encoded {
                s.to_string()
            } else {
                encode_component(s)
            }
        };
        match &self.value {
            Some(value) => format!("{}={}", encode(&self.key), encode(value)),
            None => encode(&self.key),
        }
    }
}

fn encode_component(s: &str) -> String {
    form_urlencoded::byte_serialize(s.as_bytes()).collect()
}

/// Port an endpoint is served on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EndpointPort {
    /// Use the client's configured port
    #[default]
    ClientDefault,
    /// Override with an explicit port
    Port(u16),
}

impl EndpointPort {
    /// Resolve against the client default.
    pub fn resolve(self, client_default: u16) -> u16 {
        match self {
            EndpointPort::ClientDefault => client_default,
            EndpointPort::Port(port) => port,
        }
    }
}

/// A fully resolved outgoing request.
///
/// Produced by the request builder for a single call and handed to the
/// transport; nothing retains it afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct RestRequest {
    /// HTTP method
    pub method: Method,
    /// Absolute target URL including query
    pub url: Url,
    /// Merged headers
    pub headers: HeaderMap,
    /// Encoded body, empty for bodyless requests
    pub body: Bytes,
}

impl RestRequest {
    /// Create a bodyless request.
    pub fn new(method: Method, url: Url) -> Self {
        Self {
            method,
            url,
            headers: HeaderMap::new(),
            body: Bytes::new(),
        }
    }

    /// Whether the request uses plaintext `http`.
    pub fn is_plaintext(&self) -> bool {
        self.url.scheme() == "http"
    }

    /// The same request over `https`.
    ///
    /// Host, port, path, query, headers and body are kept. Returns `None`
    /// when the request is not plaintext `http`.
    pub fn upgraded_to_secure(&self) -> Option<RestRequest> {
        if !self.is_plaintext() {
            return None;
        }
        let port = self.url.port_or_known_default();
        let mut url = self.url.clone();
        url.set_scheme("https").ok()?;
        url.set_port(port).ok()?;
        Some(RestRequest {
            url,
            ..self.clone()
        })
    }
}

/// Metadata of a received response.
#[derive(Debug, Clone, PartialEq)]
pub struct ResponseMeta {
    /// HTTP status code
    pub status: u16,
    /// Response headers
    pub headers: HeaderMap,
    /// Final URL after redirects, when the transport reports it
    pub url: Option<Url>,
}

impl ResponseMeta {
    /// Metadata with only a status code.
    pub fn new(status: u16) -> Self {
        Self {
            status,
            headers: HeaderMap::new(),
            url: None,
        }
    }

    /// Add a header.
    pub fn with_header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.append(name, value);
        self
    }

    /// Look up a header as text.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    /// Returns true for 2xx statuses.
    pub fn is_success(&self) -> bool {
        (200..=299).contains(&self.status)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encoded_parameter_is_verbatim() {
        let param = QueryParameter::encoded("a key", Some("x&y"));
        assert!(param.is_encoded());
        assert_eq!(param.key(), "a+key");
        assert_eq!(param.to_query_fragment(), "a+key=x%26y");
    }

    #[test]
    fn test_plain_parameter_encodes_on_render() {
        let param = QueryParameter::new("filter", "name=bob");
        assert_eq!(param.value(), Some("name=bob"));
        assert_eq!(param.to_query_fragment(), "filter=name%3Dbob");
    }

    #[test]
    fn test_parameter_equality_is_structural() {
        assert_eq!(QueryParameter::new("a", "1"), QueryParameter::new("a", "1"));
        assert_ne!(QueryParameter::new("a", "1"), QueryParameter::flag("a"));
    }

    #[test]
    fn test_endpoint_port_resolve() {
        assert_eq!(EndpointPort::Port(8443).resolve(443), 8443);
        assert_eq!(EndpointPort::ClientDefault.resolve(443), 443);
    }

    #[test]
    fn test_upgrade_keeps_everything_but_scheme() {
        let url = Url::parse("http://example.com:8080/items?page=2").unwrap();
        let mut request = RestRequest::new(Method::POST, url);
        request.body = Bytes::from_static(b"{}");

        let upgraded = request.upgraded_to_secure().unwrap();
        assert_eq!(upgraded.url.as_str(), "https://example.com:8080/items?page=2");
        assert_eq!(upgraded.method, Method::POST);
        assert_eq!(upgraded.body, request.body);
    }

    #[test]
    fn test_upgrade_keeps_default_plaintext_port() {
        let url = Url::parse("http://example.com/status").unwrap();
        let upgraded = RestRequest::new(Method::GET, url).upgraded_to_secure().unwrap();
        assert_eq!(upgraded.url.as_str(), "https://example.com:80/status");
    }

    #[test]
    fn test_upgrade_of_secure_request_is_none() {
        let url = Url::parse("https://example.com/").unwrap();
        assert!(RestRequest::new(Method::GET, url).upgraded_to_secure().is_none());
    }

    #[test]
    fn test_response_meta_helpers() {
        let meta = ResponseMeta::new(204).with_header(
            http::header::CONTENT_TYPE,
            HeaderValue::from_static("text/plain"),
        );
        assert!(meta.is_success());
        assert_eq!(meta.header("content-type"), Some("text/plain"));
    }
}
