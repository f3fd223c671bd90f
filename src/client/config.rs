//! Client configuration.

use crate::ip::Ip;
use crate::protocol::StatusValidator;
use crate::types::QueryParameter;
use std::collections::BTreeMap;

/// Defaults applied to every request a [`RestClient`](super::RestClient) builds.
///
/// Fields are read when a request is built, so changes made through
/// [`RestClient::config_mut`](super::RestClient::config_mut) apply to the
/// next request.
///
/// ```
/// use typed_rest::client::ClientConfig;
///
/// let config = ClientConfig {
///     use_ssl: false,
///     port: 8080,
///     ..ClientConfig::new("api.example.com")
/// };
/// assert_eq!(config.hostname, "api.example.com");
/// ```
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Host name or URL host form of an address
    pub hostname: String,

    /// Port used unless the endpoint overrides it
    pub port: u16,

    /// `https` when true, `http` otherwise, unless the endpoint overrides it
    pub use_ssl: bool,

    /// Headers sent with every request; endpoint headers win on collision
    pub required_headers: BTreeMap<String, String>,

    /// Query parameters placed before the endpoint's own
    pub required_query_parameters: Vec<QueryParameter>,

    /// Status policy for endpoints without their own
    pub status_validator: Option<StatusValidator>,

    /// Retry once over `https` when the transport demands a secure connection
    pub ats_upgrade: bool,

    /// Enable request logging
    pub enable_logging: bool,
}

impl ClientConfig {
    /// Defaults for `hostname`.
    pub fn new(hostname: impl Into<String>) -> Self {
        Self {
            hostname: hostname.into(),
            ..Default::default()
        }
    }

    /// Defaults for an address, bracketing IPv6 for use as a URL host.
    pub fn for_ip(ip: &Ip) -> Self {
        Self::new(ip.url_string())
    }

    /// Add a required header.
    pub fn with_header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.set_header(key, value);
        self
    }

    /// Set a required header in place, replacing any value stored under the
    /// same name in any case. Names are stored lowercased.
    pub fn set_header(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.required_headers
            .insert(key.into().to_ascii_lowercase(), value.into());
    }

    /// Add a required query parameter.
    pub fn with_query(mut self, param: QueryParameter) -> Self {
        self.required_query_parameters.push(param);
        self
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            hostname: "localhost".to_string(),
            port: 443,
            use_ssl: true,
            required_headers: BTreeMap::new(),
            required_query_parameters: Vec::new(),
            status_validator: None,
            ats_upgrade: true,
            enable_logging: true,
        }
    }
}
