//! Endpoint descriptors.
//!
//! An [`Endpoint`] declares one REST operation: path, method, optional typed
//! body and the per-endpoint overrides applied on top of the client defaults.
//!
//! # Examples
//!
//! ```
//! use typed_rest::{Endpoint, EndpointPort, QueryParameter};
//!
//! let endpoint = Endpoint::get("/v1/devices")
//!     .with_query(QueryParameter::new("page", "2"))
//!     .with_header("Accept", "application/json")
//!     .with_port(8443);
//!
//! assert_eq!(endpoint.path(), "/v1/devices");
//! assert_eq!(endpoint.port(), EndpointPort::Port(8443));
//! assert!(endpoint.body().is_none());
//!
//! let create = Endpoint::post("/v1/devices", vec!["lamp"]);
//! assert_eq!(create.body(), Some(&vec!["lamp"]));
//! ```

use crate::protocol::StatusValidator;
use crate::types::{EndpointPort, QueryParameter};
use http::Method;
use std::collections::BTreeMap;

/// Declaration of a single REST operation with a body of type `B`.
#[derive(Debug, Clone)]
pub struct Endpoint<B = ()> {
    path: String,
    method: Method,
    body: Option<B>,
    port: EndpointPort,
    query: Vec<QueryParameter>,
    headers: BTreeMap<String, String>,
    use_ssl: Option<bool>,
    status_validator: Option<StatusValidator>,
}

impl Endpoint {
    /// A bodyless endpoint.
    ///
    /// `path` is used verbatim and should start with `/`.
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Endpoint {
            path: path.into(),
            method,
            body: None,
            port: EndpointPort::ClientDefault,
            query: Vec::new(),
            headers: BTreeMap::new(),
            use_ssl: None,
            status_validator: None,
        }
    }

    /// A `GET` endpoint.
    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    /// A `DELETE` endpoint.
    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::DELETE, path)
    }

    /// A `HEAD` endpoint.
    pub fn head(path: impl Into<String>) -> Self {
        Self::new(Method::HEAD, path)
    }
}

impl<B> Endpoint<B> {
    /// A `POST` endpoint carrying `body`.
    pub fn post(path: impl Into<String>, body: B) -> Self {
        Endpoint::new(Method::POST, path).with_body(body)
    }

    /// A `PUT` endpoint carrying `body`.
    pub fn put(path: impl Into<String>, body: B) -> Self {
        Endpoint::new(Method::PUT, path).with_body(body)
    }

    /// A `PATCH` endpoint carrying `body`.
    pub fn patch(path: impl Into<String>, body: B) -> Self {
        Endpoint::new(Method::PATCH, path).with_body(body)
    }

    /// Attach a body, changing the body type.
    pub fn with_body<C>(self, body: C) -> Endpoint<C> {
        Endpoint {
            path: self.path,
            method: self.method,
            body: Some(body),
            port: self.port,
            query: self.query,
            headers: self.headers,
            use_ssl: self.use_ssl,
            status_validator: self.status_validator,
        }
    }

    /// Serve this endpoint on `port` instead of the client default.
    pub fn with_port(mut self, port: u16) -> Self {
        self.port = EndpointPort::Port(port);
        self
    }

    /// Append a query parameter.
    pub fn with_query(mut self, param: QueryParameter) -> Self {
        self.query.push(param);
        self
    }

    /// Set a header; a later value for the same name, in any case, replaces
    /// the earlier one. Names are stored lowercased.
    pub fn with_header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers
            .insert(key.into().to_ascii_lowercase(), value.into());
        self
    }

    /// Force TLS on or off regardless of the client default.
    pub fn with_ssl(mut self, use_ssl: bool) -> Self {
        self.use_ssl = Some(use_ssl);
        self
    }

    /// Replace the status policy for this endpoint.
    pub fn with_status_validator(mut self, validator: StatusValidator) -> Self {
        self.status_validator = Some(validator);
        self
    }

    /// Request path.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// HTTP method.
    pub fn method(&self) -> &Method {
        &self.method
    }

    /// Typed body, if any.
    pub fn body(&self) -> Option<&B> {
        self.body.as_ref()
    }

    /// Port choice.
    pub fn port(&self) -> EndpointPort {
        self.port
    }

    /// Endpoint-level query parameters in declaration order.
    pub fn query_parameters(&self) -> &[QueryParameter] {
        &self.query
    }

    /// Endpoint-level headers.
    pub fn headers(&self) -> &BTreeMap<String, String> {
        &self.headers
    }

    /// SSL override: `None` inherits the client setting.
    pub fn use_ssl(&self) -> Option<bool> {
        self.use_ssl
    }

    /// Status policy override.
    pub fn status_validator(&self) -> Option<&StatusValidator> {
        self.status_validator.as_ref()
    }
}
