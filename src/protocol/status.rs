//! Status-code validation.
//!
//! A [`StatusValidator`] decides whether a response is accepted. The default
//! policy accepts `200..=299`. Endpoint and client overrides replace the
//! policy wholesale and resolve as endpoint > client > default
//! (see [`StatusValidator::resolve`]).
//!
//! ```
//! use typed_rest::{ResponseMeta, StatusValidator};
//!
//! let validator = StatusValidator::default();
//! assert!(validator.validate(Some(&ResponseMeta::new(200)), None).is_ok());
//!
//! let err = validator.validate(None, None).unwrap_err();
//! assert_eq!(err.status, 0);
//! ```

use crate::types::ResponseMeta;
use bytes::Bytes;
use std::fmt;
use std::ops::RangeInclusive;
use std::sync::Arc;
use thiserror::Error;

/// A rejected response.
///
/// Equality compares only `status`; metadata and body are diagnostics.
#[derive(Debug, Clone, Error)]
#[error("unacceptable status code {status}")]
pub struct StatusCodeError {
    /// Rejected status code, `0` when no metadata was received
    pub status: u16,
    /// Response metadata, when available
    pub meta: Option<ResponseMeta>,
    /// Raw response body, when available
    pub body: Option<Bytes>,
}

impl StatusCodeError {
    /// Create a new status error.
    pub fn new(status: u16, meta: Option<ResponseMeta>, body: Option<Bytes>) -> Self {
        Self { status, meta, body }
    }

    /// The body as UTF-8 text, if present and valid.
    pub fn body_text(&self) -> Option<&str> {
        self.body
            .as_deref()
            .and_then(|b| std::str::from_utf8(b).ok())
    }
}

impl PartialEq for StatusCodeError {
    fn eq(&self, other: &Self) -> bool {
        self.status == other.status
    }
}

impl Eq for StatusCodeError {}

type ValidateFn =
    dyn Fn(Option<&ResponseMeta>, Option<&Bytes>) -> Result<ResponseMeta, StatusCodeError>
        + Send
        + Sync;

/// Accept-or-reject policy for responses.
#[derive(Clone)]
pub struct StatusValidator {
    validate: Arc<ValidateFn>,
}

impl StatusValidator {
    /// Wrap a custom policy.
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(Option<&ResponseMeta>, Option<&Bytes>) -> Result<ResponseMeta, StatusCodeError>
            + Send
            + Sync
            + 'static,
    {
        Self {
            validate: Arc::new(f),
        }
    }

    /// Accept statuses in `range`, reject everything else.
    pub fn accepting(range: RangeInclusive<u16>) -> Self {
        Self::new(move |meta, body| match meta {
            Some(meta) if range.contains(&meta.status) => Ok(meta.clone()),
            _ => Err(rejection(meta, body)),
        })
    }

    /// Run the policy.
    pub fn validate(
        &self,
        meta: Option<&ResponseMeta>,
        body: Option<&Bytes>,
    ) -> Result<ResponseMeta, StatusCodeError> {
        (self.validate)(meta, body)
    }

    /// Pick the validator for a request: endpoint override, then client
    /// override, then the default.
    pub fn resolve(
        endpoint: Option<&StatusValidator>,
        client: Option<&StatusValidator>,
    ) -> StatusValidator {
        endpoint.or(client).cloned().unwrap_or_default()
    }
}

/// Build the rejection for a response, `0` standing in for a missing status.
pub fn rejection(meta: Option<&ResponseMeta>, body: Option<&Bytes>) -> StatusCodeError {
    StatusCodeError::new(
        meta.map_or(0, |m| m.status),
        meta.cloned(),
        body.cloned(),
    )
}

impl Default for StatusValidator {
    fn default() -> Self {
        Self::accepting(200..=299)
    }
}

impl fmt::Debug for StatusValidator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StatusValidator").finish_non_exhaustive()
    }
}
