//! Error types for the REST request pipeline.
//!
//! Every stage of a request reports its own error type so callers can tell
//! *where* a call failed:
//!
//! | Stage | Error | Network activity? |
//! |-------|-------|-------------------|
//! | Body encoding | [`EncodeError`] | none |
//! | Request building | [`BuildError`] | none |
//! | Transport | [`TransportError`] | yes |
//! | Status validation | [`StatusCodeError`] | yes |
//! | Body decoding | [`DecodeError`] | yes |
//!
//! [`RestError`] unifies them for the client entry points.

use crate::protocol::StatusCodeError;
use thiserror::Error;

/// Result type for client operations.
pub type Result<T> = std::result::Result<T, RestError>;

/// Any error produced while executing an endpoint.
#[derive(Debug, Error)]
pub enum RestError {
    /// The request could not be assembled. No network call was made.
    #[error("request build failed: {0}")]
    Build(#[from] BuildError),

    /// The transport failed before a response was received.
    #[error("transport failed: {0}")]
    Transport(#[from] TransportError),

    /// A response arrived but its status code was rejected.
    #[error(transparent)]
    Status(#[from] StatusCodeError),

    /// A response arrived but its body did not decode.
    #[error("response decode failed: {0}")]
    Decode(#[from] DecodeError),
}

impl RestError {
    /// The rejected HTTP status, if this is a status error.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            RestError::Status(e) => Some(e.status),
            _ => None,
        }
    }

    /// Whether the failure came from the transport layer.
    pub fn is_transport(&self) -> bool {
        matches!(self, RestError::Transport(_))
    }
}

/// Request body encoding failures.
#[derive(Debug, Error)]
pub enum EncodeError {
    /// JSON serialization failed; the serde_json error is kept as-is.
    #[error("JSON encoding failed: {0}")]
    Json(#[from] serde_json::Error),
}

/// Failures while turning an endpoint into a request.
#[derive(Debug, Error)]
pub enum BuildError {
    /// The endpoint body could not be encoded.
    #[error(transparent)]
    Encode(#[from] EncodeError),

    /// Scheme, host, port, path or query could not form a valid URL.
    #[error("invalid request component `{component}`: {reason}")]
    InvalidComponents {
        /// Which component was rejected (`host`, `path`, ...)
        component: &'static str,
        /// Why it was rejected
        reason: String,
    },

    /// A header name or value is not valid HTTP.
    #[error("invalid header `{name}`")]
    InvalidHeader {
        /// The offending header name
        name: String,
    },
}

/// Failures reported by a [`Transport`](crate::client::Transport).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    /// A plaintext request was refused because a secure connection is required.
    ///
    /// This is the only error that triggers the ATS upgrade.
    #[error("a secure connection is required for {0}")]
    SecureConnectionRequired(String),

    /// The request or resource timeout elapsed.
    #[error("request timed out")]
    Timeout,

    /// The call was cancelled before completing.
    #[error("request cancelled")]
    Cancelled,

    /// The transport does not support long polling.
    #[error("long polling is not supported by this transport")]
    LongPollingUnsupported,

    /// A response, or one line of a line-delimited body, exceeded the
    /// configured size limit.
    #[error("response message exceeds {limit} bytes")]
    MessageTooLarge {
        /// The limit in bytes
        limit: usize,
    },

    /// Connection, TLS or protocol failure.
    #[error("network error: {0}")]
    Network(String),
}

/// Response body decoding failures.
#[derive(Debug, Error)]
pub enum DecodeError {
    /// The body was not valid JSON for the target type.
    ///
    /// `text` holds the body as UTF-8, or `<nil>` when it is not valid UTF-8.
    #[error("invalid JSON ({source}): {text}")]
    InvalidJson {
        /// Underlying serde_json error
        source: serde_json::Error,
        /// The raw body as text
        text: String,
    },
}
