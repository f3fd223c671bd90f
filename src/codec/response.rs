//! Response body decoders.
//!
//! | Decoder | Output | Fails? |
//! |---------|--------|--------|
//! | [`JsonDecoder<T>`] | `T` | yes, [`DecodeError::InvalidJson`] with the raw text |
//! | [`PlainTextDecoder`] | `String` | never, invalid UTF-8 gives `""` |
//! | [`RawDecoder`] | `Bytes` | never |
//! | [`EmptyDecoder`] | `()` | never |

use crate::error::DecodeError;
use crate::types::ResponseMeta;
use bytes::Bytes;
use serde::de::DeserializeOwned;
use std::fmt;
use std::marker::PhantomData;

/// Placeholder for bodies that are not valid UTF-8 in decode errors.
pub const NON_UTF8_PLACEHOLDER: &str = "<nil>";

/// Turns a response body into a typed value.
pub trait ResponseDecoder: Send + Sync {
    /// Decoded value type.
    type Output;

    /// Decode `body` received with `meta`.
    fn decode(&self, body: &Bytes, meta: &ResponseMeta) -> Result<Self::Output, DecodeError>;
}

/// JSON decoding into `T`.
pub struct JsonDecoder<T> {
    _target: PhantomData<fn() -> T>,
}

impl<T> JsonDecoder<T> {
    /// Create a decoder for `T`.
    pub fn new() -> Self {
        Self {
            _target: PhantomData,
        }
    }
}

impl<T> Default for JsonDecoder<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Clone for JsonDecoder<T> {
    fn clone(&self) -> Self {
        Self::new()
    }
}

impl<T> fmt::Debug for JsonDecoder<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "JsonDecoder<{}>", std::any::type_name::<T>())
    }
}

impl<T: DeserializeOwned> ResponseDecoder for JsonDecoder<T> {
    type Output = T;

    fn decode(&self, body: &Bytes, _meta: &ResponseMeta) -> Result<T, DecodeError> {
        serde_json::from_slice(body).map_err(|source| DecodeError::InvalidJson {
            source,
            text: std::str::from_utf8(body)
                .map(str::to_owned)
                .unwrap_or_else(|_| NON_UTF8_PLACEHOLDER.to_string()),
        })
    }
}

/// UTF-8 text decoding.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlainTextDecoder;

impl ResponseDecoder for PlainTextDecoder {
    type Output = String;

    fn decode(&self, body: &Bytes, _meta: &ResponseMeta) -> Result<String, DecodeError> {
        Ok(String::from_utf8(body.to_vec()).unwrap_or_default())
    }
}

/// Returns the body bytes unchanged.
#[derive(Debug, Clone, Copy, Default)]
pub struct RawDecoder;

impl ResponseDecoder for RawDecoder {
    type Output = Bytes;

    fn decode(&self, body: &Bytes, _meta: &ResponseMeta) -> Result<Bytes, DecodeError> {
        Ok(body.clone())
    }
}

/// Discards the body.
#[derive(Debug, Clone, Copy, Default)]
pub struct EmptyDecoder;

impl ResponseDecoder for EmptyDecoder {
    type Output = ();

    fn decode(&self, _body: &Bytes, _meta: &ResponseMeta) -> Result<(), DecodeError> {
        Ok(())
    }
}
