//! Request body encoders.
//!
//! | Encoder | Input | Output |
//! |---------|-------|--------|
//! | [`JsonEncoder`] | any `Serialize` (incl. [`AnyEncodable`]) | JSON bytes |
//! | [`PlainTextEncoder`] | [`TextBody`] values, or via a stringify closure | UTF-8 bytes |
//! | [`RawEncoder`] | `AsRef<[u8]>` | the bytes unchanged |
//! | [`EmptyEncoder`] | anything | empty bytes |

use crate::error::EncodeError;
use crate::protocol::content_type;
use bytes::Bytes;
use serde::{Serialize, Serializer};
use std::borrow::Cow;
use std::fmt;
use std::sync::Arc;

/// Turns a typed value into a request body.
pub trait RequestEncoder<T: ?Sized>: Send + Sync {
    /// Encode `value`.
    fn encode(&self, value: &T) -> Result<Bytes, EncodeError>;

    /// `Content-Type` of the produced body, if the encoder has one.
    fn content_type(&self) -> Option<&'static str> {
        None
    }
}

/// JSON encoding via serde_json.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonEncoder;

impl<T: Serialize + ?Sized> RequestEncoder<T> for JsonEncoder {
    fn encode(&self, value: &T) -> Result<Bytes, EncodeError> {
        Ok(Bytes::from(serde_json::to_vec(value)?))
    }

    fn content_type(&self) -> Option<&'static str> {
        Some(content_type::JSON)
    }
}

type ToValueFn = dyn Fn() -> serde_json::Result<serde_json::Value> + Send + Sync;

/// A type-erased serializable value.
///
/// Lets values of different types travel through one collection or one
/// [`JsonEncoder`] call:
///
/// ```
/// use typed_rest::codec::{AnyEncodable, JsonEncoder, RequestEncoder};
///
/// let parts = vec![AnyEncodable::new(1u8), AnyEncodable::new("two")];
/// let bytes = JsonEncoder.encode(&parts).unwrap();
/// assert_eq!(&bytes[..], b"[1,\"two\"]");
/// ```
#[derive(Clone)]
pub struct AnyEncodable {
    to_value: Arc<ToValueFn>,
}

impl AnyEncodable {
    /// Erase `value`.
    pub fn new<T: Serialize + Send + Sync + 'static>(value: T) -> Self {
        Self {
            to_value: Arc::new(move || serde_json::to_value(&value)),
        }
    }
}

impl Serialize for AnyEncodable {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let value = (self.to_value)().map_err(serde::ser::Error::custom)?;
        value.serialize(serializer)
    }
}

impl fmt::Debug for AnyEncodable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AnyEncodable")
    }
}

/// Values that already have a text representation.
///
/// Implemented for the string types. Other types opt in by implementing it,
/// keeping the default `None` when they have no natural text form.
pub trait TextBody {
    /// The text form, if any.
    fn text(&self) -> Option<Cow<'_, str>> {
        None
    }
}

impl TextBody for str {
    fn text(&self) -> Option<Cow<'_, str>> {
        Some(Cow::Borrowed(self))
    }
}

impl TextBody for String {
    fn text(&self) -> Option<Cow<'_, str>> {
        Some(Cow::Borrowed(self.as_str()))
    }
}

impl TextBody for Box<str> {
    fn text(&self) -> Option<Cow<'_, str>> {
        Some(Cow::Borrowed(self))
    }
}

impl TextBody for Cow<'_, str> {
    fn text(&self) -> Option<Cow<'_, str>> {
        Some(Cow::Borrowed(self.as_ref()))
    }
}

impl TextBody for () {}

impl<T: TextBody + ?Sized> TextBody for &T {
    fn text(&self) -> Option<Cow<'_, str>> {
        (**self).text()
    }
}

type StringifyFn<T> = dyn Fn(&T) -> String + Send + Sync;

/// Plain text encoding.
///
/// Uses the value's [`TextBody`] form, else the stringify closure. With
/// neither, the body is empty rather than an error. That leniency is
/// deliberate but can hide a missing closure, so prefer supplying one for
/// non-string types.
pub struct PlainTextEncoder<T: ?Sized> {
    stringify: Option<Arc<StringifyFn<T>>>,
}

impl<T: ?Sized> PlainTextEncoder<T> {
    /// An encoder relying on [`TextBody`] alone.
    pub fn new() -> Self {
        Self { stringify: None }
    }

    /// An encoder that falls back to `stringify`.
    pub fn with_stringify<F>(stringify: F) -> Self
    where
        F: Fn(&T) -> String + Send + Sync + 'static,
    {
        Self {
            stringify: Some(Arc::new(stringify)),
        }
    }
}

impl<T: ?Sized> Default for PlainTextEncoder<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: ?Sized> Clone for PlainTextEncoder<T> {
    fn clone(&self) -> Self {
        Self {
            stringify: self.stringify.clone(),
        }
    }
}

impl<T: TextBody + ?Sized> RequestEncoder<T> for PlainTextEncoder<T> {
    fn encode(&self, value: &T) -> Result<Bytes, EncodeError> {
        if let Some(text) = value.text() {
            return Ok(Bytes::from(text.into_owned()));
        }
        match &self.stringify {
            Some(stringify) => Ok(Bytes::from(stringify(value))),
            None => Ok(Bytes::new()),
        }
    }

    fn content_type(&self) -> Option<&'static str> {
        Some(content_type::TEXT)
    }
}

/// Passes byte-like bodies through unchanged.
#[derive(Debug, Clone, Copy, Default)]
pub struct RawEncoder;

impl<T: AsRef<[u8]> + ?Sized> RequestEncoder<T> for RawEncoder {
    fn encode(&self, value: &T) -> Result<Bytes, EncodeError> {
        Ok(Bytes::copy_from_slice(value.as_ref()))
    }

    fn content_type(&self) -> Option<&'static str> {
        Some(content_type::OCTET_STREAM)
    }
}

/// Produces an empty body for any input. Used for bodyless requests.
#[derive(Debug, Clone, Copy, Default)]
pub struct EmptyEncoder;

impl<T: ?Sized> RequestEncoder<T> for EmptyEncoder {
    fn encode(&self, _value: &T) -> Result<Bytes, EncodeError> {
        Ok(Bytes::new())
    }
}
