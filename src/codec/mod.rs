//! Pluggable body coders.
//!
//! Request bodies go through a [`RequestEncoder`], response bodies through a
//! [`ResponseDecoder`]. Both are pure and `Send + Sync`, so one instance can
//! serve many in-flight requests.
//!
//! # Examples
//!
//! ```
//! use bytes::Bytes;
//! use typed_rest::codec::{JsonDecoder, JsonEncoder, RequestEncoder, ResponseDecoder};
//! use typed_rest::ResponseMeta;
//!
//! let body = JsonEncoder.encode(&vec![1, 2, 3]).unwrap();
//! let back = JsonDecoder::<Vec<i32>>::new().decode(&body, &ResponseMeta::new(200)).unwrap();
//! assert_eq!(back, vec![1, 2, 3]);
//!
//! let err = JsonDecoder::<Vec<i32>>::new()
//!     .decode(&Bytes::from("oops"), &ResponseMeta::new(200))
//!     .unwrap_err();
//! assert!(err.to_string().ends_with(": oops"));
//! ```

mod request;
mod response;

pub use request::{
    AnyEncodable, EmptyEncoder, JsonEncoder, PlainTextEncoder, RawEncoder, RequestEncoder,
    TextBody,
};
pub use response::{
    EmptyDecoder, JsonDecoder, PlainTextDecoder, RawDecoder, ResponseDecoder,
    NON_UTF8_PLACEHOLDER,
};
