#![doc = include_str!("../README.md")]
#![warn(missing_docs)]

//! # Typed REST: endpoint descriptions over an injectable HTTP transport
//!
//! This crate turns declarative endpoint descriptions into HTTP requests,
//! sends them through a pluggable asynchronous [`Transport`](client::Transport),
//! validates the response status and decodes the body into a typed value.
//!
//! ## Pipeline
//!
//! ```text
//! Endpoint + ClientConfig ─► build_request ─► Transport ─► StatusValidator ─► ResponseDecoder ─► T
//! ```
//!
//! Every stage is a pure transform that either passes its output on or stops
//! with its own error type, collected in [`RestError`].
//!
//! ## Key Features
//!
//! - **Override layering**: endpoint port, scheme, headers and status policy
//!   override client defaults; query parameters concatenate
//! - **Pluggable coders**: JSON, plain text, raw and empty bodies in both directions
//! - **Diagnosable failures**: status errors keep the body, JSON decode errors keep the raw text
//! - **Long polling**: a held-open connection as a stream of typed results
//! - **ATS upgrade**: one bounded plaintext → `https` retry when a secure connection is required
//! - **IP values**: parsing, canonical rendering and IPv6-first preference
//!
//! ## Client Usage
//!
//! ```ignore
//! use serde::Deserialize;
//! use typed_rest::client::{ClientConfig, ReqwestTransport, RestClient};
//! use typed_rest::{Endpoint, QueryParameter};
//!
//! #[derive(Deserialize)]
//! struct Device { id: u32, name: String }
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ClientConfig::new("api.example.com").with_header("X-Api-Key", "secret");
//!     let client = RestClient::with_transport(config, ReqwestTransport::new()?);
//!
//!     let endpoint = Endpoint::get("/v1/devices").with_query(QueryParameter::new("page", "1"));
//!     let devices: Vec<Device> = client.request_json(&endpoint).await?;
//!     for device in devices {
//!         println!("{} {}", device.id, device.name);
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Module Structure
//!
//! - **[ip]** - IP address value type and interface listings
//! - **[types]** - Query parameters, ports, resolved requests, response metadata
//! - **[codec]** - Request encoders and response decoders
//! - **[protocol]** - Header/query merging and status validation
//! - **[endpoint]** - Endpoint descriptors
//! - **[client]** - Request builder, transport, client and long polling
//! - **[error]** - Error types and result handling

pub mod client;
pub mod codec;
pub mod endpoint;
pub mod error;
pub mod ip;
pub mod protocol;
pub mod types;

pub use client::{ClientConfig, LongPoll, ReqwestTransport, RestClient, Transport};
pub use endpoint::Endpoint;
pub use error::{BuildError, DecodeError, EncodeError, RestError, Result, TransportError};
pub use ip::{preferred_address, Ip, IpDecodeError, IpParseError};
pub use protocol::{StatusCodeError, StatusValidator};
pub use types::{EndpointPort, QueryParameter, ResponseMeta, RestRequest};

#[cfg(test)]
mod tests;
