//! REST client implementation.
//!
//! This module ties the pipeline together:
//!
//! - **Build** a [`RestRequest`](crate::RestRequest) from client defaults and an endpoint
//! - **Send** it through an injected [`Transport`]
//! - **Validate** the status and **decode** the body
//! - **Long-poll** a held-open connection as a [`LongPoll`] stream
//!
//! # Module Organization
//!
//! ```text
//! client/
//! ├── builder      - request resolution (defaults + overrides)
//! ├── config       - client configuration
//! ├── fetch        - RestClient and the ATS upgrade
//! ├── framing      - newline framing of long-polling bodies
//! ├── subscription - long-polling result stream
//! └── transport    - Transport trait and reqwest implementation
//! ```
//!
//! # Key Types
//!
//! | Type | Description |
//! |------|-------------|
//! | [`RestClient`] | Executes endpoints |
//! | [`ClientConfig`] | Defaults applied to every request |
//! | [`Transport`] | Injected asynchronous HTTP capability |
//! | [`ReqwestTransport`] | Production transport |
//! | [`LongPoll`] | Stream of long-polling results |
//!
//! # Examples
//!
//! ```
//! use typed_rest::client::{ClientConfig, ReqwestTransport, RestClient};
//!
//! let config = ClientConfig {
//!     use_ssl: false,
//!     port: 8080,
//!     ..ClientConfig::new("192.168.1.20")
//! }
//! .with_header("Accept", "application/json");
//!
//! let client = RestClient::with_transport(config, ReqwestTransport::new().unwrap());
//! assert_eq!(client.config().port, 8080);
//! ```

mod builder;
mod config;
mod fetch;
mod framing;
mod subscription;
mod transport;

pub use builder::build_request;
pub use config::ClientConfig;
pub use fetch::{send_with_ats_upgrade, RestClient};
pub use framing::{LineFramer, DEFAULT_MAX_MESSAGE_BYTES};
pub use subscription::LongPoll;
pub use transport::{
    ReqwestTransport, ResponseStream, Transport, TransportConfig, TransportResponse,
    DEFAULT_REQUEST_TIMEOUT, DEFAULT_RESOURCE_TIMEOUT,
};
