//! Main REST client implementation.
//!
//! [`RestClient`] runs one endpoint call as a single pass:
//!
//! ```text
//! building ─► awaiting transport ─► validating status ─► decoding body ─► done
//!    │               │                     │                    │
//!    └───────────────┴─────────────────────┴────────────────────┴─► failed
//! ```
//!
//! There are no retries except the ATS upgrade: a plaintext request refused
//! with [`TransportError::SecureConnectionRequired`] is sent once more over
//! `https` (see [`send_with_ats_upgrade`]).
//!
//! # Examples
//!
//! ## JSON request
//!
//! ```ignore
//! use typed_rest::client::{ClientConfig, ReqwestTransport, RestClient};
//! use typed_rest::Endpoint;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = RestClient::with_transport(
//!         ClientConfig::new("api.example.com"),
//!         ReqwestTransport::new()?,
//!     );
//!     let devices: Vec<Device> = client.request_json(&Endpoint::get("/v1/devices")).await?;
//!     println!("{} devices", devices.len());
//!     Ok(())
//! }
//! ```
//!
//! ## Custom coders
//!
//! ```ignore
//! use typed_rest::codec::{PlainTextEncoder, RawDecoder};
//! use typed_rest::Endpoint;
//!
//! let endpoint = Endpoint::put("/v1/motd", "hello".to_string());
//! let bytes = client.execute(&endpoint, &PlainTextEncoder::new(), &RawDecoder).await?;
//! ```

use crate::client::transport::{Transport, TransportResponse};
use crate::client::{build_request, ClientConfig, LongPoll};
use crate::codec::{
    EmptyDecoder, JsonDecoder, JsonEncoder, PlainTextDecoder, PlainTextEncoder, RawDecoder,
    RawEncoder, RequestEncoder, ResponseDecoder, TextBody,
};
use crate::endpoint::Endpoint;
use crate::error::{BuildError, Result, TransportError};
use crate::protocol::StatusValidator;
use crate::types::RestRequest;
use bytes::Bytes;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

/// The REST client.
///
/// Owns its [`ClientConfig`] and shares its [`Transport`]. Cloning is cheap
/// apart from copying the configuration.
#[derive(Clone)]
pub struct RestClient {
    transport: Arc<dyn Transport>,
    config: ClientConfig,
}

impl RestClient {
    /// Create a client over a shared transport.
    pub fn new(config: ClientConfig, transport: Arc<dyn Transport>) -> Self {
        RestClient { transport, config }
    }

    /// Create a client that owns `transport`.
    pub fn with_transport<T: Transport + 'static>(config: ClientConfig, transport: T) -> Self {
        Self::new(config, Arc::new(transport))
    }

    /// Get the client configuration
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Change the configuration used for subsequent requests.
    pub fn config_mut(&mut self) -> &mut ClientConfig {
        &mut self.config
    }

    /// The underlying transport.
    pub fn transport(&self) -> &Arc<dyn Transport> {
        &self.transport
    }

    /// Request and resource timeouts reported by the transport.
    pub fn timeouts(&self) -> (Duration, Duration) {
        (
            self.transport.timeout_for_request(),
            self.transport.timeout_for_resource(),
        )
    }

    /// Resolve `endpoint` into the request that would be sent.
    pub fn build_request<B, E>(
        &self,
        endpoint: &Endpoint<B>,
        encoder: &E,
    ) -> std::result::Result<RestRequest, BuildError>
    where
        E: RequestEncoder<B> + ?Sized,
    {
        build_request(&self.config, endpoint, encoder)
    }

    /// Execute `endpoint`: build, send, validate the status, decode the body.
    ///
    /// # Errors
    ///
    /// Each stage fails with its own [`RestError`](crate::RestError) variant:
    /// `Build`, `Transport`, `Status` or `Decode`.
    pub async fn execute<B, E, D>(
        &self,
        endpoint: &Endpoint<B>,
        encoder: &E,
        decoder: &D,
    ) -> Result<D::Output>
    where
        E: RequestEncoder<B> + ?Sized,
        D: ResponseDecoder + ?Sized,
    {
        let request = self.build_request(endpoint, encoder)?;
        let validator = self.validator_for(endpoint);

        if self.config.enable_logging {
            tracing::debug!(method = %request.method, url = %request.url, "sending request");
        }

        let (body, meta) = self.send(request).await?;

        let meta = match validator.validate(Some(&meta), Some(&body)) {
            Ok(meta) => meta,
            Err(e) => {
                if self.config.enable_logging {
                    tracing::warn!(status = e.status, "response status rejected");
                }
                return Err(e.into());
            }
        };

        Ok(decoder.decode(&body, &meta)?)
    }

    /// Execute with a JSON body and a JSON response.
    pub async fn request_json<B, R>(&self, endpoint: &Endpoint<B>) -> Result<R>
    where
        B: Serialize,
        R: DeserializeOwned,
    {
        self.execute(endpoint, &JsonEncoder, &JsonDecoder::<R>::new())
            .await
    }

    /// Execute with a JSON body, discarding the response body.
    pub async fn send_json<B: Serialize>(&self, endpoint: &Endpoint<B>) -> Result<()> {
        self.execute(endpoint, &JsonEncoder, &EmptyDecoder).await
    }

    /// Execute with a text body and a text response.
    pub async fn request_text<B: TextBody>(&self, endpoint: &Endpoint<B>) -> Result<String> {
        self.execute(endpoint, &PlainTextEncoder::<B>::new(), &PlainTextDecoder)
            .await
    }

    /// Execute with a byte body and the raw response bytes.
    pub async fn request_raw<B: AsRef<[u8]>>(&self, endpoint: &Endpoint<B>) -> Result<Bytes> {
        self.execute(endpoint, &RawEncoder, &RawDecoder).await
    }

    /// Open a long-polling call.
    ///
    /// A build failure is yielded as the only item. The ATS upgrade does not
    /// apply to long polling.
    pub fn long_poll<B, E, D>(&self, endpoint: &Endpoint<B>, encoder: &E, decoder: D) -> LongPoll<D>
    where
        E: RequestEncoder<B> + ?Sized,
        D: ResponseDecoder,
    {
        let request = match self.build_request(endpoint, encoder) {
            Ok(request) => request,
            Err(e) => return LongPoll::failed(e.into(), decoder),
        };

        if self.config.enable_logging {
            tracing::debug!(method = %request.method, url = %request.url, "opening long poll");
        }

        let source = self.transport.send_long_polling(request);
        LongPoll::new(source, self.validator_for(endpoint), decoder)
    }

    fn validator_for<B>(&self, endpoint: &Endpoint<B>) -> StatusValidator {
        StatusValidator::resolve(
            endpoint.status_validator(),
            self.config.status_validator.as_ref(),
        )
    }

    async fn send(&self, request: RestRequest) -> std::result::Result<TransportResponse, TransportError> {
        if self.config.ats_upgrade {
            send_with_ats_upgrade(self.transport.as_ref(), request, self.config.enable_logging).await
        } else {
            self.transport.send(request).await
        }
    }
}

impl fmt::Debug for RestClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RestClient")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

/// Send `request`; if it is plaintext and the transport refuses it with
/// [`TransportError::SecureConnectionRequired`], send it once more over
/// `https` and return that outcome as-is.
///
/// Every other outcome of the first attempt is returned unchanged.
pub async fn send_with_ats_upgrade(
    transport: &dyn Transport,
    request: RestRequest,
    log: bool,
) -> std::result::Result<TransportResponse, TransportError> {
    let upgraded = request.upgraded_to_secure();

    match transport.send(request).await {
        Err(TransportError::SecureConnectionRequired(url)) => match upgraded {
            Some(secure) => {
                if log {
                    tracing::warn!(from = %url, to = %secure.url, "secure connection required, retrying over https");
                }
                transport.send(secure).await
            }
            None => Err(TransportError::SecureConnectionRequired(url)),
        },
        outcome => outcome,
    }
}
