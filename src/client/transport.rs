//! Transport abstraction and the reqwest-backed implementation.
//!
//! The pipeline never opens connections itself. It hands each
//! [`RestRequest`] to a [`Transport`], which returns the body and
//! [`ResponseMeta`] or a [`TransportError`].
//!
//! # Implementing a transport
//!
//! ```
//! use async_trait::async_trait;
//! use bytes::Bytes;
//! use typed_rest::client::{Transport, TransportResponse};
//! use typed_rest::{ResponseMeta, RestRequest, TransportError};
//!
//! struct Canned;
//!
//! #[async_trait]
//! impl Transport for Canned {
//!     async fn send(&self, _request: RestRequest) -> Result<TransportResponse, TransportError> {
//!         Ok((Bytes::from_static(b"ok"), ResponseMeta::new(200)))
//!     }
//! }
//! ```

use crate::client::{LineFramer, DEFAULT_MAX_MESSAGE_BYTES};
use crate::error::TransportError;
use crate::protocol::content_type;
use crate::types::{ResponseMeta, RestRequest};
use async_trait::async_trait;
use bytes::{Bytes, BytesMut};
use futures::stream::{self, BoxStream, Stream, StreamExt};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;

/// Body and metadata of one response.
pub type TransportResponse = (Bytes, ResponseMeta);

/// Responses delivered over a held-open connection.
pub type ResponseStream = BoxStream<'static, Result<TransportResponse, TransportError>>;

/// Default connect timeout reported by [`Transport::timeout_for_request`].
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

/// Default total timeout reported by [`Transport::timeout_for_resource`].
pub const DEFAULT_RESOURCE_TIMEOUT: Duration = Duration::from_secs(7 * 24 * 60 * 60);

/// An asynchronous HTTP capability.
///
/// Dropping a returned future or stream cancels the underlying call.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Send a request and wait for its single response.
    async fn send(&self, request: RestRequest) -> Result<TransportResponse, TransportError>;

    /// Send a request whose connection stays open and yields many responses.
    ///
    /// The default yields a single [`TransportError::LongPollingUnsupported`].
    fn send_long_polling(&self, _request: RestRequest) -> ResponseStream {
        stream::once(async { Err(TransportError::LongPollingUnsupported) }).boxed()
    }

    /// Time allowed to establish a request's connection, informational only.
    fn timeout_for_request(&self) -> Duration {
        DEFAULT_REQUEST_TIMEOUT
    }

    /// Resource timeout, informational only.
    fn timeout_for_resource(&self) -> Duration {
        DEFAULT_RESOURCE_TIMEOUT
    }
}

/// Settings for [`ReqwestTransport`].
///
/// Deserializable with defaults for every missing field:
///
/// ```
/// use typed_rest::client::TransportConfig;
///
/// let config: TransportConfig = serde_json::from_str(r#"{"https_only": true}"#).unwrap();
/// assert!(config.https_only);
/// assert_eq!(config.request_timeout_ms, 60_000);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TransportConfig {
    /// Connect timeout in milliseconds, reported by [`Transport::timeout_for_request`]
    pub request_timeout_ms: u64,

    /// Total time allowed for a request including its body, in milliseconds
    pub resource_timeout_ms: u64,

    /// How long idle pooled connections are kept, in seconds
    pub pool_idle_timeout_secs: u64,

    /// Maximum idle connections kept per host
    pub max_idle_per_host: usize,

    /// Proxy for all traffic; empty means none
    pub proxy_url: String,

    /// Refuse plaintext requests with [`TransportError::SecureConnectionRequired`]
    pub https_only: bool,

    /// Skip TLS certificate validation, for devices with self-signed certificates
    pub accept_invalid_certs: bool,

    /// Responses buffered between the connection task and a long-poll reader
    pub long_poll_buffer: usize,

    /// Largest long-poll message, or line of a line-delimited body, in bytes
    pub max_message_bytes: usize,

    /// Split every successful long-poll body by lines, whatever its content type
    pub frame_lines: bool,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            request_timeout_ms: DEFAULT_REQUEST_TIMEOUT.as_millis() as u64,
            resource_timeout_ms: DEFAULT_RESOURCE_TIMEOUT.as_millis() as u64,
            pool_idle_timeout_secs: 90,
            max_idle_per_host: 16,
            proxy_url: String::new(),
            https_only: false,
            accept_invalid_certs: false,
            long_poll_buffer: 100,
            max_message_bytes: DEFAULT_MAX_MESSAGE_BYTES,
            frame_lines: false,
        }
    }
}

/// [`Transport`] backed by a pooled `reqwest::Client`.
///
/// Long polling spawns a task on the current tokio runtime, so
/// [`Transport::send_long_polling`] must be called from within one. A
/// successful response whose content type is line-delimited (for example
/// `application/x-ndjson`), or any successful response when
/// [`TransportConfig::frame_lines`] is set, yields one item per line. Every
/// other response, including all non-2xx ones, yields its whole body as one
/// item. Both are capped by [`TransportConfig::max_message_bytes`].
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: reqwest::Client,
    config: Arc<TransportConfig>,
}

impl ReqwestTransport {
    /// Create a transport with default configuration.
    pub fn new() -> Result<Self, TransportError> {
        Self::with_config(TransportConfig::default())
    }

    /// Create a transport with custom configuration.
    pub fn with_config(config: TransportConfig) -> Result<Self, TransportError> {
        let mut builder = reqwest::Client::builder()
            .connect_timeout(Duration::from_millis(config.request_timeout_ms))
            .timeout(Duration::from_millis(config.resource_timeout_ms))
            .pool_idle_timeout(Duration::from_secs(config.pool_idle_timeout_secs))
            .pool_max_idle_per_host(config.max_idle_per_host)
            .danger_accept_invalid_certs(config.accept_invalid_certs);

        if !config.proxy_url.is_empty() {
            let proxy = reqwest::Proxy::all(&config.proxy_url).map_err(map_error)?;
            builder = builder.proxy(proxy);
        }

        let client = builder.build().map_err(map_error)?;

        Ok(ReqwestTransport {
            client,
            config: Arc::new(config),
        })
    }

    /// Get the transport configuration
    pub fn config(&self) -> &TransportConfig {
        &self.config
    }

    async fn dispatch(&self, request: RestRequest) -> Result<reqwest::Response, TransportError> {
        if self.config.https_only && request.is_plaintext() {
            return Err(TransportError::SecureConnectionRequired(
                request.url.to_string(),
            ));
        }

        let mut req_builder = self
            .client
            .request(request.method, request.url)
            .headers(request.headers);

        if !request.body.is_empty() {
            req_builder = req_builder.body(request.body);
        }

        req_builder.send().await.map_err(map_error)
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn send(&self, request: RestRequest) -> Result<TransportResponse, TransportError> {
        let response = self.dispatch(request).await?;
        let meta = response_meta(&response);
        let body = response.bytes().await.map_err(map_error)?;
        Ok((body, meta))
    }

    fn send_long_polling(&self, request: RestRequest) -> ResponseStream {
        let (tx, rx) = mpsc::channel(self.config.long_poll_buffer.max(1));
        let transport = self.clone();

        tokio::spawn(async move {
            let response = tokio::select! {
                _ = tx.closed() => return,
                response = transport.dispatch(request) => response,
            };
            let response = match response {
                Ok(response) => response,
                Err(e) => {
                    let _ = tx.send(Err(e)).await;
                    return;
                }
            };

            let meta = response_meta(&response);
            let limit = transport.config.max_message_bytes;
            let body = Box::pin(response.bytes_stream());

            if meta.is_success() && (transport.config.frame_lines || is_line_delimited(&meta)) {
                pump_lines(&tx, body, meta, limit).await;
            } else {
                pump_whole(&tx, body, meta, limit).await;
            }
        });

        ReceiverStream::new(rx).boxed()
    }

    fn timeout_for_request(&self) -> Duration {
        Duration::from_millis(self.config.request_timeout_ms)
    }

    fn timeout_for_resource(&self) -> Duration {
        Duration::from_millis(self.config.resource_timeout_ms)
    }
}

type ResponseSender = mpsc::Sender<Result<TransportResponse, TransportError>>;

fn is_line_delimited(meta: &ResponseMeta) -> bool {
    meta.header("content-type")
        .is_some_and(content_type::is_line_delimited)
}

/// Deliver each line of `body` as its own response.
///
/// An empty body still carries a status that must be validated, so it is
/// delivered as one empty response.
async fn pump_lines<S>(tx: &ResponseSender, mut body: S, meta: ResponseMeta, limit: usize)
where
    S: Stream<Item = reqwest::Result<Bytes>> + Unpin,
{
    let mut framer = LineFramer::with_limit(limit);
    let mut delivered = false;

    loop {
        // Reader gone: returning drops the response and its connection.
        let chunk = tokio::select! {
            _ = tx.closed() => return,
            chunk = body.next() => chunk,
        };
        match chunk {
            Some(Ok(chunk)) => {
                let messages = match framer.feed(&chunk) {
                    Ok(messages) => messages,
                    Err(e) => {
                        let _ = tx.send(Err(e)).await;
                        return;
                    }
                };
                for message in messages {
                    delivered = true;
                    if tx.send(Ok((message, meta.clone()))).await.is_err() {
                        return;
                    }
                }
            }
            Some(Err(e)) => {
                let _ = tx.send(Err(map_error(e))).await;
                return;
            }
            None => break,
        }
    }

    match framer.finish() {
        Some(rest) => {
            let _ = tx.send(Ok((rest, meta))).await;
        }
        None if !delivered => {
            let _ = tx.send(Ok((Bytes::new(), meta))).await;
        }
        None => {}
    }
}

/// Deliver `body` as a single response once the server finishes it.
async fn pump_whole<S>(tx: &ResponseSender, mut body: S, meta: ResponseMeta, limit: usize)
where
    S: Stream<Item = reqwest::Result<Bytes>> + Unpin,
{
    let mut collected = BytesMut::new();

    loop {
        let chunk = tokio::select! {
            _ = tx.closed() => return,
            chunk = body.next() => chunk,
        };
        match chunk {
            Some(Ok(chunk)) => {
                if collected.len() + chunk.len() > limit {
                    let _ = tx.send(Err(TransportError::MessageTooLarge { limit })).await;
                    return;
                }
                collected.extend_from_slice(&chunk);
            }
            Some(Err(e)) => {
                let _ = tx.send(Err(map_error(e))).await;
                return;
            }
            None => break,
        }
    }

    let _ = tx.send(Ok((collected.freeze(), meta))).await;
}

fn response_meta(response: &reqwest::Response) -> ResponseMeta {
    ResponseMeta {
        status: response.status().as_u16(),
        headers: response.headers().clone(),
        url: Some(response.url().clone()),
    }
}

fn map_error(e: reqwest::Error) -> TransportError {
    if e.is_timeout() {
        TransportError::Timeout
    } else {
        TransportError::Network(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::Method;
    use url::Url;

    #[tokio::test]
    async fn test_default_long_polling_is_unsupported() {
        struct SendOnly;

        #[async_trait]
        impl Transport for SendOnly {
            async fn send(&self, _request: RestRequest) -> Result<TransportResponse, TransportError> {
                Ok((Bytes::new(), ResponseMeta::new(204)))
            }
        }

        let request = RestRequest::new(Method::GET, Url::parse("http://localhost/").unwrap());
        let items: Vec<_> = SendOnly.send_long_polling(request).collect().await;
        assert_eq!(items.len(), 1);
        assert_eq!(items[0], Err(TransportError::LongPollingUnsupported));
        assert_eq!(SendOnly.timeout_for_request(), DEFAULT_REQUEST_TIMEOUT);
    }

    #[tokio::test]
    async fn test_https_only_refuses_plaintext() {
        let transport = ReqwestTransport::with_config(TransportConfig {
            https_only: true,
            ..Default::default()
        })
        .unwrap();
        let request = RestRequest::new(Method::GET, Url::parse("http://127.0.0.1:9/").unwrap());
        let err = transport.send(request).await.unwrap_err();
        assert_eq!(
            err,
            TransportError::SecureConnectionRequired("http://127.0.0.1:9/".to_string())
        );
    }

    #[tokio::test]
    async fn test_dropping_long_poll_closes_connection() {
        use tokio::io::{AsyncReadExt, AsyncWriteExt};
        use tokio::net::TcpListener;

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        // Sends one line, then holds the response open until the client hangs up.
        let server = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut buf = [0u8; 4096];
            let _ = socket.read(&mut buf).await.unwrap();
            socket
                .write_all(
                    b"HTTP/1.1 200 OK\r\ncontent-type: application/x-ndjson\r\n\
                      transfer-encoding: chunked\r\n\r\n2\r\na\n\r\n",
                )
                .await
                .unwrap();
            loop {
                match socket.read(&mut buf).await {
                    Ok(0) | Err(_) => break,
                    Ok(_) => {}
                }
            }
        });

        let transport = ReqwestTransport::new().unwrap();
        let url = Url::parse(&format!("http://{}/watch", addr)).unwrap();
        let mut stream = transport.send_long_polling(RestRequest::new(Method::GET, url));

        let (body, meta) = stream.next().await.unwrap().unwrap();
        assert_eq!(&body[..], b"a");
        assert_eq!(meta.status, 200);

        drop(stream);
        tokio::time::timeout(Duration::from_secs(5), server)
            .await
            .expect("connection still open after the stream was dropped")
            .unwrap();
    }

    #[test]
    fn test_invalid_proxy_is_reported() {
        let result = ReqwestTransport::with_config(TransportConfig {
            proxy_url: "::not a url::".to_string(),
            ..Default::default()
        });
        assert!(matches!(result, Err(TransportError::Network(_))));
    }

    #[test]
    fn test_timeouts_follow_config() {
        let transport = ReqwestTransport::with_config(TransportConfig {
            request_timeout_ms: 1500,
            ..Default::default()
        })
        .unwrap();
        assert_eq!(transport.timeout_for_request(), Duration::from_millis(1500));
        assert_eq!(transport.timeout_for_resource(), DEFAULT_RESOURCE_TIMEOUT);
    }
}
