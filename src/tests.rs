//! End-to-end pipeline tests over an in-memory transport.

use crate::client::{ClientConfig, RestClient, Transport, TransportResponse};
use crate::codec::{EmptyEncoder, JsonDecoder, JsonEncoder, PlainTextDecoder};
use crate::error::{RestError, TransportError};
use crate::protocol::StatusValidator;
use crate::types::{QueryParameter, ResponseMeta, RestRequest};
use crate::{DecodeError, Endpoint};
use async_trait::async_trait;
use bytes::Bytes;
use futures::stream::{self, StreamExt};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::sync::Arc;
use tokio_test::{assert_err, assert_ok};

type Outcome = Result<TransportResponse, TransportError>;

/// Replays queued outcomes and records every request it receives.
#[derive(Default)]
struct MockTransport {
    outcomes: Mutex<VecDeque<Outcome>>,
    stream: Mutex<Option<Vec<Outcome>>>,
    requests: Mutex<Vec<RestRequest>>,
}

impl MockTransport {
    fn replying(outcomes: Vec<Outcome>) -> Arc<Self> {
        Arc::new(MockTransport {
            outcomes: Mutex::new(outcomes.into()),
            ..Default::default()
        })
    }

    fn streaming(items: Vec<Outcome>) -> Arc<Self> {
        Arc::new(MockTransport {
            stream: Mutex::new(Some(items)),
            ..Default::default()
        })
    }

    fn requests(&self) -> Vec<RestRequest> {
        self.requests.lock().clone()
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn send(&self, request: RestRequest) -> Outcome {
        self.requests.lock().push(request);
        self.outcomes
            .lock()
            .pop_front()
            .unwrap_or(Err(TransportError::Cancelled))
    }

    fn send_long_polling(&self, request: RestRequest) -> crate::client::ResponseStream {
        self.requests.lock().push(request);
        let items = self.stream.lock().take().unwrap_or_default();
        stream::iter(items).boxed()
    }
}

fn reply(status: u16, body: &'static str) -> Outcome {
    Ok((Bytes::from_static(body.as_bytes()), ResponseMeta::new(status)))
}

fn client(transport: Arc<MockTransport>) -> RestClient {
    let config = ClientConfig::new("api.example.com")
        .with_header("X-Api-Key", "secret")
        .with_query(QueryParameter::new("v", "2"));
    RestClient::new(config, transport)
}

#[derive(Debug, Serialize)]
struct NewDevice {
    name: String,
}

#[derive(Debug, Deserialize, PartialEq)]
struct Device {
    id: u32,
    name: String,
}

#[tokio::test]
async fn test_json_round_trip() {
    let transport = MockTransport::replying(vec![reply(201, r#"{"id":9,"name":"lamp"}"#)]);
    let client = client(transport.clone());

    let endpoint = Endpoint::post(
        "/v1/devices",
        NewDevice {
            name: "lamp".to_string(),
        },
    )
    .with_query(QueryParameter::new("dry_run", "false"));
    let device: Device = assert_ok!(client.request_json(&endpoint).await);
    assert_eq!(
        device,
        Device {
            id: 9,
            name: "lamp".to_string()
        }
    );

    let sent = transport.requests();
    assert_eq!(sent.len(), 1);
    assert_eq!(
        sent[0].url.as_str(),
        "https://api.example.com/v1/devices?v=2&dry_run=false"
    );
    assert_eq!(sent[0].headers["x-api-key"], "secret");
    assert_eq!(sent[0].headers["content-type"], "application/json");
    assert_eq!(&sent[0].body[..], br#"{"name":"lamp"}"#);
}

#[tokio::test]
async fn test_build_error_skips_transport() {
    let transport = MockTransport::replying(vec![reply(200, "")]);
    let mut client = client(transport.clone());
    client.config_mut().hostname = String::new();

    let err = assert_err!(client.request_text(&Endpoint::get("/")).await);
    assert!(matches!(err, RestError::Build(_)));
    assert!(transport.requests().is_empty());
}

#[tokio::test]
async fn test_transport_error_is_untouched() {
    let transport = MockTransport::replying(vec![Err(TransportError::Timeout)]);
    let err = client(transport)
        .request_text(&Endpoint::get("/slow"))
        .await
        .unwrap_err();
    assert!(matches!(err, RestError::Transport(TransportError::Timeout)));
}

#[tokio::test]
async fn test_status_error_keeps_body() {
    let transport = MockTransport::replying(vec![reply(404, "no such device")]);
    let err = client(transport)
        .request_json::<(), Device>(&Endpoint::get("/v1/devices/1"))
        .await
        .unwrap_err();

    match err {
        RestError::Status(status) => {
            assert_eq!(status.status, 404);
            assert_eq!(status.body_text(), Some("no such device"));
        }
        other => panic!("expected status error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_decode_error_keeps_raw_text() {
    let transport = MockTransport::replying(vec![reply(200, "<html>maintenance</html>")]);
    let err = client(transport)
        .request_json::<(), Device>(&Endpoint::get("/v1/devices/1"))
        .await
        .unwrap_err();

    match err {
        RestError::Decode(DecodeError::InvalidJson { text, .. }) => {
            assert_eq!(text, "<html>maintenance</html>");
        }
        other => panic!("expected decode error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_endpoint_validator_beats_client_validator() {
    let transport = MockTransport::replying(vec![reply(304, ""), reply(304, "")]);
    let mut client = client(transport);
    client.config_mut().status_validator = Some(StatusValidator::accepting(200..=304));

    // Client policy accepts 304.
    assert_ok!(client.request_text(&Endpoint::get("/cache")).await);

    // Endpoint policy replaces it entirely.
    let strict = Endpoint::get("/cache").with_status_validator(StatusValidator::accepting(200..=200));
    let err = assert_err!(client.request_text(&strict).await);
    assert_eq!(err.status_code(), Some(304));
}

#[tokio::test]
async fn test_ats_upgrade_end_to_end() {
    let transport = MockTransport::replying(vec![
        Err(TransportError::SecureConnectionRequired(
            "http://api.example.com/".to_string(),
        )),
        reply(200, "upgraded"),
    ]);
    let mut client = client(transport.clone());
    client.config_mut().use_ssl = false;
    client.config_mut().port = 443;

    let text = assert_ok!(client.request_text(&Endpoint::get("/ping")).await);
    assert_eq!(text, "upgraded");

    let sent = transport.requests();
    assert_eq!(sent.len(), 2);
    assert_eq!(sent[0].url.as_str(), "http://api.example.com:443/ping?v=2");
    assert_eq!(sent[1].url.as_str(), "https://api.example.com/ping?v=2");
    assert_eq!(sent[0].headers, sent[1].headers);
    assert_eq!(sent[0].method, sent[1].method);
    assert_eq!(sent[0].body, sent[1].body);
}

#[tokio::test]
async fn test_ats_upgrade_can_be_disabled() {
    let transport = MockTransport::replying(vec![
        Err(TransportError::SecureConnectionRequired(
            "http://api.example.com/".to_string(),
        )),
        reply(200, "unused"),
    ]);
    let mut client = client(transport.clone());
    client.config_mut().use_ssl = false;
    client.config_mut().ats_upgrade = false;

    let err = assert_err!(client.request_text(&Endpoint::get("/ping")).await);
    assert!(matches!(
        err,
        RestError::Transport(TransportError::SecureConnectionRequired(_))
    ));
    assert_eq!(transport.requests().len(), 1);
}

#[tokio::test]
async fn test_config_changes_apply_to_next_request() {
    let transport = MockTransport::replying(vec![reply(200, ""), reply(200, "")]);
    let mut client = client(transport.clone());

    assert_ok!(client.send_json(&Endpoint::delete("/v1/devices/3")).await);
    client.config_mut().set_header("X-API-KEY", "rotated");
    assert_ok!(client.request_raw(&Endpoint::put("/v1/firmware", vec![0xde, 0xad])).await);

    let sent = transport.requests();
    assert_eq!(sent[0].headers["x-api-key"], "secret");
    assert_eq!(sent[1].headers["x-api-key"], "rotated");
    assert!(sent[0].body.is_empty());
    assert_eq!(&sent[1].body[..], &[0xde, 0xad]);
}

#[tokio::test]
async fn test_long_poll_decodes_each_response() {
    let transport = MockTransport::streaming(vec![
        reply(200, r#"{"id":1,"name":"a"}"#),
        reply(500, "oops"),
        reply(200, r#"{"id":2,"name":"b"}"#),
    ]);
    let client = client(transport.clone());

    let poll = client.long_poll(
        &Endpoint::get("/v1/events"),
        &EmptyEncoder,
        JsonDecoder::<Device>::new(),
    );
    let results: Vec<_> = poll.collect().await;

    assert_eq!(results.len(), 3);
    assert_eq!(results[0].as_ref().unwrap().id, 1);
    assert_eq!(results[1].as_ref().unwrap_err().status_code(), Some(500));
    assert_eq!(results[2].as_ref().unwrap().id, 2);
    assert_eq!(transport.requests().len(), 1);
}

#[tokio::test]
async fn test_long_poll_build_error() {
    let transport = MockTransport::streaming(Vec::new());
    let mut client = client(transport.clone());
    client.config_mut().hostname = "bad host".to_string();

    let mut poll = client.long_poll(&Endpoint::get("/v1/events"), &EmptyEncoder, PlainTextDecoder);
    assert!(matches!(poll.next().await, Some(Err(RestError::Build(_)))));
    assert!(poll.next().await.is_none());
    assert!(transport.requests().is_empty());
}

#[tokio::test]
async fn test_execute_with_explicit_coders() {
    let transport = MockTransport::replying(vec![reply(200, "[1,2,3]")]);
    let values = client(transport.clone())
        .execute(
            &Endpoint::put("/v1/values", vec![3, 2, 1]),
            &JsonEncoder,
            &JsonDecoder::<Vec<u8>>::new(),
        )
        .await
        .unwrap();
    assert_eq!(values, vec![1, 2, 3]);
    assert_eq!(&transport.requests()[0].body[..], b"[3,2,1]");
}
