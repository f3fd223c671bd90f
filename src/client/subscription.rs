//! Long-polling result streams.
//!
//! A long-polling call keeps one connection open and receives a sequence of
//! responses. [`LongPoll`] runs each of them through status validation and
//! body decoding on its own, yielding one typed result per response.
//!
//! # Lifecycle
//!
//! 1. Created by [`RestClient::long_poll`](super::RestClient::long_poll)
//! 2. Yields a result per response through `next().await` or [`Stream`]
//! 3. Ends when the transport closes the connection, or right after it
//!    yields a transport error
//!
//! Dropping the `LongPoll` cancels the transport call.
//!
//! # Examples
//!
//! ```ignore
//! use typed_rest::codec::{EmptyEncoder, JsonDecoder};
//! use typed_rest::Endpoint;
//!
//! let mut events = client.long_poll(&Endpoint::get("/events"), &EmptyEncoder, JsonDecoder::<Event>::new());
//! while let Some(result) = events.next().await {
//!     match result {
//!         Ok(event) => println!("event: {:?}", event),
//!         Err(e) => eprintln!("event failed: {}", e),
//!     }
//! }
//! ```

use crate::client::transport::{ResponseStream, TransportResponse};
use crate::codec::ResponseDecoder;
use crate::error::{RestError, Result};
use crate::protocol::StatusValidator;
use futures::{Stream, StreamExt};
use std::pin::Pin;
use std::task::{ready, Context, Poll};

/// A stream of decoded long-polling responses.
pub struct LongPoll<D: ResponseDecoder> {
    /// Error raised before the transport was reached, yielded first
    pending: Option<RestError>,
    /// Transport responses; `None` once the stream has ended
    source: Option<ResponseStream>,
    validator: StatusValidator,
    decoder: D,
}

impl<D: ResponseDecoder> LongPoll<D> {
    /// Wrap a transport stream.
    pub fn new(source: ResponseStream, validator: StatusValidator, decoder: D) -> Self {
        LongPoll {
            pending: None,
            source: Some(source),
            validator,
            decoder,
        }
    }

    /// A stream that yields `error` once and ends.
    pub fn failed(error: RestError, decoder: D) -> Self {
        LongPoll {
            pending: Some(error),
            source: None,
            validator: StatusValidator::default(),
            decoder,
        }
    }

    /// Whether the stream has ended or will end after a pending error.
    pub fn is_closed(&self) -> bool {
        self.source.is_none()
    }

    fn process(&self, (body, meta): TransportResponse) -> Result<D::Output> {
        let meta = self.validator.validate(Some(&meta), Some(&body))?;
        Ok(self.decoder.decode(&body, &meta)?)
    }
}

impl<D: ResponseDecoder + Unpin> LongPoll<D> {
    /// Receive the next result.
    ///
    /// - `Some(Ok(value))` - a response passed validation and decoded
    /// - `Some(Err(error))` - a response was rejected, or the transport failed
    /// - `None` - the connection is closed
    pub async fn next(&mut self) -> Option<Result<D::Output>> {
        StreamExt::next(self).await
    }
}

impl<D: ResponseDecoder + Unpin> Stream for LongPoll<D> {
    type Item = Result<D::Output>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = &mut *self;
        if let Some(error) = this.pending.take() {
            return Poll::Ready(Some(Err(error)));
        }
        let Some(source) = this.source.as_mut() else {
            return Poll::Ready(None);
        };

        match ready!(source.poll_next_unpin(cx)) {
            Some(Ok(response)) => Poll::Ready(Some(this.process(response))),
            Some(Err(e)) => {
                this.source = None;
                Poll::Ready(Some(Err(e.into())))
            }
            None => {
                this.source = None;
                Poll::Ready(None)
            }
        }
    }
}
