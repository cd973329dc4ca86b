//! Endpoint execution.

use async_stream::try_stream;
use bytes::{Bytes, BytesMut};
use futures::StreamExt;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::{timeout_at, Instant};
use tracing::instrument;

use super::streaming::{EventDecoder, EventStream, Frame};
use super::{ByteStream, HttpRequest, HttpResponse, HttpTransport, ReqwestTransport};
use crate::codec::Decodable;
use crate::endpoint::Endpoint;
use crate::errors::{DecodeError, TransportError, WebserviceError, WebserviceResult};

/// Default ceiling for a buffered response body (10 MiB).
pub const DEFAULT_MAX_BODY_SIZE: usize = 10 * 1024 * 1024;

const STATUS_OK: u16 = 200;

/// Executes endpoints over an [`HttpTransport`].
///
/// Holds no per-call state; clones share the underlying transport and can be
/// used from many tasks at once.
#[derive(Clone)]
pub struct Webservice {
    transport: Arc<dyn HttpTransport>,
    max_body_size: usize,
}

impl Webservice {
    /// Creates a client backed by [`ReqwestTransport`].
    pub fn new() -> WebserviceResult<Self> {
        Ok(Self::with_transport(Arc::new(ReqwestTransport::new()?)))
    }

    /// Creates a client over a custom transport.
    pub fn with_transport(transport: Arc<dyn HttpTransport>) -> Self {
        Self {
            transport,
            max_body_size: DEFAULT_MAX_BODY_SIZE,
        }
    }

    /// Sets the ceiling for buffered response bodies.
    pub fn max_body_size(mut self, limit: usize) -> Self {
        self.max_body_size = limit;
        self
    }

    /// Returns the body ceiling.
    pub fn body_limit(&self) -> usize {
        self.max_body_size
    }

    /// Sends the endpoint and decodes the whole body.
    ///
    /// Only `200 OK` counts as success; any other status fails with
    /// [`WebserviceError::HttpStatus`] without reading the body.
    #[instrument(skip(self, endpoint), fields(method = %endpoint.method(), url = %endpoint.url()))]
    pub async fn execute<T: Decodable>(&self, endpoint: Endpoint<T>) -> WebserviceResult<T> {
        let timeout = endpoint.timeout();
        let deadline = Instant::now() + timeout;

        let response = send_before(self.transport.as_ref(), to_request(&endpoint), deadline, timeout)
            .await?;

        let status = ensure_ok(&response)?;
        let body = read_body(response, self.max_body_size, deadline, timeout).await?;
        tracing::debug!(status, bytes = body.len(), "Response body read");

        T::decode(&body).map_err(WebserviceError::from)
    }

    /// Returns a lazy stream of events decoded from a `text/event-stream` body.
    ///
    /// The request is sent on the first poll. A non-OK status becomes the
    /// stream's only item. The deadline covers the whole stream.
    pub fn execute_streaming<T>(&self, endpoint: Endpoint<T>) -> EventStream<T>
    where
        T: Decodable + Send + 'static,
    {
        let transport = Arc::clone(&self.transport);
        let max_line = self.max_body_size;

        let stream: std::pin::Pin<Box<dyn futures::Stream<Item = WebserviceResult<T>> + Send>> =
            Box::pin(try_stream! {
                let timeout = endpoint.timeout();
                let deadline = Instant::now() + timeout;
                tracing::debug!(method = %endpoint.method(), url = %endpoint.url(), "Opening event stream");

                let response = send_before(transport.as_ref(), to_request(&endpoint), deadline, timeout)
                    .await?;
                ensure_ok(&response)?;

                let mut body = response.body;
                let mut decoder = EventDecoder::<T>::new().with_max_line(max_line);

                'read: loop {
                    while let Some(frame) = decoder.next_frame() {
                        match frame? {
                            Frame::Event(event) => {
                                tracing::trace!("Stream event decoded");
                                yield event;
                            }
                            Frame::Done => break 'read,
                        }
                    }

                    let chunk = timeout_at(deadline, body.next())
                        .await
                        .map_err(|_| TransportError::Timeout { timeout })?;

                    match chunk {
                        Some(chunk) => decoder.push(&chunk?),
                        None => {
                            decoder.finish();
                            break 'read;
                        }
                    }
                }
                tracing::debug!("Event stream completed");
            });

        EventStream::new(stream)
    }
}

impl std::fmt::Debug for Webservice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Webservice")
            .field("max_body_size", &self.max_body_size)
            .finish_non_exhaustive()
    }
}

fn to_request<T>(endpoint: &Endpoint<T>) -> HttpRequest {
    HttpRequest {
        method: endpoint.method().clone(),
        url: endpoint.url().clone(),
        headers: endpoint.headers().clone(),
        body: endpoint.body().cloned(),
        timeout: endpoint.timeout(),
    }
}

async fn send_before(
    transport: &dyn HttpTransport,
    request: HttpRequest,
    deadline: Instant,
    timeout: Duration,
) -> Result<HttpResponse, TransportError> {
    match timeout_at(deadline, transport.send(request)).await {
        Ok(result) => result,
        Err(_) => Err(TransportError::Timeout { timeout }),
    }
}

fn ensure_ok(response: &HttpResponse) -> WebserviceResult<u16> {
    if response.status == STATUS_OK {
        Ok(response.status)
    } else {
        tracing::debug!(status = response.status, "Non-OK status, discarding body");
        Err(WebserviceError::HttpStatus {
            status_code: response.status,
        })
    }
}

async fn read_body(
    response: HttpResponse,
    limit: usize,
    deadline: Instant,
    timeout: Duration,
) -> WebserviceResult<Bytes> {
    let declared = response
        .headers
        .get(http::header::CONTENT_LENGTH)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse::<usize>().ok());
    if declared.is_some_and(|len| len > limit) {
        return Err(DecodeError::Overflow { limit }.into());
    }

    let mut body: ByteStream = response.body;
    let mut buffer = BytesMut::with_capacity(declared.unwrap_or(0));

    loop {
        let next = timeout_at(deadline, body.next())
            .await
            .map_err(|_| TransportError::Timeout { timeout })?;

        match next {
            Some(chunk) => {
                let chunk = chunk?;
                if buffer.len() + chunk.len() > limit {
                    return Err(DecodeError::Overflow { limit }.into());
                }
                buffer.extend_from_slice(&chunk);
            }
            None => return Ok(buffer.freeze()),
        }
    }
}
