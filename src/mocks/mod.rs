//! Mock implementations for testing.
//!
//! [`MockTransport`] replays scripted responses chunk by chunk and records
//! every request, so decoding, status and deadline handling can be tested
//! without a network.

use async_trait::async_trait;
use bytes::Bytes;
use futures::StreamExt;
use http::header::{HeaderName, HeaderValue, CONTENT_LENGTH, CONTENT_TYPE};
use http::HeaderMap;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use crate::errors::TransportError;
use crate::transport::{ByteStream, HttpRequest, HttpResponse, HttpTransport};

/// A scripted response.
#[derive(Debug, Clone)]
pub struct MockResponse {
    /// HTTP status code.
    pub status: u16,
    /// Response headers.
    pub headers: HeaderMap,
    /// Body chunks, delivered one per read.
    pub chunks: Vec<Bytes>,
    /// Delay before the headers are returned.
    pub delay: Option<Duration>,
    /// Keep the body open after the last chunk instead of ending it.
    pub hang: bool,
}

impl MockResponse {
    /// Creates a response with the given status and no body.
    pub fn status(status: u16) -> Self {
        Self {
            status,
            headers: HeaderMap::new(),
            chunks: Vec::new(),
            delay: None,
            hang: false,
        }
    }

    /// Creates a successful JSON response delivered as one chunk.
    pub fn json<T: serde::Serialize>(value: &T) -> Self {
        let body = serde_json::to_vec(value).unwrap_or_default();
        Self::status(200)
            .with_header(CONTENT_TYPE, "application/json")
            .with_header(CONTENT_LENGTH, &body.len().to_string())
            .with_chunks([body])
    }

    /// Creates a successful event-stream response with the given chunks.
    pub fn sse<I, B>(chunks: I) -> Self
    where
        I: IntoIterator<Item = B>,
        B: Into<Bytes>,
    {
        Self::status(200)
            .with_header(CONTENT_TYPE, "text/event-stream")
            .with_chunks(chunks)
    }

    /// Creates an error response carrying an OpenAI-style error body.
    pub fn error(status: u16, message: &str) -> Self {
        let body = serde_json::json!({
            "error": {
                "message": message,
                "type": "invalid_request_error"
            }
        });
        Self::status(status)
            .with_header(CONTENT_TYPE, "application/json")
            .with_chunks([body.to_string()])
    }

    /// Overrides the status code.
    pub fn with_status(mut self, status: u16) -> Self {
        self.status = status;
        self
    }

    /// Replaces the body chunks.
    pub fn with_chunks<I, B>(mut self, chunks: I) -> Self
    where
        I: IntoIterator<Item = B>,
        B: Into<Bytes>,
    {
        self.chunks = chunks.into_iter().map(Into::into).collect();
        self
    }

    /// Adds a header.
    pub fn with_header(mut self, name: HeaderName, value: &str) -> Self {
        if let Ok(value) = HeaderValue::from_str(value) {
            self.headers.insert(name, value);
        }
        self
    }

    /// Delays the headers.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Leaves the body open after the last chunk.
    pub fn hanging(mut self) -> Self {
        self.hang = true;
        self
    }
}

/// Mock HTTP transport for testing.
#[derive(Default)]
pub struct MockTransport {
    responses: Mutex<VecDeque<MockResponse>>,
    requests: Mutex<Vec<HttpRequest>>,
    chunks_read: Arc<AtomicUsize>,
}

impl MockTransport {
    /// Creates a mock transport with no scripted responses.
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues a response; responses are served in queue order.
    pub fn queue(&self, response: MockResponse) {
        lock(&self.responses).push_back(response);
    }

    /// Gets all recorded requests.
    pub fn requests(&self) -> Vec<HttpRequest> {
        lock(&self.requests).clone()
    }

    /// Gets the last recorded request.
    pub fn last_request(&self) -> Option<HttpRequest> {
        lock(&self.requests).last().cloned()
    }

    /// Returns the number of requests made.
    pub fn request_count(&self) -> usize {
        lock(&self.requests).len()
    }

    /// Returns how many body chunks have been handed out so far.
    pub fn chunks_read(&self) -> usize {
        self.chunks_read.load(Ordering::SeqCst)
    }

    fn next_response(&self) -> MockResponse {
        lock(&self.responses)
            .pop_front()
            .unwrap_or_else(|| MockResponse::error(500, "No mock response configured"))
    }
}

#[async_trait]
impl HttpTransport for MockTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        lock(&self.requests).push(request);
        let response = self.next_response();

        if let Some(delay) = response.delay {
            tokio::time::sleep(delay).await;
        }

        let counter = Arc::clone(&self.chunks_read);
        let chunks = futures::stream::iter(response.chunks).map(move |chunk| {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok::<_, TransportError>(chunk)
        });

        let body: ByteStream = if response.hang {
            Box::pin(chunks.chain(futures::stream::pending()))
        } else {
            Box::pin(chunks)
        };

        Ok(HttpResponse {
            status: response.status,
            headers: response.headers,
            body,
        })
    }
}

impl std::fmt::Debug for MockTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MockTransport")
            .field("request_count", &self.request_count())
            .field("chunks_read", &self.chunks_read())
            .finish()
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::Method;
    use url::Url;

    fn request() -> HttpRequest {
        HttpRequest {
            method: Method::GET,
            url: Url::parse("http://mock.local/resource").unwrap(),
            headers: HeaderMap::new(),
            body: None,
            timeout: Duration::from_secs(1),
        }
    }

    #[tokio::test]
    async fn test_responses_served_in_order() {
        let transport = MockTransport::new();
        transport.queue(MockResponse::status(201));
        transport.queue(MockResponse::status(404));

        assert_eq!(transport.send(request()).await.unwrap().status, 201);
        assert_eq!(transport.send(request()).await.unwrap().status, 404);
        assert_eq!(transport.send(request()).await.unwrap().status, 500);
        assert_eq!(transport.request_count(), 3);
    }

    #[tokio::test]
    async fn test_chunks_counted_only_when_read() {
        let transport = MockTransport::new();
        transport.queue(MockResponse::sse(["a", "b", "c"]));

        let mut response = transport.send(request()).await.unwrap();
        assert_eq!(transport.chunks_read(), 0);

        let first = response.body.next().await.unwrap().unwrap();
        assert_eq!(first, Bytes::from_static(b"a"));
        assert_eq!(transport.chunks_read(), 1);
    }
}
