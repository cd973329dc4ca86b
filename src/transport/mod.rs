//! HTTP transport layer.
//!
//! [`HttpTransport`] is the seam to the network: it sends one request and
//! hands back the status plus an unread chunk stream. [`Webservice`] sits on
//! top of it and turns an [`Endpoint`](crate::Endpoint) into a decoded
//! payload or an [`EventStream`] of decoded events.

mod client;
mod http;
mod streaming;

pub use self::client::{Webservice, DEFAULT_MAX_BODY_SIZE};
pub use self::http::ReqwestTransport;
pub use self::streaming::{DecoderState, EventDecoder, EventStream, Frame, LineKind};

use ::http::{HeaderMap, Method};
use async_trait::async_trait;
use bytes::Bytes;
use futures::Stream;
use std::pin::Pin;
use std::time::Duration;
use url::Url;

use crate::errors::TransportError;

/// Response body as an ordered stream of raw chunks.
pub type ByteStream = Pin<Box<dyn Stream<Item = Result<Bytes, TransportError>> + Send>>;

/// HTTP request handed to a transport.
#[derive(Debug, Clone)]
pub struct HttpRequest {
    /// HTTP method.
    pub method: Method,
    /// Absolute URL.
    pub url: Url,
    /// Request headers.
    pub headers: HeaderMap,
    /// Request body.
    pub body: Option<Bytes>,
    /// Deadline for the call.
    pub timeout: Duration,
}

/// HTTP response with an unread body.
pub struct HttpResponse {
    /// HTTP status code.
    pub status: u16,
    /// Response headers.
    pub headers: HeaderMap,
    /// Body chunks in arrival order.
    pub body: ByteStream,
}

impl std::fmt::Debug for HttpResponse {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpResponse")
            .field("status", &self.status)
            .field("headers", &self.headers)
            .finish_non_exhaustive()
    }
}

/// HTTP transport trait.
#[async_trait]
pub trait HttpTransport: Send + Sync {
    /// Sends a request and returns once the status line and headers arrive.
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError>;
}
