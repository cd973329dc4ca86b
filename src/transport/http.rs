//! HTTP transport implementation.

use async_trait::async_trait;
use futures::StreamExt;
use reqwest::{redirect, Client, ClientBuilder};
use std::time::Duration;
use tracing::instrument;

use super::{ByteStream, HttpRequest, HttpResponse, HttpTransport};
use crate::errors::TransportError;

/// HTTP transport implementation using reqwest.
///
/// The underlying client pools connections; clone the transport (or share it
/// behind an `Arc`) instead of building a new one per call.
#[derive(Clone)]
pub struct ReqwestTransport {
    client: Client,
}

impl ReqwestTransport {
    /// Creates a transport with default client settings.
    pub fn new() -> Result<Self, TransportError> {
        Self::with_user_agent(concat!("chatgpt-webservice/", env!("CARGO_PKG_VERSION")))
    }

    /// Creates a transport that sends the given `User-Agent`.
    ///
    /// Redirects are not followed; a 3xx reaches the caller as a status
    /// failure.
    pub fn with_user_agent(user_agent: &str) -> Result<Self, TransportError> {
        let client = ClientBuilder::new()
            .user_agent(user_agent)
            .redirect(redirect::Policy::none())
            .tcp_keepalive(Duration::from_secs(60))
            .build()
            .map_err(|e| TransportError::Connection {
                message: format!("Failed to build HTTP client: {}", e),
            })?;

        Ok(Self { client })
    }

    /// Wraps an existing reqwest client.
    ///
    /// The client's redirect policy is used as is.
    pub fn from_client(client: Client) -> Self {
        Self { client }
    }

    fn map_error(err: reqwest::Error, timeout: Duration) -> TransportError {
        match TransportError::from(err) {
            TransportError::Timeout { .. } => TransportError::Timeout { timeout },
            other => other,
        }
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    #[instrument(skip(self, request), fields(method = %request.method, url = %request.url))]
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        let timeout = request.timeout;

        let mut req_builder = self
            .client
            .request(request.method, request.url)
            .headers(request.headers)
            .timeout(timeout);

        if let Some(body) = request.body {
            req_builder = req_builder.body(body);
        }

        let response = req_builder
            .send()
            .await
            .map_err(|e| Self::map_error(e, timeout))?;

        let status = response.status().as_u16();
        let headers = response.headers().clone();
        tracing::debug!(status, "Response headers received");

        let body: ByteStream = Box::pin(
            response
                .bytes_stream()
                .map(move |chunk| chunk.map_err(|e| Self::map_error(e, timeout))),
        );

        Ok(HttpResponse {
            status,
            headers,
            body,
        })
    }
}

impl std::fmt::Debug for ReqwestTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReqwestTransport").finish_non_exhaustive()
    }
}
