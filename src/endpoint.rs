//! Typed description of a single HTTP call.

use bytes::Bytes;
use http::header::{HeaderMap, HeaderName, HeaderValue};
use http::Method;
use std::fmt;
use std::marker::PhantomData;
use std::str::FromStr;
use std::time::Duration;
use url::Url;

use crate::errors::{WebserviceError, WebserviceResult};

/// Default deadline for a call.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// Immutable description of one call whose response decodes as `T`.
///
/// Headers are case-insensitive; setting the same name twice keeps the last
/// value.
pub struct Endpoint<T> {
    url: Url,
    method: Method,
    headers: HeaderMap,
    body: Option<Bytes>,
    timeout: Duration,
    _output: PhantomData<fn() -> T>,
}

impl<T> Endpoint<T> {
    /// Starts building an endpoint for `url`.
    pub fn builder(url: Url) -> EndpointBuilder<T> {
        EndpointBuilder::new(url)
    }

    /// Target URL.
    pub fn url(&self) -> &Url {
        &self.url
    }

    /// HTTP method.
    pub fn method(&self) -> &Method {
        &self.method
    }

    /// Request headers.
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Request body, if any.
    pub fn body(&self) -> Option<&Bytes> {
        self.body.as_ref()
    }

    /// Deadline for the whole call.
    pub fn timeout(&self) -> Duration {
        self.timeout
    }
}

impl<T> Clone for Endpoint<T> {
    fn clone(&self) -> Self {
        Self {
            url: self.url.clone(),
            method: self.method.clone(),
            headers: self.headers.clone(),
            body: self.body.clone(),
            timeout: self.timeout,
            _output: PhantomData,
        }
    }
}

impl<T> fmt::Debug for Endpoint<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Endpoint")
            .field("url", &self.url.as_str())
            .field("method", &self.method)
            .field("headers", &self.headers.keys().collect::<Vec<_>>())
            .field("body_len", &self.body.as_ref().map(Bytes::len))
            .field("timeout", &self.timeout)
            .finish()
    }
}

/// Builder for [`Endpoint`].
pub struct EndpointBuilder<T> {
    url: Url,
    method: Method,
    headers: Vec<(String, String)>,
    body: Option<Bytes>,
    timeout: Duration,
    _output: PhantomData<fn() -> T>,
}

impl<T> EndpointBuilder<T> {
    /// Creates a builder defaulting to `GET` with the default deadline.
    pub fn new(url: Url) -> Self {
        Self {
            url,
            method: Method::GET,
            headers: Vec::new(),
            body: None,
            timeout: DEFAULT_TIMEOUT,
            _output: PhantomData,
        }
    }

    /// Sets the HTTP method.
    pub fn method(mut self, method: Method) -> Self {
        self.method = method;
        self
    }

    /// Sets a header. A later call with the same name (any case) wins.
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Sets the request body.
    pub fn body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = Some(body.into());
        self
    }

    /// Sets the deadline.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Validates the headers and builds the endpoint.
    pub fn build(self) -> WebserviceResult<Endpoint<T>> {
        if self.timeout.is_zero() {
            return Err(WebserviceError::validation_param(
                "Timeout must be greater than 0",
                "timeout",
            ));
        }

        let mut headers = HeaderMap::with_capacity(self.headers.len());
        for (name, value) in self.headers {
            let header_name = HeaderName::from_str(&name).map_err(|e| {
                WebserviceError::validation_param(
                    format!("Invalid header name '{}': {}", name, e),
                    "headers",
                )
            })?;
            let header_value = HeaderValue::from_str(&value).map_err(|e| {
                WebserviceError::validation_param(
                    format!("Invalid value for header '{}': {}", name, e),
                    "headers",
                )
            })?;
            headers.insert(header_name, header_value);
        }

        Ok(Endpoint {
            url: self.url,
            method: self.method,
            headers,
            body: self.body,
            timeout: self.timeout,
            _output: PhantomData,
        })
    }
}
