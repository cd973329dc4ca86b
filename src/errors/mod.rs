//! Error types for the webservice client.
//!
//! Every failure a call can produce surfaces as a [`WebserviceError`]. The
//! transport never retries; callers decide what to do with each category.

use std::time::Duration;
use thiserror::Error;

/// Result type alias for webservice operations.
pub type WebserviceResult<T> = Result<T, WebserviceError>;

/// Top-level error for every call made through the client.
#[derive(Debug, Error)]
pub enum WebserviceError {
    /// Input rejected before anything reached the network
    /// (empty credential, malformed base address, bad header).
    #[error("Validation error: {message}")]
    Validation {
        /// What was wrong.
        message: String,
        /// The offending parameter, when known.
        param: Option<String>,
    },

    /// The request could not be completed at the transport level.
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// The server answered with a status other than 200 OK.
    #[error("Unexpected HTTP status: {status_code}")]
    HttpStatus {
        /// The status code received.
        status_code: u16,
    },

    /// A response body or streamed event could not be decoded.
    #[error(transparent)]
    Decode(#[from] DecodeError),

    /// A request payload could not be encoded.
    #[error(transparent)]
    Encode(#[from] EncodeError),
}

impl WebserviceError {
    /// Creates a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        WebserviceError::Validation {
            message: message.into(),
            param: None,
        }
    }

    /// Creates a validation error naming the offending parameter.
    pub fn validation_param(message: impl Into<String>, param: impl Into<String>) -> Self {
        WebserviceError::Validation {
            message: message.into(),
            param: Some(param.into()),
        }
    }

    /// Returns true if the call ran past its deadline.
    pub fn is_timeout(&self) -> bool {
        matches!(self, WebserviceError::Transport(TransportError::Timeout { .. }))
    }

    /// Returns the HTTP status code for status failures.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            WebserviceError::HttpStatus { status_code } => Some(*status_code),
            _ => None,
        }
    }
}

/// Transport-level failures.
#[derive(Debug, Clone, Error)]
pub enum TransportError {
    /// The call's deadline elapsed while sending or reading.
    #[error("Timeout after {timeout:?}")]
    Timeout {
        /// The deadline the call carried.
        timeout: Duration,
    },

    /// The connection could not be established (DNS, refused, TLS handshake).
    #[error("Connection error: {message}")]
    Connection {
        /// Underlying cause.
        message: String,
    },

    /// Any other failure while sending the request or reading the body.
    #[error("Request error: {message}")]
    Request {
        /// Underlying cause.
        message: String,
    },
}

impl From<reqwest::Error> for TransportError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            // reqwest does not report the configured duration
            TransportError::Timeout {
                timeout: Duration::ZERO,
            }
        } else if err.is_connect() {
            TransportError::Connection {
                message: err.to_string(),
            }
        } else {
            TransportError::Request {
                message: err.to_string(),
            }
        }
    }
}

/// Failures turning bytes into a payload.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    /// The bytes were not a valid JSON document for the target type.
    #[error("Invalid JSON at line {line}, column {column}: {message}")]
    Json {
        /// Parser message, including the field name when serde reports one.
        message: String,
        /// 1-based line of the failure.
        line: usize,
        /// 1-based column of the failure.
        column: usize,
    },

    /// The body grew past the configured ceiling.
    #[error("Response body exceeds {limit} bytes")]
    Overflow {
        /// The ceiling in bytes.
        limit: usize,
    },

    /// A streamed line was not valid UTF-8.
    #[error("Invalid UTF-8 at byte {offset}")]
    InvalidUtf8 {
        /// Offset of the first invalid byte within the line.
        offset: usize,
    },
}

impl From<serde_json::Error> for DecodeError {
    fn from(err: serde_json::Error) -> Self {
        DecodeError::Json {
            message: err.to_string(),
            line: err.line(),
            column: err.column(),
        }
    }
}

/// Failure turning a payload into bytes.
#[derive(Debug, Clone, Error)]
#[error("Failed to encode payload: {message}")]
pub struct EncodeError {
    /// Serializer message.
    pub message: String,
}

impl From<serde_json::Error> for EncodeError {
    fn from(err: serde_json::Error) -> Self {
        EncodeError {
            message: err.to_string(),
        }
    }
}

impl From<url::ParseError> for WebserviceError {
    fn from(err: url::ParseError) -> Self {
        WebserviceError::validation_param(format!("Invalid URL: {}", err), "base_url")
    }
}
