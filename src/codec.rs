//! Codec contracts for request and response payloads.
//!
//! A payload that travels as JSON opts in with [`JsonPayload`]; the blanket
//! impls below then give it [`Encodable`] and/or [`Decodable`] depending on
//! which serde traits it derives. Raw bodies decode as [`Bytes`].

use bytes::Bytes;
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::errors::{DecodeError, EncodeError};

/// A type that can be built from a response body.
pub trait Decodable: Sized {
    /// Decodes a complete document.
    fn decode(bytes: &[u8]) -> Result<Self, DecodeError>;
}

/// A type that can be written as a request body.
pub trait Encodable {
    /// Encodes `self` into bytes.
    fn encode(&self) -> Result<Vec<u8>, EncodeError>;
}

/// Marker for payloads carried as JSON documents.
pub trait JsonPayload {}

impl<T> Decodable for T
where
    T: JsonPayload + DeserializeOwned,
{
    fn decode(bytes: &[u8]) -> Result<Self, DecodeError> {
        serde_json::from_slice(bytes).map_err(DecodeError::from)
    }
}

impl<T> Encodable for T
where
    T: JsonPayload + Serialize,
{
    fn encode(&self) -> Result<Vec<u8>, EncodeError> {
        serde_json::to_vec(self).map_err(EncodeError::from)
    }
}

impl Decodable for Bytes {
    fn decode(bytes: &[u8]) -> Result<Self, DecodeError> {
        Ok(Bytes::copy_from_slice(bytes))
    }
}

impl JsonPayload for serde_json::Value {}
