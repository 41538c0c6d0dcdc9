//! Error types for API actions.

use crate::method::ParseMethodError;
use thiserror::Error;

/// Errors returned by an action creator before anything is dispatched.
///
/// Failures of the network call itself are not errors here: they settle as
/// the `failure` phase of the lifecycle.
#[derive(Error, Debug)]
pub enum ApiError {
    /// The body could not be serialized
    #[error("Failed to encode request body: {0}")]
    Encode(#[from] serde_json::Error),

    /// Multipart requests need an object body so each entry can become a field
    #[error("Multipart body must be a JSON object, got {0}")]
    MultipartBody(&'static str),

    /// The method string is not an HTTP verb
    #[error(transparent)]
    InvalidMethod(#[from] ParseMethodError),
}

/// Errors raised by an HTTP transport.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransportError {
    /// The request could not be built from the call envelope
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// The request was sent but no response arrived
    #[error("Request failed: {0}")]
    RequestFailed(String),

    /// The response body could not be read
    #[error("Failed to read response: {0}")]
    ResponseRead(String),
}
