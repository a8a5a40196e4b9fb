//! Error types for the todo API client.
//!
//! `NotFound` and `Validation` get dedicated variants because callers react
//! to them differently (drop the item, show the message next to the input).
//! Any other failure lands in `HttpError` with whatever the error envelope
//! said.

/// Errors returned by `TodoClient` build and parse methods.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// The server returned 404: the requested todo does not exist.
    #[error("not found: {message}")]
    NotFound { message: String },

    /// The server rejected the input (400 or 422).
    #[error("{code}: {message}")]
    Validation { code: String, message: String },

    /// Any other unexpected status, or an error envelope on a 2xx status.
    #[error("HTTP {status} {code}: {message}")]
    HttpError {
        status: u16,
        code: String,
        message: String,
    },

    /// The response body could not be deserialized into the expected type.
    #[error("deserialization failed: {0}")]
    DeserializationError(String),

    /// The request payload could not be serialized to JSON.
    #[error("serialization failed: {0}")]
    SerializationError(String),
}
