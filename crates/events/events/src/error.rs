//! Catalog error types.

use thiserror::Error;

/// Result type for catalog operations.
pub type EventResult<T> = Result<T, EventError>;

/// Error type for decoding and classifying event payloads.
#[derive(Debug, Error)]
pub enum EventError {
    /// A JSON document did not match the expected shape.
    #[error("Shape mismatch for {shape}: {message}")]
    ShapeMismatch {
        /// Name of the shape the document was checked against.
        shape: String,
        /// Decoder message.
        message: String,
    },

    /// Event serialization/deserialization error.
    #[error("Serialization error: {0}")]
    SerializationError(String),

    /// A base64 payload could not be decoded.
    #[error("Base64 decode error: {0}")]
    Base64(#[from] base64::DecodeError),

    /// A gzip payload could not be inflated or deflated.
    #[error("Compression error: {0}")]
    Compression(#[from] std::io::Error),

    /// The event source could not be determined from the payload.
    #[error("Unknown event source: {0}")]
    UnknownEventSource(String),

    /// A method ARN did not have the `arn:aws:execute-api:...` layout.
    #[error("Invalid method ARN: {0}")]
    InvalidMethodArn(String),

    /// Invalid input.
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl From<serde_json::Error> for EventError {
    fn from(err: serde_json::Error) -> Self {
        EventError::SerializationError(err.to_string())
    }
}
