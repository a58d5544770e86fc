//! Error types for handler invocation.
//!
//! [`HandlerError`] is the value a handler reports to its caller, encoded in
//! the platform's `{ errorType, errorMessage }` form. [`InvokeError`] covers
//! failures of the local invoker itself.

use lambda_types_events::EventError;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type for invoker operations.
pub type InvokeResult<T> = Result<T, InvokeError>;

/// The error a handler completes with.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[error("{error_type}: {error_message}")]
pub struct HandlerError {
    pub error_type: String,
    pub error_message: String,
}

impl HandlerError {
    /// Creates an error with an explicit type.
    pub fn new(error_type: impl Into<String>, error_message: impl Into<String>) -> Self {
        Self {
            error_type: error_type.into(),
            error_message: error_message.into(),
        }
    }

    /// Creates an `Error`-typed error from a message.
    pub fn message(error_message: impl Into<String>) -> Self {
        Self::new("Error", error_message)
    }

    /// Wraps any error, using its type name as `errorType`.
    pub fn from_error<E: std::error::Error>(err: &E) -> Self {
        let full = std::any::type_name::<E>();
        let error_type = full.rsplit("::").next().unwrap_or(full);
        Self::new(error_type, err.to_string())
    }
}

impl From<&str> for HandlerError {
    fn from(message: &str) -> Self {
        Self::message(message)
    }
}

impl From<String> for HandlerError {
    fn from(message: String) -> Self {
        Self::message(message)
    }
}

impl From<EventError> for HandlerError {
    fn from(err: EventError) -> Self {
        Self::from_error(&err)
    }
}

impl From<serde_json::Error> for HandlerError {
    fn from(err: serde_json::Error) -> Self {
        Self::from_error(&err)
    }
}

/// Failures of the local invoker.
#[derive(Debug, Error)]
pub enum InvokeError {
    /// The JSON event did not decode into the handler's event type.
    #[error("Event decode error: {0}")]
    EventDecode(String),

    /// The handler's result could not be encoded as JSON.
    #[error("Result encode error: {0}")]
    ResultEncode(String),

    /// A middleware refused to run the invocation.
    #[error("Invocation rejected by middleware '{middleware}': {reason}")]
    Rejected { middleware: String, reason: String },

    /// Neither completion path finished before the context deadline.
    #[error("Invocation {request_id} timed out after {timeout_ms} ms")]
    Timeout { request_id: String, timeout_ms: u64 },

    /// Catalog error.
    #[error(transparent)]
    Event(#[from] EventError),
}

impl InvokeError {
    /// Creates a middleware rejection.
    pub fn rejected(middleware: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Rejected {
            middleware: middleware.into(),
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_wire_form() {
        let err = HandlerError::new("ValidationError", "name is required");
        assert_eq!(
            serde_json::to_value(&err).unwrap(),
            json!({ "errorType": "ValidationError", "errorMessage": "name is required" })
        );
        assert_eq!(err.to_string(), "ValidationError: name is required");
    }

    #[test]
    fn test_from_error_uses_type_name() {
        let err = HandlerError::from(EventError::InvalidInput("bad".to_string()));
        assert_eq!(err.error_type, "EventError");
        assert_eq!(err.error_message, "Invalid input: bad");

        let err: HandlerError = "plain".into();
        assert_eq!(err.error_type, "Error");
    }
}
