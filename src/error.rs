//! Stability AI SDK error types

use serde_json::Value;
use thiserror::Error;

/// All possible errors from the Stability AI SDK
#[derive(Error, Debug)]
pub enum StabilityError {
    /// Invalid request (HTTP 400, or a parameter rejected before dispatch)
    #[error("Invalid request: {message}")]
    InvalidRequest { message: String, body: Value },

    /// Invalid or missing API key (HTTP 401)
    #[error("Unauthorized: {message}")]
    Unauthorized { message: String, body: Value },

    /// Request or output rejected by content moderation (HTTP 403)
    #[error("Content moderation: {message}")]
    ContentModeration { message: String, body: Value },

    /// Referenced record does not exist, e.g. an expired job id (HTTP 404)
    #[error("Record not found: {message}")]
    RecordNotFound { message: String, body: Value },

    /// Any other non-success status
    #[error("API error ({status}): {message}")]
    Unknown {
        status: u16,
        message: String,
        body: Value,
    },

    /// A 200-class response without any recognizable media field
    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    /// Transport-level failure, propagated unwrapped from the HTTP client
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Local filesystem failure while materializing inputs or outputs
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Client constructed with an empty API key
    #[error("API key must not be empty")]
    EmptyApiKey,
}

impl StabilityError {
    /// Classify a non-success HTTP status into an error record.
    ///
    /// Total over all statuses via the `Unknown` fallback. The message always
    /// embeds a best-effort serialization of the upstream body; serialization
    /// failure degrades to an empty segment rather than panicking.
    pub(crate) fn from_status(status: u16, message: &str, body: &Value) -> Self {
        let detail = serde_json::to_string(body).unwrap_or_default();
        let message = format!("{message}: {detail}");
        let body = body.clone();

        match status {
            400 => StabilityError::InvalidRequest { message, body },
            401 => StabilityError::Unauthorized { message, body },
            403 => StabilityError::ContentModeration { message, body },
            404 => StabilityError::RecordNotFound { message, body },
            _ => StabilityError::Unknown {
                status,
                message,
                body,
            },
        }
    }

    pub(crate) fn invalid_input(message: impl Into<String>) -> Self {
        StabilityError::InvalidRequest {
            message: message.into(),
            body: Value::Null,
        }
    }

    /// Returns the raw upstream payload if this error carries one
    pub fn body(&self) -> Option<&Value> {
        match self {
            StabilityError::InvalidRequest { body, .. }
            | StabilityError::Unauthorized { body, .. }
            | StabilityError::ContentModeration { body, .. }
            | StabilityError::RecordNotFound { body, .. }
            | StabilityError::Unknown { body, .. } => Some(body),
            _ => None,
        }
    }

    /// Returns the HTTP status this error was classified from, if any
    pub fn status(&self) -> Option<u16> {
        match self {
            StabilityError::Unknown { status, .. } => Some(*status),
            StabilityError::InvalidRequest { .. } => Some(400),
            StabilityError::Unauthorized { .. } => Some(401),
            StabilityError::ContentModeration { .. } => Some(403),
            StabilityError::RecordNotFound { .. } => Some(404),
            _ => None,
        }
    }
}

/// Result type for Stability AI operations
pub type Result<T> = std::result::Result<T, StabilityError>;
