//! Error types for the Manuals client

use thiserror::Error;

/// Boxed transport error kept as the source of a [`ManualsError::Request`].
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Core error type for Manuals API operations
#[derive(Error, Debug)]
pub enum ManualsError {
    /// Request construction or transport failure (DNS, refused connection, timeout)
    #[error("request failed: {0}")]
    Request(#[source] BoxError),

    /// Non-2xx response from the service
    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    /// Response body did not match the expected JSON shape
    #[error("failed to decode response: {0}")]
    Decode(#[from] serde_json::Error),

    /// Local precondition failure, caught before any network call
    #[error("{0}")]
    Validation(String),

    /// Download destination could not be created or written
    #[error("filesystem error: {0}")]
    Filesystem(#[from] std::io::Error),
}

impl ManualsError {
    /// Wrap a transport-level error.
    pub fn request<E>(err: E) -> Self
    where
        E: Into<BoxError>,
    {
        ManualsError::Request(err.into())
    }

    /// Create a validation error from a message.
    pub fn validation(message: impl Into<String>) -> Self {
        ManualsError::Validation(message.into())
    }

    /// HTTP status code for API errors, `None` for every other variant.
    pub fn status(&self) -> Option<u16> {
        match self {
            ManualsError::Api { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Result type alias for Manuals operations
pub type Result<T> = std::result::Result<T, ManualsError>;
