//! Promotion upload error types.

use thiserror::Error;

/// Failures surfaced by the promotion server port.
#[derive(Debug, Clone, Error)]
pub enum UploadError {
    /// The server answered with a non-success status.
    #[error("promotion server returned {status}: {body}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Response body snippet for diagnostics.
        body: String,
    },

    /// Transport-level failure before a status was received.
    #[error("transport error during upload: {message}")]
    Transport {
        /// Human-readable failure description.
        message: String,
    },
}

impl UploadError {
    /// Creates a transport error.
    #[must_use]
    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport {
            message: message.into(),
        }
    }
}
