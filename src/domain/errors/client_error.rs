//! Room client error types.

use thiserror::Error;

/// Failures surfaced by the room client port.
#[derive(Debug, Clone, Error)]
pub enum ClientError {
    /// The requested event does not exist or is not visible.
    #[error("event not found: {event_id}")]
    NotFound {
        /// Identifier of the missing event.
        event_id: String,
    },

    /// Any transport-level failure (connection, timeout, bad status).
    #[error("transport error: {message}")]
    Transport {
        /// Human-readable failure description.
        message: String,
    },
}

impl ClientError {
    /// Creates a not-found error.
    #[must_use]
    pub fn not_found(event_id: impl Into<String>) -> Self {
        Self::NotFound {
            event_id: event_id.into(),
        }
    }

    /// Creates a transport error.
    #[must_use]
    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport {
            message: message.into(),
        }
    }

    /// Returns whether the error is a missing-event error.
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}
