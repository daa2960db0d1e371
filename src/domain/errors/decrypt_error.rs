//! Attachment decryption error types.

use thiserror::Error;

/// Failures surfaced by the decryptor port.
#[derive(Debug, Clone, Error)]
pub enum DecryptError {
    /// Encryption metadata could not be parsed (bad base64, wrong lengths).
    #[error("malformed encryption metadata: {message}")]
    Format {
        /// Human-readable failure description.
        message: String,
    },

    /// Ciphertext hash did not match the expected digest.
    #[error("ciphertext integrity check failed")]
    IntegrityMismatch,
}

impl DecryptError {
    /// Creates a format error.
    #[must_use]
    pub fn format(message: impl Into<String>) -> Self {
        Self::Format {
            message: message.into(),
        }
    }
}
