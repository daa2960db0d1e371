//! Decryptor port definition.

use bytes::Bytes;

use crate::domain::entities::EncryptedFileInfo;
use crate::domain::errors::DecryptError;

/// Port for decrypting end-to-end encrypted media attachments.
///
/// Decryption is CPU-bound and synchronous; implementations must be
/// thread-safe.
pub trait DecryptorPort: Send + Sync {
    /// Decrypts ciphertext using the descriptor's key, IV, and expected
    /// content hash.
    fn decrypt(
        &self,
        ciphertext: &[u8],
        file: &EncryptedFileInfo,
    ) -> Result<Bytes, DecryptError>;
}

#[cfg(test)]
pub mod mock {
    use super::*;

    /// Mock decryptor for testing.
    pub struct MockDecryptor {
        succeed: bool,
    }

    impl MockDecryptor {
        /// Creates a mock that echoes the ciphertext back as plaintext.
        pub const fn passthrough() -> Self {
            Self { succeed: true }
        }

        /// Creates a mock that fails every decryption.
        pub const fn failing() -> Self {
            Self { succeed: false }
        }
    }

    impl DecryptorPort for MockDecryptor {
        fn decrypt(
            &self,
            ciphertext: &[u8],
            _file: &EncryptedFileInfo,
        ) -> Result<Bytes, DecryptError> {
            if self.succeed {
                Ok(Bytes::copy_from_slice(ciphertext))
            } else {
                Err(DecryptError::IntegrityMismatch)
            }
        }
    }
}
