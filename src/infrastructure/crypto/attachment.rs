//! Encrypted media attachment decryption.
//!
//! Matrix encrypts media with AES-256-CTR; the event carries the key as an
//! unpadded URL-safe base64 JWK, the IV and the ciphertext SHA-256 as
//! unpadded base64. The hash is verified before decryption.

use aes::Aes256;
use base64::Engine;
use base64::engine::general_purpose::{STANDARD_NO_PAD, URL_SAFE_NO_PAD};
use bytes::Bytes;
use ctr::Ctr128BE;
use ctr::cipher::{KeyIvInit, StreamCipher};
use sha2::{Digest, Sha256};

use crate::domain::entities::EncryptedFileInfo;
use crate::domain::errors::DecryptError;
use crate::domain::ports::DecryptorPort;

type Aes256Ctr = Ctr128BE<Aes256>;

/// Decryptor for end-to-end encrypted media attachments.
#[derive(Debug, Default, Clone, Copy)]
pub struct AttachmentDecryptor;

impl AttachmentDecryptor {
    /// Creates a decryptor.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

/// Decodes unpadded base64, tolerating padding some senders include.
fn decode_unpadded(engine: &impl Engine, value: &str, field: &str) -> Result<Vec<u8>, DecryptError> {
    engine
        .decode(value.trim_end_matches('='))
        .map_err(|e| DecryptError::format(format!("invalid base64 in {field}: {e}")))
}

impl DecryptorPort for AttachmentDecryptor {
    fn decrypt(
        &self,
        ciphertext: &[u8],
        file: &EncryptedFileInfo,
    ) -> Result<Bytes, DecryptError> {
        let key = decode_unpadded(&URL_SAFE_NO_PAD, &file.key, "key")?;
        let key: [u8; 32] = key
            .try_into()
            .map_err(|_| DecryptError::format("key is not 32 bytes"))?;

        let iv = decode_unpadded(&STANDARD_NO_PAD, &file.iv, "iv")?;
        let iv: [u8; 16] = iv
            .try_into()
            .map_err(|_| DecryptError::format("iv is not 16 bytes"))?;

        let expected_hash = decode_unpadded(&STANDARD_NO_PAD, &file.sha256, "hash")?;
        let actual_hash = Sha256::digest(ciphertext);
        if actual_hash.as_slice() != expected_hash.as_slice() {
            return Err(DecryptError::IntegrityMismatch);
        }

        let mut plaintext = ciphertext.to_vec();
        let mut cipher = Aes256Ctr::new(&key.into(), &iv.into());
        cipher.apply_keystream(&mut plaintext);

        Ok(Bytes::from(plaintext))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Builds a descriptor by encrypting `plaintext` with the given key/iv.
    /// CTR mode is symmetric, so encryption reuses `apply_keystream`.
    fn encrypt(plaintext: &[u8], key: [u8; 32], iv: [u8; 16]) -> (Vec<u8>, EncryptedFileInfo) {
        let mut ciphertext = plaintext.to_vec();
        let mut cipher = Aes256Ctr::new(&key.into(), &iv.into());
        cipher.apply_keystream(&mut ciphertext);

        let file = EncryptedFileInfo {
            url: "mxc://hs/media".to_owned(),
            key: URL_SAFE_NO_PAD.encode(key),
            iv: STANDARD_NO_PAD.encode(iv),
            sha256: STANDARD_NO_PAD.encode(Sha256::digest(&ciphertext)),
        };
        (ciphertext, file)
    }

    #[test]
    fn decrypts_valid_attachment() {
        let (ciphertext, file) = encrypt(b"a small image", [7u8; 32], [3u8; 16]);

        let plaintext = AttachmentDecryptor::new().decrypt(&ciphertext, &file).unwrap();
        assert_eq!(&plaintext[..], b"a small image");
    }

    #[test]
    fn tampered_ciphertext_fails_integrity_check() {
        let (mut ciphertext, file) = encrypt(b"a small image", [7u8; 32], [3u8; 16]);
        ciphertext[0] ^= 0xff;

        let err = AttachmentDecryptor::new().decrypt(&ciphertext, &file).unwrap_err();
        assert!(matches!(err, DecryptError::IntegrityMismatch));
    }

    #[test]
    fn malformed_key_is_a_format_error() {
        let (ciphertext, mut file) = encrypt(b"x", [7u8; 32], [3u8; 16]);
        file.key = "???not-base64???".to_owned();

        let err = AttachmentDecryptor::new().decrypt(&ciphertext, &file).unwrap_err();
        assert!(matches!(err, DecryptError::Format { .. }));
    }

    #[test]
    fn short_key_is_a_format_error() {
        let (ciphertext, mut file) = encrypt(b"x", [7u8; 32], [3u8; 16]);
        file.key = URL_SAFE_NO_PAD.encode([1u8; 16]);

        let err = AttachmentDecryptor::new().decrypt(&ciphertext, &file).unwrap_err();
        assert!(matches!(err, DecryptError::Format { .. }));
    }

    #[test]
    fn padded_base64_is_tolerated() {
        let (ciphertext, mut file) = encrypt(b"padded input", [9u8; 32], [1u8; 16]);
        file.iv.push('=');

        let plaintext = AttachmentDecryptor::new().decrypt(&ciphertext, &file).unwrap();
        assert_eq!(&plaintext[..], b"padded input");
    }
}
