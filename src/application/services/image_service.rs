//! Image download, decryption, and validation.

use std::sync::Arc;

use bytes::Bytes;
use tracing::{error, warn};

use crate::domain::entities::{
    DEFAULT_IMAGE_FILENAME, InboundEvent, RejectReason, ResolvedImage,
};
use crate::domain::ports::{DecryptorPort, RoomClientPort};

/// Produces validated image bytes for a target message, or a specific
/// rejection.
pub struct ImageService {
    room_client: Arc<dyn RoomClientPort>,
    decryptor: Arc<dyn DecryptorPort>,
    max_bytes: u64,
    /// Allowed format tags, upper-cased once at construction.
    allowed_formats: Vec<String>,
}

impl ImageService {
    /// Creates a service with an eagerly normalized format allow-set.
    #[must_use]
    pub fn new(
        room_client: Arc<dyn RoomClientPort>,
        decryptor: Arc<dyn DecryptorPort>,
        max_bytes: u64,
        allowed_formats: &[String],
    ) -> Self {
        Self {
            room_client,
            decryptor,
            max_bytes,
            allowed_formats: allowed_formats.iter().map(|f| f.to_uppercase()).collect(),
        }
    }

    /// Downloads (and decrypts if needed) the target's image and validates
    /// it against the size and format policy.
    ///
    /// # Errors
    /// Returns the rejection reason for any download, decryption, size, or
    /// format failure.
    pub async fn resolve(&self, target: &InboundEvent) -> Result<ResolvedImage, RejectReason> {
        let filename = if target.body.trim().is_empty() {
            DEFAULT_IMAGE_FILENAME.to_owned()
        } else {
            target.body.clone()
        };

        let bytes = self.download(target, &filename).await?;
        self.validate(bytes, filename)
    }

    async fn download(
        &self,
        target: &InboundEvent,
        filename: &str,
    ) -> Result<Bytes, RejectReason> {
        if let Some(file) = &target.encrypted_file {
            if file.url.is_empty() {
                error!(%filename, "no media URL in encrypted file metadata");
                return Err(RejectReason::EncryptedImageUrlMissing);
            }
            let ciphertext = self.room_client.download_media(&file.url).await.map_err(
                |error| {
                    error!(%filename, url = %file.url, %error, "ciphertext download failed");
                    RejectReason::EncryptedImageDecryptFailed
                },
            )?;
            return self.decryptor.decrypt(&ciphertext, file).map_err(|error| {
                error!(%filename, %error, "attachment decryption failed");
                RejectReason::EncryptedImageDecryptFailed
            });
        }

        if let Some(url) = &target.media_url {
            return self.room_client.download_media(url).await.map_err(|error| {
                error!(%url, %error, "media download failed");
                RejectReason::ImageDownloadFailed
            });
        }

        error!(
            %filename,
            event_id = %target.event_id,
            "no media reference in target message"
        );
        Err(RejectReason::ImageMissing)
    }

    /// Size check runs before format sniffing, cheaper check first. The
    /// format is sniffed from the bytes only, never from the filename.
    fn validate(&self, bytes: Bytes, filename: String) -> Result<ResolvedImage, RejectReason> {
        if bytes.is_empty() {
            error!(%filename, "download produced no bytes");
            return Err(RejectReason::ImageDownloadFailed);
        }

        if bytes.len() as u64 > self.max_bytes {
            warn!(
                size = bytes.len(),
                max = self.max_bytes,
                "image size exceeded limit"
            );
            return Err(RejectReason::ImageSizeExceeded);
        }

        let format = match image::guess_format(&bytes) {
            Ok(format) => format_tag(format),
            Err(error) => {
                warn!(%filename, size = bytes.len(), %error, "could not determine image format");
                return Err(RejectReason::ImageFormatInvalid);
            }
        };

        if !self.allowed_formats.contains(&format) {
            warn!(
                %format,
                allowed = ?self.allowed_formats,
                %filename,
                "unsupported image format"
            );
            return Err(RejectReason::ImageFormatUnsupported);
        }

        Ok(ResolvedImage {
            bytes,
            format,
            filename,
        })
    }
}

/// Canonical upper-cased tag for a sniffed format (`PNG`, `JPEG`, ...).
fn format_tag(format: image::ImageFormat) -> String {
    format
        .to_mime_type()
        .trim_start_matches("image/")
        .to_uppercase()
}
