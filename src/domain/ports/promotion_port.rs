//! Promotion server port definition.

use async_trait::async_trait;
use bytes::Bytes;

use crate::domain::errors::UploadError;

/// Port for delivering validated images to the external promotion server.
#[async_trait]
pub trait PromotionServerPort: Send + Sync {
    /// Uploads image bytes under a display filename. One attempt, no retry.
    async fn upload(&self, filename: &str, bytes: Bytes) -> Result<(), UploadError>;
}
