//! Promotion server HTTP upload client.

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::Client;
use reqwest::multipart::{Form, Part};
use tracing::{info, warn};

use crate::domain::entities::PromotionSettings;
use crate::domain::errors::UploadError;
use crate::domain::ports::PromotionServerPort;

/// Multipart field name the promotion server expects.
const IMAGE_FIELD: &str = "image";

/// HTTP client posting validated images to the promotion server.
pub struct PromotionServerClient {
    client: Client,
    endpoint: String,
    api_token: String,
}

impl PromotionServerClient {
    /// Creates a client. The endpoint is normalized once: an address
    /// without an explicit scheme keeps working over plain `http://`
    /// (legacy convenience, logged as a warning).
    ///
    /// # Errors
    /// Returns an error if the HTTP client cannot be created.
    pub fn new(settings: &PromotionSettings) -> Result<Self, UploadError> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .build()
            .map_err(|e| UploadError::transport(format!("failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            endpoint: normalize_server_url(&settings.server_url),
            api_token: settings.api_token.clone(),
        })
    }
}

fn normalize_server_url(url: &str) -> String {
    if url.starts_with("http://") || url.starts_with("https://") {
        url.to_owned()
    } else {
        warn!(%url, "promotion server URL has no scheme, assuming plain http");
        format!("http://{url}")
    }
}

#[async_trait]
impl PromotionServerPort for PromotionServerClient {
    async fn upload(&self, filename: &str, bytes: Bytes) -> Result<(), UploadError> {
        let part = Part::bytes(bytes.to_vec())
            .file_name(filename.to_owned())
            .mime_str("application/octet-stream")
            .map_err(|e| UploadError::transport(format!("invalid multipart part: {e}")))?;
        let form = Form::new().part(IMAGE_FIELD, part);

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_token)
            .multipart(form)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    UploadError::transport("upload timed out")
                } else if e.is_connect() {
                    UploadError::transport("failed to connect to promotion server")
                } else {
                    UploadError::transport(e.to_string())
                }
            })?;

        let status = response.status();
        if status.is_success() {
            info!(server = %self.endpoint, status = status.as_u16(), "upload accepted");
            return Ok(());
        }

        let body: String = response
            .text()
            .await
            .unwrap_or_default()
            .chars()
            .take(200)
            .collect();
        Err(UploadError::Status {
            status: status.as_u16(),
            body,
        })
    }
}
