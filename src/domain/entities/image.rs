//! Validated image value object.

use bytes::Bytes;

/// Display filename used when the target message has no usable body.
pub const DEFAULT_IMAGE_FILENAME: &str = "meme";

/// A downloaded, decrypted, and validated image.
///
/// Transient: exists only within one pipeline run.
#[derive(Debug, Clone)]
pub struct ResolvedImage {
    /// Raw image bytes.
    pub bytes: Bytes,
    /// Detected format tag (e.g. `PNG`, `JPEG`), upper-cased.
    pub format: String,
    /// Display filename forwarded to the promotion server.
    pub filename: String,
}
