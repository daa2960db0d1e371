//! Pipeline outcome and rejection reasons.

/// A named, user-facing rejection reason.
///
/// Every variant maps to exactly one configured message template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RejectReason {
    /// Command neither carries an image nor replies to one.
    MissingPromotionTarget,
    /// The replied-to event could not be fetched.
    MissingRepliedMessage,
    /// Encrypted media descriptor has no ciphertext URL.
    EncryptedImageUrlMissing,
    /// Ciphertext download or decryption failed.
    EncryptedImageDecryptFailed,
    /// Plain media download failed (or produced no bytes).
    ImageDownloadFailed,
    /// The target message carries no media reference at all.
    ImageMissing,
    /// Image exceeds the configured maximum size.
    ImageSizeExceeded,
    /// Format detected but not in the configured allow-set.
    ImageFormatUnsupported,
    /// No detectable image format in the bytes.
    ImageFormatInvalid,
    /// Upload to the promotion server failed.
    PromotionServerError,
    /// Global cooldown still active.
    GlobalCooldown {
        /// Whole seconds until the gate opens again.
        remaining_secs: u64,
    },
    /// Per-user cooldown still active.
    UserCooldown {
        /// Whole seconds until the gate opens again.
        remaining_secs: u64,
    },
}

impl RejectReason {
    /// Stable key identifying the reason, used for logging.
    #[must_use]
    pub const fn key(&self) -> &'static str {
        match self {
            Self::MissingPromotionTarget => "missing_promotion_target",
            Self::MissingRepliedMessage => "missing_replied_message",
            Self::EncryptedImageUrlMissing => "encrypted_image_url_missing",
            Self::EncryptedImageDecryptFailed => "encrypted_image_decrypt_failed",
            Self::ImageDownloadFailed => "image_download_failed",
            Self::ImageMissing => "image_missing",
            Self::ImageSizeExceeded => "image_size_exceeded",
            Self::ImageFormatUnsupported => "image_format_unsupported",
            Self::ImageFormatInvalid => "image_format_invalid",
            Self::PromotionServerError => "promotion_server_error",
            Self::GlobalCooldown { .. } => "global_cooldown_message",
            Self::UserCooldown { .. } => "user_cooldown_message",
        }
    }
}

/// Terminal result of one pipeline run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PipelineOutcome {
    /// Event was not relevant; no side effect.
    Ignored,
    /// A named failure; the matching template was sent to the room.
    Rejected(RejectReason),
    /// Image uploaded, reaction posted, cooldowns updated.
    Promoted,
}

impl PipelineOutcome {
    /// Whether the run ended in a successful promotion.
    #[must_use]
    pub const fn is_promoted(&self) -> bool {
        matches!(self, Self::Promoted)
    }
}
