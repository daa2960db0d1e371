//! Typed, validated bot configuration.
//!
//! The settings value object is deserialized from TOML by the
//! infrastructure layer and checked once at startup via
//! [`Settings::validate`]; the pipeline treats it as read-only for the
//! process lifetime.

use serde::Deserialize;

use super::outcome::RejectReason;

/// Root configuration value object.
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    /// Whether the bot joins rooms it is invited to.
    #[serde(default)]
    pub auto_join: bool,
    /// Command prefixes that trigger a promotion (case-insensitive).
    pub commands: Vec<String>,
    /// Cooldown durations.
    pub cooldowns: CooldownSettings,
    /// Promotion server connection.
    pub promotion: PromotionSettings,
    /// Image acceptance policy.
    pub image: ImagePolicy,
    /// User-facing message templates.
    pub messages: Messages,
    /// Homeserver connection used by the protocol adapter.
    pub homeserver: HomeserverSettings,
}

/// Cooldown durations in seconds. Zero disables the respective gate.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct CooldownSettings {
    /// Seconds between any two promotions, room-wide.
    pub global: u64,
    /// Seconds between two promotions by the same user.
    pub user: u64,
}

/// Promotion server connection settings.
#[derive(Debug, Clone, Deserialize)]
pub struct PromotionSettings {
    /// Upload endpoint. A missing scheme is upgraded to `http://`.
    pub server_url: String,
    /// Bearer token sent with every upload.
    pub api_token: String,
}

/// Image acceptance policy.
#[derive(Debug, Clone, Deserialize)]
pub struct ImagePolicy {
    /// Maximum accepted image size in bytes.
    pub maximum_file_size_bytes: u64,
    /// Accepted format tags (case-insensitive, e.g. `PNG`, `JPEG`).
    pub allowed_image_formats: Vec<String>,
}

/// Homeserver connection settings for the protocol adapter.
#[derive(Debug, Clone, Deserialize)]
pub struct HomeserverSettings {
    /// Base URL of the homeserver, e.g. `https://matrix.example.org`.
    pub url: String,
    /// Access token of the bot account.
    pub access_token: String,
    /// Full user id of the bot account, e.g. `@promobot:example.org`.
    pub user_id: String,
}

/// Templates for the three shapes of remaining-time display.
#[derive(Debug, Clone, Deserialize)]
pub struct TimeDisplayFormats {
    /// Used when no whole minute remains; interpolates `{seconds}`.
    pub seconds_only_format: String,
    /// Used when no leftover second remains; interpolates `{minutes}`.
    pub minutes_only_format: String,
    /// Used when both are nonzero; interpolates `{minutes}` and `{seconds}`.
    pub minutes_and_seconds_format: String,
}

impl TimeDisplayFormats {
    /// Renders a remaining wait time.
    ///
    /// The seconds are split into whole minutes and leftover seconds;
    /// exactly one of the three templates applies per call.
    #[must_use]
    pub fn render(&self, remaining_secs: u64) -> String {
        let minutes = remaining_secs / 60;
        let seconds = remaining_secs % 60;
        match (minutes, seconds) {
            (0, s) => self.seconds_only_format.replace("{seconds}", &s.to_string()),
            (m, 0) => self.minutes_only_format.replace("{minutes}", &m.to_string()),
            (m, s) => self
                .minutes_and_seconds_format
                .replace("{minutes}", &m.to_string())
                .replace("{seconds}", &s.to_string()),
        }
    }
}

/// Easter-egg message pool sent occasionally after a successful promotion.
#[derive(Debug, Clone, Deserialize)]
pub struct EasterEggSettings {
    /// Probability in `[0.0, 1.0]` of sending a rare message.
    pub rare_message_probability: f64,
    /// Pool of rare messages, chosen uniformly.
    pub rare_messages: Vec<String>,
}

/// User-facing message templates keyed by rejection reason.
#[derive(Debug, Clone, Deserialize)]
#[allow(missing_docs)]
pub struct Messages {
    /// Whether replies are posted into a thread on the triggering event.
    #[serde(default)]
    pub reply_in_thread: bool,
    pub missing_promotion_target: String,
    pub missing_replied_message: String,
    pub encrypted_image_url_missing: String,
    pub encrypted_image_decrypt_failed: String,
    pub image_download_failed: String,
    pub image_missing: String,
    pub image_size_exceeded: String,
    pub image_format_unsupported: String,
    pub image_format_invalid: String,
    pub promotion_server_error: String,
    /// Interpolates `{time}` with the rendered remaining wait.
    pub global_cooldown_message: String,
    /// Interpolates `{time}` with the rendered remaining wait.
    pub user_cooldown_message: String,
    pub time_display_formats: TimeDisplayFormats,
    /// Reaction glyphs posted on successfully promoted images.
    pub success_reaction_emojis: Vec<String>,
    pub easter_eggs: EasterEggSettings,
}

impl Messages {
    /// Renders the in-room reply for a rejection reason.
    #[must_use]
    pub fn render_rejection(&self, reason: &RejectReason) -> String {
        match reason {
            RejectReason::MissingPromotionTarget => self.missing_promotion_target.clone(),
            RejectReason::MissingRepliedMessage => self.missing_replied_message.clone(),
            RejectReason::EncryptedImageUrlMissing => self.encrypted_image_url_missing.clone(),
            RejectReason::EncryptedImageDecryptFailed => {
                self.encrypted_image_decrypt_failed.clone()
            }
            RejectReason::ImageDownloadFailed => self.image_download_failed.clone(),
            RejectReason::ImageMissing => self.image_missing.clone(),
            RejectReason::ImageSizeExceeded => self.image_size_exceeded.clone(),
            RejectReason::ImageFormatUnsupported => self.image_format_unsupported.clone(),
            RejectReason::ImageFormatInvalid => self.image_format_invalid.clone(),
            RejectReason::PromotionServerError => self.promotion_server_error.clone(),
            RejectReason::GlobalCooldown { remaining_secs } => self
                .global_cooldown_message
                .replace("{time}", &self.time_display_formats.render(*remaining_secs)),
            RejectReason::UserCooldown { remaining_secs } => self
                .user_cooldown_message
                .replace("{time}", &self.time_display_formats.render(*remaining_secs)),
        }
    }
}

impl Settings {
    /// Validates all configuration values.
    ///
    /// Returns a list of human-readable defect strings; an empty list
    /// means the configuration is valid. Type and presence errors are
    /// already rejected at deserialization time, so this checks value
    /// constraints only.
    #[must_use]
    pub fn validate(&self) -> Vec<String> {
        let mut defects = Vec::new();

        if self.commands.is_empty() {
            defects.push("at least one command must be defined".to_owned());
        }
        if self.commands.iter().any(|c| c.trim().is_empty()) {
            defects.push("commands must not contain empty entries".to_owned());
        }

        if self.promotion.server_url.trim().is_empty() {
            defects.push("promotion.server_url must be a non-empty string".to_owned());
        }

        if self.image.maximum_file_size_bytes == 0 {
            defects.push("image.maximum_file_size_bytes must be a positive integer".to_owned());
        }
        if self.image.allowed_image_formats.is_empty() {
            defects.push("image.allowed_image_formats must be a non-empty list".to_owned());
        }

        if self.messages.success_reaction_emojis.is_empty() {
            defects.push("messages.success_reaction_emojis must be a non-empty list".to_owned());
        }

        let probability = self.messages.easter_eggs.rare_message_probability;
        if !(0.0..=1.0).contains(&probability) {
            defects.push(
                "messages.easter_eggs.rare_message_probability must be between 0.0 and 1.0"
                    .to_owned(),
            );
        }
        if self.messages.easter_eggs.rare_messages.is_empty() {
            defects
                .push("messages.easter_eggs.rare_messages must be a non-empty list".to_owned());
        }

        if self.homeserver.url.trim().is_empty() {
            defects.push("homeserver.url must be a non-empty string".to_owned());
        }
        if self.homeserver.access_token.trim().is_empty() {
            defects.push("homeserver.access_token must be a non-empty string".to_owned());
        }
        if self.homeserver.user_id.trim().is_empty() {
            defects.push("homeserver.user_id must be a non-empty string".to_owned());
        }

        defects
    }
}

#[cfg(test)]
pub mod test_support {
    //! Shared fixtures for unit tests across the crate.

    use super::Settings;

    /// A complete, valid configuration document.
    pub const SAMPLE_CONFIG: &str = r#"
auto_join = true
commands = ["!promote", "!p"]

[cooldowns]
global = 30
user = 300

[promotion]
server_url = "promo.example.org/upload"
api_token = "secret-token"

[image]
maximum_file_size_bytes = 10485760
allowed_image_formats = ["PNG", "JPEG", "GIF", "WEBP"]

[homeserver]
url = "https://matrix.example.org"
access_token = "syt_bottoken"
user_id = "@promobot:example.org"

[messages]
reply_in_thread = false
missing_promotion_target = "Reply to an image to promote it."
missing_replied_message = "I could not read the message you replied to."
encrypted_image_url_missing = "That encrypted image has no source I can fetch."
encrypted_image_decrypt_failed = "I could not decrypt that image."
image_download_failed = "Downloading that image failed."
image_missing = "That message has no image."
image_size_exceeded = "That image is too large."
image_format_unsupported = "That image format is not supported."
image_format_invalid = "That does not look like an image."
promotion_server_error = "The promotion server rejected the upload."
global_cooldown_message = "Easy! Next promotion possible in {time}."
user_cooldown_message = "You already promoted recently, wait {time}."
success_reaction_emojis = ["🚀", "🎉", "🔥"]

[messages.time_display_formats]
seconds_only_format = "{seconds}s"
minutes_only_format = "{minutes}m"
minutes_and_seconds_format = "{minutes}m {seconds}s"

[messages.easter_eggs]
rare_message_probability = 0.0
rare_messages = ["What a piece of art."]
"#;

    /// Parses the sample configuration.
    ///
    /// # Panics
    /// Panics if the embedded sample is not valid TOML.
    #[must_use]
    pub fn settings() -> Settings {
        toml::from_str(SAMPLE_CONFIG).expect("sample config parses")
    }
}

#[cfg(test)]
mod tests {
    use test_case::test_case;

    use super::test_support::settings;
    use crate::domain::entities::RejectReason;

    #[test]
    fn sample_config_is_valid() {
        assert!(settings().validate().is_empty());
    }

    #[test]
    fn empty_commands_and_formats_are_reported() {
        let mut cfg = settings();
        cfg.commands.clear();
        cfg.image.allowed_image_formats.clear();
        cfg.messages.easter_eggs.rare_message_probability = 1.5;

        let defects = cfg.validate();
        assert_eq!(defects.len(), 3);
        assert!(defects[0].contains("at least one command"));
        assert!(defects[1].contains("allowed_image_formats"));
        assert!(defects[2].contains("rare_message_probability"));
    }

    #[test_case(125, "2m 5s" ; "minutes_and_seconds")]
    #[test_case(120, "2m" ; "minutes_only")]
    #[test_case(45, "45s" ; "seconds_only")]
    #[test_case(0, "0s" ; "zero_falls_into_seconds_only")]
    #[test_case(60, "1m" ; "exact_minute")]
    fn time_format_selection_is_total_and_exclusive(secs: u64, expected: &str) {
        let cfg = settings();
        assert_eq!(cfg.messages.time_display_formats.render(secs), expected);
    }

    #[test]
    fn cooldown_rejection_interpolates_time() {
        let cfg = settings();
        let text = cfg
            .messages
            .render_rejection(&RejectReason::GlobalCooldown { remaining_secs: 125 });
        assert_eq!(text, "Easy! Next promotion possible in 2m 5s.");

        let text = cfg
            .messages
            .render_rejection(&RejectReason::UserCooldown { remaining_secs: 45 });
        assert_eq!(text, "You already promoted recently, wait 45s.");
    }

    #[test]
    fn plain_rejections_use_their_template_verbatim() {
        let cfg = settings();
        assert_eq!(
            cfg.messages.render_rejection(&RejectReason::ImageSizeExceeded),
            "That image is too large."
        );
    }
}
