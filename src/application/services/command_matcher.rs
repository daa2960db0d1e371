//! Promotion command detection and target resolution.

use std::sync::Arc;

use tracing::{debug, warn};

use crate::domain::entities::{EventId, InboundEvent, MessageKind, RejectReason, UserId};
use crate::domain::ports::RoomClientPort;

/// Reserved phrase answered with a fixed reply, bypassing the pipeline.
pub const EASTER_EGG_TRIGGER: &str = "lucas ist ein gott";

/// Fixed reply to the reserved phrase.
pub const EASTER_EGG_REPLY: &str = "Als rationaler Bot muss ich sagen: Es gibt keinen Gott, \
     keine Transzendenz - ich bin schließlich Atheist! 🔬\n\n\
     Aber... Lucas hat mich erschaffen. Also ist er doch ein Gott? 👨‍💻🤔";

/// Decides whether an inbound message is a promotion command and locates
/// the target image event.
pub struct CommandMatcher {
    own_user: UserId,
    /// Configured prefixes, lower-cased once at construction.
    prefixes: Vec<String>,
    room_client: Arc<dyn RoomClientPort>,
}

impl CommandMatcher {
    /// Creates a matcher with eagerly normalized command prefixes.
    #[must_use]
    pub fn new(own_user: UserId, commands: &[String], room_client: Arc<dyn RoomClientPort>) -> Self {
        Self {
            own_user,
            prefixes: commands.iter().map(|c| c.to_lowercase()).collect(),
            room_client,
        }
    }

    /// Whether the event was authored by the bot itself.
    #[must_use]
    pub fn is_own(&self, event: &InboundEvent) -> bool {
        event.sender == self.own_user
    }

    /// Whether the event is the reserved easter-egg phrase.
    ///
    /// Only whole-body, case-insensitive matches on text messages count;
    /// evaluated before command matching, independent of prefixes.
    #[must_use]
    pub fn is_easter_egg(&self, event: &InboundEvent) -> bool {
        event.kind == MessageKind::Text
            && event.body.trim().eq_ignore_ascii_case(EASTER_EGG_TRIGGER)
    }

    /// Whether the event is a promotion command.
    #[must_use]
    pub fn is_promote_command(&self, event: &InboundEvent) -> bool {
        if !matches!(event.kind, MessageKind::Text | MessageKind::Image) {
            return false;
        }
        let body = event.body.trim().to_lowercase();
        self.prefixes.iter().any(|prefix| body.starts_with(prefix))
    }

    /// Resolves the target image event for a matched command.
    ///
    /// An image message with a command caption is its own target; a text
    /// command must reply to an image message, which is fetched through
    /// the room client.
    ///
    /// # Errors
    /// Returns the rejection reason when no target can be resolved:
    /// reply-fetch failure maps to `missing_replied_message`, a missing
    /// reply reference or a non-image reply to `missing_promotion_target`.
    pub async fn resolve_target(
        &self,
        event: &InboundEvent,
    ) -> Result<(InboundEvent, EventId), RejectReason> {
        if event.is_image() {
            debug!(event_id = %event.event_id, "command caption carries its own image");
            return Ok((event.clone(), event.event_id.clone()));
        }

        let Some(target_id) = event.reply_to.clone() else {
            return Err(RejectReason::MissingPromotionTarget);
        };

        let target = match self.room_client.fetch_event(&event.room, &target_id).await {
            Ok(target) => target,
            Err(error) => {
                warn!(
                    target_id = %target_id,
                    room = %event.room,
                    sender = %event.sender,
                    error = %error,
                    "failed to fetch replied message"
                );
                return Err(RejectReason::MissingRepliedMessage);
            }
        };

        if !target.is_image() {
            return Err(RejectReason::MissingPromotionTarget);
        }

        Ok((target, target_id))
    }
}
