//! The promotion pipeline orchestrator.
//!
//! Wires command matching, rate limiting, image resolution, and publishing
//! in strict order per inbound event. Any stage can short-circuit with a
//! terminal outcome; cooldown state is updated only after a fully
//! successful publish.

use std::sync::Arc;

use tracing::{debug, error, info, warn};

use crate::application::services::{
    CommandMatcher, EASTER_EGG_REPLY, ImageService, PromotionPublisher, RateLimiter,
};
use crate::domain::entities::{
    InboundEvent, MembershipEvent, MembershipState, Messages, PipelineOutcome, RejectReason,
    Settings, UserId,
};
use crate::domain::ports::{DecryptorPort, PromotionServerPort, RoomClientPort};

/// Per-event promotion pipeline, shared across concurrent handler tasks.
pub struct PromoteUseCase {
    matcher: CommandMatcher,
    limiter: RateLimiter,
    images: ImageService,
    publisher: PromotionPublisher,
    room_client: Arc<dyn RoomClientPort>,
    messages: Messages,
    own_user: UserId,
    auto_join: bool,
}

impl PromoteUseCase {
    /// Builds the pipeline from validated settings and the collaborator
    /// ports. Derived values (normalized prefixes, format allow-set) are
    /// computed once here.
    #[must_use]
    pub fn new(
        room_client: Arc<dyn RoomClientPort>,
        decryptor: Arc<dyn DecryptorPort>,
        server: Arc<dyn PromotionServerPort>,
        settings: &Settings,
    ) -> Self {
        let own_user = UserId(settings.homeserver.user_id.clone());
        Self {
            matcher: CommandMatcher::new(
                own_user.clone(),
                &settings.commands,
                Arc::clone(&room_client),
            ),
            limiter: RateLimiter::new(settings.cooldowns),
            images: ImageService::new(
                Arc::clone(&room_client),
                decryptor,
                settings.image.maximum_file_size_bytes,
                &settings.image.allowed_image_formats,
            ),
            publisher: PromotionPublisher::new(
                server,
                Arc::clone(&room_client),
                settings.messages.success_reaction_emojis.clone(),
                settings.messages.easter_eggs.rare_message_probability,
                settings.messages.easter_eggs.rare_messages.clone(),
                settings.messages.reply_in_thread,
            ),
            room_client,
            messages: settings.messages.clone(),
            own_user,
            auto_join: settings.auto_join,
        }
    }

    /// Runs one message through the pipeline.
    pub async fn handle_message(&self, event: &InboundEvent) -> PipelineOutcome {
        if self.matcher.is_own(event) {
            debug!(event_id = %event.event_id, "ignoring own message");
            return PipelineOutcome::Ignored;
        }

        if self.matcher.is_easter_egg(event) {
            info!(sender = %event.sender, "special response triggered");
            if let Err(send_error) = self
                .room_client
                .send_reply(&event.room, &event.event_id, EASTER_EGG_REPLY, false)
                .await
            {
                error!(error = %send_error, "failed to send special response");
            }
            return PipelineOutcome::Ignored;
        }

        if !self.matcher.is_promote_command(event) {
            return PipelineOutcome::Ignored;
        }

        let (target, target_id) = match self.matcher.resolve_target(event).await {
            Ok(resolved) => resolved,
            Err(reason) => return self.reject(event, reason).await,
        };

        // Gate on cooldowns before any expensive download work.
        if let Err(reason) = self.limiter.check(&event.sender) {
            return self.reject(event, reason).await;
        }

        let image = match self.images.resolve(&target).await {
            Ok(image) => image,
            Err(reason) => return self.reject(event, reason).await,
        };
        info!(
            filename = %image.filename,
            format = %image.format,
            size = image.bytes.len(),
            "downloaded a valid image"
        );

        if let Err(reason) = self.publisher.publish(event, &target_id, image).await {
            return self.reject(event, reason).await;
        }

        self.limiter.commit(&event.sender);
        PipelineOutcome::Promoted
    }

    /// Handles a membership change: joins on invites targeting the bot when
    /// auto-join is enabled, otherwise only logs.
    pub async fn handle_membership(&self, event: &MembershipEvent) {
        if event.target != self.own_user || event.membership != MembershipState::Invite {
            return;
        }

        info!(from = %event.sender, room = %event.room, "room invite received");
        if !self.auto_join {
            info!("auto join is disabled in config, ignoring invite");
            return;
        }

        match self.room_client.join_room(&event.room).await {
            Ok(()) => info!(room = %event.room, "joined room"),
            Err(join_error) => error!(room = %event.room, error = %join_error, "failed to join room"),
        }
    }

    async fn reject(&self, event: &InboundEvent, reason: RejectReason) -> PipelineOutcome {
        warn!(
            sender = %event.sender,
            room = %event.room,
            event_id = %event.event_id,
            reason = reason.key(),
            "promotion rejected"
        );

        let text = self.messages.render_rejection(&reason);
        if let Err(send_error) = self
            .room_client
            .send_reply(
                &event.room,
                &event.event_id,
                &text,
                self.messages.reply_in_thread,
            )
            .await
        {
            error!(error = %send_error, "failed to send rejection reply");
        }

        PipelineOutcome::Rejected(reason)
    }
}
