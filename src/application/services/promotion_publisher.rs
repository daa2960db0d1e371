//! Upload delivery and in-room success signaling.

use std::sync::Arc;
use std::time::Instant;

use rand::Rng;
use rand::seq::IndexedRandom;
use tracing::{error, info};

use crate::domain::entities::{EventId, InboundEvent, RejectReason, ResolvedImage};
use crate::domain::ports::{PromotionServerPort, RoomClientPort};

/// Delivers validated images to the promotion server and marks the source
/// event with a success reaction.
pub struct PromotionPublisher {
    server: Arc<dyn PromotionServerPort>,
    room_client: Arc<dyn RoomClientPort>,
    glyphs: Vec<String>,
    rare_probability: f64,
    rare_messages: Vec<String>,
    reply_in_thread: bool,
}

impl PromotionPublisher {
    /// Creates a publisher.
    #[must_use]
    pub fn new(
        server: Arc<dyn PromotionServerPort>,
        room_client: Arc<dyn RoomClientPort>,
        glyphs: Vec<String>,
        rare_probability: f64,
        rare_messages: Vec<String>,
        reply_in_thread: bool,
    ) -> Self {
        Self {
            server,
            room_client,
            glyphs,
            rare_probability: rare_probability.clamp(0.0, 1.0),
            rare_messages,
            reply_in_thread,
        }
    }

    /// Uploads the image and posts one random success reaction onto the
    /// target event.
    ///
    /// Reaction and rare-message failures after a successful upload are
    /// logged and swallowed; the promotion already happened from the
    /// server's point of view.
    ///
    /// # Errors
    /// Returns `promotion_server_error` when the upload fails. No retry.
    pub async fn publish(
        &self,
        event: &InboundEvent,
        target_id: &EventId,
        image: ResolvedImage,
    ) -> Result<(), RejectReason> {
        let started = Instant::now();
        self.server
            .upload(&image.filename, image.bytes)
            .await
            .map_err(|upload_error| {
                error!(
                    filename = %image.filename,
                    error = %upload_error,
                    "upload to promotion server failed"
                );
                RejectReason::PromotionServerError
            })?;
        info!(
            filename = %image.filename,
            format = %image.format,
            upload_ms = started.elapsed().as_millis() as u64,
            "upload successful"
        );

        self.react(event, target_id).await;
        self.maybe_send_rare_message(event).await;
        Ok(())
    }

    async fn react(&self, event: &InboundEvent, target_id: &EventId) {
        let glyph = self.glyphs.choose(&mut rand::rng()).cloned();
        let Some(glyph) = glyph else { return };

        match self.room_client.add_reaction(&event.room, target_id, &glyph).await {
            Ok(()) => info!(%glyph, target = %target_id, "added reaction to promoted image"),
            Err(reaction_error) => {
                error!(%glyph, error = %reaction_error, "failed to add success reaction");
            }
        }
    }

    async fn maybe_send_rare_message(&self, event: &InboundEvent) {
        if self.rare_messages.is_empty() || self.rare_probability <= 0.0 {
            return;
        }
        let message = {
            let mut rng = rand::rng();
            if !rng.random_bool(self.rare_probability) {
                return;
            }
            self.rare_messages.choose(&mut rng).cloned()
        };
        let Some(message) = message else { return };

        if let Err(error) = self
            .room_client
            .send_reply(&event.room, &event.event_id, &message, self.reply_in_thread)
            .await
        {
            error!(%error, "failed to send rare message");
        }
    }
}

#[cfg(test)]
mod tests {
    use bytes::Bytes;

    use super::*;
    use crate::domain::entities::MessageKind;
    use crate::domain::ports::mocks::{MockPromotionServer, MockRoomClient};

    fn publisher(
        server: Arc<MockPromotionServer>,
        client: Arc<MockRoomClient>,
        rare_probability: f64,
    ) -> PromotionPublisher {
        PromotionPublisher::new(
            server,
            client,
            vec!["🚀".to_owned()],
            rare_probability,
            vec!["A rare one.".to_owned()],
            false,
        )
    }

    fn image() -> ResolvedImage {
        ResolvedImage {
            bytes: Bytes::from_static(b"imagebytes"),
            format: "PNG".to_owned(),
            filename: "cat.png".to_owned(),
        }
    }

    fn event() -> InboundEvent {
        InboundEvent::new("@a:hs", "!r:hs", "$cmd", MessageKind::Text, "!p")
    }

    #[tokio::test]
    async fn success_uploads_once_and_reacts_once() {
        let server = Arc::new(MockPromotionServer::new());
        let client = Arc::new(MockRoomClient::new());
        let p = publisher(server.clone(), client.clone(), 0.0);

        p.publish(&event(), &EventId::from("$target"), image()).await.unwrap();

        let uploads = server.uploads.lock();
        assert_eq!(uploads.len(), 1);
        assert_eq!(uploads[0].0, "cat.png");
        assert_eq!(&uploads[0].1[..], b"imagebytes");

        let reactions = client.reactions.lock();
        assert_eq!(reactions.len(), 1);
        assert_eq!(reactions[0].1, "$target");
        assert_eq!(reactions[0].2, "🚀");
    }

    #[tokio::test]
    async fn upload_failure_is_rejected_without_reaction() {
        let server = Arc::new(MockPromotionServer::new().failing());
        let client = Arc::new(MockRoomClient::new());
        let p = publisher(server, client.clone(), 0.0);

        let err = p.publish(&event(), &EventId::from("$target"), image()).await.unwrap_err();
        assert_eq!(err, RejectReason::PromotionServerError);
        assert!(client.reactions.lock().is_empty());
    }

    #[tokio::test]
    async fn reaction_failure_does_not_undo_the_promotion() {
        let server = Arc::new(MockPromotionServer::new());
        let client = Arc::new(MockRoomClient::new().failing_reactions());
        let p = publisher(server.clone(), client, 0.0);

        assert!(p.publish(&event(), &EventId::from("$target"), image()).await.is_ok());
        assert_eq!(server.uploads.lock().len(), 1);
    }

    #[tokio::test]
    async fn certain_rare_message_is_sent_after_success() {
        let server = Arc::new(MockPromotionServer::new());
        let client = Arc::new(MockRoomClient::new());
        let p = publisher(server, client.clone(), 1.0);

        p.publish(&event(), &EventId::from("$target"), image()).await.unwrap();

        let replies = client.replies.lock();
        assert_eq!(replies.len(), 1);
        assert_eq!(replies[0].2, "A rare one.");
    }

    #[tokio::test]
    async fn zero_probability_never_sends_rare_messages() {
        let server = Arc::new(MockPromotionServer::new());
        let client = Arc::new(MockRoomClient::new());
        let p = publisher(server, client.clone(), 0.0);

        p.publish(&event(), &EventId::from("$target"), image()).await.unwrap();
        assert!(client.replies.lock().is_empty());
    }
}
