//! Room client port definition.

use async_trait::async_trait;
use bytes::Bytes;

use crate::domain::entities::{EventId, InboundEvent, RoomId};
use crate::domain::errors::ClientError;

/// Port for all interactions with the messaging protocol.
#[async_trait]
pub trait RoomClientPort: Send + Sync {
    /// Fetches a single event from a room.
    async fn fetch_event(
        &self,
        room: &RoomId,
        event_id: &EventId,
    ) -> Result<InboundEvent, ClientError>;

    /// Downloads media bytes from a protocol media URL.
    async fn download_media(&self, url: &str) -> Result<Bytes, ClientError>;

    /// Sends a text reply to an event, optionally threaded.
    async fn send_reply(
        &self,
        room: &RoomId,
        reply_to: &EventId,
        text: &str,
        threaded: bool,
    ) -> Result<(), ClientError>;

    /// Posts a reaction glyph onto an event.
    async fn add_reaction(
        &self,
        room: &RoomId,
        event_id: &EventId,
        glyph: &str,
    ) -> Result<(), ClientError>;

    /// Joins a room.
    async fn join_room(&self, room: &RoomId) -> Result<(), ClientError>;
}
