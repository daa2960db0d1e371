//! Inbound room event model.

use serde::{Deserialize, Serialize};

/// Unique identifier of a user within the messaging protocol.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UserId(pub String);

impl UserId {
    /// Returns the identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for UserId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for UserId {
    fn from(value: &str) -> Self {
        Self(value.to_owned())
    }
}

/// Unique identifier of a room.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RoomId(pub String);

impl RoomId {
    /// Returns the identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for RoomId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for RoomId {
    fn from(value: &str) -> Self {
        Self(value.to_owned())
    }
}

/// Unique identifier of an event within a room.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EventId(pub String);

impl EventId {
    /// Returns the identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for EventId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for EventId {
    fn from(value: &str) -> Self {
        Self(value.to_owned())
    }
}

/// Kind of a room message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MessageKind {
    /// Plain text message (`m.text`).
    Text,
    /// Image message (`m.image`).
    Image,
    /// Any other message or event type the pipeline does not act on.
    #[default]
    Other,
}

impl MessageKind {
    /// Maps a wire `msgtype` string onto a kind.
    #[must_use]
    pub fn from_msgtype(msgtype: &str) -> Self {
        match msgtype {
            "m.text" => Self::Text,
            "m.image" => Self::Image,
            _ => Self::Other,
        }
    }
}

/// Descriptor of an end-to-end encrypted media attachment.
///
/// Carries everything needed to fetch and decrypt the ciphertext: the
/// ciphertext URL, the unpadded URL-safe base64 AES key, the unpadded
/// base64 IV, and the unpadded base64 SHA-256 of the ciphertext.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncryptedFileInfo {
    /// Ciphertext location. May be empty on malformed events.
    pub url: String,
    /// Symmetric key, unpadded URL-safe base64 (JWK `k`).
    pub key: String,
    /// Initialization vector, unpadded base64.
    pub iv: String,
    /// Expected SHA-256 of the ciphertext, unpadded base64.
    pub sha256: String,
}

/// An inbound room message event, received once per pipeline run.
#[derive(Debug, Clone)]
pub struct InboundEvent {
    /// Author of the event.
    pub sender: UserId,
    /// Room the event was sent in.
    pub room: RoomId,
    /// Identifier of the event itself.
    pub event_id: EventId,
    /// Message kind.
    pub kind: MessageKind,
    /// Message body (caption for image messages).
    pub body: String,
    /// Event this message replies to, if any.
    pub reply_to: Option<EventId>,
    /// Plain media URL, if the event carries unencrypted media.
    pub media_url: Option<String>,
    /// Encrypted media descriptor, if the event carries encrypted media.
    pub encrypted_file: Option<EncryptedFileInfo>,
}

impl InboundEvent {
    /// Creates a new event without reply relation or media.
    #[must_use]
    pub fn new(
        sender: impl Into<String>,
        room: impl Into<String>,
        event_id: impl Into<String>,
        kind: MessageKind,
        body: impl Into<String>,
    ) -> Self {
        Self {
            sender: UserId(sender.into()),
            room: RoomId(room.into()),
            event_id: EventId(event_id.into()),
            kind,
            body: body.into(),
            reply_to: None,
            media_url: None,
            encrypted_file: None,
        }
    }

    /// Sets the reply-target event.
    #[must_use]
    pub fn with_reply_to(mut self, event_id: impl Into<String>) -> Self {
        self.reply_to = Some(EventId(event_id.into()));
        self
    }

    /// Sets a plain media URL.
    #[must_use]
    pub fn with_media_url(mut self, url: impl Into<String>) -> Self {
        self.media_url = Some(url.into());
        self
    }

    /// Sets an encrypted media descriptor.
    #[must_use]
    pub fn with_encrypted_file(mut self, file: EncryptedFileInfo) -> Self {
        self.encrypted_file = Some(file);
        self
    }

    /// Whether the event is an image message.
    #[must_use]
    pub const fn is_image(&self) -> bool {
        matches!(self.kind, MessageKind::Image)
    }
}

/// Membership state carried by a room member event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MembershipState {
    /// The target was invited to the room.
    Invite,
    /// The target joined the room.
    Join,
    /// The target left or was removed from the room.
    Leave,
    /// Any other membership value.
    Other,
}

impl MembershipState {
    /// Maps a wire membership string onto a state.
    #[must_use]
    pub fn from_wire(value: &str) -> Self {
        match value {
            "invite" => Self::Invite,
            "join" => Self::Join,
            "leave" | "ban" => Self::Leave,
            _ => Self::Other,
        }
    }
}

/// A room membership change event.
#[derive(Debug, Clone)]
pub struct MembershipEvent {
    /// User who caused the membership change.
    pub sender: UserId,
    /// Room the change applies to.
    pub room: RoomId,
    /// User whose membership changed.
    pub target: UserId,
    /// New membership state.
    pub membership: MembershipState,
}

/// Any inbound event the bot dispatches on.
#[derive(Debug, Clone)]
pub enum RoomEvent {
    /// A room message.
    Message(InboundEvent),
    /// A membership change.
    Membership(MembershipEvent),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn msgtype_mapping() {
        assert_eq!(MessageKind::from_msgtype("m.text"), MessageKind::Text);
        assert_eq!(MessageKind::from_msgtype("m.image"), MessageKind::Image);
        assert_eq!(MessageKind::from_msgtype("m.notice"), MessageKind::Other);
    }

    #[test]
    fn membership_mapping() {
        assert_eq!(MembershipState::from_wire("invite"), MembershipState::Invite);
        assert_eq!(MembershipState::from_wire("join"), MembershipState::Join);
        assert_eq!(MembershipState::from_wire("ban"), MembershipState::Leave);
        assert_eq!(MembershipState::from_wire("knock"), MembershipState::Other);
    }

    #[test]
    fn builder_sets_relations() {
        let event = InboundEvent::new("@a:hs", "!r:hs", "$e", MessageKind::Text, "!promote")
            .with_reply_to("$target");
        assert_eq!(event.reply_to, Some(EventId("$target".into())));
        assert!(!event.is_image());
    }
}
