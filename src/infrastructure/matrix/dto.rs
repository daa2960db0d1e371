//! Wire types for the Matrix client-server API.

use std::collections::HashMap;

use serde::Deserialize;

use crate::domain::entities::{
    EncryptedFileInfo, EventId, InboundEvent, MembershipEvent, MembershipState, MessageKind,
    RoomEvent, RoomId, UserId,
};

/// Response of `GET /_matrix/client/v3/sync`.
#[derive(Debug, Deserialize)]
pub struct SyncResponse {
    pub next_batch: String,
    #[serde(default)]
    pub rooms: Rooms,
}

#[derive(Debug, Default, Deserialize)]
pub struct Rooms {
    #[serde(default)]
    pub join: HashMap<String, JoinedRoom>,
    #[serde(default)]
    pub invite: HashMap<String, InvitedRoom>,
}

#[derive(Debug, Deserialize)]
pub struct JoinedRoom {
    #[serde(default)]
    pub timeline: Timeline,
}

#[derive(Debug, Default, Deserialize)]
pub struct Timeline {
    #[serde(default)]
    pub events: Vec<RawEvent>,
}

#[derive(Debug, Deserialize)]
pub struct InvitedRoom {
    #[serde(default)]
    pub invite_state: InviteState,
}

#[derive(Debug, Default, Deserialize)]
pub struct InviteState {
    #[serde(default)]
    pub events: Vec<RawEvent>,
}

/// An event as received on the wire, content left untyped until the event
/// type is known.
#[derive(Debug, Deserialize)]
pub struct RawEvent {
    #[serde(rename = "type")]
    pub event_type: String,
    pub event_id: Option<String>,
    pub sender: Option<String>,
    pub state_key: Option<String>,
    #[serde(default)]
    pub content: serde_json::Value,
}

/// `m.room.message` content.
#[derive(Debug, Default, Deserialize)]
pub struct MessageContent {
    pub msgtype: Option<String>,
    pub body: Option<String>,
    pub url: Option<String>,
    pub file: Option<FileContent>,
    #[serde(rename = "m.relates_to")]
    pub relates_to: Option<RelatesTo>,
}

/// Encrypted file descriptor inside message content.
#[derive(Debug, Deserialize)]
pub struct FileContent {
    pub url: Option<String>,
    pub key: Option<JsonWebKey>,
    pub iv: Option<String>,
    #[serde(default)]
    pub hashes: HashMap<String, String>,
}

#[derive(Debug, Deserialize)]
pub struct JsonWebKey {
    pub k: String,
}

#[derive(Debug, Deserialize)]
pub struct RelatesTo {
    #[serde(rename = "m.in_reply_to")]
    pub in_reply_to: Option<InReplyTo>,
}

#[derive(Debug, Deserialize)]
pub struct InReplyTo {
    pub event_id: String,
}

/// `m.room.member` content.
#[derive(Debug, Deserialize)]
pub struct MemberContent {
    pub membership: Option<String>,
}

impl RawEvent {
    /// Converts a raw wire event into a dispatchable domain event.
    ///
    /// Returns `None` for event types the bot does not act on, and for
    /// malformed events missing their id or sender.
    #[must_use]
    pub fn into_room_event(self, room_id: &str) -> Option<RoomEvent> {
        match self.event_type.as_str() {
            "m.room.message" => Some(RoomEvent::Message(self.into_message_event(room_id)?)),
            "m.room.member" => Some(RoomEvent::Membership(self.into_membership_event(room_id)?)),
            _ => None,
        }
    }

    /// Converts a raw event into a message event.
    ///
    /// Tolerates non-message event types by producing
    /// [`MessageKind::Other`], so that a fetched reply target can still be
    /// inspected (and rejected as a non-image).
    #[must_use]
    pub fn into_message_event(self, room_id: &str) -> Option<InboundEvent> {
        let event_id = self.event_id?;
        let sender = self.sender?;

        let content: MessageContent = if self.event_type == "m.room.message" {
            serde_json::from_value(self.content).unwrap_or_default()
        } else {
            MessageContent::default()
        };

        let mut event = InboundEvent {
            sender: UserId(sender),
            room: RoomId(room_id.to_owned()),
            event_id: EventId(event_id),
            kind: content
                .msgtype
                .as_deref()
                .map(MessageKind::from_msgtype)
                .unwrap_or_default(),
            body: content.body.unwrap_or_default(),
            reply_to: content
                .relates_to
                .and_then(|r| r.in_reply_to)
                .map(|r| EventId(r.event_id)),
            media_url: content.url,
            encrypted_file: None,
        };

        if let Some(file) = content.file {
            event.encrypted_file = Some(EncryptedFileInfo {
                url: file.url.unwrap_or_default(),
                key: file.key.map(|k| k.k).unwrap_or_default(),
                iv: file.iv.unwrap_or_default(),
                sha256: file.hashes.get("sha256").cloned().unwrap_or_default(),
            });
        }

        Some(event)
    }

    fn into_membership_event(self, room_id: &str) -> Option<MembershipEvent> {
        let sender = self.sender?;
        let target = self.state_key?;
        let content: MemberContent = serde_json::from_value(self.content).ok()?;

        Some(MembershipEvent {
            sender: UserId(sender),
            room: RoomId(room_id.to_owned()),
            target: UserId(target),
            membership: content
                .membership
                .as_deref()
                .map_or(MembershipState::Other, MembershipState::from_wire),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn raw(value: serde_json::Value) -> RawEvent {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn text_reply_converts_with_relation() {
        let event = raw(json!({
            "type": "m.room.message",
            "event_id": "$cmd",
            "sender": "@alice:hs",
            "content": {
                "msgtype": "m.text",
                "body": "!promote",
                "m.relates_to": { "m.in_reply_to": { "event_id": "$img" } }
            }
        }));

        let Some(RoomEvent::Message(message)) = event.into_room_event("!room:hs") else {
            panic!("expected message event");
        };
        assert_eq!(message.kind, MessageKind::Text);
        assert_eq!(message.body, "!promote");
        assert_eq!(message.reply_to, Some(EventId("$img".into())));
    }

    #[test]
    fn encrypted_image_converts_with_file_descriptor() {
        let event = raw(json!({
            "type": "m.room.message",
            "event_id": "$img",
            "sender": "@bob:hs",
            "content": {
                "msgtype": "m.image",
                "body": "cat.png",
                "file": {
                    "url": "mxc://hs/abc",
                    "key": { "k": "a_key" },
                    "iv": "an_iv",
                    "hashes": { "sha256": "a_hash" }
                }
            }
        }));

        let Some(RoomEvent::Message(message)) = event.into_room_event("!room:hs") else {
            panic!("expected message event");
        };
        assert!(message.is_image());
        let file = message.encrypted_file.unwrap();
        assert_eq!(file.url, "mxc://hs/abc");
        assert_eq!(file.key, "a_key");
        assert_eq!(file.sha256, "a_hash");
        assert!(message.media_url.is_none());
    }

    #[test]
    fn member_invite_converts() {
        let event = raw(json!({
            "type": "m.room.member",
            "event_id": "$inv",
            "sender": "@alice:hs",
            "state_key": "@promobot:hs",
            "content": { "membership": "invite" }
        }));

        let Some(RoomEvent::Membership(membership)) = event.into_room_event("!room:hs") else {
            panic!("expected membership event");
        };
        assert_eq!(membership.target, UserId("@promobot:hs".into()));
        assert_eq!(membership.membership, MembershipState::Invite);
    }

    #[test]
    fn unrelated_event_types_are_dropped() {
        let event = raw(json!({
            "type": "m.reaction",
            "event_id": "$r",
            "sender": "@alice:hs",
            "content": {}
        }));
        assert!(event.into_room_event("!room:hs").is_none());
    }

    #[test]
    fn fetched_non_message_event_becomes_kind_other() {
        let event = raw(json!({
            "type": "m.room.topic",
            "event_id": "$t",
            "sender": "@alice:hs",
            "content": { "topic": "hello" }
        }));

        let message = event.into_message_event("!room:hs").unwrap();
        assert_eq!(message.kind, MessageKind::Other);
    }

    #[test]
    fn sync_response_parses() {
        let response: SyncResponse = serde_json::from_value(json!({
            "next_batch": "s123",
            "rooms": {
                "join": {
                    "!room:hs": {
                        "timeline": { "events": [{
                            "type": "m.room.message",
                            "event_id": "$e",
                            "sender": "@a:hs",
                            "content": { "msgtype": "m.text", "body": "hi" }
                        }] }
                    }
                },
                "invite": {
                    "!other:hs": { "invite_state": { "events": [] } }
                }
            }
        }))
        .unwrap();

        assert_eq!(response.next_batch, "s123");
        assert_eq!(response.rooms.join.len(), 1);
        assert_eq!(response.rooms.invite.len(), 1);
    }
}
