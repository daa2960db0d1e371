//! Matrix client-server API HTTP client.

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::{Client, StatusCode};
use serde_json::json;
use tracing::{debug, warn};
use uuid::Uuid;

use super::dto::{RawEvent, SyncResponse};
use crate::domain::entities::{EventId, HomeserverSettings, InboundEvent, RoomEvent, RoomId};
use crate::domain::errors::ClientError;

/// Long-poll timeout requested from the homeserver, in milliseconds.
const SYNC_TIMEOUT_MS: u64 = 30_000;

/// Room client adapter over the Matrix client-server REST API.
pub struct MatrixRoomClient {
    client: Client,
    base_url: String,
    access_token: String,
}

impl MatrixRoomClient {
    /// Creates a client for the configured homeserver.
    ///
    /// # Errors
    /// Returns an error if the HTTP client cannot be created.
    pub fn new(settings: &HomeserverSettings) -> Result<Self, ClientError> {
        // Request timeout must outlive the sync long-poll window.
        let client = Client::builder()
            .user_agent(concat!("promobot/", env!("CARGO_PKG_VERSION")))
            .timeout(std::time::Duration::from_secs(60))
            .build()
            .map_err(|e| ClientError::transport(format!("failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: settings.url.trim_end_matches('/').to_owned(),
            access_token: settings.access_token.clone(),
        })
    }

    fn map_request_error(error: &reqwest::Error) -> ClientError {
        if error.is_timeout() {
            ClientError::transport("request timed out")
        } else if error.is_connect() {
            ClientError::transport("failed to connect to homeserver")
        } else {
            ClientError::transport(error.to_string())
        }
    }

    /// Performs one sync round and converts the timeline and invite-state
    /// events into dispatchable domain events.
    ///
    /// # Errors
    /// Returns a transport error when the sync request fails.
    pub async fn sync_once(
        &self,
        since: Option<&str>,
    ) -> Result<(Vec<RoomEvent>, String), ClientError> {
        let mut url = format!(
            "{}/_matrix/client/v3/sync?timeout={SYNC_TIMEOUT_MS}",
            self.base_url
        );
        if let Some(since) = since {
            url.push_str("&since=");
            url.push_str(since);
        }

        let response = self
            .client
            .get(&url)
            .bearer_auth(&self.access_token)
            .send()
            .await
            .map_err(|e| Self::map_request_error(&e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ClientError::transport(format!("sync returned HTTP {status}")));
        }

        let sync: SyncResponse = response
            .json()
            .await
            .map_err(|e| ClientError::transport(format!("failed to parse sync response: {e}")))?;

        let mut events = Vec::new();
        for (room_id, room) in sync.rooms.join {
            for raw in room.timeline.events {
                if let Some(event) = raw.into_room_event(&room_id) {
                    events.push(event);
                }
            }
        }
        for (room_id, room) in sync.rooms.invite {
            for raw in room.invite_state.events {
                if let Some(event) = raw.into_room_event(&room_id) {
                    events.push(event);
                }
            }
        }

        debug!(count = events.len(), "sync round complete");
        Ok((events, sync.next_batch))
    }

    /// Resolves an `mxc://server/media-id` URL to the authenticated
    /// download endpoint.
    fn media_download_url(&self, mxc_url: &str) -> Result<String, ClientError> {
        let rest = mxc_url
            .strip_prefix("mxc://")
            .ok_or_else(|| ClientError::transport(format!("not an mxc URL: {mxc_url}")))?;
        let (server, media_id) = rest
            .split_once('/')
            .ok_or_else(|| ClientError::transport(format!("malformed mxc URL: {mxc_url}")))?;
        Ok(format!(
            "{}/_matrix/client/v1/media/download/{server}/{media_id}",
            self.base_url
        ))
    }

    async fn send_event(
        &self,
        room: &RoomId,
        event_type: &str,
        content: &serde_json::Value,
    ) -> Result<(), ClientError> {
        let txn_id = Uuid::new_v4();
        let url = format!(
            "{}/_matrix/client/v3/rooms/{}/send/{event_type}/{txn_id}",
            self.base_url,
            room.as_str()
        );

        let response = self
            .client
            .put(&url)
            .bearer_auth(&self.access_token)
            .json(content)
            .send()
            .await
            .map_err(|e| Self::map_request_error(&e))?;

        let status = response.status();
        if status.is_success() {
            Ok(())
        } else {
            Err(ClientError::transport(format!(
                "{event_type} send returned HTTP {status}"
            )))
        }
    }
}

#[async_trait]
impl crate::domain::ports::RoomClientPort for MatrixRoomClient {
    async fn fetch_event(
        &self,
        room: &RoomId,
        event_id: &EventId,
    ) -> Result<InboundEvent, ClientError> {
        let url = format!(
            "{}/_matrix/client/v3/rooms/{}/event/{}",
            self.base_url,
            room.as_str(),
            event_id.as_str()
        );

        let response = self
            .client
            .get(&url)
            .bearer_auth(&self.access_token)
            .send()
            .await
            .map_err(|e| Self::map_request_error(&e))?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Err(ClientError::not_found(event_id.as_str()));
        }
        if !status.is_success() {
            return Err(ClientError::transport(format!(
                "event fetch returned HTTP {status}"
            )));
        }

        let raw: RawEvent = response
            .json()
            .await
            .map_err(|e| ClientError::transport(format!("failed to parse event: {e}")))?;

        raw.into_message_event(room.as_str())
            .ok_or_else(|| ClientError::not_found(event_id.as_str()))
    }

    async fn download_media(&self, url: &str) -> Result<Bytes, ClientError> {
        let download_url = self.media_download_url(url)?;

        let response = self
            .client
            .get(&download_url)
            .bearer_auth(&self.access_token)
            .send()
            .await
            .map_err(|e| {
                warn!(%url, error = %e, "media download failed");
                Self::map_request_error(&e)
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(ClientError::transport(format!(
                "media download returned HTTP {status}"
            )));
        }

        response
            .bytes()
            .await
            .map_err(|e| ClientError::transport(format!("failed to read media body: {e}")))
    }

    async fn send_reply(
        &self,
        room: &RoomId,
        reply_to: &EventId,
        text: &str,
        threaded: bool,
    ) -> Result<(), ClientError> {
        let relates_to = if threaded {
            json!({
                "rel_type": "m.thread",
                "event_id": reply_to.as_str(),
                "is_falling_back": true,
                "m.in_reply_to": { "event_id": reply_to.as_str() }
            })
        } else {
            json!({ "m.in_reply_to": { "event_id": reply_to.as_str() } })
        };

        let content = json!({
            "msgtype": "m.text",
            "body": text,
            "m.relates_to": relates_to
        });

        self.send_event(room, "m.room.message", &content).await
    }

    async fn add_reaction(
        &self,
        room: &RoomId,
        event_id: &EventId,
        glyph: &str,
    ) -> Result<(), ClientError> {
        let content = json!({
            "m.relates_to": {
                "rel_type": "m.annotation",
                "event_id": event_id.as_str(),
                "key": glyph
            }
        });

        self.send_event(room, "m.reaction", &content).await
    }

    async fn join_room(&self, room: &RoomId) -> Result<(), ClientError> {
        let url = format!("{}/_matrix/client/v3/join/{}", self.base_url, room.as_str());

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.access_token)
            .json(&json!({}))
            .send()
            .await
            .map_err(|e| Self::map_request_error(&e))?;

        let status = response.status();
        if status.is_success() {
            Ok(())
        } else {
            Err(ClientError::transport(format!("join returned HTTP {status}")))
        }
    }
}
