//! Long-poll sync loop feeding inbound events into the pipeline.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, error, info};

use super::client::MatrixRoomClient;
use crate::domain::entities::RoomEvent;

/// Delay before retrying after a failed sync round.
const SYNC_RETRY_DELAY: Duration = Duration::from_secs(5);

/// Spawns the sync loop.
///
/// The first round only establishes the sync position; its (historical)
/// events are discarded so a restart never replays old commands. Subsequent
/// rounds push every dispatchable event into `events_tx`. The loop ends
/// when the receiving side is dropped.
pub fn spawn_sync_loop(
    client: Arc<MatrixRoomClient>,
    events_tx: mpsc::UnboundedSender<RoomEvent>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut since: Option<String> = None;

        loop {
            match client.sync_once(since.as_deref()).await {
                Ok((events, next_batch)) => {
                    if since.is_none() {
                        info!("initial sync complete, listening for events");
                    } else {
                        for event in events {
                            if events_tx.send(event).is_err() {
                                debug!("event receiver dropped, stopping sync loop");
                                return;
                            }
                        }
                    }
                    since = Some(next_batch);
                }
                Err(sync_error) => {
                    error!(error = %sync_error, "sync failed, retrying");
                    tokio::time::sleep(SYNC_RETRY_DELAY).await;
                }
            }
        }
    })
}
