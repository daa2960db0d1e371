mod client;
mod dto;
mod sync;

pub use client::MatrixRoomClient;
pub use sync::spawn_sync_loop;
