mod decryptor_port;
mod promotion_port;
mod room_client_port;

pub use decryptor_port::DecryptorPort;
pub use promotion_port::PromotionServerPort;
pub use room_client_port::RoomClientPort;

#[cfg(test)]
pub mod mocks {
    pub use super::decryptor_port::mock::MockDecryptor;
    pub use super::promotion_port::mock::MockPromotionServer;
    pub use super::room_client_port::mock::MockRoomClient;
}
