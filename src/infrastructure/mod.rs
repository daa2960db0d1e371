/// CLI arguments and settings loading.
pub mod config;
/// Encrypted attachment decryption.
pub mod crypto;
/// Matrix client-server protocol adapter.
pub mod matrix;
/// Promotion server upload client.
pub mod promotion;

pub use config::{CliArgs, LogLevel, load_settings};
pub use crypto::AttachmentDecryptor;
pub use matrix::MatrixRoomClient;
pub use promotion::PromotionServerClient;
