mod client_error;
mod decrypt_error;
mod upload_error;

pub use client_error::ClientError;
pub use decrypt_error::DecryptError;
pub use upload_error::UploadError;
