mod attachment;

pub use attachment::AttachmentDecryptor;
