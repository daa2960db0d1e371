//! Promobot - a Matrix chat-room bot that promotes images to an external server.
//!
//! Users reply to an image with a promote command (or upload an image with the
//! command as caption); the bot downloads and validates the image, forwards it
//! to the configured promotion server, and reacts to the promoted message.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

/// Application layer containing the pipeline services and use cases.
pub mod application;
/// Domain layer containing entities, errors, and port definitions.
pub mod domain;
/// Infrastructure layer containing adapters for external services.
pub mod infrastructure;

/// Current version of the application.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Application name.
pub const NAME: &str = "promobot";
