mod command_matcher;
mod cooldown_service;
mod image_service;
mod promotion_publisher;

pub use command_matcher::{CommandMatcher, EASTER_EGG_REPLY, EASTER_EGG_TRIGGER};
pub use cooldown_service::RateLimiter;
pub use image_service::ImageService;
pub use promotion_publisher::PromotionPublisher;
