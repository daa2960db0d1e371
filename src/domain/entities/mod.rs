mod event;
mod image;
mod outcome;
mod settings;

pub use event::{
    EncryptedFileInfo, EventId, InboundEvent, MembershipEvent, MembershipState, MessageKind,
    RoomEvent, RoomId, UserId,
};
pub use image::{DEFAULT_IMAGE_FILENAME, ResolvedImage};
pub use outcome::{PipelineOutcome, RejectReason};
pub use settings::{
    CooldownSettings, EasterEggSettings, HomeserverSettings, ImagePolicy, Messages,
    PromotionSettings, Settings, TimeDisplayFormats,
};

#[cfg(test)]
pub use settings::test_support;
