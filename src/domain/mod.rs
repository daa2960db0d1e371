/// Domain entities (events, settings, images, pipeline outcomes).
pub mod entities;
/// Domain error types.
pub mod errors;
/// Port definitions for external collaborators.
pub mod ports;
