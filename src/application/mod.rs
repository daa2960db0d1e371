/// Pipeline services: command matching, rate limiting, image resolution,
/// and publishing.
pub mod services;
/// Use cases wiring the services into the per-event pipeline.
pub mod use_cases;
