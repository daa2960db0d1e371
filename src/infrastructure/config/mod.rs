mod args;
mod loader;

pub use args::{CliArgs, LogLevel};
pub use loader::load_settings;
