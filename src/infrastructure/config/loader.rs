//! Settings file loading.

use std::path::{Path, PathBuf};

use color_eyre::eyre::{Result, WrapErr, eyre};
use directories::ProjectDirs;

use crate::domain::entities::Settings;

const CONFIG_FILE: &str = "config.toml";

/// Returns the default configuration file path under the platform config
/// directory.
fn default_config_path() -> Option<PathBuf> {
    ProjectDirs::from("org", "promobot", crate::NAME)
        .map(|dirs| dirs.config_dir().join(CONFIG_FILE))
}

/// Loads and parses the settings file.
///
/// Falls back to the platform config directory when no explicit path is
/// given. Value validation is the caller's job via [`Settings::validate`].
///
/// # Errors
/// Returns an error when no path can be determined, the file cannot be
/// read, or the TOML does not match the settings schema.
pub fn load_settings(path: Option<&Path>) -> Result<Settings> {
    let path = match path {
        Some(path) => path.to_path_buf(),
        None => default_config_path()
            .ok_or_else(|| eyre!("could not determine a configuration directory"))?,
    };

    let raw = std::fs::read_to_string(&path)
        .wrap_err_with(|| format!("failed to read configuration file {}", path.display()))?;

    toml::from_str(&raw)
        .wrap_err_with(|| format!("invalid configuration in {}", path.display()))
}
