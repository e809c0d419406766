//! Configuration module for ffm.
//!
//! This module provides configuration types and loading functionality.
//!
//! The configuration file supports JSONC format (JSON with comments).
//! Both single-line (`//`) and multi-line (`/* */`) comments are allowed.
//! The configuration is read once at startup and never reloaded.

pub mod template;
pub mod types;

use std::path::PathBuf;
use std::sync::OnceLock;

pub use types::{
    ConfigError, FfmConfig, config_paths, load_config as load_config_default, load_config_from_path,
};

/// Global configuration instance, loaded once at startup.
static CONFIG: OnceLock<FfmConfig> = OnceLock::new();

/// Path to the currently loaded configuration file.
static CONFIG_PATH: OnceLock<PathBuf> = OnceLock::new();

/// Custom config path override (set via CLI --config flag).
static CUSTOM_CONFIG_PATH: OnceLock<PathBuf> = OnceLock::new();

/// Sets a custom configuration file path to use instead of the default search paths.
///
/// This must be called before `init()` to take effect.
/// Returns `false` if a path was already set.
pub fn set_custom_config_path(path: PathBuf) -> bool { CUSTOM_CONFIG_PATH.set(path).is_ok() }

/// Returns the custom configuration path, if one was set.
pub fn custom_config_path() -> Option<&'static PathBuf> { CUSTOM_CONFIG_PATH.get() }

/// Loads the configuration from the custom path or the default search paths.
///
/// # Errors
///
/// Returns the [`ConfigError`] from the underlying loader.
pub fn load() -> Result<(FfmConfig, PathBuf), ConfigError> {
    CUSTOM_CONFIG_PATH
        .get()
        .map_or_else(load_config_default, |path| load_config_from_path(path))
}

/// Loads the configuration from disk, falling back to defaults.
fn load_or_default() -> FfmConfig {
    match load() {
        Ok((config, path)) => {
            tracing::debug!(path = %path.display(), "ffm: loaded configuration");
            let _ = CONFIG_PATH.set(path);
            config
        }
        Err(ConfigError::NotFound) => {
            tracing::debug!("ffm: no configuration file found, using defaults");
            FfmConfig::default()
        }
        Err(err) => {
            tracing::warn!(error = %err, "ffm: failed to load configuration, using defaults");
            FfmConfig::default()
        }
    }
}

/// Initializes and returns the global configuration instance.
///
/// Idempotent: later calls return the same instance.
pub fn init() -> &'static FfmConfig { CONFIG.get_or_init(load_or_default) }

/// Returns the path to the loaded configuration file, if any.
pub fn get_config_path() -> Option<&'static PathBuf> { CONFIG_PATH.get() }

/// Returns where `ffm config init` writes a new file: the custom path if
/// set, otherwise the first default search path.
#[must_use]
pub fn default_config_path() -> Option<PathBuf> {
    CUSTOM_CONFIG_PATH.get().cloned().or_else(|| config_paths().into_iter().next())
}
