//! Configuration types for ffm.
//!
//! This module provides the configuration types and loading functionality.
//! The configuration file supports JSONC format (JSON with comments).
//! Both single-line (`//`) and multi-line (`/* */`) comments are allowed.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::modules::ffm::modifiers::{Modifiers, parse_bypass_modifiers};

/// Default bypass modifier.
pub const DEFAULT_BYPASS_MODIFIER: &str = "fn";

/// Default minimum interval between processed mouse-moved events, in milliseconds.
pub const DEFAULT_MOUSE_MOTION_INTERVAL_MS: f64 = 35.0;

/// Longest accepted focus delay, in seconds.
pub const MAX_FOCUS_DELAY_SECS: f64 = 60.0;

/// Longest accepted interval between processed mouse-moved events, in milliseconds.
pub const MAX_MOUSE_MOTION_INTERVAL_MS: f64 = 1000.0;

/// Focus-follows-mouse configuration.
///
/// Every field has a default, so an empty file (or no file) gives the stock
/// behaviour: focus follows immediately, `fn` suspends it, and floating
/// windows put it on standby.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default, rename_all = "camelCase")]
pub struct FfmConfig {
    /// Modifier keys that suspend focus-follows-mouse while all are held.
    /// Tokens: `fn`, `shift`, `alt`, `cmd`, `ctrl`, separated by spaces, `+`, `,` or `|`.
    /// Default: `"fn"`
    pub bypass_modifier: String,

    /// Stop following the mouse while the focused window is floating.
    /// Default: true
    pub standby_on_float: bool,

    /// Delay in seconds between selecting a window and focusing it.
    /// Values above 60 are capped.
    /// Default: 0
    pub focus_delay: f64,

    /// Minimum time in milliseconds between two processed mouse movements.
    /// Values above 1000 are capped.
    /// Default: 35
    pub mouse_motion_interval: f64,
}

impl Default for FfmConfig {
    fn default() -> Self {
        Self {
            bypass_modifier: DEFAULT_BYPASS_MODIFIER.to_string(),
            standby_on_float: true,
            focus_delay: 0.0,
            mouse_motion_interval: DEFAULT_MOUSE_MOTION_INTERVAL_MS,
        }
    }
}

impl FfmConfig {
    /// The parsed bypass modifier mask.
    #[must_use]
    pub fn bypass_modifiers(&self) -> Modifiers { parse_bypass_modifiers(&self.bypass_modifier) }

    /// The focus delay, capped at [`MAX_FOCUS_DELAY_SECS`]. Negative or NaN
    /// values count as zero.
    #[must_use]
    pub fn focus_delay_duration(&self) -> Duration {
        bounded_duration(self.focus_delay, MAX_FOCUS_DELAY_SECS)
    }

    /// The motion debounce interval, capped at [`MAX_MOUSE_MOTION_INTERVAL_MS`].
    /// Negative or NaN values count as zero.
    #[must_use]
    pub fn mouse_motion_interval_duration(&self) -> Duration {
        bounded_duration(self.mouse_motion_interval, MAX_MOUSE_MOTION_INTERVAL_MS) / 1000
    }
}

fn bounded_duration(value: f64, max: f64) -> Duration {
    if value.is_nan() || value <= 0.0 {
        return Duration::ZERO;
    }
    Duration::from_secs_f64(value.min(max))
}

/// Errors that can occur when loading the configuration.
#[derive(Debug)]
pub enum ConfigError {
    /// No configuration file was found in any of the expected locations.
    NotFound,
    /// The configuration file exists but could not be read.
    IoError(std::io::Error),
    /// The configuration file contains invalid JSON.
    ParseError(serde_json::Error),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotFound => write!(
                f,
                "No configuration file found. Expected at ~/.config/ffm/config.jsonc, \
                ~/Library/Application Support/ffm/config.jsonc, or ~/.ffm.jsonc"
            ),
            Self::IoError(err) => write!(f, "Failed to read configuration file: {err}"),
            Self::ParseError(err) => write!(f, "Failed to parse configuration file: {err}"),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::IoError(err) => Some(err),
            Self::ParseError(err) => Some(err),
            Self::NotFound => None,
        }
    }
}

impl From<std::io::Error> for ConfigError {
    fn from(err: std::io::Error) -> Self { Self::IoError(err) }
}

impl From<serde_json::Error> for ConfigError {
    fn from(err: serde_json::Error) -> Self { Self::ParseError(err) }
}

/// Configuration file names to search for (in priority order).
const CONFIG_FILE_NAMES: &[&str] = &["config.jsonc", "config.json"];

/// Dotfile names in the home directory.
const HOME_CONFIG_FILE_NAMES: &[&str] = &[".ffm.jsonc", ".ffm.json"];

/// Returns the possible configuration file paths in priority order.
///
/// The function checks the following locations (both `.jsonc` and `.json` variants):
/// 1. `$XDG_CONFIG_HOME/ffm/config.jsonc` if `$XDG_CONFIG_HOME` is set
/// 2. `~/.config/ffm/config.jsonc`
/// 3. `~/Library/Application Support/ffm/config.jsonc` (macOS native)
/// 4. `~/.ffm.jsonc` or `~/.ffm.json`
#[must_use]
pub fn config_paths() -> Vec<PathBuf> {
    let mut paths = Vec::new();
    let mut push_dir = |dir: PathBuf| {
        for filename in CONFIG_FILE_NAMES {
            let path = dir.join(filename);
            // XDG_CONFIG_HOME is often ~/.config itself
            if !paths.contains(&path) {
                paths.push(path);
            }
        }
    };

    if let Ok(xdg_config) = std::env::var("XDG_CONFIG_HOME")
        && !xdg_config.is_empty()
    {
        push_dir(PathBuf::from(xdg_config).join("ffm"));
    }

    if let Some(home) = dirs::home_dir() {
        push_dir(home.join(".config").join("ffm"));
    }

    if let Some(config_dir) = dirs::config_dir() {
        push_dir(config_dir.join("ffm"));
    }

    if let Some(home) = dirs::home_dir() {
        for filename in HOME_CONFIG_FILE_NAMES {
            paths.push(home.join(filename));
        }
    }

    paths
}

/// Loads the configuration from a specific file.
///
/// # Errors
///
/// Returns `ConfigError::NotFound` if the file does not exist.
/// Returns `ConfigError::IoError` if the file could not be read.
/// Returns `ConfigError::ParseError` if the file contains invalid JSON.
pub fn load_config_from_path(path: &Path) -> Result<(FfmConfig, PathBuf), ConfigError> {
    if !path.exists() {
        return Err(ConfigError::NotFound);
    }

    let file = fs::File::open(path)?;
    // Strip comments from JSONC before parsing
    let reader = json_comments::StripComments::new(file);
    let config: FfmConfig = serde_json::from_reader(reader)?;
    Ok((config, path.to_path_buf()))
}

/// Loads the configuration from the first available config file.
///
/// # Errors
///
/// Returns `ConfigError::NotFound` if no configuration file exists in any of the expected locations.
/// Returns `ConfigError::IoError` if a configuration file exists but could not be read.
/// Returns `ConfigError::ParseError` if the configuration file contains invalid JSON.
pub fn load_config() -> Result<(FfmConfig, PathBuf), ConfigError> {
    config_paths()
        .into_iter()
        .find(|path| path.exists())
        .map_or(Err(ConfigError::NotFound), |path| load_config_from_path(&path))
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn test_defaults() {
        let config = FfmConfig::default();
        assert_eq!(config.bypass_modifier, "fn");
        assert!(config.standby_on_float);
        assert_eq!(config.focus_delay_duration(), Duration::ZERO);
        assert_eq!(config.mouse_motion_interval_duration(), Duration::from_millis(35));
        assert_eq!(config.bypass_modifiers(), Modifiers::FN);
    }

    #[test]
    fn test_empty_object_uses_defaults() {
        let config: FfmConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config, FfmConfig::default());
    }

    #[test]
    fn test_camel_case_keys() {
        let json = r#"{
            "bypassModifier": "alt+shift",
            "standbyOnFloat": false,
            "focusDelay": 0.25,
            "mouseMotionInterval": 50
        }"#;

        let config: FfmConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.bypass_modifiers(), Modifiers::ALT | Modifiers::SHIFT);
        assert!(!config.standby_on_float);
        assert_eq!(config.focus_delay_duration(), Duration::from_millis(250));
        assert_eq!(config.mouse_motion_interval_duration(), Duration::from_millis(50));
    }

    #[test]
    fn test_negative_values_clamp_to_zero() {
        let config = FfmConfig {
            focus_delay: -1.0,
            mouse_motion_interval: f64::NAN,
            ..Default::default()
        };
        assert_eq!(config.focus_delay_duration(), Duration::ZERO);
        assert_eq!(config.mouse_motion_interval_duration(), Duration::ZERO);
    }

    #[test]
    fn test_oversized_values_are_capped() {
        let config = FfmConfig {
            focus_delay: 9.5e18,
            mouse_motion_interval: f64::INFINITY,
            ..Default::default()
        };
        assert_eq!(config.focus_delay_duration(), Duration::from_secs(60));
        assert_eq!(config.mouse_motion_interval_duration(), Duration::from_secs(1));
    }

    #[test]
    fn test_load_jsonc_from_path() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"{{
                // hold cmd to move freely
                "bypassModifier": "cmd", /* block comment */
                "focusDelay": 1
            }}"#
        )
        .unwrap();

        let (config, path) = load_config_from_path(file.path()).unwrap();
        assert_eq!(path, file.path());
        assert_eq!(config.bypass_modifiers(), Modifiers::CMD);
        assert_eq!(config.focus_delay_duration(), Duration::from_secs(1));
        assert!(config.standby_on_float);
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let result = load_config_from_path(&dir.path().join("config.jsonc"));
        assert!(matches!(result, Err(ConfigError::NotFound)));
    }

    #[test]
    fn test_load_invalid_json() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "{{ \"focusDelay\": }}").unwrap();

        let result = load_config_from_path(file.path());
        assert!(matches!(result, Err(ConfigError::ParseError(_))));
    }

    #[test]
    fn test_config_paths_end_with_home_dotfiles() {
        let paths = config_paths();
        if dirs::home_dir().is_some() {
            assert!(paths.last().unwrap().ends_with(".ffm.json"));
            assert!(paths.iter().any(|p| p.ends_with(".config/ffm/config.jsonc")));
        }
    }

    #[test]
    fn test_config_error_display() {
        let msg = ConfigError::NotFound.to_string();
        assert!(msg.contains("No configuration file found"));
    }
}
