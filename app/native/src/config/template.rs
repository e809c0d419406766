//! Configuration template generation.
//!
//! Generates a commented configuration template with all available options.

use std::fs;
use std::path::Path;

/// Generates a configuration template with all options commented out.
#[must_use]
pub fn generate_config_template() -> String {
    r#"// ffm Configuration File
// ======================
// This file uses JSONC format (JSON with comments).
// All options below are commented out and show their default values.
// Uncomment and modify the options you want to configure.

{
  // Modifier keys that suspend focus-follows-mouse while all of them are held.
  // Tokens: "fn", "shift", "alt", "cmd", "ctrl" (e.g. "alt+shift").
  // "bypassModifier": "fn",

  // Stop following the mouse while the focused window is floating.
  // "standbyOnFloat": true,

  // Seconds to wait before focusing the window under the pointer (at most 60).
  // "focusDelay": 0,

  // Minimum milliseconds between two processed mouse movements (at most 1000).
  // "mouseMotionInterval": 35
}
"#
    .to_string()
}

/// Creates a configuration file with the template at the specified path.
///
/// Creates parent directories if they don't exist.
///
/// # Errors
///
/// Returns an error if the file cannot be written.
pub fn create_config_file(path: &Path) -> Result<(), std::io::Error> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    fs::write(path, generate_config_template())
}
