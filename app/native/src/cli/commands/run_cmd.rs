//! `ffm run`: start focus-follows-mouse.

use clap::Args;

use crate::config::{self, FfmConfig};
use crate::error::FfmError;
use crate::modules::ffm::{FfmSettings, init};

/// Per-run overrides for the configuration file.
#[derive(Args, Debug, Clone, Default, PartialEq)]
pub struct RunArgs {
    /// Modifier keys that suspend focus-follows-mouse while held
    /// (`fn`, `shift`, `alt`, `cmd`, `ctrl`, e.g. "cmd+alt").
    #[arg(long, value_name = "KEYS")]
    pub bypass_modifier: Option<String>,

    /// Delay in seconds between selecting a window and focusing it.
    #[arg(long, value_name = "SECONDS")]
    pub focus_delay: Option<f64>,

    /// Minimum milliseconds between two processed mouse movements.
    #[arg(long, value_name = "MS")]
    pub mouse_motion_interval: Option<f64>,

    /// Stop following the mouse while the focused window is floating.
    #[arg(long, value_name = "BOOL")]
    pub standby_on_float: Option<bool>,
}

impl RunArgs {
    /// Returns `config` with every given override applied.
    #[must_use]
    pub fn apply(&self, mut config: FfmConfig) -> FfmConfig {
        if let Some(bypass) = &self.bypass_modifier {
            config.bypass_modifier.clone_from(bypass);
        }
        if let Some(delay) = self.focus_delay {
            config.focus_delay = delay;
        }
        if let Some(interval) = self.mouse_motion_interval {
            config.mouse_motion_interval = interval;
        }
        if let Some(standby) = self.standby_on_float {
            config.standby_on_float = standby;
        }
        config
    }
}

/// Loads the configuration, applies overrides and runs until interrupted.
///
/// # Errors
///
/// Returns the lifecycle error if focus-follows-mouse cannot start.
pub fn execute(args: &RunArgs) -> Result<(), FfmError> {
    let config = args.apply(config::init().clone());
    if let Some(path) = config::get_config_path() {
        tracing::debug!(path = %path.display(), "ffm: using configuration file");
    }

    init::run(&FfmSettings::from(&config))
}
