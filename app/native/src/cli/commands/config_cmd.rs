//! Config CLI commands.
//!
//! Commands for managing the ffm configuration file.

use std::path::PathBuf;

use clap::Subcommand;
use colored::Colorize;

use crate::config::template::{create_config_file, generate_config_template};
use crate::config::{self, config_paths};
use crate::error::FfmError;

/// Config management commands.
#[derive(Subcommand, Debug, Clone)]
#[command(next_display_order = None)]
pub enum ConfigCommands {
    /// Initialize a new configuration file with all options documented.
    ///
    /// Creates a new configuration file at the default location with all
    /// available options commented out.
    #[command(
        name = "init",
        after_long_help = r#"Examples:
  ffm config init              # Create config at default location
  ffm config init --force      # Overwrite existing config
  ffm config init --path ~/my-config.jsonc  # Create at custom path
  ffm config init --stdout     # Print template to stdout"#
    )]
    Init {
        /// Overwrite existing configuration file if it exists.
        #[arg(long, short)]
        force: bool,

        /// Custom path for the configuration file.
        /// If not specified, uses ~/.config/ffm/config.jsonc
        #[arg(long, short, value_name = "PATH")]
        path: Option<PathBuf>,

        /// Print the configuration template to stdout instead of writing to a file.
        #[arg(long)]
        stdout: bool,
    },

    /// Show the effective configuration as JSON.
    ///
    /// Prints the loaded configuration with defaults filled in.
    Show,

    /// Show the path to the configuration file.
    ///
    /// Displays the paths where ffm looks for configuration files, and
    /// indicates which one is currently in use (if any).
    Path,
}

/// Execute config subcommands.
///
/// # Errors
///
/// Returns an error if the command execution fails.
pub fn execute(cmd: &ConfigCommands) -> Result<(), FfmError> {
    match cmd {
        ConfigCommands::Init { force, path, stdout } => {
            if *stdout {
                println!("{}", generate_config_template());
                Ok(())
            } else {
                init_config(*force, path.clone())
            }
        }
        ConfigCommands::Show => show_config(),
        ConfigCommands::Path => {
            show_config_path();
            Ok(())
        }
    }
}

/// Initialize a new configuration file.
fn init_config(force: bool, custom_path: Option<PathBuf>) -> Result<(), FfmError> {
    let config_path = custom_path
        .or_else(config::default_config_path)
        .unwrap_or_else(|| PathBuf::from("config.jsonc"));

    if config_path.exists() && !force {
        return Err(FfmError::Config(format!(
            "Configuration file already exists at: {}\nUse --force to overwrite.",
            config_path.display()
        )));
    }

    create_config_file(&config_path).map_err(|e| {
        FfmError::Config(format!("Failed to create config file {}: {e}", config_path.display()))
    })?;

    println!("{} {}", "Configuration file created at:".green(), config_path.display());
    println!("\nAll options are commented out by default.");
    println!("Edit the file and uncomment the options you want to configure.");

    Ok(())
}

/// Print the effective configuration.
fn show_config() -> Result<(), FfmError> {
    let (config, source) = match config::load() {
        Ok((config, path)) => (config, Some(path)),
        Err(config::ConfigError::NotFound) => (config::FfmConfig::default(), None),
        Err(err) => return Err(err.into()),
    };

    match source {
        Some(path) => eprintln!("# {}", path.display()),
        None => eprintln!("# defaults (no configuration file found)"),
    }
    println!("{}", serde_json::to_string_pretty(&config)?);

    Ok(())
}

/// Show the configuration file search paths.
fn show_config_path() {
    println!("Configuration file search paths (in priority order):\n");

    if let Some(custom) = config::custom_config_path() {
        println!("  --config {} {}", custom.display(), "(active)".green());
        return;
    }

    let mut found_config = false;
    for (i, path) in config_paths().iter().enumerate() {
        let exists = path.exists();
        let marker = if exists && !found_config {
            found_config = true;
            " (active)".green()
        } else if exists {
            " (exists)".dimmed()
        } else {
            "".normal()
        };

        println!("  {}. {}{}", i + 1, path.display(), marker);
    }

    if !found_config {
        println!("\nNo configuration file found.");
        println!("Run 'ffm config init' to create one.");
    }
}
