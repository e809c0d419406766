//! CLI command definitions using Clap.
//!
//! - `config_cmd` - Configuration file management commands
//! - `run_cmd` - Starting focus-follows-mouse with per-run overrides

use std::io;
use std::path::PathBuf;

use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::{Generator, Shell, generate};

use crate::config::{self, FfmConfig};
use crate::error::FfmError;

pub mod config_cmd;
pub mod run_cmd;

pub use config_cmd::ConfigCommands;
pub use run_cmd::RunArgs;

/// Application version from Cargo.toml.
const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// ffm - focus follows mouse for macOS.
#[derive(Parser, Debug)]
#[command(name = "ffm")]
#[command(author, version = APP_VERSION, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to a custom configuration file.
    ///
    /// Overrides the default configuration file search paths.
    /// Supports JSONC format (JSON with comments).
    #[arg(long, short, global = true, value_name = "PATH")]
    pub config: Option<String>,

    /// Enable debug logging. `RUST_LOG` takes precedence when set.
    #[arg(long, short, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

/// Available CLI commands.
#[derive(Subcommand, Debug, Clone)]
#[command(next_display_order = None)]
pub enum Commands {
    /// Start focus-follows-mouse in the foreground.
    ///
    /// This is the default when no subcommand is given. Press Ctrl-C to stop.
    Run(RunArgs),

    /// Configuration file management commands.
    ///
    /// Initialize, view, and locate the configuration file.
    #[command(subcommand)]
    Config(ConfigCommands),

    /// Output the configuration JSON Schema.
    ///
    /// Outputs a JSON Schema to stdout that describes the structure of the
    /// configuration file. Can be redirected to a file for use with editors
    /// that support JSON Schema validation.
    Schema,

    /// Generate shell completions.
    ///
    /// Outputs shell completion script to stdout for the specified shell.
    ///
    /// Usage:
    ///   eval "$(ffm completions --shell zsh)"
    ///   ffm completions --shell fish > ~/.config/fish/completions/ffm.fish
    Completions {
        /// The shell to generate completions for.
        #[arg(long, short, value_enum)]
        shell: Shell,
    },
}

impl Cli {
    /// Returns the custom config path if specified via --config flag.
    #[must_use]
    pub fn config_path(&self) -> Option<PathBuf> { self.config.as_ref().map(PathBuf::from) }

    /// The subcommand to execute. Defaults to `run` without overrides.
    #[must_use]
    pub fn subcommand(&self) -> Commands {
        match &self.command {
            Some(command) => command.clone(),
            None => Commands::Run(RunArgs::default()),
        }
    }

    /// Execute the CLI command.
    ///
    /// # Errors
    ///
    /// Returns an error if the command execution fails.
    pub fn execute(&self) -> Result<(), FfmError> {
        if let Some(path) = self.config_path() {
            if !path.exists() {
                return Err(FfmError::Config(format!(
                    "Configuration file not found: {}",
                    path.display()
                )));
            }
            config::set_custom_config_path(path);
        }

        match self.subcommand() {
            Commands::Run(args) => run_cmd::execute(&args),
            Commands::Config(cmd) => config_cmd::execute(&cmd),

            Commands::Schema => {
                println!("{}", print_schema()?);
                Ok(())
            }

            Commands::Completions { shell } => {
                Self::print_completions(shell);
                Ok(())
            }
        }
    }

    /// Print shell completions to stdout.
    fn print_completions<G: Generator>(generator: G) {
        let mut cmd = Self::command();
        generate(generator, &mut cmd, "ffm", &mut io::stdout());
    }
}

/// Renders the configuration JSON Schema.
///
/// # Errors
///
/// Returns [`FfmError::Config`] if the schema cannot be serialized.
pub fn print_schema() -> Result<String, FfmError> {
    let schema = schemars::schema_for!(FfmConfig);
    Ok(serde_json::to_string_pretty(&schema)?)
}
