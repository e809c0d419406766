//! CLI module for ffm.
//!
//! Running `ffm` with no subcommand (or `ffm run`) starts focus-follows-mouse
//! in the foreground. The other subcommands inspect and scaffold the
//! configuration file.

mod commands;

pub use commands::{Cli, Commands, ConfigCommands, RunArgs};
