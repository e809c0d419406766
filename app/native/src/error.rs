//! Error types for ffm.
//!
//! This module provides the error type returned by the lifecycle and the CLI.
//! Pipeline outcomes such as "no window under the pointer" are not errors:
//! they are [`Decision`](crate::modules::ffm::Decision) values.

use thiserror::Error;

use crate::config::ConfigError;
use crate::modules::ffm::ActorError;

/// Errors that can occur while running focus-follows-mouse.
#[derive(Debug, Error)]
pub enum FfmError {
    /// A required OS resource (system-wide accessibility element, event tap,
    /// window server connection) could not be obtained.
    #[error("Resource unavailable: {0}")]
    ResourceUnavailable(String),
    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),
    /// IO error.
    #[error("IO error: {0}")]
    Io(String),
    /// The current platform cannot run the focus pipeline.
    #[error("Unsupported: {0}")]
    Unsupported(String),
    /// The focus actor could not be reached.
    #[error("Actor error: {0}")]
    Actor(String),
}

impl From<std::io::Error> for FfmError {
    fn from(err: std::io::Error) -> Self { Self::Io(err.to_string()) }
}

impl From<ConfigError> for FfmError {
    fn from(err: ConfigError) -> Self { Self::Config(err.to_string()) }
}

impl From<serde_json::Error> for FfmError {
    fn from(err: serde_json::Error) -> Self { Self::Config(err.to_string()) }
}

impl From<ActorError> for FfmError {
    fn from(err: ActorError) -> Self { Self::Actor(err.to_string()) }
}
