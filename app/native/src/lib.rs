//! ffm - focus follows mouse for macOS tiling window managers.
//!
//! Moving the pointer over a window focuses it, after a debounce and an
//! optional delay. The pipeline lives in [`modules::ffm`]; this crate also
//! provides the configuration loader and the `ffm` command line.

pub mod cli;
pub mod config;
pub mod error;
pub mod modules;
pub mod platform;
