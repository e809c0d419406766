//! Platform helpers shared by the macOS integration.
//!
//! - [`objc`] - Objective-C helper utilities (macOS only)
//! - [`thread`] - Named thread spawning

#[cfg(target_os = "macos")]
pub mod objc;
pub mod thread;

#[cfg(target_os = "macos")]
pub use objc::nsstring;
pub use thread::spawn_named_thread;
