//! macOS event sources feeding the focus actor.
//!
//! - [`mouse_monitor`] - `CGEventTap` for pointer motion
//! - [`app_monitor`] - `NSWorkspace` application activation
//! - [`focus_observer`] - `AXFocusedWindowChanged` on the frontmost application

pub mod app_monitor;
pub mod focus_observer;
pub mod mouse_monitor;

pub use app_monitor::AppMonitor;
pub use focus_observer::FocusObserver;
pub use mouse_monitor::MouseMonitor;
