//! Collaborator interfaces used by the focus pipeline.
//!
//! The pipeline never touches the window server, the accessibility API or
//! the run loop directly. It talks to these traits, which are implemented by
//! the macOS FFI layer in production and by recording fakes in tests.

use std::time::Duration;

use super::motion::ScreenPoint;

/// Window server identifier for a window.
pub type WindowId = u32;

/// Process identifier.
pub type Pid = i32;

/// Window server client connection identifier.
pub type ConnectionId = i32;

/// Result of a window server hit test.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowHit {
    /// The window under the point.
    pub window_id: WindowId,
    /// The connection that owns the window.
    pub connection: ConnectionId,
}

/// Geometry and classification queries against the window server.
pub trait WindowServer {
    /// The connection of the current process.
    fn own_connection(&self) -> ConnectionId;

    /// Finds the topmost window at `point`.
    fn hit_test(&self, point: ScreenPoint) -> Option<WindowHit>;

    /// Returns the window's stacking level.
    fn window_level(&self, window_id: WindowId) -> i32;

    /// Resolves the process that owns `connection`.
    fn connection_pid(&self, connection: ConnectionId) -> Option<Pid>;
}

/// Accessibility element queries and focus changes.
///
/// `Element` is an owned, move-only handle. Dropping it releases the
/// underlying foreign reference, so every exit path releases exactly once.
pub trait Accessibility {
    /// Owned UI element handle.
    type Element;

    /// Accessibility hit test at `point`.
    fn element_at_position(&self, point: ScreenPoint) -> Option<Self::Element>;

    /// The element's role, e.g. `"AXWindow"` or `"AXButton"`.
    fn role(&self, element: &Self::Element) -> Option<String>;

    /// The window that contains `element` (`AXWindow` attribute).
    fn window_of(&self, element: &Self::Element) -> Option<Self::Element>;

    /// The window id of the focused window of the application `pid`.
    fn focused_window_of(&self, pid: Pid) -> Option<WindowId>;

    /// Makes `window` the focused window of its application.
    fn set_focused_window(&self, window: &Self::Element);

    /// Makes `pid` the frontmost application.
    fn set_focused_application(&self, pid: Pid);
}

/// Identifies one scheduled commit.
///
/// Every schedule gets a fresh token. A timer that fires with a token that no
/// longer matches the pending commit is ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CommitToken(pub u64);

/// One-shot timer facility.
pub trait CommitTimer {
    /// Handle used to cancel a scheduled timer.
    type Handle;

    /// Schedules delivery of `token` back to the controller after `delay`.
    fn schedule_once(&mut self, delay: Duration, token: CommitToken) -> Self::Handle;

    /// Cancels a scheduled timer. Cancelling a timer that already fired is a no-op.
    fn cancel(&mut self, handle: Self::Handle);
}
