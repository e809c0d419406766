//! In-memory collaborators for driving the focus pipeline without a window
//! server.
//!
//! [`FakeDesktop`] implements both [`WindowServer`] and [`Accessibility`] over
//! a list of placed windows and counts every element it hands out and gets
//! back, so callers can check that each element is released exactly once.
//! [`FakeTimer`] records scheduled and cancelled commits instead of running
//! them. Both are cheap to clone; clones share state.

use std::ops::Range;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;

use super::backend::{
    Accessibility, CommitTimer, CommitToken, ConnectionId, Pid, WindowHit, WindowId, WindowServer,
};
use super::eligibility::levels;
use super::motion::ScreenPoint;
use super::resolver::WINDOW_ROLE;

/// A window placed on the fake desktop.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FakeWindow {
    pub window_id: WindowId,
    pub pid: Pid,
    pub connection: ConnectionId,
    pub level: i32,
    /// Role of the element found by the accessibility hit test.
    pub hit_role: &'static str,
}

impl FakeWindow {
    /// A normal-level window whose hit test lands directly on the window element.
    #[must_use]
    pub const fn normal(window_id: WindowId, pid: Pid) -> Self {
        Self {
            window_id,
            pid,
            connection: pid + 100,
            level: levels::NORMAL,
            hit_role: WINDOW_ROLE,
        }
    }

    #[must_use]
    pub const fn with_level(mut self, level: i32) -> Self {
        self.level = level;
        self
    }

    #[must_use]
    pub const fn with_connection(mut self, connection: ConnectionId) -> Self {
        self.connection = connection;
        self
    }

    /// Makes the accessibility hit test land on a child element with `role`.
    #[must_use]
    pub const fn with_hit_role(mut self, role: &'static str) -> Self {
        self.hit_role = role;
        self
    }
}

/// A focus change requested through [`Accessibility`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FocusCall {
    Window(WindowId),
    Application(Pid),
}

#[derive(Debug, Default)]
struct DesktopState {
    own_connection: ConnectionId,
    /// Placed windows, topmost last.
    windows: Vec<(Range<f64>, FakeWindow)>,
    focused_windows: Vec<(Pid, WindowId)>,
    ax_hit_test_empty: bool,
    window_attribute_missing: bool,
    pid_lookup_fails: bool,
    acquired: usize,
    released: Vec<WindowId>,
    focus_calls: Vec<FocusCall>,
}

impl DesktopState {
    fn window_at(&self, point: ScreenPoint) -> Option<FakeWindow> {
        self.windows
            .iter()
            .rev()
            .find(|(span, _)| span.contains(&point.x))
            .map(|(_, window)| *window)
    }

    fn window(&self, window_id: WindowId) -> Option<FakeWindow> {
        self.windows.iter().map(|(_, window)| *window).find(|w| w.window_id == window_id)
    }
}

/// Fake window server and accessibility tree.
#[derive(Debug, Clone, Default)]
pub struct FakeDesktop {
    state: Arc<Mutex<DesktopState>>,
}

impl FakeDesktop {
    /// Creates an empty desktop. `own_connection` is the caller's connection.
    #[must_use]
    pub fn new(own_connection: ConnectionId) -> Self {
        let desktop = Self::default();
        desktop.state.lock().own_connection = own_connection;
        desktop
    }

    /// Places `window` over the whole screen, above everything else.
    pub fn set_window(&self, window: FakeWindow) {
        self.place_window(window, f64::MIN..f64::MAX);
    }

    /// Places `window` over the horizontal span `x`, above everything else.
    pub fn place_window(&self, window: FakeWindow, x: Range<f64>) {
        let mut state = self.state.lock();
        state.windows.retain(|(_, w)| w.window_id != window.window_id);
        state.windows.push((x, window));
    }

    /// Removes every window.
    pub fn clear_windows(&self) { self.state.lock().windows.clear(); }

    /// Sets the window reported as focused for `pid`.
    pub fn set_focused_window_of(&self, pid: Pid, window_id: WindowId) {
        let mut state = self.state.lock();
        state.focused_windows.retain(|(p, _)| *p != pid);
        state.focused_windows.push((pid, window_id));
    }

    /// Makes the accessibility hit test find nothing.
    pub fn set_hit_test_empty(&self, empty: bool) { self.state.lock().ax_hit_test_empty = empty; }

    /// Makes child elements report no containing window.
    pub fn set_window_attribute_missing(&self, missing: bool) {
        self.state.lock().window_attribute_missing = missing;
    }

    /// Makes process lookups by connection fail.
    pub fn set_pid_lookup_fails(&self, fails: bool) { self.state.lock().pid_lookup_fails = fails; }

    /// Hands out a window element for `window_id` as the accessibility layer would.
    #[must_use]
    pub fn window_element(&self, window_id: WindowId) -> FakeElement {
        self.acquire(window_id, WINDOW_ROLE)
    }

    /// Number of elements handed out.
    #[must_use]
    pub fn acquired(&self) -> usize { self.state.lock().acquired }

    /// Number of elements released.
    #[must_use]
    pub fn released(&self) -> usize { self.state.lock().released.len() }

    /// Window ids of released elements, in release order.
    #[must_use]
    pub fn released_windows(&self) -> Vec<WindowId> { self.state.lock().released.clone() }

    /// Elements handed out and not yet released.
    #[must_use]
    pub fn live_elements(&self) -> usize {
        let state = self.state.lock();
        state.acquired - state.released.len()
    }

    /// Focus changes requested so far.
    #[must_use]
    pub fn focus_calls(&self) -> Vec<FocusCall> { self.state.lock().focus_calls.clone() }

    fn acquire(&self, window_id: WindowId, role: &'static str) -> FakeElement {
        self.state.lock().acquired += 1;
        FakeElement {
            window_id,
            role,
            state: Arc::clone(&self.state),
        }
    }
}

impl WindowServer for FakeDesktop {
    fn own_connection(&self) -> ConnectionId { self.state.lock().own_connection }

    fn hit_test(&self, point: ScreenPoint) -> Option<WindowHit> {
        self.state.lock().window_at(point).map(|window| WindowHit {
            window_id: window.window_id,
            connection: window.connection,
        })
    }

    fn window_level(&self, window_id: WindowId) -> i32 {
        self.state.lock().window(window_id).map_or(levels::NORMAL, |window| window.level)
    }

    fn connection_pid(&self, connection: ConnectionId) -> Option<Pid> {
        let state = self.state.lock();
        if state.pid_lookup_fails {
            return None;
        }
        state
            .windows
            .iter()
            .find(|(_, window)| window.connection == connection)
            .map(|(_, window)| window.pid)
    }
}

impl Accessibility for FakeDesktop {
    type Element = FakeElement;

    fn element_at_position(&self, point: ScreenPoint) -> Option<FakeElement> {
        let window = {
            let state = self.state.lock();
            if state.ax_hit_test_empty {
                return None;
            }
            state.window_at(point)?
        };
        Some(self.acquire(window.window_id, window.hit_role))
    }

    fn role(&self, element: &FakeElement) -> Option<String> { Some(element.role.to_string()) }

    fn window_of(&self, element: &FakeElement) -> Option<FakeElement> {
        if self.state.lock().window_attribute_missing {
            return None;
        }
        Some(self.acquire(element.window_id, WINDOW_ROLE))
    }

    fn focused_window_of(&self, pid: Pid) -> Option<WindowId> {
        self.state
            .lock()
            .focused_windows
            .iter()
            .find(|(p, _)| *p == pid)
            .map(|(_, window_id)| *window_id)
    }

    fn set_focused_window(&self, window: &FakeElement) {
        self.state.lock().focus_calls.push(FocusCall::Window(window.window_id));
    }

    fn set_focused_application(&self, pid: Pid) {
        self.state.lock().focus_calls.push(FocusCall::Application(pid));
    }
}

/// Element handed out by [`FakeDesktop`]. Dropping it records a release.
pub struct FakeElement {
    window_id: WindowId,
    role: &'static str,
    state: Arc<Mutex<DesktopState>>,
}

impl FakeElement {
    #[must_use]
    pub const fn window_id(&self) -> WindowId { self.window_id }
}

impl Drop for FakeElement {
    fn drop(&mut self) { self.state.lock().released.push(self.window_id); }
}

impl std::fmt::Debug for FakeElement {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FakeElement")
            .field("window_id", &self.window_id)
            .field("role", &self.role)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Default)]
struct TimerState {
    scheduled: Vec<(Duration, CommitToken)>,
    cancelled: Vec<CommitToken>,
}

/// Timer that records requests instead of running them.
#[derive(Debug, Clone, Default)]
pub struct FakeTimer {
    state: Arc<Mutex<TimerState>>,
}

impl FakeTimer {
    #[must_use]
    pub fn new() -> Self { Self::default() }

    /// Every schedule request, in order.
    #[must_use]
    pub fn scheduled(&self) -> Vec<(Duration, CommitToken)> { self.state.lock().scheduled.clone() }

    /// Every cancelled token, in order.
    #[must_use]
    pub fn cancelled(&self) -> Vec<CommitToken> { self.state.lock().cancelled.clone() }

    /// The most recently scheduled token.
    #[must_use]
    pub fn last_token(&self) -> Option<CommitToken> {
        self.state.lock().scheduled.last().map(|(_, token)| *token)
    }
}

impl CommitTimer for FakeTimer {
    type Handle = CommitToken;

    fn schedule_once(&mut self, delay: Duration, token: CommitToken) -> CommitToken {
        self.state.lock().scheduled.push((delay, token));
        token
    }

    fn cancel(&mut self, handle: CommitToken) { self.state.lock().cancelled.push(handle); }
}
