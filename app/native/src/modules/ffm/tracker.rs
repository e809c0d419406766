//! Focus state fed by host and tiling notifications.
//!
//! The tracker holds the window the host reports as focused and whether
//! focus-follows-mouse is active (the focused window is not floating). Both
//! fields are written by notification handlers and read by the eligibility
//! rules, possibly from a different thread than the one that wrote them, so
//! they are plain atomics. Each field is independent and brief staleness is
//! tolerated.

use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};

use super::backend::WindowId;

/// Bit in the tiling float status that marks the window as floating.
pub const FLOAT_STATUS_FLOATING: u32 = 0x1;

/// Process-wide focus state.
#[derive(Debug)]
pub struct TrackerState {
    /// Focused window id, `0` when unknown.
    focused_window_id: AtomicU32,
    /// Whether tracking is active (the focused window is tiled).
    active: AtomicBool,
}

impl Default for TrackerState {
    fn default() -> Self { Self::new() }
}

impl TrackerState {
    /// Creates a tracker with no focused window and tracking active.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            focused_window_id: AtomicU32::new(0),
            active: AtomicBool::new(true),
        }
    }

    /// The focused window, if known.
    #[must_use]
    pub fn focused_window_id(&self) -> Option<WindowId> {
        match self.focused_window_id.load(Ordering::Relaxed) {
            0 => None,
            id => Some(id),
        }
    }

    pub fn set_focused_window_id(&self, window_id: WindowId) {
        self.focused_window_id.store(window_id, Ordering::Relaxed);
    }

    #[must_use]
    pub fn is_active(&self) -> bool { self.active.load(Ordering::Relaxed) }

    pub fn set_active(&self, active: bool) { self.active.store(active, Ordering::Relaxed); }

    /// Applies a tiling float status change.
    ///
    /// Bit 0 set means the focused window is floating, which puts
    /// focus-follows-mouse on standby.
    pub fn apply_float_status(&self, status: u32) {
        self.set_active(status & FLOAT_STATUS_FLOATING == 0);
    }
}
