//! Rules deciding whether a candidate window should become the focus target.

use super::backend::{ConnectionId, WindowId};
use super::modifiers::Modifiers;
use super::motion::MotionEvent;
use super::resolver::WindowTarget;
use super::tracker::TrackerState;

/// Window levels that may receive focus.
pub mod levels {
    /// `kCGNormalWindowLevel`.
    pub const NORMAL: i32 = 0;
    /// `kCGFloatingWindowLevel`.
    pub const FLOATING: i32 = 3;
    /// `kCGModalPanelWindowLevel`.
    pub const MODAL_PANEL: i32 = 8;

    /// Levels eligible for focus-follows-mouse.
    pub const ALLOWED: [i32; 3] = [NORMAL, FLOATING, MODAL_PANEL];
}

/// Returns whether windows at `level` may be focused.
#[must_use]
pub fn is_level_allowed(level: i32) -> bool { levels::ALLOWED.contains(&level) }

/// Why a candidate was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectReason {
    /// Nothing usable under the pointer.
    NoCandidate,
    /// The window already has focus.
    AlreadyFocused,
    /// The window belongs to our own connection.
    OwnConnection,
    /// The window level is not in the allow-set.
    LevelNotAllowed,
    /// All bypass modifiers are held.
    BypassHeld,
    /// Standby-on-float is in effect.
    Standby,
}

/// Outcome of evaluating a candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Reject(RejectReason),
    /// The candidate is already the pending target; nothing to do.
    AlreadyPending,
    Accept,
}

/// Static eligibility configuration.
#[derive(Debug, Clone, Copy)]
pub struct EligibilityFilter {
    bypass: Modifiers,
    standby_on_float: bool,
    own_connection: ConnectionId,
}

impl EligibilityFilter {
    #[must_use]
    pub const fn new(
        bypass: Modifiers,
        standby_on_float: bool,
        own_connection: ConnectionId,
    ) -> Self {
        Self { bypass, standby_on_float, own_connection }
    }

    #[must_use]
    pub const fn bypass(&self) -> Modifiers { self.bypass }

    #[must_use]
    pub const fn standby_on_float(&self) -> bool { self.standby_on_float }

    /// Checks the rules that do not depend on the candidate.
    ///
    /// Returns the rejection reason if focus-follows-mouse is suppressed for
    /// this event regardless of what is under the pointer.
    #[must_use]
    pub fn suppression(&self, event: &MotionEvent, tracker: &TrackerState) -> Option<RejectReason> {
        if event.modifiers.holds_all(self.bypass) {
            return Some(RejectReason::BypassHeld);
        }

        if self.standby_on_float && !tracker.is_active() {
            return Some(RejectReason::Standby);
        }

        None
    }

    /// Decides what to do with `candidate`. The first matching rule wins.
    #[must_use]
    pub fn evaluate(
        &self,
        candidate: Option<&WindowTarget>,
        event: &MotionEvent,
        tracker: &TrackerState,
        pending_target: Option<WindowId>,
    ) -> Decision {
        let Some(candidate) = candidate else {
            return Decision::Reject(RejectReason::NoCandidate);
        };

        if tracker.focused_window_id() == Some(candidate.window_id) {
            return Decision::Reject(RejectReason::AlreadyFocused);
        }

        if candidate.connection == self.own_connection {
            return Decision::Reject(RejectReason::OwnConnection);
        }

        if !is_level_allowed(candidate.level) {
            return Decision::Reject(RejectReason::LevelNotAllowed);
        }

        if let Some(reason) = self.suppression(event, tracker) {
            return Decision::Reject(reason);
        }

        if pending_target == Some(candidate.window_id) {
            return Decision::AlreadyPending;
        }

        Decision::Accept
    }
}
