//! Delayed focus commits.
//!
//! The scheduler holds at most one [`PendingCommit`]. Scheduling a new target
//! supersedes the old one, cancelling its timer and releasing its element
//! before the new element is adopted. When the timer fires with the current
//! token, the window and its application are focused and the element is
//! released.
//!
//! ```text
//!            schedule                 schedule (supersede)
//!   Idle ───────────────▶ Pending ◀───────────────┐
//!    ▲                       │ │                   │
//!    │   cancel / teardown   │ └───────────────────┘
//!    ├───────────────────────┤
//!    │   fire(token)         │
//!    └───────────────────────┘
//! ```

use std::time::Duration;

use super::backend::{Accessibility, CommitTimer, CommitToken, Pid, WindowId};
use super::resolver::CandidateWindow;

/// A scheduled focus change.
#[derive(Debug)]
pub struct PendingCommit<E, H> {
    pub window_id: WindowId,
    pub pid: Pid,
    pub token: CommitToken,
    element: E,
    timer: H,
}

impl<E, H> PendingCommit<E, H> {
    /// The window element that will receive focus.
    #[must_use]
    pub const fn element(&self) -> &E { &self.element }
}

/// Single-slot delayed commit state machine.
pub struct CommitScheduler<E, T: CommitTimer> {
    timer: T,
    delay: Duration,
    pending: Option<PendingCommit<E, T::Handle>>,
    next_token: u64,
}

impl<E, T: CommitTimer> CommitScheduler<E, T> {
    #[must_use]
    pub const fn new(timer: T, delay: Duration) -> Self {
        Self {
            timer,
            delay,
            pending: None,
            next_token: 0,
        }
    }

    /// The configured focus delay.
    #[must_use]
    pub const fn delay(&self) -> Duration { self.delay }

    /// Window id of the pending commit, if any.
    #[must_use]
    pub fn pending_target(&self) -> Option<WindowId> {
        self.pending.as_ref().map(|pending| pending.window_id)
    }

    #[must_use]
    pub const fn pending(&self) -> Option<&PendingCommit<E, T::Handle>> { self.pending.as_ref() }

    #[must_use]
    pub const fn is_idle(&self) -> bool { self.pending.is_none() }

    #[must_use]
    pub const fn timer(&self) -> &T { &self.timer }

    /// Takes ownership of `candidate` and schedules it, superseding any
    /// pending commit.
    pub fn schedule(&mut self, candidate: CandidateWindow<E>) -> CommitToken {
        self.cancel();

        self.next_token = self.next_token.wrapping_add(1);
        let token = CommitToken(self.next_token);
        let handle = self.timer.schedule_once(self.delay, token);

        tracing::debug!(
            window_id = candidate.window_id,
            pid = candidate.pid,
            delay_ms = self.delay.as_millis(),
            "ffm: focus scheduled"
        );

        self.pending = Some(PendingCommit {
            window_id: candidate.window_id,
            pid: candidate.pid,
            token,
            element: candidate.element,
            timer: handle,
        });

        token
    }

    /// Cancels the pending commit and releases its element.
    ///
    /// Returns `true` if a commit was pending. Safe to call when idle.
    pub fn cancel(&mut self) -> bool {
        let Some(pending) = self.pending.take() else {
            return false;
        };

        let PendingCommit { window_id, timer, element, .. } = pending;
        self.timer.cancel(timer);
        drop(element);

        tracing::trace!(window_id, "ffm: pending focus cancelled");
        true
    }

    /// Handles a timer expiry.
    ///
    /// Commits the pending target if `token` belongs to it. Returns the
    /// committed window id, or `None` for a stale token.
    pub fn fire<A>(&mut self, token: CommitToken, accessibility: &A) -> Option<WindowId>
    where A: Accessibility<Element = E> {
        if self.pending.as_ref().is_none_or(|pending| pending.token != token) {
            tracing::trace!(token = token.0, "ffm: ignoring stale commit timer");
            return None;
        }

        let PendingCommit { window_id, pid, element, .. } = self.pending.take()?;

        accessibility.set_focused_window(&element);
        accessibility.set_focused_application(pid);
        drop(element);

        tracing::debug!(window_id, pid, "ffm: focus committed");
        Some(window_id)
    }
}
