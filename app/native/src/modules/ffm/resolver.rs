//! Hit-testing the screen into a classified candidate window.
//!
//! Resolution happens in two steps. [`WindowResolver::locate`] only asks the
//! window server, so every eligibility rule can run without holding an
//! accessibility element. [`WindowResolver::attach`] then looks up the window
//! element for a target that is going to be scheduled.

use super::backend::{Accessibility, ConnectionId, Pid, WindowId, WindowServer};
use super::motion::ScreenPoint;

/// Accessibility role of a top-level window.
pub const WINDOW_ROLE: &str = "AXWindow";

/// Window server facts about the window under the pointer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowTarget {
    pub window_id: WindowId,
    pub pid: Pid,
    pub connection: ConnectionId,
    pub level: i32,
}

/// A window target together with its owned accessibility element.
#[derive(Debug)]
pub struct CandidateWindow<E> {
    pub window_id: WindowId,
    pub pid: Pid,
    pub connection: ConnectionId,
    pub level: i32,
    /// Owned window element. Released when the candidate is dropped unless it
    /// is moved into a pending commit.
    pub element: E,
}

impl<E> CandidateWindow<E> {
    #[must_use]
    pub const fn new(target: WindowTarget, element: E) -> Self {
        Self {
            window_id: target.window_id,
            pid: target.pid,
            connection: target.connection,
            level: target.level,
            element,
        }
    }
}

/// Resolves screen positions into [`WindowTarget`]s and [`CandidateWindow`]s.
pub struct WindowResolver<'a, W, A> {
    window_server: &'a W,
    accessibility: &'a A,
}

impl<'a, W, A> WindowResolver<'a, W, A>
where
    W: WindowServer,
    A: Accessibility,
{
    #[must_use]
    pub const fn new(window_server: &'a W, accessibility: &'a A) -> Self {
        Self { window_server, accessibility }
    }

    /// Finds the window under `point` using the window server only.
    ///
    /// Returns `None` when there is no window, the window belongs to
    /// `caller` (our own overlays), or the owning process cannot be resolved.
    pub fn locate(&self, point: ScreenPoint, caller: ConnectionId) -> Option<WindowTarget> {
        let hit = self.window_server.hit_test(point)?;
        if hit.window_id == 0 {
            return None;
        }

        if hit.connection == caller {
            tracing::trace!(window_id = hit.window_id, "ffm: ignoring own window");
            return None;
        }

        let Some(pid) = self.window_server.connection_pid(hit.connection) else {
            tracing::trace!(
                window_id = hit.window_id,
                connection = hit.connection,
                "ffm: could not resolve owning process"
            );
            return None;
        };

        Some(WindowTarget {
            window_id: hit.window_id,
            pid,
            connection: hit.connection,
            level: self.window_server.window_level(hit.window_id),
        })
    }

    /// Acquires the accessibility window element at `point` for `target`.
    ///
    /// Returns `None` when the accessibility tree has nothing at the point
    /// or the element has no containing window. Elements looked up along the
    /// way are released before returning.
    pub fn attach(
        &self,
        target: WindowTarget,
        point: ScreenPoint,
    ) -> Option<CandidateWindow<A::Element>> {
        let element = self.accessibility.element_at_position(point)?;
        let element = self.window_element(element)?;
        Some(CandidateWindow::new(target, element))
    }

    /// Turns an arbitrary element into the window element that contains it.
    fn window_element(&self, element: A::Element) -> Option<A::Element> {
        let role = self.accessibility.role(&element)?;
        if role == WINDOW_ROLE {
            return Some(element);
        }

        // `element` is dropped here, the containing window is a new reference.
        self.accessibility.window_of(&element)
    }
}
