//! The focus-follows-mouse pipeline.
//!
//! [`FocusController`] owns every piece of mutable pipeline state and is
//! driven one message at a time by the actor:
//!
//! ```text
//! MotionEvent ─▶ MotionFilter ─▶ suppression ─▶ locate ─▶ evaluate
//!                                                           │
//!           Accept: attach element, schedule ◀──────────────┤
//!           AlreadyPending: nothing ◀───────────────────────┤
//!           Reject: cancel ◀────────────────────────────────┘
//! ```
//!
//! No accessibility element is acquired before a target is accepted.
//!
//! Host notifications update the shared [`TrackerState`]. Each of them
//! first cancels whatever commit is pending.

use std::sync::Arc;
use std::time::Duration;

use super::backend::{
    Accessibility, CommitTimer, CommitToken, ConnectionId, Pid, WindowId, WindowServer,
};
use super::eligibility::{Decision, EligibilityFilter, RejectReason};
use super::modifiers::Modifiers;
use super::motion::{MotionEvent, MotionFilter};
use super::resolver::WindowResolver;
use super::scheduler::CommitScheduler;
use super::tracker::TrackerState;
use crate::config::FfmConfig;

/// Runtime settings derived from [`FfmConfig`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FfmSettings {
    pub bypass: Modifiers,
    pub standby_on_float: bool,
    pub focus_delay: Duration,
    pub mouse_motion_interval: Duration,
}

impl Default for FfmSettings {
    fn default() -> Self { Self::from(&FfmConfig::default()) }
}

impl From<&FfmConfig> for FfmSettings {
    fn from(config: &FfmConfig) -> Self {
        Self {
            bypass: config.bypass_modifiers(),
            standby_on_float: config.standby_on_float,
            focus_delay: config.focus_delay_duration(),
            mouse_motion_interval: config.mouse_motion_interval_duration(),
        }
    }
}

/// Turns motion events and host notifications into focus commits.
pub struct FocusController<W, A, T>
where
    A: Accessibility,
    T: CommitTimer,
{
    window_server: W,
    accessibility: A,
    own_connection: ConnectionId,
    motion: MotionFilter,
    eligibility: EligibilityFilter,
    scheduler: CommitScheduler<A::Element, T>,
    tracker: Arc<TrackerState>,
}

impl<W, A, T> FocusController<W, A, T>
where
    W: WindowServer,
    A: Accessibility,
    T: CommitTimer,
{
    pub fn new(
        window_server: W,
        accessibility: A,
        timer: T,
        settings: &FfmSettings,
        tracker: Arc<TrackerState>,
    ) -> Self {
        let own_connection = window_server.own_connection();

        Self {
            window_server,
            accessibility,
            own_connection,
            motion: MotionFilter::new(settings.mouse_motion_interval),
            eligibility: EligibilityFilter::new(
                settings.bypass,
                settings.standby_on_float,
                own_connection,
            ),
            scheduler: CommitScheduler::new(timer, settings.focus_delay),
            tracker,
        }
    }

    #[must_use]
    pub const fn tracker(&self) -> &Arc<TrackerState> { &self.tracker }

    #[must_use]
    pub const fn scheduler(&self) -> &CommitScheduler<A::Element, T> { &self.scheduler }

    /// Window id of the pending commit, if any.
    #[must_use]
    pub fn pending_target(&self) -> Option<WindowId> { self.scheduler.pending_target() }

    /// Handles one pointer-motion sample.
    ///
    /// Returns `None` when the sample was debounced, otherwise the decision
    /// that was acted on.
    pub fn on_mouse_moved(&mut self, event: &MotionEvent) -> Option<Decision> {
        if !self.motion.should_process(event.timestamp) {
            return None;
        }

        let decision = match self.eligibility.suppression(event, &self.tracker) {
            Some(reason) => Decision::Reject(reason),
            None => self.evaluate_and_schedule(event),
        };

        if let Decision::Reject(reason) = decision {
            tracing::trace!(?reason, "ffm: candidate rejected");
            self.scheduler.cancel();
        }

        Some(decision)
    }

    /// Runs the eligibility rules on window server facts and, on accept,
    /// acquires the window element and schedules it.
    fn evaluate_and_schedule(&mut self, event: &MotionEvent) -> Decision {
        let resolver = WindowResolver::new(&self.window_server, &self.accessibility);
        let target = resolver.locate(event.position, self.own_connection);
        let decision = self.eligibility.evaluate(
            target.as_ref(),
            event,
            &self.tracker,
            self.scheduler.pending_target(),
        );

        let (Decision::Accept, Some(target)) = (decision, target) else {
            return decision;
        };

        match resolver.attach(target, event.position) {
            Some(candidate) => {
                self.scheduler.schedule(candidate);
                Decision::Accept
            }
            None => {
                tracing::trace!(
                    window_id = target.window_id,
                    "ffm: no accessibility window at point"
                );
                Decision::Reject(RejectReason::NoCandidate)
            }
        }
    }

    /// Handles an expired commit timer.
    ///
    /// The committed window becomes the tracked focused window right away,
    /// so hovering it again does not commit a second time.
    pub fn on_commit_due(&mut self, token: CommitToken) -> Option<WindowId> {
        let window_id = self.scheduler.fire(token, &self.accessibility)?;
        self.tracker.set_focused_window_id(window_id);
        Some(window_id)
    }

    /// The host activated an application.
    pub fn on_application_activated(&mut self, pid: Pid) {
        self.scheduler.cancel();

        match self.accessibility.focused_window_of(pid) {
            Some(window_id) => {
                tracing::debug!(pid, window_id, "ffm: application activated");
                self.tracker.set_focused_window_id(window_id);
            }
            None => tracing::debug!(pid, "ffm: activated application has no focused window"),
        }
    }

    /// The host focused a window.
    pub fn on_window_focused(&mut self, window_id: WindowId) {
        self.scheduler.cancel();

        tracing::debug!(window_id, "ffm: window focused");
        self.tracker.set_focused_window_id(window_id);
    }

    /// The tiling layer changed the float status of a window.
    pub fn on_tiling_float_changed(&mut self, window_id: WindowId, status: u32) {
        self.scheduler.cancel();

        self.tracker.apply_float_status(status);
        tracing::debug!(
            window_id,
            status,
            active = self.tracker.is_active(),
            "ffm: float status changed"
        );
    }

    /// Cancels any pending commit. Called once before the controller is dropped.
    pub fn teardown(&mut self) {
        if self.scheduler.cancel() {
            tracing::debug!("ffm: cancelled pending focus on teardown");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modules::ffm::motion::ScreenPoint;
    use crate::modules::ffm::testing::{FakeDesktop, FakeTimer, FakeWindow, FocusCall};

    const OWN: ConnectionId = 1;
    const MS: u64 = 1_000_000;

    type Controller = FocusController<FakeDesktop, FakeDesktop, FakeTimer>;

    fn settings() -> FfmSettings {
        FfmSettings {
            bypass: Modifiers::FN,
            standby_on_float: true,
            focus_delay: Duration::from_millis(100),
            mouse_motion_interval: Duration::from_millis(35),
        }
    }

    fn controller(desktop: &FakeDesktop, timer: &FakeTimer) -> Controller {
        FocusController::new(
            desktop.clone(),
            desktop.clone(),
            timer.clone(),
            &settings(),
            Arc::new(TrackerState::new()),
        )
    }

    fn moved(ms: u64, x: f64) -> MotionEvent {
        MotionEvent::new(ms * MS, ScreenPoint::new(x, 0.0), Modifiers::empty())
    }

    #[test]
    fn test_settings_from_config() {
        let config = FfmConfig {
            bypass_modifier: "cmd".to_string(),
            focus_delay: 0.1,
            ..Default::default()
        };
        let settings = FfmSettings::from(&config);

        assert_eq!(settings.bypass, Modifiers::CMD);
        assert!(settings.standby_on_float);
        assert_eq!(settings.focus_delay, Duration::from_millis(100));
        assert_eq!(settings.mouse_motion_interval, Duration::from_millis(35));
    }

    #[test]
    fn test_accept_schedules_with_delay() {
        let desktop = FakeDesktop::new(OWN);
        desktop.set_window(FakeWindow::normal(42, 7));
        let timer = FakeTimer::new();
        let mut controller = controller(&desktop, &timer);

        assert_eq!(controller.on_mouse_moved(&moved(0, 10.0)), Some(Decision::Accept));
        assert_eq!(controller.pending_target(), Some(42));
        assert_eq!(timer.scheduled().len(), 1);
        assert_eq!(timer.scheduled()[0].0, Duration::from_millis(100));
    }

    #[test]
    fn test_debounced_event_is_skipped() {
        let desktop = FakeDesktop::new(OWN);
        desktop.set_window(FakeWindow::normal(42, 7));
        let timer = FakeTimer::new();
        let mut controller = controller(&desktop, &timer);

        assert!(controller.on_mouse_moved(&moved(0, 10.0)).is_some());
        let acquired = desktop.acquired();

        assert_eq!(controller.on_mouse_moved(&moved(10, 10.0)), None);
        assert_eq!(desktop.acquired(), acquired);
    }

    #[test]
    fn test_same_target_is_not_rescheduled() {
        let desktop = FakeDesktop::new(OWN);
        desktop.set_window(FakeWindow::normal(42, 7));
        let timer = FakeTimer::new();
        let mut controller = controller(&desktop, &timer);

        controller.on_mouse_moved(&moved(0, 10.0));
        let acquired = desktop.acquired();

        for ms in (50..500).step_by(50) {
            assert_eq!(controller.on_mouse_moved(&moved(ms, 10.0)), Some(Decision::AlreadyPending));
        }

        assert_eq!(timer.scheduled().len(), 1);
        assert!(timer.cancelled().is_empty());
        assert_eq!(desktop.acquired(), acquired);
        assert_eq!(desktop.live_elements(), 1);
    }

    #[test]
    fn test_rejected_targets_never_touch_accessibility() {
        let desktop = FakeDesktop::new(OWN);
        desktop.place_window(FakeWindow::normal(42, 7).with_level(25), 0.0..100.0);
        desktop.place_window(FakeWindow::normal(43, 8), 100.0..200.0);
        let timer = FakeTimer::new();
        let mut controller = controller(&desktop, &timer);
        controller.on_window_focused(43);

        assert_eq!(
            controller.on_mouse_moved(&moved(0, 50.0)),
            Some(Decision::Reject(RejectReason::LevelNotAllowed))
        );
        assert_eq!(
            controller.on_mouse_moved(&moved(40, 150.0)),
            Some(Decision::Reject(RejectReason::AlreadyFocused))
        );
        assert_eq!(desktop.acquired(), 0);
    }

    #[test]
    fn test_accepted_target_without_element_is_no_candidate() {
        let desktop = FakeDesktop::new(OWN);
        desktop.set_window(FakeWindow::normal(42, 7));
        desktop.set_hit_test_empty(true);
        let timer = FakeTimer::new();
        let mut controller = controller(&desktop, &timer);

        assert_eq!(
            controller.on_mouse_moved(&moved(0, 10.0)),
            Some(Decision::Reject(RejectReason::NoCandidate))
        );
        assert!(timer.scheduled().is_empty());
        assert_eq!(controller.pending_target(), None);
    }

    #[test]
    fn test_moving_to_another_window_supersedes() {
        let desktop = FakeDesktop::new(OWN);
        desktop.place_window(FakeWindow::normal(42, 7), 0.0..100.0);
        desktop.place_window(FakeWindow::normal(43, 8), 100.0..200.0);
        let timer = FakeTimer::new();
        let mut controller = controller(&desktop, &timer);

        controller.on_mouse_moved(&moved(0, 50.0));
        controller.on_mouse_moved(&moved(40, 150.0));

        assert_eq!(controller.pending_target(), Some(43));
        assert_eq!(desktop.released_windows(), vec![42]);
        assert_eq!(desktop.live_elements(), 1);
    }

    #[test]
    fn test_rejection_cancels_pending() {
        let desktop = FakeDesktop::new(OWN);
        desktop.place_window(FakeWindow::normal(42, 7), 0.0..100.0);
        let timer = FakeTimer::new();
        let mut controller = controller(&desktop, &timer);

        controller.on_mouse_moved(&moved(0, 50.0));
        let decision = controller.on_mouse_moved(&moved(40, 500.0));

        assert_eq!(decision, Some(Decision::Reject(RejectReason::NoCandidate)));
        assert_eq!(controller.pending_target(), None);
        assert_eq!(desktop.live_elements(), 0);
    }

    #[test]
    fn test_bypass_skips_hit_tests() {
        let desktop = FakeDesktop::new(OWN);
        desktop.set_window(FakeWindow::normal(42, 7));
        let timer = FakeTimer::new();
        let mut controller = controller(&desktop, &timer);

        let event = MotionEvent::new(0, ScreenPoint::new(10.0, 0.0), Modifiers::FN | Modifiers::CMD);
        assert_eq!(
            controller.on_mouse_moved(&event),
            Some(Decision::Reject(RejectReason::BypassHeld))
        );
        assert_eq!(desktop.acquired(), 0);
        assert!(timer.scheduled().is_empty());
    }

    #[test]
    fn test_standby_never_schedules() {
        let desktop = FakeDesktop::new(OWN);
        desktop.set_window(FakeWindow::normal(42, 7));
        let timer = FakeTimer::new();
        let mut controller = controller(&desktop, &timer);
        controller.on_tiling_float_changed(9, 0x1);

        for ms in (0..1000).step_by(40) {
            let decision = controller.on_mouse_moved(&moved(ms, 10.0));
            assert_eq!(decision, Some(Decision::Reject(RejectReason::Standby)));
        }
        assert!(timer.scheduled().is_empty());
        assert_eq!(controller.pending_target(), None);
    }

    #[test]
    fn test_standby_lifts_when_window_tiles_again() {
        let desktop = FakeDesktop::new(OWN);
        desktop.set_window(FakeWindow::normal(42, 7));
        let timer = FakeTimer::new();
        let mut controller = controller(&desktop, &timer);

        controller.on_tiling_float_changed(9, 0x1);
        controller.on_tiling_float_changed(9, 0x0);

        assert_eq!(controller.on_mouse_moved(&moved(0, 10.0)), Some(Decision::Accept));
    }

    #[test]
    fn test_commit_due_focuses_window_then_app() {
        let desktop = FakeDesktop::new(OWN);
        desktop.set_window(FakeWindow::normal(42, 7));
        let timer = FakeTimer::new();
        let mut controller = controller(&desktop, &timer);

        controller.on_mouse_moved(&moved(0, 10.0));
        let token = timer.last_token().unwrap();

        assert_eq!(controller.on_commit_due(token), Some(42));
        assert_eq!(desktop.focus_calls(), vec![FocusCall::Window(42), FocusCall::Application(7)]);
        assert_eq!(desktop.live_elements(), 0);
        assert_eq!(controller.pending_target(), None);
    }

    #[test]
    fn test_committed_window_is_not_committed_again() {
        let desktop = FakeDesktop::new(OWN);
        desktop.set_window(FakeWindow::normal(42, 7));
        let timer = FakeTimer::new();
        let mut controller = controller(&desktop, &timer);

        controller.on_mouse_moved(&moved(0, 10.0));
        let token = timer.last_token().unwrap();
        controller.on_commit_due(token);
        assert_eq!(controller.tracker().focused_window_id(), Some(42));

        for ms in (40..1000).step_by(40) {
            assert_eq!(
                controller.on_mouse_moved(&moved(ms, 10.0)),
                Some(Decision::Reject(RejectReason::AlreadyFocused))
            );
        }
        assert_eq!(timer.scheduled().len(), 1);
        assert_eq!(desktop.focus_calls(), vec![FocusCall::Window(42), FocusCall::Application(7)]);
    }

    #[test]
    fn test_stale_commit_leaves_tracker_alone() {
        let desktop = FakeDesktop::new(OWN);
        desktop.set_window(FakeWindow::normal(42, 7));
        let timer = FakeTimer::new();
        let mut controller = controller(&desktop, &timer);

        controller.on_mouse_moved(&moved(0, 10.0));
        let token = timer.last_token().unwrap();
        controller.on_window_focused(5);

        assert_eq!(controller.on_commit_due(token), None);
        assert_eq!(controller.tracker().focused_window_id(), Some(5));
    }

    #[test]
    fn test_window_focused_preempts_pending() {
        let desktop = FakeDesktop::new(OWN);
        desktop.set_window(FakeWindow::normal(42, 7));
        let timer = FakeTimer::new();
        let mut controller = controller(&desktop, &timer);

        controller.on_mouse_moved(&moved(0, 10.0));
        let token = timer.last_token().unwrap();

        controller.on_window_focused(77);
        assert_eq!(controller.tracker().focused_window_id(), Some(77));
        assert_eq!(desktop.released_windows(), vec![42]);

        assert_eq!(controller.on_commit_due(token), None);
        assert!(desktop.focus_calls().is_empty());
    }

    #[test]
    fn test_focused_window_is_not_a_target() {
        let desktop = FakeDesktop::new(OWN);
        desktop.set_window(FakeWindow::normal(42, 7));
        let timer = FakeTimer::new();
        let mut controller = controller(&desktop, &timer);

        controller.on_window_focused(42);
        assert_eq!(
            controller.on_mouse_moved(&moved(0, 10.0)),
            Some(Decision::Reject(RejectReason::AlreadyFocused))
        );
        assert_eq!(desktop.live_elements(), 0);
    }

    #[test]
    fn test_application_activated_tracks_focused_window() {
        let desktop = FakeDesktop::new(OWN);
        desktop.set_focused_window_of(7, 42);
        let timer = FakeTimer::new();
        let mut controller = controller(&desktop, &timer);

        controller.on_application_activated(7);
        assert_eq!(controller.tracker().focused_window_id(), Some(42));

        // No focused window: state unchanged.
        controller.on_application_activated(8);
        assert_eq!(controller.tracker().focused_window_id(), Some(42));
    }

    #[test]
    fn test_every_notification_cancels() {
        let desktop = FakeDesktop::new(OWN);
        desktop.place_window(FakeWindow::normal(42, 7), 0.0..100.0);
        desktop.place_window(FakeWindow::normal(43, 8), 100.0..200.0);
        let timer = FakeTimer::new();
        let mut controller = controller(&desktop, &timer);

        controller.on_mouse_moved(&moved(0, 50.0));
        controller.on_application_activated(99);
        assert_eq!(controller.pending_target(), None);

        controller.on_mouse_moved(&moved(40, 150.0));
        controller.on_tiling_float_changed(43, 0x0);
        assert_eq!(controller.pending_target(), None);

        assert_eq!(timer.cancelled().len(), 2);
        assert_eq!(desktop.live_elements(), 0);
    }

    #[test]
    fn test_teardown_releases_pending() {
        let desktop = FakeDesktop::new(OWN);
        desktop.set_window(FakeWindow::normal(42, 7));
        let timer = FakeTimer::new();
        let mut controller = controller(&desktop, &timer);

        controller.on_mouse_moved(&moved(0, 10.0));
        controller.teardown();
        controller.teardown();

        assert_eq!(controller.pending_target(), None);
        assert_eq!(timer.cancelled().len(), 1);
        assert_eq!(desktop.live_elements(), 0);
    }
}
