//! Focus actor module.
//!
//! The actor owns the [`FocusController`] and processes messages one at a
//! time, so motion events, timer expiries and host notifications never race
//! each other and the controller needs no locks.
//!
//! # Panic Recovery
//!
//! If a message handler panics, the panic is caught and logged and the actor
//! keeps processing subsequent messages. A bad event must not leave the user
//! without focus-follows-mouse for the rest of the session.

mod handle;
mod messages;

use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::Arc;
use std::time::Duration;

pub use handle::{ActorError, FfmHandle};
pub use messages::{
    EXPORT_APPLICATION_ACTIVATED, EXPORT_TILING_FLOAT, EXPORT_WINDOW_FOCUSED, FfmMessage, FfmStatus,
};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use super::backend::{Accessibility, CommitTimer, CommitToken, WindowServer};
use super::controller::{FfmSettings, FocusController};
use super::tracker::TrackerState;

/// Channel buffer size for the focus actor.
const CHANNEL_BUFFER_SIZE: usize = 256;

/// Commit timer backed by a tokio task.
///
/// Each scheduled commit is a task that sleeps for the delay and then posts
/// [`FfmMessage::CommitDue`] back into the actor's channel. Cancelling
/// aborts the task; a fire that slips through anyway carries a stale token.
pub struct TokioTimer {
    sender: mpsc::WeakSender<FfmMessage>,
}

impl TokioTimer {
    fn new(sender: &mpsc::Sender<FfmMessage>) -> Self { Self { sender: sender.downgrade() } }
}

impl CommitTimer for TokioTimer {
    type Handle = JoinHandle<()>;

    fn schedule_once(&mut self, delay: Duration, token: CommitToken) -> JoinHandle<()> {
        let sender = self.sender.clone();

        tokio::spawn(async move {
            tokio::time::sleep(delay).await;

            if let Some(sender) = sender.upgrade() {
                let _ = sender.send(FfmMessage::CommitDue(token)).await;
            }
        })
    }

    fn cancel(&mut self, handle: JoinHandle<()>) { handle.abort(); }
}

/// The actor that owns the focus pipeline.
pub struct FfmActor<W, A>
where A: Accessibility {
    controller: FocusController<W, A, TokioTimer>,
    receiver: mpsc::Receiver<FfmMessage>,
}

impl<W, A> FfmActor<W, A>
where
    W: WindowServer,
    A: Accessibility,
{
    /// Creates the actor and its handle without starting it.
    ///
    /// The actor must be driven by [`Self::run`] inside a tokio runtime.
    pub fn new(window_server: W, accessibility: A, settings: &FfmSettings) -> (Self, FfmHandle) {
        let (sender, receiver) = mpsc::channel(CHANNEL_BUFFER_SIZE);
        let tracker = Arc::new(TrackerState::new());

        let controller = FocusController::new(
            window_server,
            accessibility,
            TokioTimer::new(&sender),
            settings,
            Arc::clone(&tracker),
        );

        (Self { controller, receiver }, FfmHandle::new(sender, tracker))
    }

    /// Run the actor's message loop until shutdown or until every handle is
    /// dropped. Any pending commit is cancelled before returning.
    pub async fn run(mut self) {
        tracing::trace!("ffm: actor message loop starting");

        while let Some(msg) = self.receiver.recv().await {
            if matches!(msg, FfmMessage::Shutdown) {
                tracing::debug!("ffm: actor received shutdown message");
                break;
            }

            let msg_name = msg.name();
            let result = catch_unwind(AssertUnwindSafe(|| {
                self.handle_message(msg);
            }));

            if let Err(panic_info) = result {
                let panic_msg = panic_info
                    .downcast_ref::<&str>()
                    .map(|s| (*s).to_string())
                    .or_else(|| panic_info.downcast_ref::<String>().cloned())
                    .unwrap_or_else(|| "unknown panic".to_string());

                tracing::error!("ffm: PANIC in actor while handling '{msg_name}': {panic_msg}");
            }
        }

        self.controller.teardown();
        tracing::debug!("ffm: actor stopped");
    }

    fn handle_message(&mut self, msg: FfmMessage) {
        match msg {
            FfmMessage::MouseMoved(event) => {
                self.controller.on_mouse_moved(&event);
            }
            FfmMessage::ApplicationActivated { pid } => {
                self.controller.on_application_activated(pid);
            }
            FfmMessage::WindowFocused { window_id } => {
                self.controller.on_window_focused(window_id);
            }
            FfmMessage::TilingFloatChanged { window_id, status } => {
                self.controller.on_tiling_float_changed(window_id, status);
            }
            FfmMessage::CommitDue(token) => {
                self.controller.on_commit_due(token);
            }
            FfmMessage::Status { respond_to } => {
                let tracker = self.controller.tracker();
                let _ = respond_to.send(FfmStatus {
                    focused_window_id: tracker.focused_window_id(),
                    pending_target: self.controller.pending_target(),
                    active: tracker.is_active(),
                });
            }
            FfmMessage::Shutdown => {}
        }
    }
}

impl<W, A> FfmActor<W, A>
where
    W: WindowServer + Send + 'static,
    A: Accessibility + Send + 'static,
    A::Element: Send,
{
    /// Spawn the actor on the current tokio runtime and return a handle.
    #[must_use]
    pub fn spawn(window_server: W, accessibility: A, settings: &FfmSettings) -> FfmHandle {
        tracing::debug!("ffm: spawning focus actor");
        let (actor, handle) = Self::new(window_server, accessibility, settings);
        tokio::spawn(actor.run());
        handle
    }
}
