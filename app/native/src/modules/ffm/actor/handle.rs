//! Handle for communicating with the focus actor.
//!
//! The `FfmHandle` provides a safe, cloneable interface for sending
//! messages to the actor and reading the shared focus state.

use std::sync::Arc;

use tokio::sync::mpsc::error::TrySendError;
use tokio::sync::{mpsc, oneshot};

use super::messages::{FfmMessage, FfmStatus};
use crate::modules::ffm::backend::{Pid, WindowId};
use crate::modules::ffm::motion::MotionEvent;
use crate::modules::ffm::tracker::TrackerState;

/// Error types for actor communication.
#[derive(Debug, thiserror::Error)]
pub enum ActorError {
    /// Failed to send message to actor.
    #[error("Failed to send message to actor: channel closed")]
    SendFailed,

    /// The actor is busy and its queue is full.
    #[error("Failed to send message to actor: channel full")]
    ChannelFull,

    /// Failed to receive response from actor.
    #[error("Failed to receive response from actor: channel closed")]
    ReceiveFailed,
}

/// Handle for communicating with the focus actor.
///
/// This handle is cheap to clone and can be shared across threads.
#[derive(Clone)]
pub struct FfmHandle {
    sender: mpsc::Sender<FfmMessage>,
    tracker: Arc<TrackerState>,
}

impl FfmHandle {
    pub(crate) const fn new(sender: mpsc::Sender<FfmMessage>, tracker: Arc<TrackerState>) -> Self {
        Self { sender, tracker }
    }

    /// Focus state shared with the actor.
    #[must_use]
    pub const fn tracker(&self) -> &Arc<TrackerState> { &self.tracker }

    /// Returns whether the actor has stopped.
    #[must_use]
    pub fn is_closed(&self) -> bool { self.sender.is_closed() }

    /// Send a message to the actor without waiting for delivery.
    ///
    /// # Errors
    ///
    /// Returns [`ActorError::SendFailed`] if the actor has stopped, or
    /// [`ActorError::ChannelFull`] if its queue is full.
    pub fn send(&self, msg: FfmMessage) -> Result<(), ActorError> {
        self.sender.try_send(msg).map_err(|err| match err {
            TrySendError::Full(_) => ActorError::ChannelFull,
            TrySendError::Closed(_) => ActorError::SendFailed,
        })
    }

    /// Send a message to the actor and wait for queue space.
    ///
    /// # Errors
    ///
    /// Returns [`ActorError::SendFailed`] if the actor has stopped.
    pub async fn send_async(&self, msg: FfmMessage) -> Result<(), ActorError> {
        self.sender.send(msg).await.map_err(|_| ActorError::SendFailed)
    }

    /// Forwards a pointer-motion sample.
    ///
    /// Samples that do not fit in the queue are dropped; the next one
    /// supersedes them anyway.
    pub fn mouse_moved(&self, event: MotionEvent) {
        match self.send(FfmMessage::MouseMoved(event)) {
            Ok(()) | Err(ActorError::ChannelFull) => {}
            Err(err) => tracing::trace!(error = %err, "ffm: dropped motion event"),
        }
    }

    /// Notifies the actor that an application was activated.
    ///
    /// # Errors
    ///
    /// Returns an error if the message could not be queued.
    pub fn application_activated(&self, pid: Pid) -> Result<(), ActorError> {
        self.send(FfmMessage::ApplicationActivated { pid })
    }

    /// Notifies the actor that a window received focus.
    ///
    /// # Errors
    ///
    /// Returns an error if the message could not be queued.
    pub fn window_focused(&self, window_id: WindowId) -> Result<(), ActorError> {
        self.send(FfmMessage::WindowFocused { window_id })
    }

    /// Notifies the actor of a float status change.
    ///
    /// # Errors
    ///
    /// Returns an error if the message could not be queued.
    pub fn tiling_float_changed(&self, window_id: WindowId, status: u32) -> Result<(), ActorError> {
        self.send(FfmMessage::TilingFloatChanged { window_id, status })
    }

    /// Queries a status snapshot.
    ///
    /// # Errors
    ///
    /// Returns [`ActorError::SendFailed`] or [`ActorError::ReceiveFailed`]
    /// if the actor has stopped.
    pub async fn status(&self) -> Result<FfmStatus, ActorError> {
        let (tx, rx) = oneshot::channel();
        self.send_async(FfmMessage::Status { respond_to: tx }).await?;
        rx.await.map_err(|_| ActorError::ReceiveFailed)
    }

    /// Asks the actor to stop.
    ///
    /// # Errors
    ///
    /// Returns [`ActorError::SendFailed`] if the actor has already stopped.
    pub async fn shutdown(&self) -> Result<(), ActorError> {
        self.send_async(FfmMessage::Shutdown).await
    }

    /// Asks the actor to stop from a thread outside the runtime.
    ///
    /// # Errors
    ///
    /// Returns [`ActorError::SendFailed`] if the actor has already stopped.
    pub fn shutdown_blocking(&self) -> Result<(), ActorError> {
        self.sender.blocking_send(FfmMessage::Shutdown).map_err(|_| ActorError::SendFailed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_send_reports_full_and_closed() {
        let (sender, receiver) = mpsc::channel(1);
        let handle = FfmHandle::new(sender, Arc::new(TrackerState::new()));

        handle.window_focused(1).unwrap();
        assert!(matches!(handle.window_focused(2), Err(ActorError::ChannelFull)));

        drop(receiver);
        assert!(handle.is_closed());
        assert!(matches!(handle.window_focused(3), Err(ActorError::SendFailed)));
    }

    #[test]
    fn test_error_display() {
        assert_eq!(
            ActorError::SendFailed.to_string(),
            "Failed to send message to actor: channel closed"
        );
        assert_eq!(
            ActorError::ReceiveFailed.to_string(),
            "Failed to receive response from actor: channel closed"
        );
    }
}
