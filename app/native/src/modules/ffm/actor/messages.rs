//! Message types for the focus actor.
//!
//! All communication with the actor happens through [`FfmMessage`]: pointer
//! motion from the event tap, notifications from the host, timer expiries
//! posted back by the actor's own commit timer, and status queries.

use tokio::sync::oneshot;

use crate::modules::ffm::backend::{CommitToken, Pid, WindowId};
use crate::modules::ffm::motion::MotionEvent;

/// Host export announcing that an application was activated.
pub const EXPORT_APPLICATION_ACTIVATED: &str = "chunkwm_export_application_activated";

/// Host export announcing that a window received focus.
pub const EXPORT_WINDOW_FOCUSED: &str = "chunkwm_export_window_focused";

/// Tiling export announcing a float status change of the focused window.
pub const EXPORT_TILING_FLOAT: &str = "Tiling_focused_window_float";

/// Snapshot of the actor's state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FfmStatus {
    /// Window the host reports as focused.
    pub focused_window_id: Option<WindowId>,
    /// Window waiting for its focus commit.
    pub pending_target: Option<WindowId>,
    /// Whether tracking is active (not on standby).
    pub active: bool,
}

/// Messages sent to the focus actor.
#[derive(Debug)]
pub enum FfmMessage {
    /// The pointer moved.
    MouseMoved(MotionEvent),

    /// An application was brought to front.
    ApplicationActivated { pid: Pid },

    /// A window received focus.
    WindowFocused { window_id: WindowId },

    /// The tiling layer changed the float status of the focused window.
    TilingFloatChanged { window_id: WindowId, status: u32 },

    /// A commit timer expired.
    CommitDue(CommitToken),

    /// Request a status snapshot.
    Status { respond_to: oneshot::Sender<FfmStatus> },

    /// Stop the actor. Any pending commit is cancelled.
    Shutdown,
}

impl FfmMessage {
    /// Returns the name of the message for logging.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::MouseMoved(_) => "MouseMoved",
            Self::ApplicationActivated { .. } => "ApplicationActivated",
            Self::WindowFocused { .. } => "WindowFocused",
            Self::TilingFloatChanged { .. } => "TilingFloatChanged",
            Self::CommitDue(_) => "CommitDue",
            Self::Status { .. } => "Status",
            Self::Shutdown => "Shutdown",
        }
    }

    /// Builds a message from a host export broadcast.
    ///
    /// `payload` holds native-endian 32-bit words: the process id for an
    /// activated application, the window id for a focused window, and the
    /// window id followed by the status bits for a float change. Unknown
    /// nodes and short payloads yield `None`.
    #[must_use]
    pub fn from_export(node: &str, payload: &[u8]) -> Option<Self> {
        let word = |index: usize| -> Option<u32> {
            let bytes = payload.get(index * 4..index * 4 + 4)?;
            Some(u32::from_ne_bytes(bytes.try_into().ok()?))
        };

        match node {
            EXPORT_APPLICATION_ACTIVATED => Some(Self::ApplicationActivated {
                pid: i32::from_ne_bytes(word(0)?.to_ne_bytes()),
            }),
            EXPORT_WINDOW_FOCUSED => Some(Self::WindowFocused { window_id: word(0)? }),
            EXPORT_TILING_FLOAT => Some(Self::TilingFloatChanged {
                window_id: word(0)?,
                status: word(1)?,
            }),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn words(values: &[u32]) -> Vec<u8> {
        values.iter().flat_map(|value| value.to_ne_bytes()).collect()
    }

    #[test]
    fn test_application_activated_export() {
        let message = FfmMessage::from_export(EXPORT_APPLICATION_ACTIVATED, &words(&[7]));
        assert!(matches!(message, Some(FfmMessage::ApplicationActivated { pid: 7 })));
    }

    #[test]
    fn test_window_focused_export() {
        let message = FfmMessage::from_export(EXPORT_WINDOW_FOCUSED, &words(&[42]));
        assert!(matches!(message, Some(FfmMessage::WindowFocused { window_id: 42 })));
    }

    #[test]
    fn test_float_export_reads_two_words() {
        let message = FfmMessage::from_export(EXPORT_TILING_FLOAT, &words(&[42, 1]));
        assert!(matches!(
            message,
            Some(FfmMessage::TilingFloatChanged { window_id: 42, status: 1 })
        ));

        assert!(FfmMessage::from_export(EXPORT_TILING_FLOAT, &words(&[42])).is_none());
    }

    #[test]
    fn test_unknown_or_short_export() {
        assert!(FfmMessage::from_export("chunkwm_export_space_changed", &words(&[1])).is_none());
        assert!(FfmMessage::from_export(EXPORT_WINDOW_FOCUSED, &[1, 2]).is_none());
    }

    #[test]
    fn test_message_names() {
        assert_eq!(FfmMessage::Shutdown.name(), "Shutdown");
        assert_eq!(FfmMessage::CommitDue(CommitToken(1)).name(), "CommitDue");
        assert_eq!(FfmMessage::WindowFocused { window_id: 1 }.name(), "WindowFocused");
    }
}
