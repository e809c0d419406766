//! Focus follows mouse.
//!
//! Moving the pointer over a window schedules that window to receive focus
//! after a debounce and an optional delay. Windows at unusual levels, our own
//! windows, and movement while a bypass modifier is held are ignored, and the
//! whole feature goes on standby while the focused window is floating.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────┐   MouseMoved    ┌──────────────────────────────────┐
//! │  Event tap   │ ──────────────▶ │            FfmActor              │
//! └──────────────┘                 │  ┌────────────────────────────┐  │
//! ┌──────────────┐   Activated /   │  │      FocusController       │  │
//! │ App + focus  │   Focused /     │  │ MotionFilter → Resolver →  │  │
//! │ observers,   │   Float  ─────▶ │  │ Eligibility → Scheduler    │  │
//! │ host exports │                 │  └────────────────────────────┘  │
//! └──────────────┘                 │                                  │
//!                  CommitDue ◀──── │  TokioTimer                      │
//!                                  └──────────────────────────────────┘
//! ```
//!
//! The pipeline only talks to the [`backend`] traits; the macOS
//! implementations live in `ffi` and are only built on macOS.

pub mod actor;
pub mod backend;
pub mod controller;
pub mod eligibility;
#[cfg(target_os = "macos")]
pub mod events;
#[cfg(target_os = "macos")]
pub mod ffi;
pub mod init;
pub mod modifiers;
pub mod motion;
pub mod resolver;
pub mod scheduler;
#[cfg(any(test, feature = "testing"))]
pub mod testing;
pub mod tracker;

pub use actor::{
    ActorError, EXPORT_APPLICATION_ACTIVATED, EXPORT_TILING_FLOAT, EXPORT_WINDOW_FOCUSED, FfmActor,
    FfmHandle, FfmMessage, FfmStatus,
};
pub use backend::{
    Accessibility, CommitTimer, CommitToken, ConnectionId, Pid, WindowHit, WindowId, WindowServer,
};
pub use controller::{FfmSettings, FocusController};
pub use eligibility::{Decision, EligibilityFilter, RejectReason};
pub use modifiers::{Modifiers, parse_bypass_modifiers};
pub use motion::{MotionEvent, MotionFilter, ScreenPoint};
pub use resolver::{CandidateWindow, WindowResolver, WindowTarget};
pub use scheduler::{CommitScheduler, PendingCommit};
pub use tracker::TrackerState;

/// Human-readable name of the feature.
pub const PLUGIN_NAME: &str = "Focus Follows Mouse";

/// Version of the feature.
pub const PLUGIN_VERSION: &str = env!("CARGO_PKG_VERSION");
