//! Safe wrappers for the window server calls in the `SkyLight` private framework.
//!
#![allow(clippy::doc_markdown)] // Allow SkyLight, CGPoint, etc. without backticks
//!
//! Hit-testing goes straight to the window server instead of walking the
//! accessibility tree, which is what makes reacting to every mouse movement
//! affordable.
//!
//! # Safety
//!
//! These APIs are private and undocumented. They work without SIP disabled
//! but may change between macOS versions. All unsafe code is encapsulated
//! here.

use core_graphics::geometry::CGPoint;

use crate::modules::ffm::backend::{ConnectionId, Pid, WindowHit, WindowId, WindowServer};
use crate::modules::ffm::eligibility::levels;
use crate::modules::ffm::motion::ScreenPoint;

// ============================================================================
// FFI Declarations
// ============================================================================

#[link(name = "SkyLight", kind = "framework")]
unsafe extern "C" {
    /// Returns the main connection ID to the window server.
    fn CGSMainConnectionID() -> i32;

    /// Finds the topmost window containing `screen_point`.
    fn CGSFindWindowByGeometry(
        cid: i32,
        zero: i32,
        one: i32,
        zero_again: i32,
        screen_point: *const CGPoint,
        window_point_out: *mut CGPoint,
        wid_out: *mut i32,
        cid_out: *mut i32,
    ) -> i32;

    /// Gets the stacking level of a window.
    fn CGSGetWindowLevel(cid: i32, wid: u32, level_out: *mut i32) -> i32;

    /// Gets the process that owns a connection.
    fn CGSConnectionGetPID(cid: i32, pid_out: *mut i32) -> i32;
}

const K_CG_ERROR_SUCCESS: i32 = 0;

// ============================================================================
// Window server
// ============================================================================

/// [`WindowServer`] backed by `SkyLight`.
#[derive(Debug, Clone, Copy)]
pub struct SkyLightWindowServer {
    connection: ConnectionId,
}

impl SkyLightWindowServer {
    /// Connects to the window server.
    ///
    /// Returns `None` if the process has no window server connection.
    #[must_use]
    pub fn connect() -> Option<Self> {
        let connection = unsafe { CGSMainConnectionID() };
        if connection == 0 {
            tracing::warn!("ffm: skylight: failed to get connection ID");
            return None;
        }
        Some(Self { connection })
    }
}

impl WindowServer for SkyLightWindowServer {
    fn own_connection(&self) -> ConnectionId { self.connection }

    fn hit_test(&self, point: ScreenPoint) -> Option<WindowHit> {
        let screen_point = CGPoint::new(point.x, point.y);
        let mut window_point = CGPoint::new(0.0, 0.0);
        let mut window_id: i32 = 0;
        let mut window_connection: i32 = 0;

        let result = unsafe {
            CGSFindWindowByGeometry(
                self.connection,
                0,
                1,
                0,
                &raw const screen_point,
                &raw mut window_point,
                &raw mut window_id,
                &raw mut window_connection,
            )
        };

        if result != K_CG_ERROR_SUCCESS {
            return None;
        }

        let window_id = WindowId::try_from(window_id).ok().filter(|&id| id != 0)?;
        Some(WindowHit { window_id, connection: window_connection })
    }

    fn window_level(&self, window_id: WindowId) -> i32 {
        let mut level = levels::NORMAL;
        let result = unsafe { CGSGetWindowLevel(self.connection, window_id, &raw mut level) };
        if result != K_CG_ERROR_SUCCESS {
            tracing::trace!(window_id, result, "ffm: skylight: failed to read window level");
        }
        level
    }

    fn connection_pid(&self, connection: ConnectionId) -> Option<Pid> {
        let mut pid: Pid = 0;
        let result = unsafe { CGSConnectionGetPID(connection, &raw mut pid) };
        (result == K_CG_ERROR_SUCCESS && pid > 0).then_some(pid)
    }
}
