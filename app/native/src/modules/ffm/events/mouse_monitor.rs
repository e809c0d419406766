//! Pointer-motion monitoring.
//!
//! A listen-only `CGEventTap` for `kCGEventMouseMoved` converts every
//! movement into a [`MotionEvent`] and forwards it to the installed
//! [`FfmHandle`]. The callback never blocks: a full queue drops the sample.
//!
//! macOS disables event taps that take too long or when secure input is
//! toggled. The callback receives a pseudo-event in that case and re-enables
//! the tap right away.

use std::ffi::c_void;
use std::ptr;
use std::sync::atomic::{AtomicPtr, Ordering};

use core_foundation::base::TCFType;
use core_foundation::mach_port::CFMachPort;
use core_foundation::runloop::{CFRunLoop, CFRunLoopSource, kCFRunLoopCommonModes};
use core_graphics::geometry::CGPoint;
use parking_lot::RwLock;

use crate::error::FfmError;
use crate::modules::ffm::actor::FfmHandle;
use crate::modules::ffm::modifiers::Modifiers;
use crate::modules::ffm::motion::{MotionEvent, ScreenPoint};

// ============================================================================
// FFI Declarations
// ============================================================================

type CGEventRef = *mut c_void;
type CGEventTapProxy = *mut c_void;
type CFMachPortRef = *mut c_void;

type CGEventTapCallBack = extern "C" fn(
    proxy: CGEventTapProxy,
    event_type: u32,
    event: CGEventRef,
    user_info: *mut c_void,
) -> CGEventRef;

#[link(name = "CoreGraphics", kind = "framework")]
unsafe extern "C" {
    fn CGEventTapCreate(
        tap: u32,
        place: u32,
        options: u32,
        events_of_interest: u64,
        callback: CGEventTapCallBack,
        user_info: *mut c_void,
    ) -> CFMachPortRef;

    fn CGEventTapEnable(tap: CFMachPortRef, enable: bool);
    fn CGEventGetTimestamp(event: CGEventRef) -> u64;
    fn CGEventGetLocation(event: CGEventRef) -> CGPoint;
    fn CGEventGetFlags(event: CGEventRef) -> u64;
}

#[link(name = "CoreFoundation", kind = "framework")]
unsafe extern "C" {
    fn CFMachPortInvalidate(port: CFMachPortRef);
}

// Constants for event tap configuration
const K_CG_SESSION_EVENT_TAP: u32 = 1;
const K_CG_HEAD_INSERT_EVENT_TAP: u32 = 0;
const K_CG_EVENT_TAP_OPTION_LISTEN_ONLY: u32 = 1;

const K_CG_EVENT_MOUSE_MOVED: u32 = 5;
const K_CG_EVENT_TAP_DISABLED_BY_TIMEOUT: u32 = 0xFFFF_FFFE;
const K_CG_EVENT_TAP_DISABLED_BY_USER_INPUT: u32 = 0xFFFF_FFFF;

// ============================================================================
// Global State
// ============================================================================

/// Where motion events go. Read from the tap callback.
static SINK: RwLock<Option<FfmHandle>> = RwLock::new(None);

/// The active tap, for re-enabling from the callback.
static TAP: AtomicPtr<c_void> = AtomicPtr::new(ptr::null_mut());

// ============================================================================
// Mouse Monitor
// ============================================================================

/// A running mouse-moved event tap.
///
/// Dropping the monitor (or calling [`MouseMonitor::stop`]) removes the tap
/// from the run loop and invalidates it.
pub struct MouseMonitor {
    port: CFMachPort,
    source: CFRunLoopSource,
    run_loop: CFRunLoop,
}

impl MouseMonitor {
    /// Creates the event tap and attaches it to the current thread's run loop.
    ///
    /// Events are delivered once that run loop runs.
    ///
    /// # Errors
    ///
    /// Returns [`FfmError::ResourceUnavailable`] if the tap cannot be created,
    /// which usually means the process lacks accessibility permissions.
    pub fn start(handle: FfmHandle) -> Result<Self, FfmError> {
        let event_mask = 1u64 << K_CG_EVENT_MOUSE_MOVED;

        let tap = unsafe {
            CGEventTapCreate(
                K_CG_SESSION_EVENT_TAP,
                K_CG_HEAD_INSERT_EVENT_TAP,
                K_CG_EVENT_TAP_OPTION_LISTEN_ONLY,
                event_mask,
                mouse_event_callback,
                ptr::null_mut(),
            )
        };

        if tap.is_null() {
            return Err(FfmError::ResourceUnavailable(
                "failed to create mouse event tap (check accessibility permissions)".to_string(),
            ));
        }

        let port = unsafe { CFMachPort::wrap_under_create_rule(tap.cast()) };
        let source = port.create_runloop_source(0).map_err(|()| {
            unsafe { CFMachPortInvalidate(tap) };
            FfmError::ResourceUnavailable("failed to create event tap run loop source".to_string())
        })?;

        *SINK.write() = Some(handle);
        TAP.store(tap, Ordering::SeqCst);

        let run_loop = CFRunLoop::get_current();
        run_loop.add_source(&source, unsafe { kCFRunLoopCommonModes });
        unsafe { CGEventTapEnable(tap, true) };

        tracing::debug!("ffm: mouse monitor started");
        Ok(Self { port, source, run_loop })
    }
}

impl Drop for MouseMonitor {
    fn drop(&mut self) {
        let tap: CFMachPortRef = self.port.as_concrete_TypeRef().cast();

        TAP.store(ptr::null_mut(), Ordering::SeqCst);
        unsafe { CGEventTapEnable(tap, false) };
        self.run_loop.remove_source(&self.source, unsafe { kCFRunLoopCommonModes });
        unsafe { CFMachPortInvalidate(tap) };
        *SINK.write() = None;

        tracing::debug!("ffm: mouse monitor stopped");
    }
}

// ============================================================================
// Event Tap Callback
// ============================================================================

extern "C" fn mouse_event_callback(
    _proxy: CGEventTapProxy,
    event_type: u32,
    event: CGEventRef,
    _user_info: *mut c_void,
) -> CGEventRef {
    match event_type {
        K_CG_EVENT_TAP_DISABLED_BY_TIMEOUT | K_CG_EVENT_TAP_DISABLED_BY_USER_INPUT => {
            let tap = TAP.load(Ordering::SeqCst);
            if !tap.is_null() {
                tracing::debug!(event_type, "ffm: event tap was disabled, re-enabling");
                unsafe { CGEventTapEnable(tap, true) };
            }
        }
        K_CG_EVENT_MOUSE_MOVED if !event.is_null() => {
            if let Some(handle) = SINK.read().as_ref() {
                handle.mouse_moved(motion_event(event));
            }
        }
        _ => {}
    }

    event
}

fn motion_event(event: CGEventRef) -> MotionEvent {
    let (timestamp, location, flags) = unsafe {
        (CGEventGetTimestamp(event), CGEventGetLocation(event), CGEventGetFlags(event))
    };

    MotionEvent::new(
        timestamp,
        ScreenPoint::new(location.x, location.y),
        Modifiers::from_bits_retain(flags),
    )
}
