//! Focused-window observer.
//!
//! Watches `AXFocusedWindowChanged` on the frontmost application and forwards
//! the new window id as
//! [`FfmMessage::WindowFocused`](crate::modules::ffm::FfmMessage).
//! Application activation only reports focus moving between applications;
//! this reports focus moving between windows of the same application,
//! including the ones we focus ourselves.
//!
//! # Thread Safety
//!
//! Observers are created, retargeted and released on the main thread, where
//! their callbacks also run. [`observe`] is called by the application monitor
//! whenever another application becomes frontmost.

use std::ffi::c_void;
use std::ptr;

use core_foundation::base::TCFType;
use core_foundation::runloop::{CFRunLoop, CFRunLoopSource, kCFRunLoopCommonModes};
use core_foundation::string::CFString;
use objc::runtime::Object;
use objc::{class, msg_send, sel, sel_impl};
use parking_lot::Mutex;

use crate::error::FfmError;
use crate::modules::ffm::actor::FfmHandle;
use crate::modules::ffm::backend::Pid;
use crate::modules::ffm::ffi::{AXElement, window_id_of};

// ============================================================================
// FFI Declarations
// ============================================================================

type AXObserverRef = *mut c_void;
type AXUIElementRef = *mut c_void;
type CFRunLoopSourceRef = *mut c_void;
type AXObserverCallback =
    unsafe extern "C" fn(AXObserverRef, AXUIElementRef, *const c_void, *mut c_void);

const K_AX_ERROR_SUCCESS: i32 = 0;

const FOCUSED_WINDOW_CHANGED: &str = "AXFocusedWindowChanged";

#[link(name = "ApplicationServices", kind = "framework")]
unsafe extern "C" {
    fn AXObserverCreate(
        application: i32,
        callback: AXObserverCallback,
        out_observer: *mut AXObserverRef,
    ) -> i32;
    fn AXObserverAddNotification(
        observer: AXObserverRef,
        element: AXUIElementRef,
        notification: *const c_void,
        refcon: *mut c_void,
    ) -> i32;
    fn AXObserverGetRunLoopSource(observer: AXObserverRef) -> CFRunLoopSourceRef;
}

#[link(name = "CoreFoundation", kind = "framework")]
unsafe extern "C" {
    fn CFRelease(cf: *const c_void);
}

// ============================================================================
// Global State
// ============================================================================

/// An `AXObserverRef` that can be stored in the global state.
struct ObserverRef(AXObserverRef);

// SAFETY: observers are only created, used and released on the main thread.
// The mutex serializes access to the stored pointer.
unsafe impl Send for ObserverRef {}

/// The observer installed on one application.
struct ObservedApp {
    pid: Pid,
    observer: ObserverRef,
}

struct ObserverState {
    handle: FfmHandle,
    observed: Option<ObservedApp>,
}

static STATE: Mutex<Option<ObserverState>> = Mutex::new(None);

impl ObservedApp {
    /// Creates an observer for `pid` and adds it to the main run loop.
    fn create(pid: Pid) -> Result<Self, FfmError> {
        let app = AXElement::application(pid)
            .ok_or_else(|| unavailable(format!("no accessibility element for pid {pid}")))?;

        let mut observer: AXObserverRef = ptr::null_mut();
        let result = unsafe { AXObserverCreate(pid, focused_window_changed, &raw mut observer) };
        if result != K_AX_ERROR_SUCCESS || observer.is_null() {
            return Err(unavailable(format!("AXObserverCreate failed for pid {pid}: {result}")));
        }
        let observed = Self { pid, observer: ObserverRef(observer) };

        let name = CFString::from_static_string(FOCUSED_WINDOW_CHANGED);
        let result = unsafe {
            AXObserverAddNotification(
                observer,
                app.as_raw(),
                name.as_concrete_TypeRef().cast(),
                ptr::null_mut(),
            )
        };
        if result != K_AX_ERROR_SUCCESS {
            return Err(unavailable(format!(
                "failed to observe {FOCUSED_WINDOW_CHANGED} for pid {pid}: {result}"
            )));
        }

        if let Some(source) = observed.run_loop_source() {
            CFRunLoop::get_main().add_source(&source, unsafe { kCFRunLoopCommonModes });
        }
        Ok(observed)
    }

    fn run_loop_source(&self) -> Option<CFRunLoopSource> {
        let source = unsafe { AXObserverGetRunLoopSource(self.observer.0) };
        if source.is_null() {
            return None;
        }
        Some(unsafe { CFRunLoopSource::wrap_under_get_rule(source.cast()) })
    }
}

impl Drop for ObservedApp {
    fn drop(&mut self) {
        if let Some(source) = self.run_loop_source() {
            CFRunLoop::get_main().remove_source(&source, unsafe { kCFRunLoopCommonModes });
        }
        unsafe { CFRelease(self.observer.0.cast_const()) };
    }
}

// ============================================================================
// Public API
// ============================================================================

/// The running focused-window observer.
///
/// Dropping it releases the observer on the current application.
pub struct FocusObserver {
    _private: (),
}

impl FocusObserver {
    /// Starts observing the frontmost application.
    ///
    /// Must be called from the main thread.
    #[must_use]
    pub fn start(handle: FfmHandle) -> Self {
        *STATE.lock() = Some(ObserverState { handle, observed: None });

        match frontmost_pid() {
            Some(pid) => observe(pid),
            None => tracing::debug!("ffm: no frontmost application to observe"),
        }

        tracing::debug!("ffm: focus observer started");
        Self { _private: () }
    }
}

impl Drop for FocusObserver {
    fn drop(&mut self) {
        let state = STATE.lock().take();
        drop(state);

        tracing::debug!("ffm: focus observer stopped");
    }
}

/// Moves the observer to application `pid`.
///
/// Does nothing if `pid` is already observed or the observer is not running.
pub fn observe(pid: Pid) {
    let mut guard = STATE.lock();
    let Some(state) = guard.as_mut() else {
        return;
    };

    if state.observed.as_ref().is_some_and(|observed| observed.pid == pid) {
        return;
    }

    state.observed = None;
    match ObservedApp::create(pid) {
        Ok(observed) => {
            tracing::trace!(pid, "ffm: observing focused window changes");
            state.observed = Some(observed);
        }
        Err(err) => tracing::debug!(pid, error = %err, "ffm: cannot observe application"),
    }
}

fn unavailable(message: String) -> FfmError { FfmError::ResourceUnavailable(message) }

fn frontmost_pid() -> Option<Pid> {
    unsafe {
        let workspace: *mut Object = msg_send![class!(NSWorkspace), sharedWorkspace];
        if workspace.is_null() {
            return None;
        }

        let app: *mut Object = msg_send![workspace, frontmostApplication];
        if app.is_null() {
            return None;
        }

        let pid: i32 = msg_send![app, processIdentifier];
        (pid > 0).then_some(pid)
    }
}

// ============================================================================
// Observer Callback
// ============================================================================

/// Called by the accessibility framework on the main run loop.
///
/// `element` is the newly focused window and is only borrowed.
unsafe extern "C" fn focused_window_changed(
    _observer: AXObserverRef,
    element: AXUIElementRef,
    _notification: *const c_void,
    _refcon: *mut c_void,
) {
    let Some(window_id) = (unsafe { window_id_of(element) }) else {
        tracing::trace!("ffm: focused window change without a window id");
        return;
    };

    if let Some(state) = STATE.lock().as_ref()
        && let Err(err) = state.handle.window_focused(window_id)
    {
        tracing::debug!(window_id, error = %err, "ffm: dropped window focus change");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_observe_without_observer_is_ignored() {
        observe(1);
        assert!(STATE.lock().is_none());
    }
}
