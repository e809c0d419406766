//! Application activation monitor.
//!
//! Bridges `NSWorkspaceDidActivateApplicationNotification` to
//! [`FfmMessage::ApplicationActivated`](crate::modules::ffm::FfmMessage).
//! This is how the tracked focused window follows focus moving to another
//! application, whether by keyboard, by clicking, or by our own commits.
//!
//! # Thread Safety
//!
//! `NSWorkspace` notifications are delivered on the main thread. The
//! observer only forwards the process id into the actor's channel.

use objc::declare::ClassDecl;
use objc::runtime::{Class, Object, Sel};
use objc::{class, msg_send, sel, sel_impl};
use parking_lot::RwLock;

use super::focus_observer;
use crate::error::FfmError;
use crate::modules::ffm::actor::FfmHandle;
use crate::platform::objc::nsstring;

/// Where activation events go. Read from the observer callback.
static SINK: RwLock<Option<FfmHandle>> = RwLock::new(None);

const OBSERVER_CLASS_NAME: &str = "FfmAppActivationObserver";

/// A registered workspace observer.
///
/// Dropping the monitor unregisters the observer.
pub struct AppMonitor {
    notification_center: *mut Object,
    observer: *mut Object,
}

impl AppMonitor {
    /// Registers for application activation notifications.
    ///
    /// Must be called from the main thread.
    ///
    /// # Errors
    ///
    /// Returns [`FfmError::ResourceUnavailable`] if the workspace
    /// notification center or the observer cannot be obtained.
    pub fn start(handle: FfmHandle) -> Result<Self, FfmError> {
        unsafe {
            let workspace: *mut Object = msg_send![class!(NSWorkspace), sharedWorkspace];
            if workspace.is_null() {
                return Err(unavailable("failed to get shared workspace"));
            }

            let notification_center: *mut Object = msg_send![workspace, notificationCenter];
            if notification_center.is_null() {
                return Err(unavailable("failed to get workspace notification center"));
            }

            let observer = create_observer()?;

            *SINK.write() = Some(handle);

            let name = nsstring("NSWorkspaceDidActivateApplicationNotification");
            let _: () = msg_send![
                notification_center,
                addObserver: observer
                selector: sel!(handleAppActivated:)
                name: name
                object: std::ptr::null::<Object>()
            ];

            tracing::debug!("ffm: app monitor started");
            Ok(Self { notification_center, observer })
        }
    }
}

impl Drop for AppMonitor {
    fn drop(&mut self) {
        unsafe {
            let _: () = msg_send![self.notification_center, removeObserver: self.observer];
            let _: () = msg_send![self.observer, release];
        }
        *SINK.write() = None;

        tracing::debug!("ffm: app monitor stopped");
    }
}

fn unavailable(message: &str) -> FfmError { FfmError::ResourceUnavailable(message.to_string()) }

/// Creates the Objective-C observer object, declaring its class on first use.
unsafe fn create_observer() -> Result<*mut Object, FfmError> {
    let observer_class = match Class::get(OBSERVER_CLASS_NAME) {
        Some(class) => class,
        None => {
            let mut decl = ClassDecl::new(OBSERVER_CLASS_NAME, class!(NSObject))
                .ok_or_else(|| unavailable("failed to declare app observer class"))?;

            unsafe {
                decl.add_method(
                    sel!(handleAppActivated:),
                    handle_app_activated as extern "C" fn(&Object, Sel, *mut Object),
                );
            }

            decl.register()
        }
    };

    let observer: *mut Object = unsafe {
        let instance: *mut Object = msg_send![observer_class, alloc];
        msg_send![instance, init]
    };

    if observer.is_null() {
        return Err(unavailable("failed to create app observer"));
    }
    Ok(observer)
}

extern "C" fn handle_app_activated(_self: &Object, _cmd: Sel, notification: *mut Object) {
    let Some(pid) = activated_pid(notification) else {
        return;
    };

    if let Some(handle) = SINK.read().as_ref()
        && let Err(err) = handle.application_activated(pid)
    {
        tracing::debug!(pid, error = %err, "ffm: dropped application activation");
    }

    focus_observer::observe(pid);
}

/// Extracts the process id from an activation `NSNotification`.
fn activated_pid(notification: *mut Object) -> Option<i32> {
    if notification.is_null() {
        return None;
    }

    unsafe {
        let user_info: *mut Object = msg_send![notification, userInfo];
        if user_info.is_null() {
            return None;
        }

        let app_key = nsstring("NSWorkspaceApplicationKey");
        let running_app: *mut Object = msg_send![user_info, objectForKey: app_key];
        if running_app.is_null() {
            return None;
        }

        let pid: i32 = msg_send![running_app, processIdentifier];
        (pid > 0).then_some(pid)
    }
}
