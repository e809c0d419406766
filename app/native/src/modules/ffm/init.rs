//! Focus-follows-mouse lifecycle.
//!
//! [`run`] wires the macOS backends to the actor and blocks on the main run
//! loop until the process is interrupted:
//!
//! 1. Obtain the system-wide accessibility element and the window server
//!    connection. Failing either aborts with nothing running.
//! 2. Start the actor on its own thread (`ffm-actor`, current-thread tokio
//!    runtime). The same runtime listens for Ctrl-C and stops the main run
//!    loop.
//! 3. Install the mouse event tap, the focused-window observer and the
//!    application activation observer on the main run loop.
//! 4. Run the main run loop.
//! 5. On exit, remove the tap and the observers, shut the actor down (which
//!    cancels any pending commit) and release the system-wide element.

use super::controller::FfmSettings;
use crate::error::FfmError;

#[cfg(target_os = "macos")]
pub use self::macos::run;

/// Runs focus-follows-mouse. Only macOS is supported.
///
/// # Errors
///
/// Always returns [`FfmError::Unsupported`] on this platform.
#[cfg(not(target_os = "macos"))]
pub fn run(settings: &FfmSettings) -> Result<(), FfmError> {
    tracing::debug!(?settings, "ffm: refusing to start on unsupported platform");
    Err(FfmError::Unsupported(format!(
        "focus follows mouse requires macOS, running on {}",
        std::env::consts::OS
    )))
}

#[cfg(target_os = "macos")]
mod macos {
    use std::thread::JoinHandle;

    use core_foundation::runloop::CFRunLoop;
    use tokio::sync::oneshot;

    use super::{FfmError, FfmSettings};
    use crate::modules::ffm::actor::{FfmActor, FfmHandle};
    use crate::modules::ffm::events::{AppMonitor, FocusObserver, MouseMonitor};
    use crate::modules::ffm::ffi::{SkyLightWindowServer, SystemAccessibility, is_trusted};
    use crate::modules::ffm::{PLUGIN_NAME, PLUGIN_VERSION};
    use crate::platform::spawn_named_thread;

    /// Runs focus-follows-mouse until interrupted.
    ///
    /// Must be called from the main thread.
    ///
    /// # Errors
    ///
    /// Returns [`FfmError::ResourceUnavailable`] if the accessibility element,
    /// the window server connection, the event tap or the workspace observer
    /// cannot be obtained, and [`FfmError::Io`] if the actor thread or its
    /// runtime cannot be created.
    pub fn run(settings: &FfmSettings) -> Result<(), FfmError> {
        if !is_trusted() {
            tracing::warn!(
                "ffm: process is not trusted for accessibility, grant access in System Settings > Privacy & Security > Accessibility"
            );
        }

        let accessibility = SystemAccessibility::new().ok_or_else(|| {
            FfmError::ResourceUnavailable(
                "failed to create the system-wide accessibility element".to_string(),
            )
        })?;
        let window_server = SkyLightWindowServer::connect().ok_or_else(|| {
            FfmError::ResourceUnavailable("failed to connect to the window server".to_string())
        })?;

        let (handle, actor_thread) = start_actor(window_server, accessibility, *settings)?;

        let monitors = match start_monitors(&handle) {
            Ok(monitors) => monitors,
            Err(err) => {
                stop_actor(&handle, actor_thread);
                return Err(err);
            }
        };

        tracing::info!(
            bypass = ?settings.bypass,
            standby_on_float = settings.standby_on_float,
            focus_delay = ?settings.focus_delay,
            mouse_motion_interval = ?settings.mouse_motion_interval,
            "ffm: {PLUGIN_NAME} {PLUGIN_VERSION} running"
        );

        CFRunLoop::run_current();

        drop(monitors);
        stop_actor(&handle, actor_thread);

        tracing::info!("ffm: stopped");
        Ok(())
    }

    fn start_actor(
        window_server: SkyLightWindowServer,
        accessibility: SystemAccessibility,
        settings: FfmSettings,
    ) -> Result<(FfmHandle, JoinHandle<()>), FfmError> {
        let (ready_tx, ready_rx) = oneshot::channel::<Result<FfmHandle, FfmError>>();

        let thread = spawn_named_thread("actor", move || {
            let runtime = match tokio::runtime::Builder::new_current_thread().enable_all().build() {
                Ok(runtime) => runtime,
                Err(err) => {
                    let _ = ready_tx.send(Err(err.into()));
                    return;
                }
            };

            runtime.block_on(async move {
                let (actor, handle) = FfmActor::new(window_server, accessibility, &settings);
                if ready_tx.send(Ok(handle)).is_err() {
                    return;
                }

                tokio::spawn(stop_main_run_loop_on_ctrl_c());
                actor.run().await;
            });
        })?;

        match ready_rx.blocking_recv() {
            Ok(Ok(handle)) => Ok((handle, thread)),
            Ok(Err(err)) => {
                let _ = thread.join();
                Err(err)
            }
            Err(_) => {
                let _ = thread.join();
                Err(FfmError::Actor("actor thread exited during startup".to_string()))
            }
        }
    }

    fn start_monitors(
        handle: &FfmHandle,
    ) -> Result<(MouseMonitor, FocusObserver, AppMonitor), FfmError> {
        let mouse = MouseMonitor::start(handle.clone())?;
        let focus = FocusObserver::start(handle.clone());
        let apps = AppMonitor::start(handle.clone())?;
        Ok((mouse, focus, apps))
    }

    fn stop_actor(handle: &FfmHandle, thread: JoinHandle<()>) {
        if let Err(err) = handle.shutdown_blocking() {
            tracing::debug!(error = %err, "ffm: actor already stopped");
        }
        if thread.join().is_err() {
            tracing::error!("ffm: actor thread panicked");
        }
    }

    async fn stop_main_run_loop_on_ctrl_c() {
        if let Err(err) = tokio::signal::ctrl_c().await {
            tracing::warn!(error = %err, "ffm: failed to listen for interrupt");
            return;
        }

        tracing::info!("ffm: interrupted, shutting down");
        CFRunLoop::get_main().stop();
    }
}
