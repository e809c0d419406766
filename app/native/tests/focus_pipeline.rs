//! End-to-end tests of the focus actor against the in-memory desktop.
//!
//! Time is paused, so commit delays elapse instantly and in order. Every
//! check that depends on the actor having caught up goes through
//! [`FfmHandle::status`], which is answered only after all earlier messages.

use std::time::Duration;

use ffm_lib::modules::ffm::testing::{FakeDesktop, FakeWindow, FocusCall};
use ffm_lib::modules::ffm::{
    EXPORT_TILING_FLOAT, EXPORT_WINDOW_FOCUSED, FfmActor, FfmHandle, FfmMessage, FfmSettings,
    Modifiers, MotionEvent, ScreenPoint,
};

const OWN_CONNECTION: i32 = 1;
const MS: u64 = 1_000_000;

fn settings() -> FfmSettings {
    FfmSettings {
        bypass: Modifiers::FN,
        standby_on_float: true,
        focus_delay: Duration::from_millis(100),
        mouse_motion_interval: Duration::from_millis(35),
    }
}

fn spawn(desktop: &FakeDesktop) -> FfmHandle {
    FfmActor::spawn(desktop.clone(), desktop.clone(), &settings())
}

fn motion(ms: u64, x: f64) -> MotionEvent {
    MotionEvent::new(ms * MS, ScreenPoint::new(x, 0.0), Modifiers::empty())
}

fn words(values: &[u32]) -> Vec<u8> { values.iter().flat_map(|v| v.to_ne_bytes()).collect() }

#[tokio::test(start_paused = true)]
async fn test_hovered_window_is_focused_after_delay() {
    let desktop = FakeDesktop::new(OWN_CONNECTION);
    desktop.set_window(FakeWindow::normal(42, 7));
    let handle = spawn(&desktop);

    handle.mouse_moved(motion(0, 10.0));
    handle.mouse_moved(motion(50, 20.0));

    let status = handle.status().await.unwrap();
    assert_eq!(status.pending_target, Some(42));
    assert!(desktop.focus_calls().is_empty());

    tokio::time::sleep(Duration::from_millis(110)).await;

    let status = handle.status().await.unwrap();
    assert_eq!(status.pending_target, None);
    assert_eq!(desktop.focus_calls(), vec![FocusCall::Window(42), FocusCall::Application(7)]);
    assert_eq!(desktop.live_elements(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_resting_on_committed_window_commits_once() {
    let desktop = FakeDesktop::new(OWN_CONNECTION);
    desktop.set_window(FakeWindow::normal(42, 7));
    let handle = spawn(&desktop);

    for step in 0..10 {
        handle.mouse_moved(motion(step * 150, 10.0));
        tokio::time::sleep(Duration::from_millis(150)).await;
    }

    let status = handle.status().await.unwrap();
    assert_eq!(status.focused_window_id, Some(42));
    assert_eq!(status.pending_target, None);
    assert_eq!(desktop.focus_calls(), vec![FocusCall::Window(42), FocusCall::Application(7)]);
    assert_eq!(desktop.acquired(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_hovering_pending_window_acquires_nothing_more() {
    let desktop = FakeDesktop::new(OWN_CONNECTION);
    desktop.set_window(FakeWindow::normal(42, 7));
    let handle = FfmActor::spawn(desktop.clone(), desktop.clone(), &FfmSettings {
        focus_delay: Duration::from_secs(5),
        ..settings()
    });

    for step in 0..20 {
        handle.mouse_moved(motion(step * 40, 10.0));
    }

    assert_eq!(handle.status().await.unwrap().pending_target, Some(42));
    assert_eq!(desktop.acquired(), 1);
    assert_eq!(desktop.live_elements(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_nothing_commits_before_the_delay() {
    let desktop = FakeDesktop::new(OWN_CONNECTION);
    desktop.set_window(FakeWindow::normal(42, 7));
    let handle = spawn(&desktop);

    handle.mouse_moved(motion(0, 10.0));
    tokio::time::sleep(Duration::from_millis(90)).await;

    assert_eq!(handle.status().await.unwrap().pending_target, Some(42));
    assert!(desktop.focus_calls().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_standby_blocks_focus_until_window_tiles_again() {
    let desktop = FakeDesktop::new(OWN_CONNECTION);
    desktop.set_window(FakeWindow::normal(42, 7));
    let handle = spawn(&desktop);

    handle.tiling_float_changed(3, 1).unwrap();
    handle.mouse_moved(motion(0, 10.0));

    let status = handle.status().await.unwrap();
    assert!(!status.active);
    assert_eq!(status.pending_target, None);

    tokio::time::sleep(Duration::from_millis(200)).await;
    assert!(desktop.focus_calls().is_empty());

    handle.tiling_float_changed(3, 0).unwrap();
    handle.mouse_moved(motion(300, 10.0));
    assert_eq!(handle.status().await.unwrap().pending_target, Some(42));
}

#[tokio::test(start_paused = true)]
async fn test_external_focus_preempts_pending_commit() {
    let desktop = FakeDesktop::new(OWN_CONNECTION);
    desktop.set_window(FakeWindow::normal(42, 7));
    let handle = spawn(&desktop);

    handle.mouse_moved(motion(0, 10.0));
    assert_eq!(handle.status().await.unwrap().pending_target, Some(42));

    handle.window_focused(9).unwrap();
    let status = handle.status().await.unwrap();
    assert_eq!(status.pending_target, None);
    assert_eq!(status.focused_window_id, Some(9));
    assert_eq!(desktop.released_windows(), vec![42]);

    tokio::time::sleep(Duration::from_millis(200)).await;
    assert!(desktop.focus_calls().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_moving_to_another_window_supersedes() {
    let desktop = FakeDesktop::new(OWN_CONNECTION);
    desktop.place_window(FakeWindow::normal(42, 7), 0.0..100.0);
    desktop.place_window(FakeWindow::normal(43, 8), 100.0..200.0);
    let handle = spawn(&desktop);

    handle.mouse_moved(motion(0, 50.0));
    tokio::time::sleep(Duration::from_millis(40)).await;
    handle.mouse_moved(motion(40, 150.0));
    assert_eq!(handle.status().await.unwrap().pending_target, Some(43));

    tokio::time::sleep(Duration::from_millis(150)).await;

    assert_eq!(handle.status().await.unwrap().pending_target, None);
    assert_eq!(desktop.focus_calls(), vec![FocusCall::Window(43), FocusCall::Application(8)]);
    assert_eq!(desktop.released_windows(), vec![42, 43]);
}

#[tokio::test(start_paused = true)]
async fn test_bypass_modifier_cancels_pending_commit() {
    let desktop = FakeDesktop::new(OWN_CONNECTION);
    desktop.set_window(FakeWindow::normal(42, 7));
    let handle = spawn(&desktop);

    handle.mouse_moved(motion(0, 10.0));
    handle.mouse_moved(MotionEvent::new(
        50 * MS,
        ScreenPoint::new(20.0, 0.0),
        Modifiers::FN | Modifiers::SHIFT,
    ));

    assert_eq!(handle.status().await.unwrap().pending_target, None);
    tokio::time::sleep(Duration::from_millis(200)).await;
    assert!(desktop.focus_calls().is_empty());
    assert_eq!(desktop.live_elements(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_activated_application_window_is_not_refocused() {
    let desktop = FakeDesktop::new(OWN_CONNECTION);
    desktop.set_window(FakeWindow::normal(42, 7));
    desktop.set_focused_window_of(7, 42);
    let handle = spawn(&desktop);

    handle.application_activated(7).unwrap();
    handle.mouse_moved(motion(0, 10.0));

    let status = handle.status().await.unwrap();
    assert_eq!(status.focused_window_id, Some(42));
    assert_eq!(status.pending_target, None);
    assert_eq!(desktop.live_elements(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_host_exports_drive_the_actor() {
    let desktop = FakeDesktop::new(OWN_CONNECTION);
    let handle = spawn(&desktop);

    let focused = FfmMessage::from_export(EXPORT_WINDOW_FOCUSED, &words(&[9])).unwrap();
    handle.send(focused).unwrap();
    let floated = FfmMessage::from_export(EXPORT_TILING_FLOAT, &words(&[9, 1])).unwrap();
    handle.send(floated).unwrap();

    let status = handle.status().await.unwrap();
    assert_eq!(status.focused_window_id, Some(9));
    assert!(!status.active);
    assert!(!handle.tracker().is_active());
}

#[tokio::test(start_paused = true)]
async fn test_shutdown_cancels_pending_commit() {
    let desktop = FakeDesktop::new(OWN_CONNECTION);
    desktop.set_window(FakeWindow::normal(42, 7));
    let handle = spawn(&desktop);

    handle.mouse_moved(motion(0, 10.0));
    assert_eq!(handle.status().await.unwrap().pending_target, Some(42));

    handle.shutdown().await.unwrap();
    tokio::time::sleep(Duration::from_millis(200)).await;

    assert!(handle.is_closed());
    assert!(handle.status().await.is_err());
    assert!(desktop.focus_calls().is_empty());
    assert_eq!(desktop.live_elements(), 0);
}
