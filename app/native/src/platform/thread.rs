use std::io;
use std::thread::{self, JoinHandle};

/// Spawns a thread named `ffm-{name}`.
///
/// # Errors
///
/// Returns the OS error if the thread could not be created.
pub fn spawn_named_thread<F, T>(name: &str, task: F) -> io::Result<JoinHandle<T>>
where
    F: FnOnce() -> T + Send + 'static,
    T: Send + 'static,
{
    let thread_name = format!("ffm-{name}");

    thread::Builder::new().name(thread_name.clone()).spawn(task).inspect_err(|err| {
        tracing::error!(thread = %thread_name, error = %err, "ffm: failed to spawn thread");
    })
}
