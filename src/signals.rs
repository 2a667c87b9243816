use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard};
use std::thread::{self, JoinHandle};

use agent_provider::CancelSignal;
use session_store::SessionStore;
use signal_hook::consts::{SIGINT, SIGTERM};
use signal_hook::iterator::Signals;

use crate::app::App;
use crate::lifecycle::AgentLifecycle;

/// Guard for the installed shutdown hook; closes the signal handle and
/// joins the listener thread on drop.
pub struct ShutdownHookGuard {
    handle: signal_hook::iterator::Handle,
    thread: Option<JoinHandle<()>>,
}

impl Drop for ShutdownHookGuard {
    fn drop(&mut self) {
        self.handle.close();
        if let Some(thread) = self.thread.take() {
            let _ = thread.join();
        }
    }
}

/// Install a SIGINT/SIGTERM cleanup hook.
///
/// The closure receives the signal number and runs at most once; further
/// signals are ignored so a second interrupt cannot race the cleanup. All
/// state the closure needs is captured explicitly by the caller.
pub fn install_shutdown_hook<F>(cleanup: F) -> std::io::Result<ShutdownHookGuard>
where
    F: Fn(i32) + Send + Sync + 'static,
{
    let ran = AtomicBool::new(false);
    let mut signals = Signals::new([SIGINT, SIGTERM])?;
    let handle = signals.handle();

    let thread = thread::Builder::new()
        .name("spec-forge-signals".to_string())
        .spawn(move || {
            for signal in signals.forever() {
                run_cleanup_once(&cleanup, &ran, signal);
            }
        })?;

    Ok(ShutdownHookGuard {
        handle,
        thread: Some(thread),
    })
}

/// Runs `cleanup` for the first delivered signal only.
pub fn run_cleanup_once(cleanup: &dyn Fn(i32), ran: &AtomicBool, signal: i32) {
    if ran.swap(true, Ordering::SeqCst) {
        return;
    }
    cleanup(signal);
}

/// Conventional exit status for a signal-terminated process.
#[must_use]
pub fn exit_code_for_signal(signal: i32) -> i32 {
    128 + signal
}

/// Best-effort shutdown work shared by the signal path: abandon any
/// in-flight remote call, persist whatever turns are fully appended, then
/// release the remote agent.
///
/// Save failures are logged and do not stop the teardown.
pub fn shutdown_cleanup(
    cancel: &CancelSignal,
    store: &SessionStore,
    app: &Mutex<App>,
    lifecycle: &AgentLifecycle,
) {
    cancel.store(true, Ordering::SeqCst);

    let session = lock_unpoisoned(app).session().clone();
    match store.save(&session) {
        Ok(path) => tracing::info!(path = %path.display(), "session saved on shutdown"),
        Err(error) => tracing::error!(error = %error, "best-effort session save failed"),
    }

    lifecycle.terminate();
}

fn lock_unpoisoned<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    match mutex.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}
