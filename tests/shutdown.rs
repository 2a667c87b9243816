use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use agent_provider::CancelSignal;
use agent_provider_mock::MockProvider;
use session_store::{SessionDocument, SessionStore};
use spec_forge::app::App;
use spec_forge::lifecycle::AgentLifecycle;
use spec_forge::signals::{exit_code_for_signal, run_cleanup_once, shutdown_cleanup};

fn cancel_signal() -> CancelSignal {
    Arc::new(AtomicBool::new(false))
}

#[test]
fn cleanup_persists_appended_turns_and_releases_the_agent() {
    let provider = Arc::new(MockProvider::interview());
    let lifecycle = AgentLifecycle::new(Arc::clone(&provider) as _);
    lifecycle.create().expect("create should succeed");

    let dir = tempfile::tempdir().expect("tempdir should be created");
    let store = SessionStore::new(dir.path().join(".sessions"));
    let mut app = App::new(SessionDocument::v1("session-1", "2026-08-06T10:00:00Z"));
    app.record_user_turn("only turn so far", "2026-08-06T10:00:05Z");
    let app = Mutex::new(app);
    let cancel = cancel_signal();

    shutdown_cleanup(&cancel, &store, &app, &lifecycle);

    assert!(cancel.load(Ordering::SeqCst), "in-flight calls must be abandoned");
    let loaded = store.load("session-1").expect("session should be on disk");
    assert_eq!(loaded.turns.len(), 1);
    assert_eq!(loaded.turns[0].text, "only turn so far");
    assert!(lifecycle.is_terminated());
    assert_eq!(provider.teardown_calls(), 1);
}

#[test]
fn cleanup_racing_the_normal_exit_path_tears_down_once() {
    let provider = Arc::new(MockProvider::interview());
    let lifecycle = AgentLifecycle::new(Arc::clone(&provider) as _);
    lifecycle.create().expect("create should succeed");

    let dir = tempfile::tempdir().expect("tempdir should be created");
    let store = SessionStore::new(dir.path().join(".sessions"));
    let app = Mutex::new(App::new(SessionDocument::v1(
        "session-1",
        "2026-08-06T10:00:00Z",
    )));
    let cancel = cancel_signal();

    // Signal path, then the normal exit path's terminate.
    shutdown_cleanup(&cancel, &store, &app, &lifecycle);
    lifecycle.terminate();
    assert_eq!(provider.teardown_calls(), 1);
}

#[test]
fn cleanup_before_the_agent_exists_still_saves_the_session() {
    let provider = Arc::new(MockProvider::interview());
    let lifecycle = AgentLifecycle::new(Arc::clone(&provider) as _);

    let dir = tempfile::tempdir().expect("tempdir should be created");
    let store = SessionStore::new(dir.path().join(".sessions"));
    let app = Mutex::new(App::new(SessionDocument::v1(
        "session-1",
        "2026-08-06T10:00:00Z",
    )));

    shutdown_cleanup(&cancel_signal(), &store, &app, &lifecycle);

    assert!(store.load("session-1").is_ok());
    assert_eq!(provider.teardown_calls(), 0);
}

#[test]
fn the_cleanup_closure_runs_for_the_first_signal_only() {
    let runs = AtomicUsize::new(0);
    let observed_signal = AtomicUsize::new(0);
    let ran = AtomicBool::new(false);
    let cleanup = |signal: i32| {
        runs.fetch_add(1, Ordering::SeqCst);
        observed_signal.store(signal as usize, Ordering::SeqCst);
    };

    run_cleanup_once(&cleanup, &ran, 2);
    run_cleanup_once(&cleanup, &ran, 15);
    run_cleanup_once(&cleanup, &ran, 2);

    assert_eq!(runs.load(Ordering::SeqCst), 1);
    assert_eq!(observed_signal.load(Ordering::SeqCst), 2);
}

#[test]
fn signal_exit_codes_follow_the_128_convention() {
    assert_eq!(exit_code_for_signal(2), 130);
    assert_eq!(exit_code_for_signal(15), 143);
}
