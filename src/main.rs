use std::io;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use agent_provider::{CancelSignal, TurnError};
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;
use session_store::{SessionDocument, SessionStore};
use spec_forge::app::{now_rfc3339, App, InputAction, ReplyOutcome};
use spec_forge::config::Config;
use spec_forge::lifecycle::AgentLifecycle;
use spec_forge::signals::{exit_code_for_signal, install_shutdown_hook, shutdown_cleanup};
use spec_forge::{console, logging, providers, specfile};

fn main() -> io::Result<()> {
    dotenvy::dotenv().ok();

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(error) => {
            console::error(&format!("configuration: {error}"));
            console::notice("Copy .env.sample to .env and fill in your project endpoint.");
            std::process::exit(1);
        }
    };

    let _log_guard = logging::init(Path::new("."));
    tracing::info!(
        endpoint = %config.project_endpoint,
        model = %config.model_name,
        "starting spec_forge"
    );

    run(config)
}

fn run(config: Config) -> io::Result<()> {
    let store = SessionStore::new(&config.session_dir);
    let app = Arc::new(Mutex::new(App::new(SessionDocument::create(now_rfc3339()))));

    let provider = match providers::provider_from_env(&config) {
        Ok(provider) => provider,
        Err(error) => {
            tracing::error!(error = %error, "provider bootstrap failed");
            console::error(&format!("provider bootstrap: {error}"));
            std::process::exit(1);
        }
    };
    let profile = provider.profile();

    let lifecycle = Arc::new(AgentLifecycle::new(provider));
    let cancel: CancelSignal = Arc::new(AtomicBool::new(false));
    let shutdown_requested = Arc::new(AtomicBool::new(false));

    let _signal_guard = install_shutdown_hook({
        let app = Arc::clone(&app);
        let lifecycle = Arc::clone(&lifecycle);
        let store = store.clone();
        let cancel = Arc::clone(&cancel);
        let shutdown_requested = Arc::clone(&shutdown_requested);
        move |signal| {
            tracing::info!(signal, "shutdown signal received");
            shutdown_requested.store(true, Ordering::SeqCst);
            println!();
            console::notice("Shutting down…");
            shutdown_cleanup(&cancel, &store, &app, &lifecycle);
            std::process::exit(exit_code_for_signal(signal));
        }
    })?;

    console::banner(&profile.provider_id, &profile.model_id);

    console::notice("Creating agent…");
    if let Err(error) = lifecycle.create() {
        tracing::error!(error = %error, "agent creation failed");
        console::error(&format!("agent creation: {error}"));
        std::process::exit(1);
    }
    console::success("Agent ready.");
    console::greeting();

    let mut editor = DefaultEditor::new().map_err(io::Error::other)?;

    while !shutdown_requested.load(Ordering::SeqCst) {
        let line = match editor.readline(console::PROMPT) {
            Ok(line) => line,
            Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => {
                println!();
                break;
            }
            Err(error) => {
                tracing::error!(error = %error, "terminal read failed");
                console::error(&format!("terminal: {error}"));
                break;
            }
        };

        match lock_unpoisoned(&app).on_line(&line) {
            InputAction::Ignored => {}
            InputAction::SaveSession => save_session(&store, &app),
            InputAction::ConfirmExit => {
                let confirmed = confirm_exit(&mut editor)?;
                {
                    let mut app = lock_unpoisoned(&app);
                    if confirmed {
                        app.on_exit_confirmed();
                    } else {
                        app.on_exit_declined();
                    }
                }
                if confirmed {
                    console::notice("Exiting…");
                    break;
                }
            }
            InputAction::Forward(text) => {
                let _ = editor.add_history_entry(text.as_str());
                if !converse(&config, &app, &lifecycle, &cancel, &text) {
                    break;
                }
            }
        }
    }

    finish(&store, &app, &lifecycle)
}

/// One conversational exchange. Returns false when the loop must stop.
fn converse(
    config: &Config,
    app: &Mutex<App>,
    lifecycle: &AgentLifecycle,
    cancel: &CancelSignal,
    text: &str,
) -> bool {
    lock_unpoisoned(app).record_user_turn(text, now_rfc3339());
    console::thinking();

    match lifecycle.send_turn(text, cancel) {
        Ok(reply) => {
            let outcome = lock_unpoisoned(app).on_agent_reply(&reply, now_rfc3339());
            match outcome {
                ReplyOutcome::Conversation(reply) => {
                    console::agent_reply(&reply);
                    true
                }
                ReplyOutcome::SpecReady(payload) => {
                    write_spec(config, &payload);
                    false
                }
            }
        }
        Err(TurnError::Cancelled) => false,
        Err(error @ (TurnError::Auth(_) | TurnError::Lifecycle(_))) => {
            tracing::error!(error = %error, "conversation ended by fatal turn error");
            console::error(&error.to_string());
            false
        }
        Err(TurnError::Remote(message)) => {
            tracing::error!(error = %message, "turn failed");
            console::error(&format!("agent call failed: {message}"));
            console::notice("You can try again, or type 'exit' to quit.");
            true
        }
    }
}

fn write_spec(config: &Config, payload: &str) {
    match specfile::write_spec_file(&config.output_file, payload) {
        Ok(()) => {
            tracing::info!(path = %config.output_file.display(), "specification written");
            console::agent_reply("Specification generation complete!");
            console::success(&format!("Saved to {}", config.output_file.display()));
        }
        Err(error) => {
            tracing::error!(error = %error, "specification write failed");
            console::error(&format!("specification write: {error}"));
        }
    }
}

fn save_session(store: &SessionStore, app: &Mutex<App>) {
    let session = lock_unpoisoned(app).session().clone();
    match store.save(&session) {
        Ok(path) => console::success(&format!("Session saved to {}", path.display())),
        Err(error) => {
            tracing::error!(error = %error, "session save failed");
            console::error(&format!("session save: {error}"));
        }
    }
}

/// Final save plus remote-agent teardown on the normal exit path. The
/// signal path runs the same work through `shutdown_cleanup`.
fn finish(store: &SessionStore, app: &Mutex<App>, lifecycle: &AgentLifecycle) -> io::Result<()> {
    let session = lock_unpoisoned(app).session().clone();
    match store.save(&session) {
        Ok(path) => {
            tracing::info!(path = %path.display(), "session saved");
            console::notice(&format!("Session saved to {}", path.display()));
        }
        Err(error) => {
            tracing::error!(error = %error, "final session save failed");
            console::error(&format!("final session save: {error}"));
        }
    }

    console::notice("Deleting agent…");
    lifecycle.terminate();
    console::notice("Goodbye.");
    Ok(())
}

fn confirm_exit(editor: &mut DefaultEditor) -> io::Result<bool> {
    match editor.readline("Are you sure you want to exit? [y/N] ") {
        Ok(answer) => Ok(matches!(
            answer.trim().to_ascii_lowercase().as_str(),
            "y" | "yes"
        )),
        Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => Ok(true),
        Err(error) => Err(io::Error::other(error)),
    }
}

fn lock_unpoisoned<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    match mutex.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}
