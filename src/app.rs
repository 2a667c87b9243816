use session_store::{SessionDocument, TurnRole};
use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;

use crate::commands::{parse_reserved_command, ReservedCommand};
use crate::specfile;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Idle,
    ConfirmingExit,
    Exiting,
}

/// What the terminal loop should do with one line of input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputAction {
    /// Blank input; prompt again.
    Ignored,
    SaveSession,
    /// `exit`/`quit` was typed; ask for confirmation before leaving.
    ConfirmExit,
    /// Conversation text to send to the agent.
    Forward(String),
}

/// What an agent reply turned out to be.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplyOutcome {
    Conversation(String),
    /// The reply carried the spec markers; the payload is the artifact.
    SpecReady(String),
}

/// Pure terminal-loop state machine: transcript plus exit bookkeeping.
///
/// No I/O happens here — the loop in `main` renders, saves, and sends,
/// so tests can drive every transition directly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct App {
    pub mode: Mode,
    pub should_exit: bool,
    session: SessionDocument,
}

impl App {
    #[must_use]
    pub fn new(session: SessionDocument) -> Self {
        Self {
            mode: Mode::Idle,
            should_exit: false,
            session,
        }
    }

    #[must_use]
    pub fn session(&self) -> &SessionDocument {
        &self.session
    }

    pub fn on_line(&mut self, input: &str) -> InputAction {
        if input.trim().is_empty() {
            return InputAction::Ignored;
        }

        match parse_reserved_command(input) {
            Some(ReservedCommand::Save) => InputAction::SaveSession,
            Some(ReservedCommand::Exit) => {
                self.mode = Mode::ConfirmingExit;
                InputAction::ConfirmExit
            }
            None => InputAction::Forward(input.trim().to_string()),
        }
    }

    pub fn on_exit_confirmed(&mut self) {
        self.mode = Mode::Exiting;
        self.should_exit = true;
    }

    pub fn on_exit_declined(&mut self) {
        self.mode = Mode::Idle;
    }

    pub fn record_user_turn(&mut self, text: &str, ts: impl Into<String>) {
        self.session.push_turn(TurnRole::User, text, ts);
    }

    /// Appends the agent turn and checks it for the spec-ready signal.
    pub fn on_agent_reply(&mut self, reply: &str, ts: impl Into<String>) -> ReplyOutcome {
        self.session.push_turn(TurnRole::Agent, reply, ts);

        match specfile::extract_spec_payload(reply) {
            Some(payload) => {
                self.mode = Mode::Exiting;
                self.should_exit = true;
                ReplyOutcome::SpecReady(payload)
            }
            None => ReplyOutcome::Conversation(reply.to_string()),
        }
    }
}

/// Current UTC time as an RFC3339 string.
///
/// Formatting a UTC timestamp cannot fail in practice; the epoch fallback
/// keeps turn recording total without panicking.
#[must_use]
pub fn now_rfc3339() -> String {
    OffsetDateTime::now_utc()
        .format(&Rfc3339)
        .unwrap_or_else(|_| "1970-01-01T00:00:00Z".to_string())
}
