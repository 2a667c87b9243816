use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Version written into every session document.
pub const SESSION_SCHEMA_VERSION: u32 = 1;

/// Author of one conversation turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TurnRole {
    User,
    Agent,
    System,
}

impl TurnRole {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Agent => "agent",
            Self::System => "system",
        }
    }
}

/// One message exchanged with the remote agent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Turn {
    pub role: TurnRole,
    pub text: String,
    pub ts: String,
}

impl Turn {
    #[must_use]
    pub fn new(role: TurnRole, text: impl Into<String>, ts: impl Into<String>) -> Self {
        Self {
            role,
            text: text.into(),
            ts: ts.into(),
        }
    }
}

/// Full transcript of one interview session.
///
/// Mutated only by appending turns; `updated_at` tracks the newest turn.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SessionDocument {
    pub version: u32,
    pub session_id: String,
    pub created_at: String,
    pub updated_at: String,
    pub turns: Vec<Turn>,
}

impl SessionDocument {
    /// Starts an empty transcript with a generated session id.
    #[must_use]
    pub fn create(created_at: impl Into<String>) -> Self {
        Self::v1(Uuid::new_v4().to_string(), created_at)
    }

    #[must_use]
    pub fn v1(session_id: impl Into<String>, created_at: impl Into<String>) -> Self {
        let created_at = created_at.into();
        Self {
            version: SESSION_SCHEMA_VERSION,
            session_id: session_id.into(),
            updated_at: created_at.clone(),
            created_at,
            turns: Vec::new(),
        }
    }

    /// Appends one turn and advances the update stamp.
    pub fn push_turn(&mut self, role: TurnRole, text: impl Into<String>, ts: impl Into<String>) {
        let ts = ts.into();
        self.updated_at = ts.clone();
        self.turns.push(Turn::new(role, text, ts));
    }
}
