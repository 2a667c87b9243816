//! Minimal provider-agnostic contract for one interview conversation.
//!
//! This crate intentionally defines only the shared lifecycle and turn
//! exchange types. It excludes provider transport details, wire payloads,
//! and terminal-loop concerns.

use std::fmt;
use std::sync::{atomic::AtomicBool, Arc};

/// Shared cancellation flag observed by in-flight provider calls.
pub type CancelSignal = Arc<AtomicBool>;

/// Error returned while constructing/configuring a provider before any
/// conversation starts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderInitError {
    message: String,
}

impl ProviderInitError {
    /// Creates a new provider initialization error.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    /// Returns the underlying error message.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for ProviderInitError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for ProviderInitError {}

impl From<String> for ProviderInitError {
    fn from(message: String) -> Self {
        Self::new(message)
    }
}

impl From<&str> for ProviderInitError {
    fn from(message: &str) -> Self {
        Self::new(message)
    }
}

/// Immutable metadata describing a conversation provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderProfile {
    pub provider_id: String,
    pub model_id: String,
}

/// Identifiers of a provisioned remote agent resource.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AgentBinding {
    pub agent_id: String,
    pub thread_id: String,
}

/// Terminal classification of a failed conversation turn.
///
/// By the time a provider reports one of these, its own retry budget is
/// spent: `Remote` degrades to a user-visible message and the conversation
/// continues, while `Auth` and `Lifecycle` end it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TurnError {
    /// The shared cancel flag was raised while the call was in flight.
    Cancelled,
    /// The service rejected the caller's credentials or permissions.
    Auth(String),
    /// The conversation is not in a state that can accept turns.
    Lifecycle(String),
    /// Any other remote failure, surfaced after retries were exhausted.
    Remote(String),
}

impl TurnError {
    /// Returns true when this error must end the conversation loop.
    #[must_use]
    pub fn ends_conversation(&self) -> bool {
        !matches!(self, Self::Remote(_))
    }
}

impl fmt::Display for TurnError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Cancelled => write!(f, "turn was cancelled"),
            Self::Auth(message) => write!(f, "authentication failed: {message}"),
            Self::Lifecycle(message) => write!(f, "{message}"),
            Self::Remote(message) => write!(f, "{message}"),
        }
    }
}

impl std::error::Error for TurnError {}

/// Provider interface owning one remote agent resource.
///
/// The caller drives the resource through provision → turns → teardown.
/// Implementations must keep `teardown` safe to call from any state and
/// from a thread other than the one issuing turns.
pub trait AgentProvider: Send + Sync + 'static {
    /// Returns provider/model identity metadata.
    fn profile(&self) -> ProviderProfile;

    /// Provisions the remote agent resource and returns its identifiers.
    fn provision(&self) -> Result<AgentBinding, ProviderInitError>;

    /// Sends one user turn and blocks until the agent's reply text.
    fn send_turn(&self, text: &str, cancel: &CancelSignal) -> Result<String, TurnError>;

    /// Releases the remote agent resource. Must be idempotent.
    fn teardown(&self) -> Result<(), String>;
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::AtomicBool;
    use std::sync::Arc;

    use super::{
        AgentBinding, AgentProvider, CancelSignal, ProviderInitError, ProviderProfile, TurnError,
    };

    struct MinimalProvider;

    impl AgentProvider for MinimalProvider {
        fn profile(&self) -> ProviderProfile {
            ProviderProfile {
                provider_id: "minimal".to_string(),
                model_id: "minimal-model".to_string(),
            }
        }

        fn provision(&self) -> Result<AgentBinding, ProviderInitError> {
            Ok(AgentBinding {
                agent_id: "agent-1".to_string(),
                thread_id: "thread-1".to_string(),
            })
        }

        fn send_turn(&self, text: &str, _cancel: &CancelSignal) -> Result<String, TurnError> {
            Ok(format!("echo: {text}"))
        }

        fn teardown(&self) -> Result<(), String> {
            Ok(())
        }
    }

    #[test]
    fn provider_init_error_preserves_message() {
        let error = ProviderInitError::new("missing token");
        assert_eq!(error.message(), "missing token");
        assert_eq!(error.to_string(), "missing token");
    }

    #[test]
    fn minimal_provider_round_trips_a_turn() {
        let provider = MinimalProvider;
        let binding = provider.provision().expect("provision should succeed");
        assert_eq!(binding.agent_id, "agent-1");

        let cancel: CancelSignal = Arc::new(AtomicBool::new(false));
        let reply = provider
            .send_turn("hello", &cancel)
            .expect("turn should succeed");
        assert_eq!(reply, "echo: hello");

        provider.teardown().expect("teardown should succeed");
    }

    #[test]
    fn only_remote_errors_keep_the_conversation_alive() {
        assert!(!TurnError::Remote("503".to_string()).ends_conversation());
        assert!(TurnError::Auth("denied".to_string()).ends_conversation());
        assert!(TurnError::Lifecycle("terminated".to_string()).ends_conversation());
        assert!(TurnError::Cancelled.ends_conversation());
    }

    #[test]
    fn turn_error_display_carries_the_message() {
        assert_eq!(
            TurnError::Auth("invalid bearer token".to_string()).to_string(),
            "authentication failed: invalid bearer token"
        );
        assert_eq!(
            TurnError::Remote("service unavailable".to_string()).to_string(),
            "service unavailable"
        );
        assert_eq!(TurnError::Cancelled.to_string(), "turn was cancelled");
    }
}
