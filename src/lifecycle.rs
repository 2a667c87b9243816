use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use agent_provider::{AgentBinding, AgentProvider, CancelSignal, ProviderInitError, TurnError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleState {
    Uninitialized,
    Created,
    Conversing,
    Terminated,
}

impl LifecycleState {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Uninitialized => "uninitialized",
            Self::Created => "created",
            Self::Conversing => "conversing",
            Self::Terminated => "terminated",
        }
    }
}

/// Owner of the remote agent resource for one process run.
///
/// Drives uninitialized → created → conversing → terminated. `terminate`
/// is latched: the normal exit path and the signal path may both call it,
/// the provider tears down exactly once, and teardown failures never block
/// process exit.
pub struct AgentLifecycle {
    provider: Arc<dyn AgentProvider>,
    state: Mutex<LifecycleState>,
    terminated: AtomicBool,
}

impl AgentLifecycle {
    #[must_use]
    pub fn new(provider: Arc<dyn AgentProvider>) -> Self {
        Self {
            provider,
            state: Mutex::new(LifecycleState::Uninitialized),
            terminated: AtomicBool::new(false),
        }
    }

    #[must_use]
    pub fn state(&self) -> LifecycleState {
        *self.lock_state()
    }

    /// Provisions the remote agent. Legal only from `Uninitialized`.
    ///
    /// The state lock is not held across the remote call; a shutdown that
    /// races provisioning releases the freshly created resource here.
    pub fn create(&self) -> Result<AgentBinding, ProviderInitError> {
        if self.terminated.load(Ordering::SeqCst) {
            return Err(ProviderInitError::new("agent lifecycle is already terminated"));
        }

        {
            let state = self.lock_state();
            if *state != LifecycleState::Uninitialized {
                return Err(ProviderInitError::new(format!(
                    "cannot create agent from state '{}'",
                    state.as_str()
                )));
            }
        }

        let binding = self.provider.provision()?;

        if self.terminated.load(Ordering::SeqCst) {
            if let Err(error) = self.provider.teardown() {
                tracing::error!(error = %error, "agent cleanup failed during shutdown");
            }
            return Err(ProviderInitError::new("shutdown requested during agent creation"));
        }

        *self.lock_state() = LifecycleState::Created;
        tracing::info!(
            agent_id = %binding.agent_id,
            thread_id = %binding.thread_id,
            state = "created",
            "agent lifecycle transition"
        );
        Ok(binding)
    }

    /// Sends one turn. Legal from `Created` (entering `Conversing`) and
    /// from `Conversing`.
    pub fn send_turn(&self, text: &str, cancel: &CancelSignal) -> Result<String, TurnError> {
        {
            let mut state = self.lock_state();
            match *state {
                LifecycleState::Created => {
                    *state = LifecycleState::Conversing;
                    tracing::info!(state = "conversing", "agent lifecycle transition");
                }
                LifecycleState::Conversing => {}
                other => {
                    return Err(TurnError::Lifecycle(format!(
                        "conversation is not active (state: {})",
                        other.as_str()
                    )));
                }
            }
        }

        self.provider.send_turn(text, cancel)
    }

    /// Releases the remote agent, whatever state the conversation was in.
    /// Safe to call repeatedly and from the signal thread.
    pub fn terminate(&self) {
        if self.terminated.swap(true, Ordering::SeqCst) {
            return;
        }

        let previous = {
            let mut state = self.lock_state();
            std::mem::replace(&mut *state, LifecycleState::Terminated)
        };
        tracing::info!(
            from = previous.as_str(),
            state = "terminated",
            "agent lifecycle transition"
        );

        if previous == LifecycleState::Uninitialized {
            return;
        }

        if let Err(error) = self.provider.teardown() {
            tracing::error!(error = %error, "agent cleanup failed");
        }
    }

    #[must_use]
    pub fn is_terminated(&self) -> bool {
        self.terminated.load(Ordering::SeqCst)
    }

    fn lock_state(&self) -> MutexGuard<'_, LifecycleState> {
        match self.state.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::AtomicBool;
    use std::sync::Arc;

    use agent_provider::{CancelSignal, TurnError};
    use agent_provider_mock::MockProvider;

    use super::{AgentLifecycle, LifecycleState};

    fn cancel_signal() -> CancelSignal {
        Arc::new(AtomicBool::new(false))
    }

    #[test]
    fn the_happy_path_walks_every_state() {
        let provider = Arc::new(MockProvider::scripted(vec![Ok("reply".to_string())]));
        let lifecycle = AgentLifecycle::new(Arc::clone(&provider) as _);
        assert_eq!(lifecycle.state(), LifecycleState::Uninitialized);

        lifecycle.create().expect("create should succeed");
        assert_eq!(lifecycle.state(), LifecycleState::Created);

        let reply = lifecycle
            .send_turn("hello", &cancel_signal())
            .expect("turn should succeed");
        assert_eq!(reply, "reply");
        assert_eq!(lifecycle.state(), LifecycleState::Conversing);

        lifecycle.terminate();
        assert_eq!(lifecycle.state(), LifecycleState::Terminated);
        assert_eq!(provider.teardown_calls(), 1);
    }

    #[test]
    fn terminate_tears_down_exactly_once() {
        let provider = Arc::new(MockProvider::interview());
        let lifecycle = AgentLifecycle::new(Arc::clone(&provider) as _);
        lifecycle.create().expect("create should succeed");

        lifecycle.terminate();
        lifecycle.terminate();
        lifecycle.terminate();
        assert_eq!(provider.teardown_calls(), 1);
    }

    #[test]
    fn terminate_before_create_skips_teardown() {
        let provider = Arc::new(MockProvider::interview());
        let lifecycle = AgentLifecycle::new(Arc::clone(&provider) as _);

        lifecycle.terminate();
        assert_eq!(provider.teardown_calls(), 0);
        assert!(lifecycle.is_terminated());
    }

    #[test]
    fn terminate_covers_the_error_exit_path_too() {
        let provider = Arc::new(MockProvider::scripted(vec![Err(TurnError::Remote(
            "boom".to_string(),
        ))]));
        let lifecycle = AgentLifecycle::new(Arc::clone(&provider) as _);
        lifecycle.create().expect("create should succeed");

        lifecycle
            .send_turn("hello", &cancel_signal())
            .expect_err("scripted turn should fail");
        lifecycle.terminate();
        assert_eq!(provider.teardown_calls(), 1);
    }

    #[test]
    fn turns_after_termination_fail_with_a_lifecycle_error() {
        let provider = Arc::new(MockProvider::interview());
        let lifecycle = AgentLifecycle::new(provider as _);
        lifecycle.create().expect("create should succeed");
        lifecycle.terminate();

        match lifecycle.send_turn("hello", &cancel_signal()) {
            Err(TurnError::Lifecycle(message)) => {
                assert!(message.contains("terminated"), "unexpected message: {message}");
            }
            other => panic!("expected lifecycle error, got {other:?}"),
        }
    }

    #[test]
    fn turns_before_create_fail_with_a_lifecycle_error() {
        let lifecycle = AgentLifecycle::new(Arc::new(MockProvider::interview()) as _);
        assert!(matches!(
            lifecycle.send_turn("hello", &cancel_signal()),
            Err(TurnError::Lifecycle(_))
        ));
    }

    #[test]
    fn create_is_rejected_after_creation_or_termination() {
        let provider = Arc::new(MockProvider::interview());
        let lifecycle = AgentLifecycle::new(Arc::clone(&provider) as _);
        lifecycle.create().expect("create should succeed");
        lifecycle
            .create()
            .expect_err("double creation should fail");

        lifecycle.terminate();
        lifecycle
            .create()
            .expect_err("creation after termination should fail");
        assert_eq!(provider.provision_calls(), 1);
    }

    #[test]
    fn failed_provisioning_leaves_the_lifecycle_uninitialized() {
        let provider = Arc::new(MockProvider::failing_provision());
        let lifecycle = AgentLifecycle::new(Arc::clone(&provider) as _);

        lifecycle.create().expect_err("provision should fail");
        assert_eq!(lifecycle.state(), LifecycleState::Uninitialized);

        lifecycle.terminate();
        assert_eq!(provider.teardown_calls(), 0);
    }
}
