//! Deterministic scripted implementation of the `agent_provider` contract.
//!
//! Used by tests to exercise lifecycle and terminal-loop behavior without
//! network access, and by `SPEC_FORGE_PROVIDER=mock` for offline runs.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard};

use agent_provider::{
    AgentBinding, AgentProvider, CancelSignal, ProviderInitError, ProviderProfile, TurnError,
};

/// Stable provider identifier used by startup selection.
pub const MOCK_PROVIDER_ID: &str = "mock";

const MOCK_AGENT_ID: &str = "mock-agent";
const MOCK_THREAD_ID: &str = "mock-thread";

/// Scripted provider: pops one pre-seeded outcome per turn.
///
/// When the script runs dry, turns echo an acknowledgment so interactive
/// mock sessions keep working.
pub struct MockProvider {
    model_id: String,
    fail_provision: bool,
    script: Mutex<VecDeque<Result<String, TurnError>>>,
    prompts: Mutex<Vec<String>>,
    provision_calls: AtomicUsize,
    teardown_calls: AtomicUsize,
}

impl MockProvider {
    #[must_use]
    pub fn scripted(outcomes: Vec<Result<String, TurnError>>) -> Self {
        Self {
            model_id: "mock-model".to_string(),
            fail_provision: false,
            script: Mutex::new(outcomes.into()),
            prompts: Mutex::new(Vec::new()),
            provision_calls: AtomicUsize::new(0),
            teardown_calls: AtomicUsize::new(0),
        }
    }

    /// Provider whose `provision` always fails, for bootstrap-error tests.
    #[must_use]
    pub fn failing_provision() -> Self {
        Self {
            fail_provision: true,
            ..Self::scripted(Vec::new())
        }
    }

    /// A short canned interview that ends with a marker-wrapped spec, so
    /// the whole flow can run offline end to end.
    #[must_use]
    pub fn interview() -> Self {
        Self::scripted(vec![
            Ok("Great, let's scope it. What problem does this solve, and for whom?".to_string()),
            Ok("Understood. Which features are must-haves for the first version?".to_string()),
            Ok(concat!(
                "Here is the specification.\n",
                "!!!SPEC_START!!!\n",
                "# Mock Project Specification\n\n",
                "## 1. Executive Summary\n",
                "A deterministic stand-in specification produced by the mock provider.\n",
                "!!!SPEC_END!!!\n",
            )
            .to_string()),
        ])
    }

    #[must_use]
    pub fn sent_prompts(&self) -> Vec<String> {
        lock_unpoisoned(&self.prompts).clone()
    }

    #[must_use]
    pub fn provision_calls(&self) -> usize {
        self.provision_calls.load(Ordering::SeqCst)
    }

    #[must_use]
    pub fn teardown_calls(&self) -> usize {
        self.teardown_calls.load(Ordering::SeqCst)
    }
}

impl Default for MockProvider {
    fn default() -> Self {
        Self::interview()
    }
}

impl AgentProvider for MockProvider {
    fn profile(&self) -> ProviderProfile {
        ProviderProfile {
            provider_id: MOCK_PROVIDER_ID.to_string(),
            model_id: self.model_id.clone(),
        }
    }

    fn provision(&self) -> Result<AgentBinding, ProviderInitError> {
        self.provision_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_provision {
            return Err(ProviderInitError::new("mock provision failure"));
        }

        Ok(AgentBinding {
            agent_id: MOCK_AGENT_ID.to_string(),
            thread_id: MOCK_THREAD_ID.to_string(),
        })
    }

    fn send_turn(&self, text: &str, cancel: &CancelSignal) -> Result<String, TurnError> {
        if cancel.load(Ordering::SeqCst) {
            return Err(TurnError::Cancelled);
        }

        lock_unpoisoned(&self.prompts).push(text.to_string());
        lock_unpoisoned(&self.script)
            .pop_front()
            .unwrap_or_else(|| Ok(format!("Noted: {text}. Tell me more.")))
    }

    fn teardown(&self) -> Result<(), String> {
        self.teardown_calls.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

fn lock_unpoisoned<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    match mutex.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}
