//! Agents-service implementation of the shared `agent_provider` contract.
//!
//! This adapter blocks the caller on `foundry_api` futures through a
//! current-thread tokio runtime, so the interactive loop stays a plain
//! synchronous request/response cycle.

use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use agent_provider::{
    AgentBinding, AgentProvider, CancelSignal, ProviderInitError, ProviderProfile, TurnError,
};
use foundry_api::payload::CreateAgentRequest;
use foundry_api::{FoundryApiClient, FoundryApiConfig, FoundryApiError};

pub use foundry_api::RetryPolicy;

/// Stable provider identifier used by startup selection.
pub const FOUNDRY_PROVIDER_ID: &str = "foundry";

/// Runtime configuration for the agents-service provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FoundryProviderConfig {
    pub access_token: String,
    pub endpoint: String,
    pub model_id: String,
    pub agent_name: String,
    pub instructions: String,
    pub api_version: Option<String>,
    pub timeout: Option<Duration>,
    pub poll_interval: Option<Duration>,
    pub retry: Option<RetryPolicy>,
}

impl FoundryProviderConfig {
    #[must_use]
    pub fn new(
        access_token: impl Into<String>,
        endpoint: impl Into<String>,
        model_id: impl Into<String>,
    ) -> Self {
        Self {
            access_token: access_token.into(),
            endpoint: endpoint.into(),
            model_id: model_id.into(),
            agent_name: "spec-forge-agent".to_string(),
            instructions: String::new(),
            api_version: None,
            timeout: None,
            poll_interval: None,
            retry: None,
        }
    }

    #[must_use]
    pub fn with_agent_name(mut self, agent_name: impl Into<String>) -> Self {
        self.agent_name = agent_name.into();
        self
    }

    #[must_use]
    pub fn with_instructions(mut self, instructions: impl Into<String>) -> Self {
        self.instructions = instructions.into();
        self
    }

    #[must_use]
    pub fn with_api_version(mut self, api_version: impl Into<String>) -> Self {
        self.api_version = Some(api_version.into());
        self
    }

    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    #[must_use]
    pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = Some(poll_interval);
        self
    }

    #[must_use]
    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = Some(retry);
        self
    }

    fn into_api_config(self) -> FoundryApiConfig {
        let mut config = FoundryApiConfig::new(self.access_token, self.endpoint);

        if let Some(api_version) = self.api_version {
            config = config.with_api_version(api_version);
        }

        if let Some(timeout) = self.timeout {
            config = config.with_timeout(timeout);
        }

        if let Some(poll_interval) = self.poll_interval {
            config = config.with_poll_interval(poll_interval);
        }

        if let Some(retry) = self.retry {
            config = config.with_retry(retry);
        }

        config
    }
}

/// Blocking view of the agents transport, injectable for tests.
trait AgentsClient: Send + Sync {
    fn create_agent(
        &self,
        model: &str,
        name: &str,
        instructions: &str,
    ) -> Result<String, FoundryApiError>;

    fn create_thread(&self) -> Result<String, FoundryApiError>;

    fn run_turn(
        &self,
        thread_id: &str,
        agent_id: &str,
        text: &str,
        cancel: &CancelSignal,
    ) -> Result<String, FoundryApiError>;

    fn delete_agent(&self, agent_id: &str) -> Result<(), FoundryApiError>;
}

struct DefaultAgentsClient {
    client: FoundryApiClient,
}

impl DefaultAgentsClient {
    fn block_on<F, T>(&self, future: F) -> Result<T, FoundryApiError>
    where
        F: std::future::Future<Output = Result<T, FoundryApiError>>,
    {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|error| {
                FoundryApiError::Unknown(format!("failed to initialize tokio runtime: {error}"))
            })?;

        runtime.block_on(future)
    }
}

impl AgentsClient for DefaultAgentsClient {
    fn create_agent(
        &self,
        model: &str,
        name: &str,
        instructions: &str,
    ) -> Result<String, FoundryApiError> {
        let request = CreateAgentRequest::new(model, name, instructions);
        self.block_on(self.client.create_agent(&request, None))
            .map(|agent| agent.id)
    }

    fn create_thread(&self) -> Result<String, FoundryApiError> {
        self.block_on(self.client.create_thread(None))
            .map(|thread| thread.id)
    }

    fn run_turn(
        &self,
        thread_id: &str,
        agent_id: &str,
        text: &str,
        cancel: &CancelSignal,
    ) -> Result<String, FoundryApiError> {
        self.block_on(async {
            self.client
                .create_message(thread_id, text, Some(cancel))
                .await?;
            let run = self.client.create_run(thread_id, agent_id, Some(cancel)).await?;
            self.client
                .wait_for_run(thread_id, &run.id, Some(cancel))
                .await?;
            let messages = self.client.list_messages(thread_id, Some(cancel)).await?;
            messages
                .latest_agent_text()
                .map(ToOwned::to_owned)
                .ok_or(FoundryApiError::EmptyReply)
        })
    }

    fn delete_agent(&self, agent_id: &str) -> Result<(), FoundryApiError> {
        self.block_on(self.client.delete_agent(agent_id, None))
            .map(|_| ())
    }
}

/// `AgentProvider` adapter backed by the agents-service transport.
pub struct FoundryProvider {
    model_id: String,
    agent_name: String,
    instructions: String,
    binding: Mutex<Option<AgentBinding>>,
    client: Arc<dyn AgentsClient>,
}

impl FoundryProvider {
    /// Creates a provider using real agents-service transport.
    pub fn new(config: FoundryProviderConfig) -> Result<Self, ProviderInitError> {
        let model_id = config.model_id.clone();
        let agent_name = config.agent_name.clone();
        let instructions = config.instructions.clone();
        let client = Arc::new(DefaultAgentsClient {
            client: FoundryApiClient::new(config.into_api_config()).map_err(map_init_error)?,
        });

        Ok(Self {
            model_id,
            agent_name,
            instructions,
            binding: Mutex::new(None),
            client,
        })
    }

    #[cfg(test)]
    fn with_client_for_tests(model_id: &str, client: Arc<dyn AgentsClient>) -> Self {
        Self {
            model_id: model_id.to_string(),
            agent_name: "spec-forge-agent".to_string(),
            instructions: String::new(),
            binding: Mutex::new(None),
            client,
        }
    }

    fn lock_binding(&self) -> MutexGuard<'_, Option<AgentBinding>> {
        lock_unpoisoned(&self.binding)
    }
}

impl AgentProvider for FoundryProvider {
    fn profile(&self) -> ProviderProfile {
        ProviderProfile {
            provider_id: FOUNDRY_PROVIDER_ID.to_string(),
            model_id: self.model_id.clone(),
        }
    }

    fn provision(&self) -> Result<AgentBinding, ProviderInitError> {
        if self.lock_binding().is_some() {
            return Err(ProviderInitError::new("agent is already provisioned"));
        }

        let agent_id = self
            .client
            .create_agent(&self.model_id, &self.agent_name, &self.instructions)
            .map_err(map_init_error)?;
        tracing::info!(agent_id = %agent_id, "remote agent created");

        let thread_id = match self.client.create_thread() {
            Ok(thread_id) => thread_id,
            Err(error) => {
                // Thread creation failed after the agent already exists;
                // release the half-provisioned resource before reporting.
                if let Err(cleanup_error) = self.client.delete_agent(&agent_id) {
                    tracing::error!(
                        agent_id = %agent_id,
                        error = %cleanup_error,
                        "failed to release half-provisioned agent"
                    );
                }
                return Err(map_init_error(error));
            }
        };
        tracing::info!(thread_id = %thread_id, "conversation thread created");

        let binding = AgentBinding {
            agent_id,
            thread_id,
        };
        *self.lock_binding() = Some(binding.clone());
        Ok(binding)
    }

    fn send_turn(&self, text: &str, cancel: &CancelSignal) -> Result<String, TurnError> {
        let binding = self
            .lock_binding()
            .clone()
            .ok_or_else(|| TurnError::Lifecycle("agent is not provisioned".to_string()))?;

        self.client
            .run_turn(&binding.thread_id, &binding.agent_id, text, cancel)
            .map_err(map_turn_error)
    }

    fn teardown(&self) -> Result<(), String> {
        let Some(binding) = self.lock_binding().take() else {
            return Ok(());
        };

        self.client
            .delete_agent(&binding.agent_id)
            .map(|()| tracing::info!(agent_id = %binding.agent_id, "remote agent deleted"))
            .map_err(|error| error.to_string())
    }
}

fn map_init_error(error: FoundryApiError) -> ProviderInitError {
    ProviderInitError::new(error.to_string())
}

fn map_turn_error(error: FoundryApiError) -> TurnError {
    match error {
        FoundryApiError::Cancelled => TurnError::Cancelled,
        error if error.is_auth() => TurnError::Auth(error.to_string()),
        error => TurnError::Remote(error.to_string()),
    }
}

fn lock_unpoisoned<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    match mutex.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};

    use agent_provider::{AgentProvider, CancelSignal, TurnError};
    use foundry_api::FoundryApiError;
    use reqwest::StatusCode;

    use super::{AgentsClient, FoundryProvider, FoundryProviderConfig};

    #[derive(Default)]
    struct FakeAgentsClient {
        fail_thread_creation: bool,
        turn_error: Mutex<Option<FoundryApiError>>,
        deleted: AtomicUsize,
        turns: Mutex<Vec<String>>,
    }

    impl AgentsClient for FakeAgentsClient {
        fn create_agent(
            &self,
            _model: &str,
            _name: &str,
            _instructions: &str,
        ) -> Result<String, FoundryApiError> {
            Ok("agent-1".to_string())
        }

        fn create_thread(&self) -> Result<String, FoundryApiError> {
            if self.fail_thread_creation {
                return Err(FoundryApiError::Unknown("thread creation failed".to_string()));
            }
            Ok("thread-1".to_string())
        }

        fn run_turn(
            &self,
            _thread_id: &str,
            _agent_id: &str,
            text: &str,
            _cancel: &CancelSignal,
        ) -> Result<String, FoundryApiError> {
            if let Some(error) = self.turn_error.lock().expect("lock").take() {
                return Err(error);
            }
            self.turns.lock().expect("lock").push(text.to_string());
            Ok(format!("reply to: {text}"))
        }

        fn delete_agent(&self, _agent_id: &str) -> Result<(), FoundryApiError> {
            self.deleted.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    fn cancel_signal() -> CancelSignal {
        Arc::new(AtomicBool::new(false))
    }

    #[test]
    fn provision_stores_the_binding_and_rejects_double_provisioning() {
        let provider =
            FoundryProvider::with_client_for_tests("gpt-5", Arc::new(FakeAgentsClient::default()));

        let binding = provider.provision().expect("provision should succeed");
        assert_eq!(binding.agent_id, "agent-1");
        assert_eq!(binding.thread_id, "thread-1");

        let error = provider
            .provision()
            .expect_err("second provision should fail");
        assert_eq!(error.message(), "agent is already provisioned");
    }

    #[test]
    fn provision_releases_the_agent_when_thread_creation_fails() {
        let client = Arc::new(FakeAgentsClient {
            fail_thread_creation: true,
            ..FakeAgentsClient::default()
        });
        let provider = FoundryProvider::with_client_for_tests("gpt-5", Arc::clone(&client) as _);

        provider
            .provision()
            .expect_err("provision should fail when the thread cannot be created");
        assert_eq!(client.deleted.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn send_turn_requires_a_provisioned_agent() {
        let provider =
            FoundryProvider::with_client_for_tests("gpt-5", Arc::new(FakeAgentsClient::default()));

        match provider.send_turn("hello", &cancel_signal()) {
            Err(TurnError::Lifecycle(message)) => {
                assert_eq!(message, "agent is not provisioned");
            }
            other => panic!("expected lifecycle error, got {other:?}"),
        }
    }

    #[test]
    fn send_turn_round_trips_through_the_client() {
        let client = Arc::new(FakeAgentsClient::default());
        let provider = FoundryProvider::with_client_for_tests("gpt-5", Arc::clone(&client) as _);
        provider.provision().expect("provision should succeed");

        let reply = provider
            .send_turn("I want a todo app", &cancel_signal())
            .expect("turn should succeed");
        assert_eq!(reply, "reply to: I want a todo app");
        assert_eq!(
            client.turns.lock().expect("lock").as_slice(),
            ["I want a todo app"]
        );
    }

    #[test]
    fn auth_failures_map_to_auth_turn_errors() {
        let client = Arc::new(FakeAgentsClient {
            turn_error: Mutex::new(Some(FoundryApiError::Auth(
                StatusCode::UNAUTHORIZED,
                "expired".to_string(),
            ))),
            ..FakeAgentsClient::default()
        });
        let provider = FoundryProvider::with_client_for_tests("gpt-5", Arc::clone(&client) as _);
        provider.provision().expect("provision should succeed");

        match provider.send_turn("hello", &cancel_signal()) {
            Err(TurnError::Auth(message)) => {
                assert!(message.contains("expired"), "unexpected message: {message}");
            }
            other => panic!("expected auth error, got {other:?}"),
        }
    }

    #[test]
    fn cancellation_maps_to_the_cancelled_turn_error() {
        let client = Arc::new(FakeAgentsClient {
            turn_error: Mutex::new(Some(FoundryApiError::Cancelled)),
            ..FakeAgentsClient::default()
        });
        let provider = FoundryProvider::with_client_for_tests("gpt-5", Arc::clone(&client) as _);
        provider.provision().expect("provision should succeed");

        assert_eq!(
            provider.send_turn("hello", &cancel_signal()),
            Err(TurnError::Cancelled)
        );
    }

    #[test]
    fn teardown_deletes_the_agent_once_and_is_idempotent() {
        let client = Arc::new(FakeAgentsClient::default());
        let provider = FoundryProvider::with_client_for_tests("gpt-5", Arc::clone(&client) as _);
        provider.provision().expect("provision should succeed");

        provider.teardown().expect("teardown should succeed");
        provider.teardown().expect("repeat teardown should be a no-op");
        assert_eq!(client.deleted.load(Ordering::SeqCst), 1);

        match provider.send_turn("hello", &cancel_signal()) {
            Err(TurnError::Lifecycle(_)) => {}
            other => panic!("turns after teardown should fail, got {other:?}"),
        }
    }

    #[test]
    fn config_builders_cover_every_transport_knob() {
        let config = FoundryProviderConfig::new("token", "https://example.test", "gpt-5")
            .with_agent_name("interviewer")
            .with_instructions("ask questions")
            .with_api_version("2026-01-01")
            .with_timeout(std::time::Duration::from_secs(30))
            .with_poll_interval(std::time::Duration::from_millis(100))
            .with_retry(foundry_api::RetryPolicy::new(5, std::time::Duration::from_secs(1)));

        assert_eq!(config.agent_name, "interviewer");
        assert_eq!(config.instructions, "ask questions");
        let api_config = config.into_api_config();
        assert_eq!(api_config.api_version, "2026-01-01");
        assert_eq!(api_config.retry.max_attempts, 5);
    }
}
