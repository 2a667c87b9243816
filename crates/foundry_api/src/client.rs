use std::future::Future;
use std::sync::{atomic::AtomicBool, atomic::Ordering, Arc};
use std::time::Duration;

use reqwest::Client;
use serde::de::DeserializeOwned;

use crate::config::FoundryApiConfig;
use crate::error::{parse_error_message, FoundryApiError};
use crate::payload::{
    AgentResource, CreateAgentRequest, CreateMessageRequest, CreateRunRequest, DeletionStatus,
    MessageList, MessageResource, RunResource, RunStatus, ThreadResource,
};
use crate::retry::{is_auth_status, is_retryable_error_text, is_retryable_status};
use crate::url::{
    agent_url, agents_url, normalize_project_endpoint, thread_messages_url, thread_run_url,
    thread_runs_url, threads_url,
};

/// Optional cancellation signal shared across request and polling loops.
pub type CancellationSignal = Arc<AtomicBool>;

const CANCEL_POLL_INTERVAL: Duration = Duration::from_millis(25);

#[derive(Debug)]
pub struct FoundryApiClient {
    http: Client,
    config: FoundryApiConfig,
    endpoint: String,
}

impl FoundryApiClient {
    pub fn new(config: FoundryApiConfig) -> Result<Self, FoundryApiError> {
        if config.access_token.trim().is_empty() {
            return Err(FoundryApiError::MissingAccessToken);
        }
        if config.endpoint.trim().is_empty() {
            return Err(FoundryApiError::MissingEndpoint);
        }

        let mut builder = Client::builder();
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        if let Some(user_agent) = config.user_agent.as_deref() {
            builder = builder.user_agent(user_agent.trim().to_owned());
        }
        let http = builder.build().map_err(FoundryApiError::from)?;
        let endpoint = normalize_project_endpoint(&config.endpoint);

        Ok(Self {
            http,
            config,
            endpoint,
        })
    }

    pub fn config(&self) -> &FoundryApiConfig {
        &self.config
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub async fn create_agent(
        &self,
        request: &CreateAgentRequest,
        cancellation: Option<&CancellationSignal>,
    ) -> Result<AgentResource, FoundryApiError> {
        let url = agents_url(&self.endpoint);
        self.execute("agent creation", || self.post(&url).json(request), cancellation)
            .await
    }

    pub async fn delete_agent(
        &self,
        agent_id: &str,
        cancellation: Option<&CancellationSignal>,
    ) -> Result<DeletionStatus, FoundryApiError> {
        let url = agent_url(&self.endpoint, agent_id);
        self.execute(
            "agent deletion",
            || self.with_common(self.http.delete(&url)),
            cancellation,
        )
        .await
    }

    pub async fn create_thread(
        &self,
        cancellation: Option<&CancellationSignal>,
    ) -> Result<ThreadResource, FoundryApiError> {
        let url = threads_url(&self.endpoint);
        self.execute(
            "thread creation",
            || self.post(&url).json(&serde_json::json!({})),
            cancellation,
        )
        .await
    }

    pub async fn create_message(
        &self,
        thread_id: &str,
        text: &str,
        cancellation: Option<&CancellationSignal>,
    ) -> Result<MessageResource, FoundryApiError> {
        let url = thread_messages_url(&self.endpoint, thread_id);
        let request = CreateMessageRequest::user(text);
        self.execute("message send", || self.post(&url).json(&request), cancellation)
            .await
    }

    pub async fn create_run(
        &self,
        thread_id: &str,
        agent_id: &str,
        cancellation: Option<&CancellationSignal>,
    ) -> Result<RunResource, FoundryApiError> {
        let url = thread_runs_url(&self.endpoint, thread_id);
        let request = CreateRunRequest::new(agent_id);
        self.execute("run creation", || self.post(&url).json(&request), cancellation)
            .await
    }

    pub async fn get_run(
        &self,
        thread_id: &str,
        run_id: &str,
        cancellation: Option<&CancellationSignal>,
    ) -> Result<RunResource, FoundryApiError> {
        let url = thread_run_url(&self.endpoint, thread_id, run_id);
        self.execute(
            "run status poll",
            || self.with_common(self.http.get(&url)),
            cancellation,
        )
        .await
    }

    pub async fn list_messages(
        &self,
        thread_id: &str,
        cancellation: Option<&CancellationSignal>,
    ) -> Result<MessageList, FoundryApiError> {
        let url = thread_messages_url(&self.endpoint, thread_id);
        self.execute(
            "message listing",
            || self.with_common(self.http.get(&url)),
            cancellation,
        )
        .await
    }

    /// Poll a run at the configured interval until it reaches a terminal
    /// state. Failed runs surface the service's `last_error`.
    pub async fn wait_for_run(
        &self,
        thread_id: &str,
        run_id: &str,
        cancellation: Option<&CancellationSignal>,
    ) -> Result<RunResource, FoundryApiError> {
        loop {
            let run = self.get_run(thread_id, run_id, cancellation).await?;
            match run.status {
                RunStatus::Completed => return Ok(run),
                RunStatus::Failed => {
                    let (code, message) = match run.last_error {
                        Some(error) => (
                            error.code,
                            error
                                .message
                                .unwrap_or_else(|| "no error detail reported".to_string()),
                        ),
                        None => (None, "no error detail reported".to_string()),
                    };
                    return Err(FoundryApiError::RunFailed { code, message });
                }
                status if status.is_terminal() => {
                    return Err(FoundryApiError::RunNotCompleted {
                        status: status.as_str().to_string(),
                    });
                }
                _ => {
                    await_or_cancel(
                        tokio::time::sleep(self.config.poll_interval),
                        cancellation,
                    )
                    .await?;
                }
            }
        }
    }

    fn post(&self, url: &str) -> reqwest::RequestBuilder {
        self.with_common(self.http.post(url))
    }

    fn with_common(&self, builder: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        builder
            .bearer_auth(self.config.access_token.trim())
            .query(&[("api-version", self.config.api_version.as_str())])
    }

    /// Run one operation through the bounded retry loop.
    ///
    /// Auth rejections and other non-transient statuses propagate on the
    /// attempt that observed them; transient failures sleep the policy's
    /// linear delay and try again until the attempt budget is spent.
    async fn execute<T, F>(
        &self,
        operation: &'static str,
        build: F,
        cancellation: Option<&CancellationSignal>,
    ) -> Result<T, FoundryApiError>
    where
        T: DeserializeOwned,
        F: Fn() -> reqwest::RequestBuilder,
    {
        let policy = self.config.retry;
        let mut last_error = None;

        for attempt in 1..=policy.max_attempts {
            if is_cancelled(cancellation) {
                return Err(FoundryApiError::Cancelled);
            }

            let response = await_or_cancel(build().send(), cancellation).await?;
            match response {
                Ok(response) => {
                    let status = response.status();
                    let body = await_or_cancel(response.text(), cancellation)
                        .await?
                        .unwrap_or_default();

                    if status.is_success() {
                        return serde_json::from_str::<T>(&body).map_err(FoundryApiError::from);
                    }

                    let message = parse_error_message(status, &body);
                    if is_auth_status(status.as_u16()) {
                        return Err(FoundryApiError::Auth(status, message));
                    }

                    let transient =
                        is_retryable_status(status.as_u16()) || is_retryable_error_text(&message);
                    if !transient {
                        return Err(FoundryApiError::Status(status, message));
                    }

                    tracing::warn!(
                        operation,
                        attempt,
                        max_attempts = policy.max_attempts,
                        status = status.as_u16(),
                        error = %message,
                        "transient remote failure"
                    );
                    last_error = Some(message);
                }
                Err(error) => {
                    if !is_transient_transport_error(&error) {
                        return Err(FoundryApiError::Request(error));
                    }

                    let message = error.to_string();
                    tracing::warn!(
                        operation,
                        attempt,
                        max_attempts = policy.max_attempts,
                        error = %message,
                        "transient transport failure"
                    );
                    last_error = Some(message);
                }
            }

            if attempt < policy.max_attempts {
                await_or_cancel(tokio::time::sleep(policy.delay_for(attempt)), cancellation)
                    .await?;
            }
        }

        Err(FoundryApiError::RetryExhausted {
            operation,
            attempts: policy.max_attempts,
            last_error,
        })
    }
}

fn is_transient_transport_error(error: &reqwest::Error) -> bool {
    error.is_timeout() || error.is_connect() || error.is_request()
}

fn is_cancelled(cancel: Option<&CancellationSignal>) -> bool {
    cancel.is_some_and(|token| token.load(Ordering::Acquire))
}

async fn await_or_cancel<F>(
    future: F,
    cancellation: Option<&CancellationSignal>,
) -> Result<F::Output, FoundryApiError>
where
    F: Future,
{
    if cancellation.is_none() {
        return Ok(future.await);
    }

    let mut future = Box::pin(future);

    loop {
        if is_cancelled(cancellation) {
            return Err(FoundryApiError::Cancelled);
        }

        if let Ok(output) = tokio::time::timeout(CANCEL_POLL_INTERVAL, &mut future).await {
            if is_cancelled(cancellation) {
                return Err(FoundryApiError::Cancelled);
            }
            return Ok(output);
        }
    }
}
