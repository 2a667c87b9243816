use std::time::Duration;

use crate::retry::RetryPolicy;
use crate::url::DEFAULT_API_VERSION;

/// Default interval between run-status polls.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(1);

/// Transport configuration for agents-service requests.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FoundryApiConfig {
    /// Bearer token passed to `Authorization`.
    pub access_token: String,
    /// Project endpoint base URL.
    pub endpoint: String,
    /// `api-version` query value appended to every request.
    pub api_version: String,
    /// Optional `User-Agent` override.
    pub user_agent: Option<String>,
    /// Optional per-request timeout.
    pub timeout: Option<Duration>,
    /// Interval between run-status polls.
    pub poll_interval: Duration,
    /// Retry policy applied to every operation.
    pub retry: RetryPolicy,
}

impl Default for FoundryApiConfig {
    fn default() -> Self {
        Self {
            access_token: String::new(),
            endpoint: String::new(),
            api_version: DEFAULT_API_VERSION.to_string(),
            user_agent: None,
            timeout: None,
            poll_interval: DEFAULT_POLL_INTERVAL,
            retry: RetryPolicy::default(),
        }
    }
}

impl FoundryApiConfig {
    pub fn new(access_token: impl Into<String>, endpoint: impl Into<String>) -> Self {
        Self {
            access_token: access_token.into(),
            endpoint: endpoint.into(),
            ..Self::default()
        }
    }

    pub fn with_api_version(mut self, api_version: impl Into<String>) -> Self {
        self.api_version = api_version.into();
        self
    }

    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }
}
