//! Startup provider selection.

use std::sync::Arc;

use agent_provider::{AgentProvider, ProviderInitError};
use agent_provider_foundry::{
    FoundryProvider, FoundryProviderConfig, RetryPolicy, FOUNDRY_PROVIDER_ID,
};
use agent_provider_mock::{MockProvider, MOCK_PROVIDER_ID};

use crate::config::Config;
use crate::instructions;

/// Selects between the real agents-service provider and the scripted mock.
pub const PROVIDER_ENV: &str = "SPEC_FORGE_PROVIDER";
/// Bearer token for the agents service, required by the real provider.
pub const ACCESS_TOKEN_ENV: &str = "PROJECT_ACCESS_TOKEN";

pub fn provider_from_env(config: &Config) -> Result<Arc<dyn AgentProvider>, ProviderInitError> {
    provider_from_lookup(config, |name| std::env::var(name).ok())
}

pub fn provider_from_lookup(
    config: &Config,
    lookup: impl Fn(&str) -> Option<String>,
) -> Result<Arc<dyn AgentProvider>, ProviderInitError> {
    let selection = lookup(PROVIDER_ENV)
        .map(|value| value.trim().to_ascii_lowercase())
        .filter(|value| !value.is_empty())
        .unwrap_or_else(|| FOUNDRY_PROVIDER_ID.to_string());

    match selection.as_str() {
        MOCK_PROVIDER_ID => Ok(Arc::new(MockProvider::interview())),
        FOUNDRY_PROVIDER_ID => foundry_provider(config, &lookup),
        other => Err(ProviderInitError::new(format!(
            "unknown provider '{other}' (expected '{FOUNDRY_PROVIDER_ID}' or '{MOCK_PROVIDER_ID}')"
        ))),
    }
}

fn foundry_provider(
    config: &Config,
    lookup: &impl Fn(&str) -> Option<String>,
) -> Result<Arc<dyn AgentProvider>, ProviderInitError> {
    let access_token = lookup(ACCESS_TOKEN_ENV)
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
        .ok_or_else(|| {
            ProviderInitError::new(
                "PROJECT_ACCESS_TOKEN is not set; the agents service needs a bearer token",
            )
        })?;

    let provider_config = FoundryProviderConfig::new(
        access_token,
        config.project_endpoint.as_str(),
        config.model_name.as_str(),
    )
    .with_agent_name(config.agent_name.as_str())
    .with_instructions(instructions::instructions_from_env())
    .with_timeout(config.request_timeout)
    .with_retry(RetryPolicy::new(config.max_retries, config.retry_delay));

    Ok(Arc::new(FoundryProvider::new(provider_config)?))
}
