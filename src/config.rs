use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use thiserror::Error;

pub const ENDPOINT_ENV: &str = "PROJECT_ENDPOINT";
pub const MODEL_NAME_ENV: &str = "MODEL_NAME";
pub const AGENT_NAME_ENV: &str = "AGENT_NAME";
pub const OUTPUT_FILE_ENV: &str = "OUTPUT_FILE";
pub const SESSION_DIR_ENV: &str = "SESSION_DIR";
pub const MAX_RETRIES_ENV: &str = "MAX_RETRIES";
pub const RETRY_DELAY_ENV: &str = "RETRY_DELAY";
pub const REQUEST_TIMEOUT_ENV: &str = "REQUEST_TIMEOUT_SECS";

pub const DEFAULT_MODEL_NAME: &str = "gpt-5";
pub const DEFAULT_AGENT_NAME: &str = "spec-forge-agent";
pub const DEFAULT_OUTPUT_FILE: &str = "spec.md";
const DEFAULT_MAX_RETRIES: u32 = 3;
const DEFAULT_RETRY_DELAY_SECS: f64 = 2.0;
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 120;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("PROJECT_ENDPOINT is not set; export it or add it to a .env file")]
    MissingEndpoint,

    #[error("environment variable {name} has invalid value '{value}' (expected {expected})")]
    InvalidValue {
        name: &'static str,
        value: String,
        expected: &'static str,
    },
}

/// Immutable snapshot of environment-derived settings, taken once at
/// startup for the process lifetime.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub project_endpoint: String,
    pub model_name: String,
    pub agent_name: String,
    pub output_file: PathBuf,
    pub session_dir: PathBuf,
    pub max_retries: u32,
    pub retry_delay: Duration,
    pub request_timeout: Duration,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Builds a config from an injectable variable source, so tests never
    /// have to mutate process-wide environment state.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |name: &str| {
            lookup(name)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let project_endpoint = get(ENDPOINT_ENV).ok_or(ConfigError::MissingEndpoint)?;
        let max_retries = parse_value(
            MAX_RETRIES_ENV,
            get(MAX_RETRIES_ENV),
            DEFAULT_MAX_RETRIES,
            "a positive integer",
        )?;
        let retry_delay_secs: f64 = parse_value(
            RETRY_DELAY_ENV,
            get(RETRY_DELAY_ENV),
            DEFAULT_RETRY_DELAY_SECS,
            "a non-negative number of seconds",
        )?;
        if !retry_delay_secs.is_finite() || retry_delay_secs < 0.0 {
            return Err(ConfigError::InvalidValue {
                name: RETRY_DELAY_ENV,
                value: retry_delay_secs.to_string(),
                expected: "a non-negative number of seconds",
            });
        }
        let request_timeout_secs = parse_value(
            REQUEST_TIMEOUT_ENV,
            get(REQUEST_TIMEOUT_ENV),
            DEFAULT_REQUEST_TIMEOUT_SECS,
            "a positive integer number of seconds",
        )?;

        Ok(Self {
            project_endpoint,
            model_name: get(MODEL_NAME_ENV).unwrap_or_else(|| DEFAULT_MODEL_NAME.to_string()),
            agent_name: get(AGENT_NAME_ENV).unwrap_or_else(|| DEFAULT_AGENT_NAME.to_string()),
            output_file: get(OUTPUT_FILE_ENV)
                .unwrap_or_else(|| DEFAULT_OUTPUT_FILE.to_string())
                .into(),
            session_dir: get(SESSION_DIR_ENV)
                .unwrap_or_else(|| session_store::DEFAULT_SESSION_DIR.to_string())
                .into(),
            max_retries,
            retry_delay: Duration::from_secs_f64(retry_delay_secs),
            request_timeout: Duration::from_secs(request_timeout_secs),
        })
    }
}

fn parse_value<T: FromStr>(
    name: &'static str,
    value: Option<String>,
    default: T,
    expected: &'static str,
) -> Result<T, ConfigError> {
    match value {
        None => Ok(default),
        Some(value) => value.parse().map_err(|_| ConfigError::InvalidValue {
            name,
            value,
            expected,
        }),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::time::Duration;

    use super::{Config, ConfigError};

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(name, value)| (name.to_string(), value.to_string()))
            .collect();
        move |name: &str| map.get(name).cloned()
    }

    #[test]
    fn missing_endpoint_is_fatal() {
        assert!(matches!(
            Config::from_lookup(lookup(&[])),
            Err(ConfigError::MissingEndpoint)
        ));
    }

    #[test]
    fn blank_endpoint_counts_as_missing() {
        assert!(matches!(
            Config::from_lookup(lookup(&[("PROJECT_ENDPOINT", "   ")])),
            Err(ConfigError::MissingEndpoint)
        ));
    }

    #[test]
    fn defaults_apply_when_only_the_endpoint_is_set() {
        let config = Config::from_lookup(lookup(&[(
            "PROJECT_ENDPOINT",
            "https://example.test/api/projects/demo",
        )]))
        .expect("config should build");

        assert_eq!(config.project_endpoint, "https://example.test/api/projects/demo");
        assert_eq!(config.model_name, "gpt-5");
        assert_eq!(config.agent_name, "spec-forge-agent");
        assert_eq!(config.output_file.to_str(), Some("spec.md"));
        assert_eq!(config.session_dir.to_str(), Some(".sessions"));
        assert_eq!(config.max_retries, 3);
        assert_eq!(config.retry_delay, Duration::from_secs(2));
        assert_eq!(config.request_timeout, Duration::from_secs(120));
    }

    #[test]
    fn overrides_replace_every_default() {
        let config = Config::from_lookup(lookup(&[
            ("PROJECT_ENDPOINT", "https://example.test"),
            ("MODEL_NAME", "gpt-6"),
            ("AGENT_NAME", "interviewer"),
            ("OUTPUT_FILE", "out/spec.md"),
            ("SESSION_DIR", "/tmp/sessions"),
            ("MAX_RETRIES", "5"),
            ("RETRY_DELAY", "0.5"),
            ("REQUEST_TIMEOUT_SECS", "30"),
        ]))
        .expect("config should build");

        assert_eq!(config.model_name, "gpt-6");
        assert_eq!(config.agent_name, "interviewer");
        assert_eq!(config.output_file.to_str(), Some("out/spec.md"));
        assert_eq!(config.session_dir.to_str(), Some("/tmp/sessions"));
        assert_eq!(config.max_retries, 5);
        assert_eq!(config.retry_delay, Duration::from_millis(500));
        assert_eq!(config.request_timeout, Duration::from_secs(30));
    }

    #[test]
    fn malformed_numbers_are_fatal() {
        let error = Config::from_lookup(lookup(&[
            ("PROJECT_ENDPOINT", "https://example.test"),
            ("MAX_RETRIES", "several"),
        ]))
        .expect_err("invalid retries should fail");

        match error {
            ConfigError::InvalidValue { name, value, .. } => {
                assert_eq!(name, "MAX_RETRIES");
                assert_eq!(value, "several");
            }
            other => panic!("expected InvalidValue, got {other:?}"),
        }
    }

    #[test]
    fn negative_retry_delays_are_fatal() {
        assert!(matches!(
            Config::from_lookup(lookup(&[
                ("PROJECT_ENDPOINT", "https://example.test"),
                ("RETRY_DELAY", "-1"),
            ])),
            Err(ConfigError::InvalidValue { .. })
        ));
    }
}
