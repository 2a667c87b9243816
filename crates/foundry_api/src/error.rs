use std::fmt;

use reqwest::StatusCode;
use serde::Deserialize;
use serde_json::Error as JsonError;

#[derive(Debug)]
pub enum FoundryApiError {
    MissingAccessToken,
    MissingEndpoint,
    Request(reqwest::Error),
    Status(StatusCode, String),
    Auth(StatusCode, String),
    Serde(JsonError),
    RunFailed {
        code: Option<String>,
        message: String,
    },
    RunNotCompleted {
        status: String,
    },
    EmptyReply,
    RetryExhausted {
        operation: &'static str,
        attempts: u32,
        last_error: Option<String>,
    },
    Cancelled,
    Unknown(String),
}

#[derive(Debug, Deserialize)]
pub(crate) struct ErrorPayload {
    #[serde(rename = "error")]
    pub value: Option<ErrorPayloadFields>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ErrorPayloadFields {
    pub message: Option<String>,
    pub code: Option<String>,
}

impl ErrorPayloadFields {
    pub fn render(&self) -> Option<String> {
        let message = self.message.as_deref().map(str::trim).filter(|m| !m.is_empty());
        let code = self.code.as_deref().map(str::trim).filter(|c| !c.is_empty());
        match (code, message) {
            (Some(code), Some(message)) => Some(format!("{code}: {message}")),
            (None, Some(message)) => Some(message.to_string()),
            (Some(code), None) => Some(code.to_string()),
            (None, None) => None,
        }
    }
}

impl fmt::Display for FoundryApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingAccessToken => write!(f, "access token is required"),
            Self::MissingEndpoint => write!(f, "project endpoint is required"),
            Self::Request(error) => write!(f, "request error: {error}"),
            Self::Status(status, message) => write!(f, "HTTP {status} {message}"),
            Self::Auth(status, message) => {
                write!(f, "authentication rejected (HTTP {status}): {message}")
            }
            Self::Serde(error) => write!(f, "serialization error: {error}"),
            Self::RunFailed { code, message } => match code {
                Some(code) if !code.trim().is_empty() => {
                    write!(f, "run failed ({code}): {message}")
                }
                _ => write!(f, "run failed: {message}"),
            },
            Self::RunNotCompleted { status } => {
                write!(f, "run ended without completing (status: {status})")
            }
            Self::EmptyReply => write!(f, "run completed but produced no agent reply"),
            Self::RetryExhausted {
                operation,
                attempts,
                last_error,
            } => {
                let last_error = last_error.as_deref().unwrap_or("n/a");
                write!(
                    f,
                    "{operation} failed after {attempts} attempts (last error: {last_error})"
                )
            }
            Self::Cancelled => write!(f, "request was cancelled"),
            Self::Unknown(message) => write!(f, "{message}"),
        }
    }
}

impl std::error::Error for FoundryApiError {}

impl From<reqwest::Error> for FoundryApiError {
    fn from(error: reqwest::Error) -> Self {
        Self::Request(error)
    }
}

impl From<JsonError> for FoundryApiError {
    fn from(error: JsonError) -> Self {
        Self::Serde(error)
    }
}

impl FoundryApiError {
    /// Returns true when the service rejected the caller's credentials.
    #[must_use]
    pub fn is_auth(&self) -> bool {
        matches!(self, Self::Auth(..))
    }
}

/// Extract a human-readable message from a structured error body.
///
/// Falls back to the raw body, then to the canonical status reason.
pub fn parse_error_message(status: StatusCode, body: &str) -> String {
    if let Ok(parsed) = serde_json::from_str::<ErrorPayload>(body) {
        if let Some(message) = parsed.value.and_then(|fields| fields.render()) {
            return message;
        }
    }

    if body.trim().is_empty() {
        status
            .canonical_reason()
            .unwrap_or("request failed")
            .to_string()
    } else {
        body.to_string()
    }
}
