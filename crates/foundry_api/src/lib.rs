//! Transport-only client primitives for the hosted agents service.
//!
//! This crate owns request building, response parsing, retry, and run
//! polling for the agents REST endpoints only. It intentionally contains
//! no credential acquisition code and no terminal/runtime coupling.
//!
//! Every operation is wrapped by a bounded linear-delay retry loop and can
//! be abandoned mid-flight through a shared [`client::CancellationSignal`].

pub mod client;
pub mod config;
pub mod error;
pub mod payload;
pub mod retry;
pub mod url;

pub use client::{CancellationSignal, FoundryApiClient};
pub use config::FoundryApiConfig;
pub use error::FoundryApiError;
pub use payload::{
    AgentResource, CreateAgentRequest, DeletionStatus, MessageList, MessageResource, RunResource,
    RunStatus, ThreadResource,
};
pub use retry::RetryPolicy;
pub use url::normalize_project_endpoint;
