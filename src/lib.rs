//! Interview-driven specification generator CLI.
//!
//! ## Provider bootstrap
//!
//! `spec_forge` selects its conversation provider at startup:
//!
//! - `SPEC_FORGE_PROVIDER=foundry` (default) talks to the hosted agents
//!   service and requires `PROJECT_ENDPOINT` plus `PROJECT_ACCESS_TOKEN`
//! - `SPEC_FORGE_PROVIDER=mock` runs a deterministic scripted interview
//!   with no network access
//!
//! ## Environment
//!
//! Configuration is read from the environment (a local `.env` file is
//! loaded first when present):
//!
//! - `PROJECT_ENDPOINT` — required, project URL of the agents service
//! - `PROJECT_ACCESS_TOKEN` — bearer token, required by the real provider
//! - `MODEL_NAME`, `AGENT_NAME`, `OUTPUT_FILE`, `SESSION_DIR` — optional
//! - `MAX_RETRIES`, `RETRY_DELAY`, `REQUEST_TIMEOUT_SECS` — optional
//! - `SPEC_FORGE_INSTRUCTIONS` — optional interview-instruction override
//!
//! ## Contracts
//!
//! The remote agent signals a finished specification by wrapping it in
//! `!!!SPEC_START!!!` / `!!!SPEC_END!!!` markers; the payload between the
//! markers is written verbatim to the output file. Session transcripts are
//! persisted as JSON documents under the session directory, and the remote
//! agent resource is deleted on every exit path, signal-driven or not.

pub mod app;
pub mod commands;
pub mod config;
pub mod console;
pub mod instructions;
pub mod lifecycle;
pub mod logging;
pub mod providers;
pub mod signals;
pub mod specfile;
