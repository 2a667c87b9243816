//! JSON persistence for interview session transcripts.
//!
//! One session is one JSON document on disk; every save atomically
//! replaces the whole file, so a reader always observes a prefix of the
//! turns appended in memory.

mod error;
mod paths;
mod schema;
mod store;

pub use error::SessionStoreError;
pub use paths::{
    sanitize_timestamp_for_filename, session_file_name, DEFAULT_SESSION_DIR,
};
pub use schema::{SessionDocument, Turn, TurnRole, SESSION_SCHEMA_VERSION};
pub use store::SessionStore;
