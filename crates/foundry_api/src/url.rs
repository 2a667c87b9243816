/// Default `api-version` query value for agents endpoints.
pub const DEFAULT_API_VERSION: &str = "2025-05-01";

/// Normalize a project endpoint for path concatenation.
///
/// Trims surrounding whitespace and any trailing slashes; path builders
/// below always insert their own separator.
pub fn normalize_project_endpoint(input: &str) -> String {
    input.trim().trim_end_matches('/').to_string()
}

pub fn agents_url(endpoint: &str) -> String {
    format!("{endpoint}/assistants")
}

pub fn agent_url(endpoint: &str, agent_id: &str) -> String {
    format!("{endpoint}/assistants/{agent_id}")
}

pub fn threads_url(endpoint: &str) -> String {
    format!("{endpoint}/threads")
}

pub fn thread_messages_url(endpoint: &str, thread_id: &str) -> String {
    format!("{endpoint}/threads/{thread_id}/messages")
}

pub fn thread_runs_url(endpoint: &str, thread_id: &str) -> String {
    format!("{endpoint}/threads/{thread_id}/runs")
}

pub fn thread_run_url(endpoint: &str, thread_id: &str, run_id: &str) -> String {
    format!("{endpoint}/threads/{thread_id}/runs/{run_id}")
}
