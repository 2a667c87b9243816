/// Default directory for persisted session documents.
pub const DEFAULT_SESSION_DIR: &str = ".sessions";

#[must_use]
pub fn sanitize_timestamp_for_filename(timestamp: &str) -> String {
    timestamp
        .chars()
        .map(|c| match c {
            ':' | '.' | '/' | '\\' | ' ' => '-',
            _ => c,
        })
        .collect()
}

#[must_use]
pub fn session_file_name(created_at: &str, session_id: &str) -> String {
    format!(
        "{}_{}.json",
        sanitize_timestamp_for_filename(created_at),
        session_id
    )
}
