use std::fs;
use std::io;
use std::path::Path;

/// Marker the agent emits immediately before the finished specification.
pub const SPEC_START_MARKER: &str = "!!!SPEC_START!!!";
/// Marker the agent emits immediately after the finished specification.
pub const SPEC_END_MARKER: &str = "!!!SPEC_END!!!";

/// Recognize the "specification ready" signal in an agent reply.
///
/// The contract is exact substrings: the first start marker, then the
/// first end marker after it. A start marker without a matching end marker
/// is not a signal. The payload between them is returned trimmed.
pub fn extract_spec_payload(content: &str) -> Option<String> {
    let start = content.find(SPEC_START_MARKER)? + SPEC_START_MARKER.len();
    let end = content[start..].find(SPEC_END_MARKER)?;
    Some(content[start..start + end].trim().to_string())
}

/// Write the specification payload, replacing the target atomically.
///
/// The payload lands in a dot-prefixed temp file next to the target and is
/// renamed into place, so the artifact is never observable half-written.
pub fn write_spec_file(path: &Path, payload: &str) -> io::Result<()> {
    let file_name = path
        .file_name()
        .and_then(|name| name.to_str())
        .unwrap_or("spec.md");
    let temp_path = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => {
            fs::create_dir_all(parent)?;
            parent.join(format!(".{file_name}.tmp"))
        }
        _ => std::path::PathBuf::from(format!(".{file_name}.tmp")),
    };

    fs::write(&temp_path, payload)?;
    fs::rename(&temp_path, path)
}
