use std::fs;
use std::path::{Path, PathBuf};

use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;

use crate::error::SessionStoreError;
use crate::paths::session_file_name;
use crate::schema::{SessionDocument, SESSION_SCHEMA_VERSION};

/// Directory of session documents, one JSON file per session.
#[derive(Debug, Clone)]
pub struct SessionStore {
    root: PathBuf,
}

impl SessionStore {
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Writes the full transcript, replacing any previous save atomically.
    ///
    /// The document is serialized to a dot-prefixed temp file in the same
    /// directory and renamed into place, so a crashed save never leaves a
    /// partially written session behind.
    pub fn save(&self, document: &SessionDocument) -> Result<PathBuf, SessionStoreError> {
        let file_name = session_file_name(&document.created_at, &document.session_id);
        let path = self.root.join(&file_name);
        validate_document(&path, document)?;

        fs::create_dir_all(&self.root)
            .map_err(|source| SessionStoreError::io("creating session directory", &self.root, source))?;

        let json = serde_json::to_string_pretty(document)
            .map_err(|source| SessionStoreError::json_serialize(&path, source))?;

        let temp_path = self.root.join(format!(".{file_name}.tmp"));
        fs::write(&temp_path, json)
            .map_err(|source| SessionStoreError::io("writing session temp file", &temp_path, source))?;
        fs::rename(&temp_path, &path)
            .map_err(|source| SessionStoreError::io("replacing session file", &path, source))?;

        Ok(path)
    }

    /// Reads a session back by its id.
    pub fn load(&self, session_id: &str) -> Result<SessionDocument, SessionStoreError> {
        let suffix = format!("_{session_id}.json");
        let path = self
            .list()?
            .into_iter()
            .find(|path| {
                path.file_name()
                    .and_then(|name| name.to_str())
                    .is_some_and(|name| name.ends_with(&suffix))
            })
            .ok_or_else(|| SessionStoreError::SessionNotFound {
                root: self.root.clone(),
                session_id: session_id.to_string(),
            })?;

        Self::load_path(&path)
    }

    /// Reads and validates one session document file.
    pub fn load_path(path: &Path) -> Result<SessionDocument, SessionStoreError> {
        let contents = fs::read_to_string(path)
            .map_err(|source| SessionStoreError::io("reading session file", path, source))?;
        let document = serde_json::from_str::<SessionDocument>(&contents)
            .map_err(|source| SessionStoreError::json_parse(path, source))?;
        validate_document(path, &document)?;
        Ok(document)
    }

    /// Session files under the root, sorted by file name (and therefore by
    /// creation timestamp). An absent root lists as empty.
    pub fn list(&self) -> Result<Vec<PathBuf>, SessionStoreError> {
        let entries = match fs::read_dir(&self.root) {
            Ok(entries) => entries,
            Err(source) if source.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(source) => {
                return Err(SessionStoreError::io(
                    "listing session directory",
                    &self.root,
                    source,
                ))
            }
        };

        let mut paths = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|source| {
                SessionStoreError::io("listing session directory", &self.root, source)
            })?;
            let path = entry.path();
            let Some(name) = path.file_name().and_then(|name| name.to_str()) else {
                continue;
            };
            if name.starts_with('.') || !name.ends_with(".json") {
                continue;
            }
            paths.push(path);
        }

        paths.sort();
        Ok(paths)
    }
}

fn validate_document(path: &Path, document: &SessionDocument) -> Result<(), SessionStoreError> {
    if document.version != SESSION_SCHEMA_VERSION {
        return Err(SessionStoreError::UnsupportedVersion {
            path: path.to_path_buf(),
            found: document.version,
        });
    }

    if document.session_id.trim().is_empty() {
        return Err(SessionStoreError::EmptySessionId {
            path: path.to_path_buf(),
        });
    }

    validate_rfc3339(path, "created_at", &document.created_at)?;
    validate_rfc3339(path, "updated_at", &document.updated_at)?;
    for turn in &document.turns {
        validate_rfc3339(path, "ts", &turn.ts)?;
    }

    Ok(())
}

fn validate_rfc3339(
    path: &Path,
    field: &'static str,
    value: &str,
) -> Result<(), SessionStoreError> {
    if OffsetDateTime::parse(value, &Rfc3339).is_err() {
        return Err(SessionStoreError::InvalidTimestamp {
            path: path.to_path_buf(),
            field,
            value: value.to_string(),
        });
    }

    Ok(())
}
