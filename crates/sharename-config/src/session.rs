// ── File-backed session store ──
//
// Keeps the three session entries in a small JSON object on disk. Every
// write rewrites the whole file, so concurrent hosts resolve as
// last-write-wins.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::{PoisonError, RwLock};

use sharename_api::{Error, SessionKey, SessionStore};
use tracing::{debug, warn};

/// Overrides the session file location.
pub const SESSION_FILE_ENV: &str = "SHARENAME_SESSION_FILE";

/// `SHARENAME_SESSION_FILE`, else `session.json` in the platform data dir.
pub fn session_path() -> PathBuf {
    if let Some(path) = std::env::var_os(SESSION_FILE_ENV) {
        return PathBuf::from(path);
    }
    super::project_dirs().map_or_else(
        || super::dirs_fallback(".local/share").join("session.json"),
        |dirs| dirs.data_dir().join("session.json"),
    )
}

/// Session file for a profile: `SHARENAME_SESSION_FILE` wins, then the
/// profile's own file, then the shared default.
pub fn resolve_session_file(profile_file: Option<&Path>) -> PathBuf {
    if let Some(path) = std::env::var_os(SESSION_FILE_ENV) {
        return PathBuf::from(path);
    }
    profile_file.map_or_else(session_path, Path::to_path_buf)
}

#[derive(Debug)]
pub struct FileSessionStore {
    path: PathBuf,
    entries: RwLock<BTreeMap<String, String>>,
}

impl FileSessionStore {
    /// Open the store at `path`. A missing file is an empty session; an
    /// unreadable one is logged and treated as empty.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let entries = match std::fs::read_to_string(&path) {
            Ok(text) => serde_json::from_str(&text).unwrap_or_else(|e| {
                warn!(path = %path.display(), error = %e, "ignoring corrupt session file");
                BTreeMap::new()
            }),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => BTreeMap::new(),
            Err(e) => {
                warn!(path = %path.display(), error = %e, "failed to read session file");
                BTreeMap::new()
            }
        };
        Self {
            path,
            entries: RwLock::new(entries),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn persist(&self, entries: &BTreeMap<String, String>) -> Result<(), Error> {
        if entries.is_empty() {
            return match std::fs::remove_file(&self.path) {
                Ok(()) => Ok(()),
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
                Err(e) => Err(io_error(&self.path, &e)),
            };
        }

        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| io_error(parent, &e))?;
        }
        let json = serde_json::to_string_pretty(entries)
            .map_err(|e| Error::Session(format!("failed to encode session: {e}")))?;
        std::fs::write(&self.path, json).map_err(|e| io_error(&self.path, &e))?;
        restrict_permissions(&self.path);
        debug!(path = %self.path.display(), "session saved");
        Ok(())
    }
}

impl SessionStore for FileSessionStore {
    fn get(&self, key: SessionKey) -> Option<String> {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key.as_str())
            .cloned()
    }

    fn set(&self, key: SessionKey, value: &str) -> Result<(), Error> {
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        entries.insert(key.as_str().to_owned(), value.to_owned());
        self.persist(&entries)
    }

    fn clear(&self) -> Result<(), Error> {
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        entries.clear();
        self.persist(&entries)
    }
}

fn io_error(path: &Path, e: &std::io::Error) -> Error {
    Error::Session(format!("{}: {e}", path.display()))
}

#[cfg(unix)]
fn restrict_permissions(path: &Path) {
    use std::os::unix::fs::PermissionsExt;
    if let Err(e) = std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o600)) {
        warn!(path = %path.display(), error = %e, "could not restrict session file permissions");
    }
}

#[cfg(not(unix))]
fn restrict_permissions(_path: &Path) {}
