//! Durable string key → string value backends.
//!
//! The file backend stores one JSON document per key:
//!
//! ```text
//! {base_dir}/
//! ├── peerplay-identity.json
//! ├── peerplay-forms.json
//! ├── peerplay-claims.json
//! ├── peerplay-issued.json
//! └── peerplay-vcs.json
//! ```
//!
//! Each write goes through its own uniquely named sibling temp file and a
//! rename, so a reader never sees a partial value. Concurrent writers to the same key are not
//! coordinated: the last write wins.

use std::collections::HashMap;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use tempfile::NamedTempFile;

use crate::error::{PeerError, Result};

/// A key-value store holding raw serialized values.
pub trait StorageBackend: Send + Sync {
    /// Return the raw value under `key`, or `None` if the key is absent.
    fn get(&self, key: &str) -> Result<Option<String>>;

    /// Store `value` under `key`, replacing any previous value.
    fn set(&self, key: &str, value: &str) -> Result<()>;

    /// Remove `key`. Removing an absent key is a no-op.
    fn remove(&self, key: &str) -> Result<()>;
}

// ── FileBackend ───────────────────────────────────────────────────────────────

/// Filesystem-backed storage: `{base_dir}/{key}.json`.
pub struct FileBackend {
    base_dir: PathBuf,
}

impl FileBackend {
    /// Create a new `FileBackend` rooted at `base_dir`.
    ///
    /// The directory and any missing parents are created if they do not exist.
    ///
    /// # Errors
    ///
    /// Returns `PeerError::Io` if the directory cannot be created.
    pub fn new(base_dir: impl Into<PathBuf>) -> Result<Self> {
        let base_dir = base_dir.into();
        std::fs::create_dir_all(&base_dir)?;
        Ok(Self { base_dir })
    }

    /// Root directory of this backend.
    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    /// Build the filesystem path for a key.
    fn key_path(&self, key: &str) -> Result<PathBuf> {
        let valid = !key.is_empty()
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'))
            && !key.starts_with('.');
        if !valid {
            return Err(PeerError::StorageError(format!(
                "storage key `{key}` is not a safe file name"
            )));
        }
        Ok(self.base_dir.join(format!("{key}.json")))
    }
}

impl StorageBackend for FileBackend {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let path = self.key_path(key)?;
        match std::fs::read(&path) {
            Ok(bytes) => String::from_utf8(bytes).map(Some).map_err(|e| {
                PeerError::StorageError(format!("{} is not UTF-8: {e}", path.display()))
            }),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(PeerError::Io(e)),
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let path = self.key_path(key)?;
        write_atomic(&path, value.as_bytes())
    }

    fn remove(&self, key: &str) -> Result<()> {
        let path = self.key_path(key)?;
        match std::fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(PeerError::Io(e)),
        }
    }
}

/// Write `data` to `path` atomically through a uniquely named sibling
/// temporary file.
///
/// Creates the parent directory if it does not exist.
pub(crate) fn write_atomic(path: &Path, data: &[u8]) -> Result<()> {
    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    std::fs::create_dir_all(dir)?;

    let mut tmp = NamedTempFile::new_in(dir)?;
    tmp.write_all(data)?;
    tmp.as_file().sync_all()?;
    tmp.persist(path).map_err(|e| PeerError::Io(e.error))?;

    Ok(())
}

// ── MemoryBackend ─────────────────────────────────────────────────────────────

/// In-process storage for tests and throwaway sessions.
#[derive(Default)]
pub struct MemoryBackend {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryBackend {
    /// Create an empty backend.
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, HashMap<String, String>>> {
        self.entries
            .lock()
            .map_err(|_| PeerError::StorageError("memory backend lock poisoned".into()))
    }
}

impl StorageBackend for MemoryBackend {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.lock()?.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.lock()?.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        self.lock()?.remove(key);
        Ok(())
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
