//! Persistence store — JSON values under caller-supplied keys.
//!
//! A key is used in one of two modes:
//!
//! - `Single`: holds at most one value. `save` overwrites; after `clear`
//!   the key loads as `None`.
//! - `List`: holds an ordered array. `save` appends; after `clear` the key
//!   loads as an empty list.
//!
//! Loading never fails. A missing key is empty, a value that is not JSON
//! is logged and treated as empty, and list entries that fail the kind's
//! validator are dropped with a warning.

use std::sync::Arc;

use log::{debug, warn};
use serde_json::Value;

use super::backend::StorageBackend;
use crate::error::{PeerError, Result};
use crate::resource::{Conformance, Resource, StoreMode};

/// The durable contents of one key, shaped by its mode.
#[derive(Debug, Clone, PartialEq)]
pub enum Stored<T> {
    Single(Option<T>),
    List(Vec<T>),
}

impl<T> Stored<T> {
    /// The empty representation for `mode`.
    pub fn empty(mode: StoreMode) -> Self {
        match mode {
            StoreMode::Single => Self::Single(None),
            StoreMode::List => Self::List(Vec::new()),
        }
    }

    /// The mode this value belongs to.
    pub fn mode(&self) -> StoreMode {
        match self {
            Self::Single(_) => StoreMode::Single,
            Self::List(_) => StoreMode::List,
        }
    }

    /// The stored values as a slice (zero or one element in single mode).
    pub fn as_slice(&self) -> &[T] {
        match self {
            Self::Single(Some(v)) => std::slice::from_ref(v),
            Self::Single(None) => &[],
            Self::List(v) => v.as_slice(),
        }
    }

    /// The single value, if this is single mode and it is set.
    pub fn single(&self) -> Option<&T> {
        match self {
            Self::Single(v) => v.as_ref(),
            Self::List(_) => None,
        }
    }

    /// Number of stored values.
    pub fn len(&self) -> usize {
        self.as_slice().len()
    }

    /// Return `true` if nothing is stored.
    pub fn is_empty(&self) -> bool {
        self.as_slice().is_empty()
    }
}

// ── PersistenceStore ──────────────────────────────────────────────────────────

/// Typed, validated access to a [`StorageBackend`].
#[derive(Clone)]
pub struct PersistenceStore {
    backend: Arc<dyn StorageBackend>,
}

impl PersistenceStore {
    /// Wrap an explicitly constructed backend.
    pub fn new(backend: Arc<dyn StorageBackend>) -> Self {
        Self { backend }
    }

    /// The shared backend.
    pub fn backend(&self) -> &Arc<dyn StorageBackend> {
        &self.backend
    }

    /// Load `key` in `mode`, keeping only values that pass `T`'s validator.
    pub fn load<T: Resource>(&self, key: &str, mode: StoreMode) -> Stored<T> {
        let Some(raw) = self.load_raw(key) else {
            return Stored::empty(mode);
        };

        match mode {
            StoreMode::Single => match T::conform(&raw) {
                Conformance::Valid(v) => Stored::Single(Some(v)),
                Conformance::Invalid(reason) => {
                    warn!("dropping invalid {} under `{key}`: {reason}", T::KIND);
                    Stored::Single(None)
                }
            },
            StoreMode::List => {
                let Value::Array(entries) = raw else {
                    warn!("value under `{key}` is not a list; treating as empty");
                    return Stored::List(Vec::new());
                };
                let total = entries.len();
                let valid: Vec<T> = entries
                    .iter()
                    .enumerate()
                    .filter_map(|(i, entry)| match T::conform(entry) {
                        Conformance::Valid(v) => Some(v),
                        Conformance::Invalid(reason) => {
                            warn!("dropping invalid {} at `{key}`[{i}]: {reason}", T::KIND);
                            None
                        }
                    })
                    .collect();
                if valid.len() != total {
                    debug!("loaded {}/{} entries from `{key}`", valid.len(), total);
                }
                Stored::List(valid)
            }
        }
    }

    /// Save `value` under `key`: overwrite in single mode, append in list
    /// mode. Returns the new contents of the key.
    ///
    /// # Errors
    ///
    /// Returns `PeerError::SerializationError` if serialization fails, or a
    /// backend error if the write fails.
    pub fn save<T: Resource>(&self, key: &str, mode: StoreMode, value: &T) -> Result<Stored<T>> {
        match mode {
            StoreMode::Single => {
                self.write_value(key, value)?;
                Ok(Stored::Single(Some(value.clone())))
            }
            StoreMode::List => {
                let mut list = match self.load::<T>(key, StoreMode::List) {
                    Stored::List(v) => v,
                    Stored::Single(_) => Vec::new(),
                };
                list.push(value.clone());
                self.write_list(key, &list)?;
                Ok(Stored::List(list))
            }
        }
    }

    /// Replace the whole list under `key`.
    ///
    /// # Errors
    ///
    /// Returns `PeerError::SerializationError` if serialization fails, or a
    /// backend error if the write fails.
    pub fn write_list<T: Resource>(&self, key: &str, values: &[T]) -> Result<()> {
        self.write_value(key, values)
    }

    /// Remove `key` entirely.
    ///
    /// # Errors
    ///
    /// Returns a backend error if the removal fails.
    pub fn clear(&self, key: &str) -> Result<()> {
        self.backend.remove(key)
    }

    // ── Internal helpers ──────────────────────────────────────────────────────

    /// Read and parse `key`; every failure degrades to `None`.
    fn load_raw(&self, key: &str) -> Option<Value> {
        let raw = match self.backend.get(key) {
            Ok(Some(raw)) => raw,
            Ok(None) => return None,
            Err(e) => {
                warn!("failed to read storage key `{key}`: {e}");
                return None;
            }
        };

        match serde_json::from_str(&raw) {
            Ok(v) => Some(v),
            Err(e) => {
                warn!("invalid data in storage key `{key}`: {e}");
                None
            }
        }
    }

    fn write_value<S: serde::Serialize + ?Sized>(&self, key: &str, value: &S) -> Result<()> {
        let json = serde_json::to_string(value)
            .map_err(|e| PeerError::SerializationError(e.to_string()))?;
        self.backend.set(key, &json)
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resource::{FormDefinition, StoredIdentity};
    use crate::storage::backend::{FileBackend, MemoryBackend};
    use serde_json::json;

    fn memory_store() -> PersistenceStore {
        PersistenceStore::new(Arc::new(MemoryBackend::new()))
    }

    fn identity() -> StoredIdentity {
        serde_json::from_value(json!({
            "did": "did:key:z1",
            "privateKeyHex": "ab",
            "publicKeyHex": "cd",
            "kid": "k1",
            "type": "Ed25519"
        }))
        .unwrap()
    }

    fn form(id: &str) -> FormDefinition {
        serde_json::from_value(json!({"id": id, "title": id.to_uppercase(), "fields": []})).unwrap()
    }

    #[test]
    fn test_single_save_load_clear() {
        let store = memory_store();
        let id = identity();

        store.save("peerplay-identity", StoreMode::Single, &id).unwrap();
        let loaded = store.load::<StoredIdentity>("peerplay-identity", StoreMode::Single);
        assert_eq!(loaded, Stored::Single(Some(id)));

        store.clear("peerplay-identity").unwrap();
        let loaded = store.load::<StoredIdentity>("peerplay-identity", StoreMode::Single);
        assert_eq!(loaded, Stored::Single(None));
    }

    #[test]
    fn test_single_save_overwrites() {
        let store = memory_store();
        let first = identity();
        let mut second = identity();
        second.did = "did:key:z2".into();

        store.save("id", StoreMode::Single, &first).unwrap();
        store.save("id", StoreMode::Single, &second).unwrap();
        let loaded = store.load::<StoredIdentity>("id", StoreMode::Single);
        assert_eq!(loaded.single().unwrap().did, "did:key:z2");
    }

    #[test]
    fn test_list_save_appends_in_order() {
        let store = memory_store();
        for id in ["a", "b", "c"] {
            store.save("forms", StoreMode::List, &form(id)).unwrap();
        }
        let loaded = store.load::<FormDefinition>("forms", StoreMode::List);
        let ids: Vec<_> = loaded.as_slice().iter().map(|f| f.id.as_str()).collect();
        assert_eq!(ids, ["a", "b", "c"]);
    }

    #[test]
    fn test_list_clear_loads_empty_not_none() {
        let store = memory_store();
        store.save("forms", StoreMode::List, &form("a")).unwrap();
        store.clear("forms").unwrap();
        assert_eq!(
            store.load::<FormDefinition>("forms", StoreMode::List),
            Stored::List(vec![])
        );
    }

    #[test]
    fn test_missing_key_is_empty() {
        let store = memory_store();
        assert_eq!(
            store.load::<StoredIdentity>("nothing", StoreMode::Single),
            Stored::Single(None)
        );
        assert!(store
            .load::<FormDefinition>("nothing", StoreMode::List)
            .is_empty());
    }

    #[test]
    fn test_corrupt_value_is_empty() {
        let store = memory_store();
        store.backend().set("forms", "{not json").unwrap();
        assert!(store.load::<FormDefinition>("forms", StoreMode::List).is_empty());
        store.backend().set("id", "[[[").unwrap();
        assert_eq!(
            store.load::<StoredIdentity>("id", StoreMode::Single),
            Stored::Single(None)
        );
    }

    #[test]
    fn test_list_drops_invalid_entries() {
        let store = memory_store();
        let raw = json!([
            {"id": "a", "title": "A", "fields": []},
            {"title": "no id", "fields": []},
            {"id": "b", "title": "B", "fields": []},
            42
        ]);
        store.backend().set("forms", &raw.to_string()).unwrap();
        let loaded = store.load::<FormDefinition>("forms", StoreMode::List);
        let ids: Vec<_> = loaded.as_slice().iter().map(|f| f.id.as_str()).collect();
        assert_eq!(ids, ["a", "b"]);
    }

    #[test]
    fn test_list_mode_non_array_is_empty() {
        let store = memory_store();
        store
            .backend()
            .set("forms", r#"{"id":"a","title":"A","fields":[]}"#)
            .unwrap();
        assert!(store.load::<FormDefinition>("forms", StoreMode::List).is_empty());
    }

    #[test]
    fn test_single_mode_invalid_is_whole_or_nothing() {
        let store = memory_store();
        store.backend().set("id", r#"{"did":"did:key:z1"}"#).unwrap();
        assert_eq!(
            store.load::<StoredIdentity>("id", StoreMode::Single),
            Stored::Single(None)
        );
    }

    #[test]
    fn test_file_backed_store_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        {
            let store = PersistenceStore::new(Arc::new(FileBackend::new(dir.path()).unwrap()));
            store.save("forms", StoreMode::List, &form("a")).unwrap();
            store.save("forms", StoreMode::List, &form("b")).unwrap();
        }
        let store = PersistenceStore::new(Arc::new(FileBackend::new(dir.path()).unwrap()));
        assert_eq!(store.load::<FormDefinition>("forms", StoreMode::List).len(), 2);
    }

    #[test]
    fn test_stored_helpers() {
        let s: Stored<u8> = Stored::empty(StoreMode::List);
        assert_eq!(s.mode(), StoreMode::List);
        assert!(s.is_empty());
        let s = Stored::Single(Some(7u8));
        assert_eq!(s.single(), Some(&7));
        assert_eq!(s.as_slice(), &[7]);
        assert_eq!(Stored::List(vec![1u8]).single(), None);
    }
}
