//! Resource manager — the import / commit / evict lifecycle.
//!
//! One manager per storage key, reused unchanged for identities, forms,
//! claims, and credentials. It holds two independent slots:
//!
//! - `imported`: a volatile candidate, one at a time, overwritten by the
//!   next import and cleared on commit or discard.
//! - `stored`: the durable contents of the key, loaded on start and
//!   rewritten on every mutation.
//!
//! Every operation is synchronous and runs to completion. A failed write
//! leaves both slots exactly as they were.

use log::{debug, info};

use crate::error::{ImportError, Result};
use crate::import::{import_from, ImportSource};
use crate::resource::{Resource, StoreMode};
use crate::storage::{PersistenceStore, Stored};

/// Lifecycle manager for one resource kind under one storage key.
pub struct ResourceManager<T: Resource> {
    store: PersistenceStore,
    key: String,
    mode: StoreMode,
    imported: Option<T>,
    stored: Stored<T>,
}

impl<T: Resource> ResourceManager<T> {
    /// Create a manager and populate `stored` from the persistence store.
    ///
    /// List mode keeps only the entries that pass validation; single mode
    /// loads the whole value or nothing.
    pub fn start(store: PersistenceStore, key: impl Into<String>, mode: StoreMode) -> Self {
        let key = key.into();
        let stored = store.load::<T>(&key, mode);
        debug!("started {} manager on `{key}` with {} stored", T::KIND, stored.len());
        Self {
            store,
            key,
            mode,
            imported: None,
            stored,
        }
    }

    /// Start a manager using the kind's default storage mode.
    pub fn open(store: PersistenceStore, key: impl Into<String>) -> Self {
        Self::start(store, key, T::MODE)
    }

    /// Re-read `stored` from the persistence store, e.g. after another
    /// manager wrote the same key.
    pub fn reload(&mut self) {
        self.stored = self.store.load::<T>(&self.key, self.mode);
    }

    // ── Accessors ─────────────────────────────────────────────────────────────

    /// The storage key this manager owns.
    pub fn key(&self) -> &str {
        &self.key
    }

    /// The storage mode of the key.
    pub fn mode(&self) -> StoreMode {
        self.mode
    }

    /// The current import candidate.
    pub fn imported(&self) -> Option<&T> {
        self.imported.as_ref()
    }

    /// The durable contents.
    pub fn stored(&self) -> &Stored<T> {
        &self.stored
    }

    /// The durable contents as a slice.
    pub fn stored_list(&self) -> &[T] {
        self.stored.as_slice()
    }

    /// The single stored value (single mode only).
    pub fn stored_single(&self) -> Option<&T> {
        self.stored.single()
    }

    /// Stored value at `index`.
    pub fn get(&self, index: usize) -> Option<&T> {
        self.stored.as_slice().get(index)
    }

    /// Number of stored values.
    pub fn len(&self) -> usize {
        self.stored.len()
    }

    /// Return `true` if nothing is stored.
    pub fn is_empty(&self) -> bool {
        self.stored.is_empty()
    }

    // ── Transitions ───────────────────────────────────────────────────────────

    /// Parse and validate `source`, making it the import candidate.
    ///
    /// On failure the previous candidate (if any) is left untouched.
    ///
    /// # Errors
    ///
    /// Returns the channel's `ImportError` unchanged.
    pub fn import(&mut self, source: ImportSource) -> std::result::Result<&T, ImportError> {
        let value = import_from::<T>(source)?;
        Ok(self.imported.insert(value))
    }

    /// Make an in-process value the import candidate without re-validating.
    pub fn import_direct(&mut self, value: T) {
        self.imported = Some(value);
    }

    /// Drop the import candidate.
    pub fn discard_imported(&mut self) {
        self.imported = None;
    }

    /// Persist the import candidate and clear it.
    ///
    /// Single mode replaces the stored value; list mode appends to it.
    /// Returns `Ok(false)` without touching anything if there is no
    /// candidate.
    ///
    /// # Errors
    ///
    /// Returns a storage error if the write fails; state is unchanged.
    pub fn commit(&mut self) -> Result<bool> {
        let Some(candidate) = self.imported.as_ref() else {
            return Ok(false);
        };

        let next = match &self.stored {
            Stored::Single(_) => {
                self.store.save(&self.key, StoreMode::Single, candidate)?;
                Stored::Single(Some(candidate.clone()))
            }
            Stored::List(current) => {
                let mut updated = current.clone();
                updated.push(candidate.clone());
                self.store.write_list(&self.key, &updated)?;
                Stored::List(updated)
            }
        };

        self.stored = next;
        self.imported = None;
        info!("committed {} to `{}` ({} stored)", T::KIND, self.key, self.stored.len());
        Ok(true)
    }

    /// Remove the stored entry at `index` (list mode only), keeping the
    /// order of the rest. Returns `Ok(false)` in single mode or when
    /// `index` is out of range.
    ///
    /// # Errors
    ///
    /// Returns a storage error if the write fails; state is unchanged.
    pub fn remove_stored(&mut self, index: usize) -> Result<bool> {
        let Stored::List(current) = &self.stored else {
            return Ok(false);
        };
        if index >= current.len() {
            return Ok(false);
        }

        let mut updated = current.clone();
        updated.remove(index);
        self.store.write_list(&self.key, &updated)?;
        self.stored = Stored::List(updated);
        debug!("removed {} at index {index} from `{}`", T::KIND, self.key);
        Ok(true)
    }

    /// Replace the stored entry at `index` (list mode only). Returns
    /// `Ok(false)` in single mode or when `index` is out of range.
    ///
    /// # Errors
    ///
    /// Returns a storage error if the write fails; state is unchanged.
    pub fn update_stored(&mut self, index: usize, value: T) -> Result<bool> {
        let Stored::List(current) = &self.stored else {
            return Ok(false);
        };
        if index >= current.len() {
            return Ok(false);
        }

        let mut updated = current.clone();
        updated[index] = value;
        self.store.write_list(&self.key, &updated)?;
        self.stored = Stored::List(updated);
        Ok(true)
    }

    /// Remove the key entirely and reset `stored` to the mode's empty
    /// value. The import candidate is not touched.
    ///
    /// # Errors
    ///
    /// Returns a storage error if the removal fails; state is unchanged.
    pub fn clear_all(&mut self) -> Result<()> {
        self.store.clear(&self.key)?;
        self.stored = Stored::empty(self.mode);
        info!("cleared `{}`", self.key);
        Ok(())
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
