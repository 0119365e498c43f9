//! StateStore — existence-checked key/value state over a document collection.
//!
//! The store owns no data. Every call is a round trip (or two) to the backing
//! collection, and every mutation is guarded by a precondition:
//!
//! | operation | requires            | otherwise     |
//! |-----------|---------------------|---------------|
//! | `create`  | key absent          | `KeyConflict` |
//! | `get`     | key present         | `KeyNotFound` |
//! | `set`     | key present         | `KeyNotFound` |
//! | `delete`  | key present         | `KeyNotFound` |
//! | `clear`   | key present         | `KeyNotFound` |
//!
//! There is no upsert. When the collection offers [`ConditionalWrites`] and
//! [`StoreOptions::atomic_writes`] is on, the check and the write happen in
//! one atomic call. Otherwise the store probes first and writes second, and
//! two concurrent callers can both pass the probe; serialize access in front
//! of the store if that matters.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::collection::{ConditionalWrites, Document, DocumentCollection, DocumentStore};
use crate::error::{StateError, StateResult};
use crate::value::StateValue;

/// Namespace used when none is given.
pub const DEFAULT_DATABASE: &str = "statedb";

/// Collection used when none is given.
pub const DEFAULT_COLLECTION: &str = "state";

/// How [`StateStore::count`] asks the collection for its size.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum CountMode {
    /// Cheap count; may lag under concurrent writes.
    #[default]
    Estimated,
    /// Exact count.
    Exact,
}

/// Behavioral knobs for a [`StateStore`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct StoreOptions {
    pub count: CountMode,
    /// Use the collection's native conditional writes when it has them.
    pub atomic_writes: bool,
}

impl Default for StoreOptions {
    fn default() -> Self {
        Self {
            count: CountMode::Estimated,
            atomic_writes: true,
        }
    }
}

/// Strict key/value view of one document collection.
#[derive(Clone)]
pub struct StateStore<C> {
    collection: C,
    options: StoreOptions,
}

impl<C: DocumentCollection> StateStore<C> {
    /// Open the collection `collection` in namespace `database` of an
    /// already-connected store.
    pub fn new<S>(store: &S, database: &str, collection: &str) -> StateResult<Self>
    where
        S: DocumentStore<Collection = C>,
    {
        let collection = store.collection(database, collection)?;
        Ok(Self::from_collection(collection))
    }

    /// Open [`DEFAULT_COLLECTION`] in [`DEFAULT_DATABASE`].
    pub fn with_defaults<S>(store: &S) -> StateResult<Self>
    where
        S: DocumentStore<Collection = C>,
    {
        Self::new(store, DEFAULT_DATABASE, DEFAULT_COLLECTION)
    }

    /// Wrap a collection handle directly.
    pub fn from_collection(collection: C) -> Self {
        Self {
            collection,
            options: StoreOptions::default(),
        }
    }

    pub fn with_options(mut self, options: StoreOptions) -> Self {
        self.options = options;
        self
    }

    pub fn options(&self) -> &StoreOptions {
        &self.options
    }

    /// The backing collection.
    pub fn collection(&self) -> &C {
        &self.collection
    }

    fn atomic(&self) -> Option<&dyn ConditionalWrites> {
        if self.options.atomic_writes {
            self.collection.conditional_writes()
        } else {
            None
        }
    }

    fn ensure_exists(&self, key: &str) -> StateResult<()> {
        if self.exists(key)? {
            Ok(())
        } else {
            Err(StateError::KeyNotFound(key.to_string()))
        }
    }

    // ── Probes ─────────────────────────────────────────────────────

    /// Whether a record with `key` is present.
    pub fn exists(&self, key: &str) -> StateResult<bool> {
        let found = self.collection.find_one(key)?.is_some();
        trace!(key, found, "existence probe");
        Ok(found)
    }

    /// Whether `key` exists and holds something other than the void marker.
    pub fn is_set(&self, key: &str) -> StateResult<bool> {
        Ok(self
            .collection
            .find_one(key)?
            .is_some_and(|doc| !doc.value.is_null()))
    }

    /// Number of records, per [`StoreOptions::count`].
    pub fn count(&self) -> StateResult<u64> {
        match self.options.count {
            CountMode::Estimated => self.collection.estimated_count(),
            CountMode::Exact => self.collection.count(),
        }
    }

    // ── Reads ──────────────────────────────────────────────────────

    /// The stored value of `key`.
    pub fn get(&self, key: &str) -> StateResult<StateValue> {
        match self.collection.find_one(key)? {
            Some(doc) => Ok(doc.value),
            None => Err(StateError::KeyNotFound(key.to_string())),
        }
    }

    /// Snapshot of every record. Not atomic against concurrent writers.
    pub fn get_all(&self) -> StateResult<BTreeMap<String, StateValue>> {
        Ok(self
            .collection
            .find_all()?
            .into_iter()
            .map(|doc| (doc.key, doc.value))
            .collect())
    }

    /// Every key currently present.
    pub fn keys(&self) -> StateResult<Vec<String>> {
        Ok(self
            .collection
            .find_all()?
            .into_iter()
            .map(|doc| doc.key)
            .collect())
    }

    // ── Writes ─────────────────────────────────────────────────────

    /// Add a new key. Fails with `KeyConflict` if it is already present.
    pub fn create(&self, key: &str, value: impl Into<StateValue>) -> StateResult<()> {
        let document = Document::new(key, value);
        let created = match self.atomic() {
            Some(cw) => cw.insert_if_absent(document)?,
            None if self.exists(key)? => false,
            None => {
                self.collection.insert_one(document)?;
                true
            }
        };
        if !created {
            return Err(StateError::KeyConflict(key.to_string()));
        }
        debug!(key, "key created");
        Ok(())
    }

    /// Overwrite the value of an existing key.
    pub fn set(&self, key: &str, value: impl Into<StateValue>) -> StateResult<()> {
        let value = value.into();
        match self.atomic() {
            Some(cw) => {
                if !cw.update_if_present(key, value)? {
                    return Err(StateError::KeyNotFound(key.to_string()));
                }
            }
            None => {
                self.ensure_exists(key)?;
                self.collection.update_one(key, value)?;
            }
        }
        debug!(key, "key updated");
        Ok(())
    }

    /// Remove an existing key.
    pub fn delete(&self, key: &str) -> StateResult<()> {
        match self.atomic() {
            Some(cw) => {
                if !cw.delete_if_present(key)? {
                    return Err(StateError::KeyNotFound(key.to_string()));
                }
            }
            None => {
                self.ensure_exists(key)?;
                self.collection.delete_one(key)?;
            }
        }
        debug!(key, "key deleted");
        Ok(())
    }

    /// Remove every record. Succeeds on an empty collection.
    pub fn delete_all(&self) -> StateResult<()> {
        self.collection.delete_all()?;
        debug!("all keys deleted");
        Ok(())
    }

    /// Void the value of an existing key, keeping the key.
    pub fn clear(&self, key: &str) -> StateResult<()> {
        self.set(key, StateValue::Null)
    }

    /// Void every value, keeping every key.
    ///
    /// Keys are enumerated first and cleared one by one. A key deleted by
    /// someone else in between is skipped; a key created in between is left
    /// alone.
    pub fn clear_all(&self) -> StateResult<()> {
        let mut cleared = 0usize;
        for key in self.keys()? {
            match self.clear(&key) {
                Ok(()) => cleared += 1,
                Err(StateError::KeyNotFound(_)) => trace!(%key, "key vanished before clear"),
                Err(e) => return Err(e),
            }
        }
        debug!(cleared, "all keys cleared");
        Ok(())
    }
}
