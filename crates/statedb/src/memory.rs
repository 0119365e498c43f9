//! Process-local document store.
//!
//! Every [`MemoryCollection`] obtained from the same [`MemoryStore`] (or a
//! clone of it) for the same `database/collection` pair sees the same data,
//! which is what a shared remote collection looks like to several
//! [`StateStore`](crate::StateStore) handles.

use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex, RwLock, RwLockReadGuard, RwLockWriteGuard};

use tracing::debug;

use crate::collection::{ConditionalWrites, Document, DocumentCollection, DocumentStore};
use crate::error::{BackendError, StateResult};
use crate::value::StateValue;

type Records = BTreeMap<String, StateValue>;

/// In-memory document store. Cheap to clone; clones share collections.
#[derive(Clone, Default)]
pub struct MemoryStore {
    collections: Arc<Mutex<HashMap<String, Arc<RwLock<Records>>>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl DocumentStore for MemoryStore {
    type Collection = MemoryCollection;

    fn collection(&self, database: &str, collection: &str) -> StateResult<MemoryCollection> {
        let name = format!("{database}/{collection}");
        let mut collections = self
            .collections
            .lock()
            .map_err(|e| BackendError::Poisoned(e.to_string()))?;
        let records = collections.entry(name.clone()).or_default().clone();
        debug!(%name, "memory collection opened");
        Ok(MemoryCollection { name, records })
    }
}

/// Handle to one collection of a [`MemoryStore`].
#[derive(Clone)]
pub struct MemoryCollection {
    name: String,
    records: Arc<RwLock<Records>>,
}

impl MemoryCollection {
    /// `database/collection` this handle points at.
    pub fn name(&self) -> &str {
        &self.name
    }

    fn read(&self) -> StateResult<RwLockReadGuard<'_, Records>> {
        Ok(self
            .records
            .read()
            .map_err(|e| BackendError::Poisoned(e.to_string()))?)
    }

    fn write(&self) -> StateResult<RwLockWriteGuard<'_, Records>> {
        Ok(self
            .records
            .write()
            .map_err(|e| BackendError::Poisoned(e.to_string()))?)
    }
}

impl DocumentCollection for MemoryCollection {
    fn find_one(&self, key: &str) -> StateResult<Option<Document>> {
        Ok(self.read()?.get(key).map(|value| Document {
            key: key.to_string(),
            value: value.clone(),
        }))
    }

    fn find_all(&self) -> StateResult<Vec<Document>> {
        Ok(self
            .read()?
            .iter()
            .map(|(key, value)| Document {
                key: key.clone(),
                value: value.clone(),
            })
            .collect())
    }

    fn insert_one(&self, document: Document) -> StateResult<()> {
        if self.insert_if_absent(document.clone())? {
            Ok(())
        } else {
            Err(BackendError::Write(format!("duplicate key: {}", document.key)).into())
        }
    }

    fn update_one(&self, key: &str, value: StateValue) -> StateResult<()> {
        self.update_if_present(key, value)?;
        Ok(())
    }

    fn delete_one(&self, key: &str) -> StateResult<()> {
        self.delete_if_present(key)?;
        Ok(())
    }

    fn delete_all(&self) -> StateResult<()> {
        self.write()?.clear();
        Ok(())
    }

    fn count(&self) -> StateResult<u64> {
        Ok(self.read()?.len() as u64)
    }

    fn conditional_writes(&self) -> Option<&dyn ConditionalWrites> {
        Some(self)
    }
}

impl ConditionalWrites for MemoryCollection {
    fn insert_if_absent(&self, document: Document) -> StateResult<bool> {
        let mut records = self.write()?;
        if records.contains_key(&document.key) {
            return Ok(false);
        }
        records.insert(document.key, document.value);
        Ok(true)
    }

    fn update_if_present(&self, key: &str, value: StateValue) -> StateResult<bool> {
        match self.write()?.get_mut(key) {
            Some(slot) => {
                *slot = value;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    fn delete_if_present(&self, key: &str) -> StateResult<bool> {
        Ok(self.write()?.remove(key).is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::StateError;

    #[test]
    fn collections_are_shared_between_handles() {
        let store = MemoryStore::new();
        let a = store.collection("db", "state").unwrap();
        let b = store.clone().collection("db", "state").unwrap();

        a.insert_one(Document::new("k", 1)).unwrap();
        assert_eq!(b.find_one("k").unwrap(), Some(Document::new("k", 1)));
        assert_eq!(b.name(), "db/state");
    }

    #[test]
    fn collections_are_isolated_by_name() {
        let store = MemoryStore::new();
        let a = store.collection("db", "one").unwrap();
        let b = store.collection("db", "two").unwrap();
        let c = store.collection("other", "one").unwrap();

        a.insert_one(Document::new("k", 1)).unwrap();
        assert_eq!(b.count().unwrap(), 0);
        assert_eq!(c.count().unwrap(), 0);
    }

    #[test]
    fn insert_one_rejects_duplicate_key() {
        let coll = MemoryStore::new().collection("db", "state").unwrap();
        coll.insert_one(Document::new("k", 1)).unwrap();

        let err = coll.insert_one(Document::new("k", 2)).unwrap_err();
        assert!(matches!(err, StateError::Backend(BackendError::Write(_))));
        assert_eq!(coll.find_one("k").unwrap().unwrap().value, StateValue::Int(1));
    }

    #[test]
    fn conditional_writes_report_outcome() {
        let coll = MemoryStore::new().collection("db", "state").unwrap();
        let cw = coll.conditional_writes().unwrap();

        assert!(cw.insert_if_absent(Document::new("k", 1)).unwrap());
        assert!(!cw.insert_if_absent(Document::new("k", 2)).unwrap());
        assert!(cw.update_if_present("k", 3.into()).unwrap());
        assert!(!cw.update_if_present("missing", 3.into()).unwrap());
        assert!(cw.delete_if_present("k").unwrap());
        assert!(!cw.delete_if_present("k").unwrap());
    }

    #[test]
    fn find_all_is_key_ordered() {
        let coll = MemoryStore::new().collection("db", "state").unwrap();
        for key in ["b", "c", "a"] {
            coll.insert_one(Document::new(key, key)).unwrap();
        }
        let keys: Vec<_> = coll.find_all().unwrap().into_iter().map(|d| d.key).collect();
        assert_eq!(keys, ["a", "b", "c"]);
    }
}
