//! The narrow interface a backing document store has to offer.
//!
//! [`StateStore`](crate::StateStore) only ever talks to a
//! [`DocumentCollection`]. Adapters live in [`crate::memory`] and
//! [`crate::redb_store`]; anything else that can do point lookups, full scans
//! and single-document writes by unique key can be plugged in the same way.

use serde::{Deserialize, Serialize};

use crate::error::StateResult;
use crate::value::StateValue;

/// A single persisted key/value pair.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Document {
    /// Unique identity of the record within its collection.
    #[serde(rename = "_id")]
    pub key: String,
    pub value: StateValue,
}

impl Document {
    pub fn new(key: impl Into<String>, value: impl Into<StateValue>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

/// An established connection to a document store.
///
/// The handle is created by calling code and passed in explicitly; the store
/// keeps no global client.
pub trait DocumentStore {
    type Collection: DocumentCollection;

    /// Resolve the collection `collection` inside namespace `database`,
    /// creating it if the backend needs it to exist.
    fn collection(&self, database: &str, collection: &str) -> StateResult<Self::Collection>;
}

/// A collection of uniquely keyed documents.
///
/// Plain writes do not check preconditions: `insert_one` on an existing key,
/// or `update_one`/`delete_one` on a missing key, have whatever effect the
/// backend gives them. Callers that need checked semantics use
/// [`StateStore`](crate::StateStore).
pub trait DocumentCollection: Send + Sync {
    /// Point lookup by key.
    fn find_one(&self, key: &str) -> StateResult<Option<Document>>;

    /// Full scan.
    fn find_all(&self) -> StateResult<Vec<Document>>;

    fn insert_one(&self, document: Document) -> StateResult<()>;

    /// Overwrite the value of the document stored under `key`.
    fn update_one(&self, key: &str, value: StateValue) -> StateResult<()>;

    fn delete_one(&self, key: &str) -> StateResult<()>;

    /// Remove every document, leaving an empty collection behind.
    fn delete_all(&self) -> StateResult<()>;

    /// Exact number of documents.
    fn count(&self) -> StateResult<u64>;

    /// Cheap, possibly stale document count. Falls back to [`count`](Self::count).
    fn estimated_count(&self) -> StateResult<u64> {
        self.count()
    }

    /// Native single-round-trip conditional writes, if the backend has them.
    fn conditional_writes(&self) -> Option<&dyn ConditionalWrites> {
        None
    }
}

/// Atomic conditional writes. Each call decides and writes in one step, so
/// concurrent callers cannot both succeed where only one should.
pub trait ConditionalWrites {
    /// Insert unless the key is present. Returns `false` if it was.
    fn insert_if_absent(&self, document: Document) -> StateResult<bool>;

    /// Overwrite the value if the key is present. Returns `false` if it wasn't.
    fn update_if_present(&self, key: &str, value: StateValue) -> StateResult<bool>;

    /// Remove the key if present. Returns `false` if it wasn't.
    fn delete_if_present(&self, key: &str) -> StateResult<bool>;
}

impl<C: DocumentCollection + ?Sized> DocumentCollection for Box<C> {
    fn find_one(&self, key: &str) -> StateResult<Option<Document>> {
        (**self).find_one(key)
    }

    fn find_all(&self) -> StateResult<Vec<Document>> {
        (**self).find_all()
    }

    fn insert_one(&self, document: Document) -> StateResult<()> {
        (**self).insert_one(document)
    }

    fn update_one(&self, key: &str, value: StateValue) -> StateResult<()> {
        (**self).update_one(key, value)
    }

    fn delete_one(&self, key: &str) -> StateResult<()> {
        (**self).delete_one(key)
    }

    fn delete_all(&self) -> StateResult<()> {
        (**self).delete_all()
    }

    fn count(&self) -> StateResult<u64> {
        (**self).count()
    }

    fn estimated_count(&self) -> StateResult<u64> {
        (**self).estimated_count()
    }

    fn conditional_writes(&self) -> Option<&dyn ConditionalWrites> {
        (**self).conditional_writes()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn document_serializes_key_as_id() {
        let doc = Document::new("age", 28);
        let json = serde_json::to_value(&doc).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"_id": "age", "value": {"type": "int", "value": 28}})
        );
    }
}
