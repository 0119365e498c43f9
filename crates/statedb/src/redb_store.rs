//! Durable document store backed by [redb](https://docs.rs/redb).
//!
//! Each collection is one redb table named `{database}/{collection}` with
//! `&str` keys and JSON-serialized [`Document`]s as `&[u8]` values. The store
//! supports both on-disk and in-memory backends (the latter for testing).

use std::path::Path;
use std::sync::Arc;

use redb::{
    Database, ReadableDatabase, ReadableTable, ReadableTableMetadata, Table, TableDefinition,
};
use tracing::debug;

use crate::collection::{ConditionalWrites, Document, DocumentCollection, DocumentStore};
use crate::error::{BackendError, StateResult};
use crate::value::StateValue;

/// Convert any `Display` error into a `BackendError` variant via a closure factory.
macro_rules! map_err {
    ($variant:ident) => {
        |e| BackendError::$variant(e.to_string())
    };
}

type DocumentTable<'a> = TableDefinition<'a, &'static str, &'static [u8]>;

/// Thread-safe redb database handle. Clones share the same database.
#[derive(Clone)]
pub struct RedbStore {
    db: Arc<Database>,
}

impl RedbStore {
    /// Open (or create) a persistent store at the given path.
    pub fn open(path: &Path) -> StateResult<Self> {
        let db = Database::create(path).map_err(map_err!(Open))?;
        debug!(?path, "redb store opened");
        Ok(Self { db: Arc::new(db) })
    }

    /// Create an ephemeral in-memory store (for testing).
    pub fn open_in_memory() -> StateResult<Self> {
        let backend = redb::backends::InMemoryBackend::new();
        let db = Database::builder()
            .create_with_backend(backend)
            .map_err(map_err!(Open))?;
        debug!("in-memory redb store opened");
        Ok(Self { db: Arc::new(db) })
    }
}

impl DocumentStore for RedbStore {
    type Collection = RedbCollection;

    fn collection(&self, database: &str, collection: &str) -> StateResult<RedbCollection> {
        let coll = RedbCollection {
            db: self.db.clone(),
            table: format!("{database}/{collection}"),
        };
        // Opening a table in a write transaction creates it if absent.
        let txn = self.db.begin_write().map_err(map_err!(Transaction))?;
        txn.open_table(coll.definition()).map_err(map_err!(Table))?;
        txn.commit().map_err(map_err!(Transaction))?;
        debug!(table = %coll.table, "redb collection ready");
        Ok(coll)
    }
}

/// One redb table holding the documents of a collection.
#[derive(Clone)]
pub struct RedbCollection {
    db: Arc<Database>,
    table: String,
}

impl RedbCollection {
    /// Name of the backing table.
    pub fn table_name(&self) -> &str {
        &self.table
    }

    fn definition(&self) -> DocumentTable<'_> {
        TableDefinition::new(&self.table)
    }

    /// Run `f` against the table inside one write transaction, committing
    /// only if it succeeds.
    fn write<T>(
        &self,
        f: impl FnOnce(&mut Table<'_, &'static str, &'static [u8]>) -> StateResult<T>,
    ) -> StateResult<T> {
        let txn = self.db.begin_write().map_err(map_err!(Transaction))?;
        let out = {
            let mut table = txn.open_table(self.definition()).map_err(map_err!(Table))?;
            f(&mut table)?
        };
        txn.commit().map_err(map_err!(Transaction))?;
        Ok(out)
    }
}

fn encode(document: &Document) -> StateResult<Vec<u8>> {
    Ok(serde_json::to_vec(document).map_err(map_err!(Serialize))?)
}

fn decode(bytes: &[u8]) -> StateResult<Document> {
    Ok(serde_json::from_slice(bytes).map_err(map_err!(Deserialize))?)
}

fn lookup(
    table: &impl ReadableTable<&'static str, &'static [u8]>,
    key: &str,
) -> StateResult<Option<Document>> {
    match table.get(key).map_err(map_err!(Read))? {
        Some(guard) => Ok(Some(decode(guard.value())?)),
        None => Ok(None),
    }
}

fn put(
    table: &mut Table<'_, &'static str, &'static [u8]>,
    document: &Document,
) -> StateResult<()> {
    let bytes = encode(document)?;
    table
        .insert(document.key.as_str(), bytes.as_slice())
        .map_err(map_err!(Write))?;
    Ok(())
}

impl DocumentCollection for RedbCollection {
    fn find_one(&self, key: &str) -> StateResult<Option<Document>> {
        let txn = self.db.begin_read().map_err(map_err!(Transaction))?;
        let table = txn.open_table(self.definition()).map_err(map_err!(Table))?;
        lookup(&table, key)
    }

    fn find_all(&self) -> StateResult<Vec<Document>> {
        let txn = self.db.begin_read().map_err(map_err!(Transaction))?;
        let table = txn.open_table(self.definition()).map_err(map_err!(Table))?;
        let mut results = Vec::new();
        for entry in table.iter().map_err(map_err!(Read))? {
            let (_, value) = entry.map_err(map_err!(Read))?;
            results.push(decode(value.value())?);
        }
        Ok(results)
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
        let txn = self.db.begin_write().map_err(map_err!(Transaction))?;
        txn.delete_table(self.definition()).map_err(map_err!(Table))?;
        txn.open_table(self.definition()).map_err(map_err!(Table))?;
        txn.commit().map_err(map_err!(Transaction))?;
        debug!(table = %self.table, "table dropped and recreated");
        Ok(())
    }

    fn count(&self) -> StateResult<u64> {
        let txn = self.db.begin_read().map_err(map_err!(Transaction))?;
        let table = txn.open_table(self.definition()).map_err(map_err!(Table))?;
        Ok(table.len().map_err(map_err!(Read))?)
    }

    fn conditional_writes(&self) -> Option<&dyn ConditionalWrites> {
        Some(self)
    }
}

impl ConditionalWrites for RedbCollection {
    fn insert_if_absent(&self, document: Document) -> StateResult<bool> {
        self.write(|table| {
            if lookup(&*table, &document.key)?.is_some() {
                return Ok(false);
            }
            put(table, &document)?;
            Ok(true)
        })
    }

    fn update_if_present(&self, key: &str, value: StateValue) -> StateResult<bool> {
        self.write(|table| match lookup(&*table, key)? {
            Some(mut document) => {
                document.value = value;
                put(table, &document)?;
                Ok(true)
            }
            None => Ok(false),
        })
    }

    fn delete_if_present(&self, key: &str) -> StateResult<bool> {
        self.write(|table| Ok(table.remove(key).map_err(map_err!(Write))?.is_some()))
    }
}
