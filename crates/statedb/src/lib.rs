//! statedb — existence-checked key/value state kept in a document store.
//!
//! A [`StateStore`] treats one collection of a document database as a strict
//! map: `create` only adds, `set`/`delete`/`clear` only touch keys that exist,
//! and a cleared key (holding [`StateValue::Null`]) is distinct from a key
//! that does not exist at all.
//!
//! # Architecture
//!
//! The store keeps no data of its own. It talks to the backing database
//! through the narrow [`DocumentCollection`] interface, obtained from an
//! explicitly constructed [`DocumentStore`] handle plus a database and a
//! collection name. Two adapters ship with the crate:
//!
//! - [`RedbStore`]: durable, one redb table per collection.
//! - [`MemoryStore`]: process-local, for tests and throwaway state.
//!
//! Both also implement [`ConditionalWrites`], which lets `create`, `set` and
//! `delete` decide and write in a single atomic step instead of probing first.
//!
//! ```no_run
//! use statedb::{MemoryStore, StateStore};
//!
//! let state = StateStore::with_defaults(&MemoryStore::new())?;
//! state.create("age", 28)?;
//! state.set("age", 29)?;
//! assert_eq!(state.get("age")?.as_i64(), Some(29));
//! # Ok::<(), statedb::StateError>(())
//! ```

pub mod collection;
pub mod config;
pub mod error;
pub mod memory;
pub mod redb_store;
pub mod store;
pub mod value;

pub use collection::{ConditionalWrites, Document, DocumentCollection, DocumentStore};
pub use config::{DynStateStore, StateDbConfig, StoreConfig};
pub use error::{BackendError, StateError, StateResult};
pub use memory::{MemoryCollection, MemoryStore};
pub use redb_store::{RedbCollection, RedbStore};
pub use store::{CountMode, DEFAULT_COLLECTION, DEFAULT_DATABASE, StateStore, StoreOptions};
pub use value::StateValue;
