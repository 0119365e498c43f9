//! statedb.toml configuration parser.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::collection::{DocumentCollection, DocumentStore};
use crate::error::StateResult;
use crate::memory::MemoryStore;
use crate::redb_store::RedbStore;
use crate::store::{DEFAULT_COLLECTION, DEFAULT_DATABASE, StateStore, StoreOptions};

/// A state store whose backend was chosen at runtime.
pub type DynStateStore = StateStore<Box<dyn DocumentCollection>>;

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct StateDbConfig {
    pub store: StoreConfig,
    pub options: StoreOptions,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct StoreConfig {
    /// redb file to use. Without one the state lives in memory.
    pub path: Option<PathBuf>,
    pub database: String,
    pub collection: String,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            path: None,
            database: DEFAULT_DATABASE.to_string(),
            collection: DEFAULT_COLLECTION.to_string(),
        }
    }
}

impl StateDbConfig {
    pub fn from_file(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: StateDbConfig = toml::from_str(&content)?;
        Ok(config)
    }

    pub fn to_toml_string(&self) -> anyhow::Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Connect to the configured backend and open the configured collection.
    pub fn open(&self) -> StateResult<DynStateStore> {
        let StoreConfig {
            path,
            database,
            collection,
        } = &self.store;

        let handle: Box<dyn DocumentCollection> = match path {
            Some(path) => Box::new(RedbStore::open(path)?.collection(database, collection)?),
            None => Box::new(MemoryStore::new().collection(database, collection)?),
        };
        info!(?path, %database, %collection, "state store ready");

        Ok(StateStore::from_collection(handle).with_options(self.options.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::CountMode;

    #[test]
    fn test_parse_empty_uses_defaults() {
        let config: StateDbConfig = toml::from_str("").unwrap();
        assert_eq!(config, StateDbConfig::default());
        assert_eq!(config.store.database, "statedb");
        assert_eq!(config.store.collection, "state");
        assert_eq!(config.options.count, CountMode::Estimated);
        assert!(config.options.atomic_writes);
    }

    #[test]
    fn test_parse_full() {
        let toml_str = r#"
[store]
path = "/var/lib/statedb/state.redb"
database = "robot"
collection = "checkins"

[options]
count = "exact"
atomic_writes = false
"#;
        let config: StateDbConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(
            config.store.path.as_deref(),
            Some(Path::new("/var/lib/statedb/state.redb"))
        );
        assert_eq!(config.store.database, "robot");
        assert_eq!(config.store.collection, "checkins");
        assert_eq!(config.options.count, CountMode::Exact);
        assert!(!config.options.atomic_writes);
    }

    #[test]
    fn test_toml_round_trip() {
        let mut config = StateDbConfig::default();
        config.store.collection = "sessions".to_string();
        let toml_str = config.to_toml_string().unwrap();
        assert!(toml_str.contains("sessions"));
        assert_eq!(toml::from_str::<StateDbConfig>(&toml_str).unwrap(), config);
    }

    #[test]
    fn test_from_file_and_open_on_disk() {
        let dir = tempfile::tempdir().unwrap();
        let db_path = dir.path().join("state.redb");
        let config_path = dir.path().join("statedb.toml");
        std::fs::write(
            &config_path,
            format!("[store]\npath = {:?}\n", db_path.to_str().unwrap()),
        )
        .unwrap();

        let config = StateDbConfig::from_file(&config_path).unwrap();
        config.open().unwrap().create("name", "Audrow Nash").unwrap();

        // A second open sees the persisted record.
        let reopened = config.open().unwrap();
        assert_eq!(reopened.get("name").unwrap().as_str(), Some("Audrow Nash"));
    }

    #[test]
    fn test_open_in_memory() {
        let store = StateDbConfig::default().open().unwrap();
        store.create("k", 1).unwrap();
        assert_eq!(store.count().unwrap(), 1);
    }
}
