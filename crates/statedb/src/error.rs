//! Error types for the state store.

use thiserror::Error;

/// Result type alias for state store operations.
pub type StateResult<T> = Result<T, StateError>;

/// Errors returned by [`StateStore`](crate::StateStore) operations.
///
/// `KeyNotFound` and `KeyConflict` are ordinary outcomes callers are expected
/// to branch on. `Backend` carries whatever the backing collection reported,
/// untouched.
#[derive(Debug, Error)]
pub enum StateError {
    #[error("key \"{0}\" does not exist")]
    KeyNotFound(String),

    #[error("key \"{0}\" already exists")]
    KeyConflict(String),

    #[error("backing store failure: {0}")]
    Backend(#[from] BackendError),
}

impl StateError {
    /// True for [`StateError::KeyNotFound`].
    pub fn is_not_found(&self) -> bool {
        matches!(self, StateError::KeyNotFound(_))
    }

    /// True for [`StateError::KeyConflict`].
    pub fn is_conflict(&self) -> bool {
        matches!(self, StateError::KeyConflict(_))
    }
}

/// Failures raised by a backing document collection.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BackendError {
    #[error("failed to open database: {0}")]
    Open(String),

    #[error("transaction error: {0}")]
    Transaction(String),

    #[error("table error: {0}")]
    Table(String),

    #[error("read error: {0}")]
    Read(String),

    #[error("write error: {0}")]
    Write(String),

    #[error("serialization error: {0}")]
    Serialize(String),

    #[error("deserialization error: {0}")]
    Deserialize(String),

    #[error("lock poisoned: {0}")]
    Poisoned(String),
}
