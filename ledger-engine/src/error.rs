//! Error types for the ledger engine

use thiserror::Error;
use uuid::Uuid;

/// Result type for ledger operations
pub type Result<T> = std::result::Result<T, Error>;

/// Ledger errors
#[derive(Error, Debug)]
pub enum Error {
    /// Input rejected before any state was touched
    #[error("Validation error: {0}")]
    Validation(String),

    /// Agent not found in the roster
    #[error("Agent not found: {0}")]
    AgentNotFound(Uuid),

    /// Transaction not found in the open set
    #[error("Transaction not found: {0}")]
    TransactionNotFound(Uuid),

    /// Snapshot not found in the archive
    #[error("Snapshot not found: {0}")]
    SnapshotNotFound(Uuid),

    /// Officer not found in the user directory
    #[error("Officer not found: {0}")]
    OfficerNotFound(Uuid),

    /// Actor role forbids the requested mutation
    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    /// Storage error (RocksDB)
    #[error("Storage error: {0}")]
    Storage(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] bincode::Error),

    /// Concurrency error (actor mailbox closed, etc.)
    #[error("Concurrency error: {0}")]
    Concurrency(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic error
    #[error("{0}")]
    Other(String),
}

impl From<rocksdb::Error> for Error {
    fn from(err: rocksdb::Error) -> Self {
        Error::Storage(err.to_string())
    }
}

impl From<String> for Error {
    fn from(msg: String) -> Self {
        Error::Other(msg)
    }
}

impl From<&str> for Error {
    fn from(msg: &str) -> Self {
        Error::Other(msg.to_string())
    }
}
