//! Settlement error types

use thiserror::Error;

/// Settlement errors
#[derive(Error, Debug)]
pub enum Error {
    /// Ledger error
    #[error("Ledger error: {0}")]
    Ledger(#[from] ledger_engine::Error),

    /// Report export error
    #[error("Export error: {0}")]
    Export(#[from] serde_json::Error),

    /// I/O error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Settlement result type
pub type Result<T> = std::result::Result<T, Error>;
