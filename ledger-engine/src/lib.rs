//! DueDesk Ledger Engine
//!
//! Running-balance ledger for a mobile-money distribution network:
//! agents carry a due balance, field officers record daily activity
//! against them, and settlement closes out a period atomically.
//!
//! # Architecture
//!
//! - **Single Writer**: One actor serializes every mutation
//! - **Atomic Commits**: Balance and record move in one write batch
//! - **Derived Aggregates**: Totals recomputed from records, never cached
//! - **Scoped Reads**: Role/officer visibility applied at the query layer
//!
//! # Invariants
//!
//! - An agent's `current_due` equals the sum of its open DUE_ADJUSTMENT
//!   amounts (plus manual resets)
//! - CASH_* and B2B_* transactions never move a balance
//! - Settlement archives, purges, and zeroes in a single atomic step

#![forbid(unsafe_code)]
#![warn(missing_docs, rust_2018_idioms, unused_qualifications)]

pub mod actor;
pub mod aggregates;
pub mod config;
pub mod error;
pub mod ledger;
pub mod scoping;
pub mod storage;
pub mod types;

// Re-exports
pub use config::Config;
pub use error::{Error, Result};
pub use ledger::Ledger;
pub use scoping::{ActorContext, OfficerRef};
pub use storage::Storage;
pub use types::{
    Agent, AgentStatus, HistorySnapshot, MobileNumber, NewAgent, Role, Transaction,
    TransactionDraft, TransactionType, TypeTotals, User, UserStatus,
};
