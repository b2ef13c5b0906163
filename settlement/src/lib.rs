//! DueDesk Settlement
//!
//! Period-close coordination for the DueDesk ledger engine.
//!
//! # Architecture
//!
//! Settlement closes out one officer's period:
//!
//! 1. **Capture**: Archive the officer's open transactions into a snapshot
//! 2. **Purge**: Remove the captured transactions from the open set
//! 3. **Reset**: Zero `current_due` for every agent assigned to the officer
//!
//! All three happen in a single atomic ledger operation; the coordinator
//! wraps it with orchestration, logging, and archive queries. The `report`
//! module provides pure summaries over the archive for export consumers.
//!
//! # Example
//!
//! ```no_run
//! use settlement::SettlementCoordinator;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let ledger = Arc::new(ledger_engine::Ledger::open(Default::default()).await?);
//!     let coordinator = SettlementCoordinator::new(ledger);
//!
//!     // let snapshot = coordinator.capture_snapshot(&ctx, officer_id).await?;
//!
//!     Ok(())
//! }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs, rust_2018_idioms, unused_qualifications)]

pub mod coordinator;
pub mod error;
pub mod report;

// Re-exports
pub use coordinator::SettlementCoordinator;
pub use error::{Error, Result};
pub use report::{officer_archive, ArchiveSummary};
