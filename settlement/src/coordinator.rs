//! Settlement coordination over the ledger engine
//!
//! Orchestrates period-close for one officer: capture an archived snapshot
//! of their open ledger, then manage the archive afterwards. The capture
//! itself is a single atomic ledger operation; the coordinator adds the
//! orchestration, logging, and archive query surface around it.

use crate::Result;
use ledger_engine::{ActorContext, HistorySnapshot, Ledger};
use std::sync::Arc;
use uuid::Uuid;

/// Settlement coordinator
pub struct SettlementCoordinator {
    /// Ledger engine
    ledger: Arc<Ledger>,
}

impl SettlementCoordinator {
    /// Create new settlement coordinator over an open ledger
    pub fn new(ledger: Arc<Ledger>) -> Self {
        Self { ledger }
    }

    /// Close out an officer's current period into an archived snapshot
    ///
    /// Atomically archives a deep copy of the officer's open transactions,
    /// purges them from the open set, and zeroes `current_due` for every
    /// agent assigned to the officer, including agents with no activity
    /// this period. An empty period is still a valid capture.
    pub async fn capture_snapshot(
        &self,
        ctx: &ActorContext,
        officer_id: Uuid,
    ) -> Result<HistorySnapshot> {
        tracing::info!(%officer_id, "Starting settlement capture");

        let snapshot = self.ledger.settle_officer(ctx, officer_id).await?;

        tracing::info!(
            snapshot_id = %snapshot.id,
            officer = %snapshot.officer_name,
            transactions = snapshot.transactions.len(),
            total_due = snapshot.total_due,
            "Settlement capture complete"
        );

        Ok(snapshot)
    }

    /// Delete an archived snapshot permanently
    ///
    /// Irreversible, and has no effect on live agents or transactions.
    pub async fn delete_snapshot(&self, ctx: &ActorContext, snapshot_id: Uuid) -> Result<()> {
        self.ledger.delete_snapshot(ctx, snapshot_id).await?;
        tracing::info!(%snapshot_id, "Deleted archived snapshot");
        Ok(())
    }

    /// Archived snapshots visible to the actor
    pub fn snapshots(&self, ctx: &ActorContext) -> Result<Vec<HistorySnapshot>> {
        Ok(self.ledger.snapshots(ctx)?)
    }

    /// Get archived snapshot by ID
    pub fn snapshot(&self, snapshot_id: Uuid) -> Result<HistorySnapshot> {
        Ok(self.ledger.snapshot(snapshot_id)?)
    }
}
