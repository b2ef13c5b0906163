//! Archive summary reports
//!
//! Pure reductions over archived snapshots. These are the inputs a
//! rendering layer (print/export screens) consumes; formatting itself
//! lives outside this crate.

use crate::Result;
use ledger_engine::{HistorySnapshot, TypeTotals};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Combined figures over a set of archived snapshots
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArchiveSummary {
    /// Number of snapshots summarized
    pub snapshot_count: usize,

    /// Number of archived transactions across all snapshots
    pub transaction_count: usize,

    /// Per-type flow sums combined across all snapshots
    pub stats: TypeTotals,

    /// Sum of captured total_due figures
    pub total_due: i64,
}

impl ArchiveSummary {
    /// Summarize a set of snapshots
    pub fn from_snapshots(snapshots: &[HistorySnapshot]) -> Self {
        let mut stats = TypeTotals::default();
        let mut transaction_count = 0;
        let mut total_due = 0i64;

        for snapshot in snapshots {
            stats.cash_given += snapshot.stats.cash_given;
            stats.cash_received += snapshot.stats.cash_received;
            stats.b2b_send += snapshot.stats.b2b_send;
            stats.b2b_receive += snapshot.stats.b2b_receive;
            transaction_count += snapshot.transactions.len();
            total_due += snapshot.total_due;
        }

        Self {
            snapshot_count: snapshots.len(),
            transaction_count,
            stats,
            total_due,
        }
    }

    /// Serialize the summary for an export consumer
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Snapshots belonging to one officer, newest first
pub fn officer_archive(snapshots: &[HistorySnapshot], officer_id: Uuid) -> Vec<HistorySnapshot> {
    let mut archive: Vec<_> = snapshots
        .iter()
        .filter(|s| s.officer_id == officer_id)
        .cloned()
        .collect();
    archive.sort_by(|a, b| b.date.cmp(&a.date));
    archive
}
