//! Derived aggregates over the live collections
//!
//! Pure computations for dashboard and reporting screens. Everything here
//! is recomputed from the Transaction/Agent collections on demand; there is
//! no cached aggregate that can drift from the underlying records.

use crate::types::{Agent, Transaction, TransactionType, TypeTotals};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

/// Per-type amount sums over a transaction set
///
/// `DueAdjustment` amounts are excluded: adjustments move balances, the
/// four flow types are what the period summary reports.
pub fn type_totals(transactions: &[Transaction]) -> TypeTotals {
    let mut totals = TypeTotals::default();
    for tx in transactions {
        match tx.kind {
            TransactionType::CashGiven => totals.cash_given += tx.amount,
            TransactionType::CashReceived => totals.cash_received += tx.amount,
            TransactionType::B2bSend => totals.b2b_send += tx.amount,
            TransactionType::B2bReceive => totals.b2b_receive += tx.amount,
            TransactionType::DueAdjustment => {}
        }
    }
    totals
}

/// Sum of `current_due` over a set of agents
pub fn total_due<'a>(agents: impl IntoIterator<Item = &'a Agent>) -> i64 {
    agents.into_iter().map(|a| a.current_due).sum()
}

/// Per-officer volume and count over a transaction set
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OfficerPerformance {
    /// Officer of record
    pub officer_id: Uuid,

    /// Sum of absolute amounts handled
    pub volume: i64,

    /// Number of transactions recorded
    pub count: usize,
}

/// Group a transaction set by officer of record
///
/// Results are sorted by descending volume for leaderboard-style views.
pub fn officer_performance(transactions: &[Transaction]) -> Vec<OfficerPerformance> {
    let mut by_officer: HashMap<Uuid, OfficerPerformance> = HashMap::new();

    for tx in transactions {
        let entry = by_officer
            .entry(tx.officer_id)
            .or_insert_with(|| OfficerPerformance {
                officer_id: tx.officer_id,
                volume: 0,
                count: 0,
            });
        entry.volume += tx.amount.abs();
        entry.count += 1;
    }

    let mut performance: Vec<_> = by_officer.into_values().collect();
    performance.sort_by(|a, b| b.volume.cmp(&a.volume));
    performance
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn tx(officer_id: Uuid, kind: TransactionType, amount: i64) -> Transaction {
        Transaction {
            id: Uuid::now_v7(),
            agent_id: Uuid::now_v7(),
            officer_id,
            kind,
            amount,
            note: String::new(),
            timestamp: Utc::now(),
        }
    }

    #[test]
    fn test_type_totals_excludes_adjustments() {
        let officer = Uuid::now_v7();
        let transactions = vec![
            tx(officer, TransactionType::CashGiven, 100),
            tx(officer, TransactionType::CashGiven, 200),
            tx(officer, TransactionType::CashReceived, 50),
            tx(officer, TransactionType::B2bSend, 70),
            tx(officer, TransactionType::B2bReceive, 30),
            tx(officer, TransactionType::DueAdjustment, 999),
        ];

        let totals = type_totals(&transactions);
        assert_eq!(totals.cash_given, 300);
        assert_eq!(totals.cash_received, 50);
        assert_eq!(totals.b2b_send, 70);
        assert_eq!(totals.b2b_receive, 30);
    }

    #[test]
    fn test_type_totals_empty() {
        assert_eq!(type_totals(&[]), TypeTotals::default());
    }

    #[test]
    fn test_officer_performance_sorted_by_volume() {
        let busy = Uuid::now_v7();
        let quiet = Uuid::now_v7();
        let transactions = vec![
            tx(busy, TransactionType::CashGiven, 500),
            tx(busy, TransactionType::DueAdjustment, -300),
            tx(quiet, TransactionType::CashReceived, 100),
        ];

        let performance = officer_performance(&transactions);
        assert_eq!(performance.len(), 2);
        assert_eq!(performance[0].officer_id, busy);
        assert_eq!(performance[0].volume, 800);
        assert_eq!(performance[0].count, 2);
        assert_eq!(performance[1].count, 1);
    }
}
