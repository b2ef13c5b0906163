//! Property-based tests for ledger invariants
//!
//! These tests use proptest to verify critical invariants:
//! - Balance derivation: current_due == Σ(open DUE_ADJUSTMENT amounts)
//! - Flow neutrality: CASH_*/B2B_* never move a balance
//! - Edit reversibility: A → B → A leaves no drift
//! - Settlement: archive is complete, open set empties, balances zero

use ledger_engine::{
    types::{MobileNumber, NewAgent, Role, TransactionDraft, TransactionType, User, UserStatus},
    ActorContext, Config, Ledger,
};
use proptest::prelude::*;
use uuid::Uuid;

const OFFICER_MOBILE: &str = "01700000001";

/// Strategy for generating transaction types
fn kind_strategy() -> impl Strategy<Value = TransactionType> {
    prop_oneof![
        Just(TransactionType::CashGiven),
        Just(TransactionType::CashReceived),
        Just(TransactionType::B2bSend),
        Just(TransactionType::B2bReceive),
        Just(TransactionType::DueAdjustment),
    ]
}

/// Strategy for a (kind, amount) pair respecting sign rules
///
/// Flow amounts are strictly positive; adjustments may be any non-zero
/// signed amount.
fn entry_strategy() -> impl Strategy<Value = (TransactionType, i64)> {
    kind_strategy().prop_flat_map(|kind| {
        let amount = if kind == TransactionType::DueAdjustment {
            prop_oneof![1i64..1_000_000, -1_000_000i64..-1].boxed()
        } else {
            (1i64..1_000_000).boxed()
        };
        amount.prop_map(move |a| (kind, a))
    })
}

/// Expected balance delta of one entry
fn due_impact(kind: TransactionType, amount: i64) -> i64 {
    if kind == TransactionType::DueAdjustment {
        amount
    } else {
        0
    }
}

fn test_officer() -> User {
    User {
        id: Uuid::now_v7(),
        name: "Rahim".to_string(),
        mobile: MobileNumber::new(OFFICER_MOBILE),
        password: "112233".to_string(),
        role: Role::Dso,
        status: UserStatus::Active,
    }
}

/// Create test ledger with temp directory, one officer and one agent
async fn create_test_ledger() -> (Ledger, ActorContext, Uuid, tempfile::TempDir) {
    let temp_dir = tempfile::tempdir().unwrap();
    let mut config = Config::default();
    config.data_dir = temp_dir.path().to_path_buf();

    let ledger = Ledger::open(config).await.unwrap();

    let officer = test_officer();
    ledger.upsert_officer(officer.clone()).unwrap();
    let ctx = ActorContext::dso(&officer);

    let agent = ledger
        .register_agent(
            &ctx,
            NewAgent {
                name: "Karim Store".to_string(),
                mobile: MobileNumber::new("01811111111"),
                area: "Mirpur".to_string(),
                assigned_officer_mobile: Some(MobileNumber::new(OFFICER_MOBILE)),
            },
        )
        .await
        .unwrap();

    (ledger, ctx, agent.id, temp_dir)
}

fn draft(agent_id: Uuid, kind: TransactionType, amount: i64) -> TransactionDraft {
    TransactionDraft {
        agent_id,
        kind,
        amount,
        note: String::new(),
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(50))]

    /// Property: current_due always equals the sum of open adjustment amounts
    #[test]
    fn prop_balance_derived_from_adjustments(
        entries in prop::collection::vec(entry_strategy(), 1..30),
    ) {
        let rt = tokio::runtime::Runtime::new().unwrap();
        rt.block_on(async {
            let (ledger, ctx, agent_id, _temp) = create_test_ledger().await;

            let mut expected = 0i64;
            for (kind, amount) in &entries {
                ledger
                    .record_transaction(&ctx, draft(agent_id, *kind, *amount))
                    .await
                    .unwrap();
                expected += due_impact(*kind, *amount);
            }

            prop_assert_eq!(ledger.agent(agent_id).unwrap().current_due, expected);

            ledger.shutdown().await.unwrap();
            Ok(())
        })?;
    }

    /// Property: flow transactions never move the balance
    #[test]
    fn prop_flow_types_are_balance_neutral(
        amounts in prop::collection::vec(1i64..1_000_000, 1..20),
    ) {
        let rt = tokio::runtime::Runtime::new().unwrap();
        rt.block_on(async {
            let (ledger, ctx, agent_id, _temp) = create_test_ledger().await;

            let flow_kinds = [
                TransactionType::CashGiven,
                TransactionType::CashReceived,
                TransactionType::B2bSend,
                TransactionType::B2bReceive,
            ];

            for (i, amount) in amounts.iter().enumerate() {
                let kind = flow_kinds[i % flow_kinds.len()];
                ledger
                    .record_transaction(&ctx, draft(agent_id, kind, *amount))
                    .await
                    .unwrap();
            }

            prop_assert_eq!(ledger.agent(agent_id).unwrap().current_due, 0);

            ledger.shutdown().await.unwrap();
            Ok(())
        })?;
    }

    /// Property: editing A → B → A restores the original balance exactly
    #[test]
    fn prop_edit_round_trip_leaves_no_drift(
        (kind_a, amount_a) in entry_strategy(),
        (kind_b, amount_b) in entry_strategy(),
    ) {
        let rt = tokio::runtime::Runtime::new().unwrap();
        rt.block_on(async {
            let (ledger, ctx, agent_id, _temp) = create_test_ledger().await;

            let tx = ledger
                .record_transaction(&ctx, draft(agent_id, kind_a, amount_a))
                .await
                .unwrap();
            let balance_after_record = ledger.agent(agent_id).unwrap().current_due;

            ledger
                .edit_transaction(&ctx, tx.id, draft(agent_id, kind_b, amount_b))
                .await
                .unwrap();
            ledger
                .edit_transaction(&ctx, tx.id, draft(agent_id, kind_a, amount_a))
                .await
                .unwrap();

            prop_assert_eq!(ledger.agent(agent_id).unwrap().current_due, balance_after_record);

            ledger.shutdown().await.unwrap();
            Ok(())
        })?;
    }

    /// Property: deleting every recorded transaction returns the balance to zero
    #[test]
    fn prop_delete_all_restores_zero(entries in prop::collection::vec(entry_strategy(), 1..20)) {
        let rt = tokio::runtime::Runtime::new().unwrap();
        rt.block_on(async {
            let (ledger, ctx, agent_id, _temp) = create_test_ledger().await;

            let mut tx_ids = Vec::new();
            for (kind, amount) in &entries {
                let tx = ledger
                    .record_transaction(&ctx, draft(agent_id, *kind, *amount))
                    .await
                    .unwrap();
                tx_ids.push(tx.id);
            }

            for tx_id in tx_ids {
                ledger.delete_transaction(&ctx, tx_id).await.unwrap();
            }

            prop_assert_eq!(ledger.agent(agent_id).unwrap().current_due, 0);
            prop_assert!(ledger.agent_transactions(agent_id).unwrap().is_empty());

            ledger.shutdown().await.unwrap();
            Ok(())
        })?;
    }

    /// Property: settlement archives everything, purges the open set, and
    /// zeroes the officer's agents
    #[test]
    fn prop_settlement_is_complete(entries in prop::collection::vec(entry_strategy(), 1..20)) {
        let rt = tokio::runtime::Runtime::new().unwrap();
        rt.block_on(async {
            let (ledger, ctx, agent_id, _temp) = create_test_ledger().await;
            let officer_id = ctx.officer.as_ref().unwrap().id;

            for (kind, amount) in &entries {
                ledger
                    .record_transaction(&ctx, draft(agent_id, *kind, *amount))
                    .await
                    .unwrap();
            }

            let snapshot = ledger.settle_officer(&ctx, officer_id).await.unwrap();

            prop_assert_eq!(snapshot.transactions.len(), entries.len());
            prop_assert!(ledger.open_transactions(&ctx).unwrap().is_empty());
            prop_assert_eq!(ledger.agent(agent_id).unwrap().current_due, 0);

            // The archived copy is findable by ID afterwards.
            let stored = ledger.snapshot(snapshot.id).unwrap();
            prop_assert_eq!(stored.transactions.len(), entries.len());

            ledger.shutdown().await.unwrap();
            Ok(())
        })?;
    }
}

#[cfg(test)]
mod integration_tests {
    use super::*;

    /// Full period lifecycle: adjust, trade, correct, settle.
    #[tokio::test]
    async fn test_full_settlement_lifecycle() {
        let (ledger, ctx, agent_id, _temp) = create_test_ledger().await;
        let officer_id = ctx.officer.as_ref().unwrap().id;

        // Opening due of 500.
        ledger
            .record_transaction(&ctx, draft(agent_id, TransactionType::DueAdjustment, 500))
            .await
            .unwrap();

        // Cash handed over; balance must not move.
        ledger
            .record_transaction(&ctx, draft(agent_id, TransactionType::CashGiven, 200))
            .await
            .unwrap();
        assert_eq!(ledger.agent(agent_id).unwrap().current_due, 500);

        // Correction: the adjustment should have been 300.
        let open = ledger.open_transactions(&ctx).unwrap();
        let adjustment = open
            .iter()
            .find(|t| t.kind == TransactionType::DueAdjustment)
            .unwrap();
        ledger
            .edit_transaction(
                &ctx,
                adjustment.id,
                draft(agent_id, TransactionType::DueAdjustment, 300),
            )
            .await
            .unwrap();
        assert_eq!(ledger.agent(agent_id).unwrap().current_due, 300);

        // Settle the period.
        let snapshot = ledger.settle_officer(&ctx, officer_id).await.unwrap();
        assert_eq!(snapshot.officer_id, officer_id);
        assert_eq!(snapshot.total_due, 300);
        assert_eq!(snapshot.stats.cash_given, 200);
        assert_eq!(snapshot.transactions.len(), 2);

        // The live ledger starts the next period clean.
        assert!(ledger.open_transactions(&ctx).unwrap().is_empty());
        assert_eq!(ledger.agent(agent_id).unwrap().current_due, 0);

        ledger.shutdown().await.unwrap();
    }

    /// Settling an officer with no open activity is still a valid capture.
    #[tokio::test]
    async fn test_empty_period_settlement() {
        let (ledger, ctx, agent_id, _temp) = create_test_ledger().await;
        let officer_id = ctx.officer.as_ref().unwrap().id;

        let snapshot = ledger.settle_officer(&ctx, officer_id).await.unwrap();
        assert!(snapshot.transactions.is_empty());
        assert_eq!(snapshot.total_due, 0);
        assert_eq!(ledger.agent(agent_id).unwrap().current_due, 0);

        ledger.shutdown().await.unwrap();
    }

    /// Settlement only touches the settled officer's agents and records.
    #[tokio::test]
    async fn test_settlement_scoped_to_officer() {
        let (ledger, ctx, agent_id, _temp) = create_test_ledger().await;
        let officer_id = ctx.officer.as_ref().unwrap().id;

        let other = User {
            id: Uuid::now_v7(),
            name: "Salma".to_string(),
            mobile: MobileNumber::new("01700000002"),
            password: "445566".to_string(),
            role: Role::Dso,
            status: UserStatus::Active,
        };
        ledger.upsert_officer(other.clone()).unwrap();
        let other_ctx = ActorContext::dso(&other);

        let other_agent = ledger
            .register_agent(
                &other_ctx,
                NewAgent {
                    name: "Salam Traders".to_string(),
                    mobile: MobileNumber::new("01822222222"),
                    area: "Banani".to_string(),
                    assigned_officer_mobile: Some(MobileNumber::new("01700000002")),
                },
            )
            .await
            .unwrap();

        ledger
            .record_transaction(&ctx, draft(agent_id, TransactionType::DueAdjustment, 500))
            .await
            .unwrap();
        ledger
            .record_transaction(
                &other_ctx,
                draft(other_agent.id, TransactionType::DueAdjustment, 700),
            )
            .await
            .unwrap();

        ledger.settle_officer(&ctx, officer_id).await.unwrap();

        // The other officer's world is untouched.
        assert_eq!(ledger.agent(other_agent.id).unwrap().current_due, 700);
        assert_eq!(ledger.open_transactions(&other_ctx).unwrap().len(), 1);

        ledger.shutdown().await.unwrap();
    }
}
