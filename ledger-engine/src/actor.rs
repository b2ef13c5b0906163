//! Actor-based concurrency for the ledger
//!
//! This module implements the single-writer pattern using Tokio actors:
//! every mutation of the ledger (record, edit, delete, reset, settle,
//! roster changes) is a message processed to completion by one actor task
//! that owns the store. Because a settlement capture is one message, no
//! transaction can be recorded between its "read open transactions" and
//! "purge open transactions" steps: a concurrent record is either fully in
//! the snapshot or fully survives in the new open set.
//!
//! ```text
//! callers (screens, settlement coordinator)
//!        │ LedgerHandle (Clone)
//!        ▼
//! mpsc::channel (bounded)
//!        │
//!        ▼
//! LedgerActor (single task) ──► Storage (WriteBatch per operation)
//! ```
//!
//! Reads bypass the actor and go straight to storage; WriteBatch commits
//! keep what they observe consistent at operation boundaries.

use crate::types::{Agent, HistorySnapshot, Transaction, TransactionDraft};
use crate::{aggregates, Error, Result, Storage};
use chrono::Utc;
use std::collections::HashSet;
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot};
use uuid::Uuid;

/// Apply a balance impact, rejecting the operation on overflow
///
/// An overflowing amount must fail the one request that carried it and
/// leave the actor alive for everyone else; it must never wrap or panic
/// inside the writer task.
fn apply_impact(balance: i64, delta: i64) -> Result<i64> {
    balance
        .checked_add(delta)
        .ok_or_else(|| Error::Validation("Amount overflows agent balance".to_string()))
}

/// Reverse a previously applied balance impact, rejecting on overflow
fn reverse_impact(balance: i64, delta: i64) -> Result<i64> {
    balance
        .checked_sub(delta)
        .ok_or_else(|| Error::Validation("Amount overflows agent balance".to_string()))
}

/// Message sent to the ledger actor
pub enum LedgerMessage {
    /// Record a new transaction against an agent
    RecordTransaction {
        /// Caller-supplied fields
        draft: TransactionDraft,
        /// Officer of record
        officer_id: Uuid,
        /// Reply channel
        response: oneshot::Sender<Result<Transaction>>,
    },

    /// Edit an open transaction (reverse old impact, reapply new)
    EditTransaction {
        /// Transaction to edit
        tx_id: Uuid,
        /// Replacement fields
        draft: TransactionDraft,
        /// Reply channel
        response: oneshot::Sender<Result<Transaction>>,
    },

    /// Delete an open transaction (reverse impact, purge record)
    DeleteTransaction {
        /// Transaction to delete
        tx_id: Uuid,
        /// Reply channel
        response: oneshot::Sender<Result<()>>,
    },

    /// Unconditionally zero an agent's due balance
    ResetAgentBalance {
        /// Agent to reset
        agent_id: Uuid,
        /// Reply channel
        response: oneshot::Sender<Result<()>>,
    },

    /// Capture, archive and clear an officer's open ledger
    SettleOfficer {
        /// Officer whose ledger is settled
        officer_id: Uuid,
        /// Reply channel
        response: oneshot::Sender<Result<HistorySnapshot>>,
    },

    /// Delete an archived snapshot
    DeleteSnapshot {
        /// Snapshot to delete
        snapshot_id: Uuid,
        /// Reply channel
        response: oneshot::Sender<Result<()>>,
    },

    /// Add one agent to the roster
    RegisterAgent {
        /// Fully-built agent record
        agent: Agent,
        /// Reply channel
        response: oneshot::Sender<Result<()>>,
    },

    /// Bulk-add agents, skipping mobiles already in the roster
    ImportAgents {
        /// Fully-built agent records
        agents: Vec<Agent>,
        /// Reply channel, resolves to the number actually inserted
        response: oneshot::Sender<Result<usize>>,
    },

    /// Remove agents from the roster (explicit purge)
    PurgeAgents {
        /// Agents to remove
        agent_ids: Vec<Uuid>,
        /// Reply channel
        response: oneshot::Sender<Result<()>>,
    },

    /// Shutdown actor
    Shutdown,
}

/// Actor that processes ledger messages
pub struct LedgerActor {
    /// Storage backend
    storage: Arc<Storage>,

    /// Mailbox for incoming messages
    mailbox: mpsc::Receiver<LedgerMessage>,
}

impl LedgerActor {
    /// Create new actor
    pub fn new(storage: Arc<Storage>, mailbox: mpsc::Receiver<LedgerMessage>) -> Self {
        Self { storage, mailbox }
    }

    /// Run the actor event loop
    pub async fn run(mut self) {
        while let Some(msg) = self.mailbox.recv().await {
            match msg {
                LedgerMessage::Shutdown => break,
                _ => self.handle_message(msg),
            }
        }
    }

    /// Handle a single message
    fn handle_message(&mut self, msg: LedgerMessage) {
        match msg {
            LedgerMessage::RecordTransaction {
                draft,
                officer_id,
                response,
            } => {
                let _ = response.send(self.record(draft, officer_id));
            }

            LedgerMessage::EditTransaction {
                tx_id,
                draft,
                response,
            } => {
                let _ = response.send(self.edit(tx_id, draft));
            }

            LedgerMessage::DeleteTransaction { tx_id, response } => {
                let _ = response.send(self.delete(tx_id));
            }

            LedgerMessage::ResetAgentBalance { agent_id, response } => {
                let _ = response.send(self.reset_balance(agent_id));
            }

            LedgerMessage::SettleOfficer {
                officer_id,
                response,
            } => {
                let _ = response.send(self.settle(officer_id));
            }

            LedgerMessage::DeleteSnapshot {
                snapshot_id,
                response,
            } => {
                let _ = response.send(self.delete_snapshot(snapshot_id));
            }

            LedgerMessage::RegisterAgent { agent, response } => {
                let _ = response.send(self.storage.put_agent(&agent));
            }

            LedgerMessage::ImportAgents { agents, response } => {
                let _ = response.send(self.import_agents(agents));
            }

            LedgerMessage::PurgeAgents {
                agent_ids,
                response,
            } => {
                let _ = response.send(self.storage.delete_agents(&agent_ids));
            }

            LedgerMessage::Shutdown => {
                // Handled in main loop
            }
        }
    }

    fn record(&self, draft: TransactionDraft, officer_id: Uuid) -> Result<Transaction> {
        let mut agent = self
            .storage
            .get_agent(draft.agent_id)?
            .ok_or(Error::AgentNotFound(draft.agent_id))?;

        let transaction = Transaction {
            id: Uuid::now_v7(),
            agent_id: draft.agent_id,
            officer_id,
            kind: draft.kind,
            amount: draft.amount,
            note: draft.note,
            timestamp: Utc::now(),
        };

        agent.current_due = apply_impact(agent.current_due, transaction.due_impact())?;
        self.storage.commit_record(&transaction, &agent)?;

        tracing::info!(
            transaction_id = %transaction.id,
            agent_id = %agent.id,
            kind = %transaction.kind,
            amount = transaction.amount,
            current_due = agent.current_due,
            "Transaction recorded"
        );

        Ok(transaction)
    }

    /// Two-phase edit: reverse the old transaction's impact on the original
    /// agent, then reapply the new impact on the (possibly different) new
    /// agent. Balances are never updated by diffing amounts directly,
    /// because the type or the agent may change.
    fn edit(&self, tx_id: Uuid, draft: TransactionDraft) -> Result<Transaction> {
        let old = self
            .storage
            .get_transaction(tx_id)?
            .ok_or(Error::TransactionNotFound(tx_id))?;

        // Officer of record and creation timestamp are fixed at creation.
        let new = Transaction {
            id: old.id,
            agent_id: draft.agent_id,
            officer_id: old.officer_id,
            kind: draft.kind,
            amount: draft.amount,
            note: draft.note,
            timestamp: old.timestamp,
        };

        let mut touched: Vec<Agent> = Vec::with_capacity(2);

        if old.agent_id == new.agent_id {
            let mut agent = self
                .storage
                .get_agent(new.agent_id)?
                .ok_or(Error::AgentNotFound(new.agent_id))?;
            agent.current_due = reverse_impact(agent.current_due, old.due_impact())?;
            agent.current_due = apply_impact(agent.current_due, new.due_impact())?;
            touched.push(agent);
        } else {
            // Reapply target must exist; a purged original agent only means
            // there is no balance cell left to reverse.
            let mut new_agent = self
                .storage
                .get_agent(new.agent_id)?
                .ok_or(Error::AgentNotFound(new.agent_id))?;

            match self.storage.get_agent(old.agent_id)? {
                Some(mut old_agent) => {
                    old_agent.current_due =
                        reverse_impact(old_agent.current_due, old.due_impact())?;
                    touched.push(old_agent);
                }
                None => {
                    tracing::warn!(
                        transaction_id = %old.id,
                        agent_id = %old.agent_id,
                        "Reversal target purged, skipping balance reversal"
                    );
                }
            }

            new_agent.current_due = apply_impact(new_agent.current_due, new.due_impact())?;
            touched.push(new_agent);
        }

        self.storage.commit_edit(&new, &touched)?;

        tracing::info!(
            transaction_id = %new.id,
            old_impact = old.due_impact(),
            new_impact = new.due_impact(),
            "Transaction edited"
        );

        Ok(new)
    }

    fn delete(&self, tx_id: Uuid) -> Result<()> {
        let old = self
            .storage
            .get_transaction(tx_id)?
            .ok_or(Error::TransactionNotFound(tx_id))?;

        let reversed = match self.storage.get_agent(old.agent_id)? {
            Some(mut agent) => {
                agent.current_due = reverse_impact(agent.current_due, old.due_impact())?;
                Some(agent)
            }
            None => {
                tracing::warn!(
                    transaction_id = %old.id,
                    agent_id = %old.agent_id,
                    "Reversal target purged, skipping balance reversal"
                );
                None
            }
        };

        self.storage.commit_delete(tx_id, reversed.as_ref())?;

        tracing::info!(
            transaction_id = %tx_id,
            reversed = old.due_impact(),
            "Transaction deleted"
        );

        Ok(())
    }

    fn reset_balance(&self, agent_id: Uuid) -> Result<()> {
        let mut agent = self
            .storage
            .get_agent(agent_id)?
            .ok_or(Error::AgentNotFound(agent_id))?;

        let written_off = agent.current_due;
        agent.current_due = 0;
        self.storage.put_agent(&agent)?;

        tracing::info!(agent_id = %agent_id, written_off, "Agent balance reset");

        Ok(())
    }

    /// Settle an officer's open ledger into a snapshot
    ///
    /// Archives a deep copy of the officer's open transactions, purges them
    /// from the open set, and zeroes `current_due` for every agent assigned
    /// to the officer, including agents with no transaction this period.
    fn settle(&self, officer_id: Uuid) -> Result<HistorySnapshot> {
        let officer = self
            .storage
            .get_user(officer_id)?
            .filter(|u| u.role == crate::types::Role::Dso)
            .ok_or(Error::OfficerNotFound(officer_id))?;

        let transactions = self.storage.list_officer_transactions(officer_id)?;

        let mut assigned: Vec<Agent> = self.storage.list_agents()?;
        assigned.retain(|a| a.assigned_officer_mobile.as_ref() == Some(&officer.mobile));

        let snapshot = HistorySnapshot {
            id: Uuid::now_v7(),
            date: Utc::now(),
            officer_id,
            officer_name: officer.name.clone(),
            total_due: aggregates::total_due(&assigned),
            stats: aggregates::type_totals(&transactions),
            transactions: transactions.clone(),
        };

        let purged_ids: Vec<Uuid> = transactions.iter().map(|t| t.id).collect();
        let zeroed: Vec<Agent> = assigned
            .into_iter()
            .map(|mut a| {
                a.current_due = 0;
                a
            })
            .collect();

        self.storage
            .commit_settlement(&snapshot, &purged_ids, &zeroed)?;

        Ok(snapshot)
    }

    fn delete_snapshot(&self, snapshot_id: Uuid) -> Result<()> {
        if self.storage.get_snapshot(snapshot_id)?.is_none() {
            return Err(Error::SnapshotNotFound(snapshot_id));
        }
        self.storage.delete_snapshot(snapshot_id)?;

        tracing::info!(snapshot_id = %snapshot_id, "Snapshot deleted");

        Ok(())
    }

    fn import_agents(&self, agents: Vec<Agent>) -> Result<usize> {
        let existing: HashSet<_> = self
            .storage
            .list_agents()?
            .into_iter()
            .map(|a| a.mobile)
            .collect();

        let mut inserted = 0usize;
        for agent in agents {
            if existing.contains(&agent.mobile) {
                continue;
            }
            self.storage.put_agent(&agent)?;
            inserted += 1;
        }

        tracing::info!(inserted, "Agent import complete");

        Ok(inserted)
    }
}

/// Handle for sending messages to the actor
#[derive(Clone)]
pub struct LedgerHandle {
    sender: mpsc::Sender<LedgerMessage>,
}

impl LedgerHandle {
    /// Create new handle
    pub fn new(sender: mpsc::Sender<LedgerMessage>) -> Self {
        Self { sender }
    }

    async fn request<T>(
        &self,
        build: impl FnOnce(oneshot::Sender<Result<T>>) -> LedgerMessage,
    ) -> Result<T> {
        let (tx, rx) = oneshot::channel();
        self.sender
            .send(build(tx))
            .await
            .map_err(|_| Error::Concurrency("Actor mailbox closed".to_string()))?;

        rx.await
            .map_err(|_| Error::Concurrency("Response channel closed".to_string()))?
    }

    /// Record a transaction
    pub async fn record_transaction(
        &self,
        draft: TransactionDraft,
        officer_id: Uuid,
    ) -> Result<Transaction> {
        self.request(|response| LedgerMessage::RecordTransaction {
            draft,
            officer_id,
            response,
        })
        .await
    }

    /// Edit an open transaction
    pub async fn edit_transaction(
        &self,
        tx_id: Uuid,
        draft: TransactionDraft,
    ) -> Result<Transaction> {
        self.request(|response| LedgerMessage::EditTransaction {
            tx_id,
            draft,
            response,
        })
        .await
    }

    /// Delete an open transaction
    pub async fn delete_transaction(&self, tx_id: Uuid) -> Result<()> {
        self.request(|response| LedgerMessage::DeleteTransaction { tx_id, response })
            .await
    }

    /// Zero an agent's due balance
    pub async fn reset_agent_balance(&self, agent_id: Uuid) -> Result<()> {
        self.request(|response| LedgerMessage::ResetAgentBalance { agent_id, response })
            .await
    }

    /// Settle an officer's open ledger
    pub async fn settle_officer(&self, officer_id: Uuid) -> Result<HistorySnapshot> {
        self.request(|response| LedgerMessage::SettleOfficer {
            officer_id,
            response,
        })
        .await
    }

    /// Delete an archived snapshot
    pub async fn delete_snapshot(&self, snapshot_id: Uuid) -> Result<()> {
        self.request(|response| LedgerMessage::DeleteSnapshot {
            snapshot_id,
            response,
        })
        .await
    }

    /// Add an agent to the roster
    pub async fn register_agent(&self, agent: Agent) -> Result<()> {
        self.request(|response| LedgerMessage::RegisterAgent { agent, response })
            .await
    }

    /// Bulk-add agents, returns the number inserted
    pub async fn import_agents(&self, agents: Vec<Agent>) -> Result<usize> {
        self.request(|response| LedgerMessage::ImportAgents { agents, response })
            .await
    }

    /// Purge agents from the roster
    pub async fn purge_agents(&self, agent_ids: Vec<Uuid>) -> Result<()> {
        self.request(|response| LedgerMessage::PurgeAgents {
            agent_ids,
            response,
        })
        .await
    }

    /// Shutdown actor
    pub async fn shutdown(&self) -> Result<()> {
        self.sender
            .send(LedgerMessage::Shutdown)
            .await
            .map_err(|_| Error::Concurrency("Actor mailbox closed".to_string()))?;
        Ok(())
    }
}

/// Spawn the ledger actor
pub fn spawn_ledger_actor(storage: Arc<Storage>) -> LedgerHandle {
    let (tx, rx) = mpsc::channel(1000); // Bounded channel for backpressure
    let actor = LedgerActor::new(storage, rx);

    tokio::spawn(async move {
        actor.run().await;
    });

    LedgerHandle::new(tx)
}
