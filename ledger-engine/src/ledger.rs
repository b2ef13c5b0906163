//! Main ledger orchestration layer
//!
//! This module ties together storage, scoping, and actor components into
//! the high-level API the entry screens and the settlement coordinator call.
//!
//! # Example
//!
//! ```no_run
//! use ledger_engine::{Config, Ledger};
//!
//! #[tokio::main]
//! async fn main() -> ledger_engine::Result<()> {
//!     let config = Config::default();
//!     let ledger = Ledger::open(config).await?;
//!
//!     // let tx = ledger.record_transaction(&ctx, draft).await?;
//!
//!     Ok(())
//! }
//! ```

use crate::{
    actor::{spawn_ledger_actor, LedgerHandle},
    scoping::{self, ActorContext},
    types::{
        Agent, AgentStatus, HistorySnapshot, NewAgent, Transaction, TransactionDraft,
        TransactionType, User,
    },
    Config, Error, Result, Storage,
};
use chrono::Utc;
use std::sync::Arc;
use uuid::Uuid;

/// Main ledger interface
pub struct Ledger {
    /// Actor handle for mutations
    handle: LedgerHandle,

    /// Direct storage access (for reads)
    storage: Arc<Storage>,

    /// Configuration
    config: Config,
}

impl Ledger {
    /// Open ledger with configuration
    pub async fn open(config: Config) -> Result<Self> {
        // Open storage
        let storage = Arc::new(Storage::open(&config)?);

        // Spawn actor
        let handle = spawn_ledger_actor(storage.clone());

        Ok(Self {
            handle,
            storage,
            config,
        })
    }

    /// Service name from configuration
    pub fn service_name(&self) -> &str {
        &self.config.service_name
    }

    // Mutations

    /// Record a new transaction
    ///
    /// The operating officer becomes the officer of record. If the draft is
    /// a `DueAdjustment`, its (signed) amount is added to the agent's
    /// `current_due`; every other type leaves the balance untouched.
    pub async fn record_transaction(
        &self,
        ctx: &ActorContext,
        draft: TransactionDraft,
    ) -> Result<Transaction> {
        let officer_id = self.mutation_officer(ctx)?;
        Self::validate_draft(&draft)?;

        self.handle.record_transaction(draft, officer_id).await
    }

    /// Edit an open transaction
    ///
    /// Reverses the old transaction's balance impact on the original agent,
    /// then reapplies the new impact on the new agent. Officer of record
    /// and creation timestamp are preserved.
    pub async fn edit_transaction(
        &self,
        ctx: &ActorContext,
        tx_id: Uuid,
        draft: TransactionDraft,
    ) -> Result<Transaction> {
        self.mutation_officer(ctx)?;
        Self::validate_draft(&draft)?;

        self.handle.edit_transaction(tx_id, draft).await
    }

    /// Delete an open transaction, reversing its balance impact
    ///
    /// Deleting the same id twice fails with `TransactionNotFound` on the
    /// second call rather than silently succeeding.
    pub async fn delete_transaction(&self, ctx: &ActorContext, tx_id: Uuid) -> Result<()> {
        self.require_mutation(ctx)?;
        self.handle.delete_transaction(tx_id).await
    }

    /// Unconditionally zero an agent's due balance (manual write-off)
    ///
    /// Transaction history is untouched; the confirmation step lives with
    /// the caller.
    pub async fn reset_agent_balance(&self, ctx: &ActorContext, agent_id: Uuid) -> Result<()> {
        self.require_mutation(ctx)?;
        self.handle.reset_agent_balance(agent_id).await
    }

    /// Settle an officer's open ledger into an archived snapshot
    ///
    /// Atomic relative to every other mutation: archives a copy of the
    /// officer's open transactions, purges them, and zeroes the balance of
    /// every agent assigned to that officer.
    pub async fn settle_officer(
        &self,
        ctx: &ActorContext,
        officer_id: Uuid,
    ) -> Result<HistorySnapshot> {
        self.require_mutation(ctx)?;
        self.handle.settle_officer(officer_id).await
    }

    /// Delete an archived snapshot permanently
    ///
    /// Does not affect live agents or transactions; they were purged and
    /// reset at capture time. Irreversible.
    pub async fn delete_snapshot(&self, ctx: &ActorContext, snapshot_id: Uuid) -> Result<()> {
        self.require_mutation(ctx)?;
        self.handle.delete_snapshot(snapshot_id).await
    }

    // Roster operations

    /// Register a new agent
    pub async fn register_agent(&self, ctx: &ActorContext, new_agent: NewAgent) -> Result<Agent> {
        self.require_mutation(ctx)?;
        Self::validate_new_agent(&new_agent)?;

        let agent = Self::build_agent(new_agent);
        self.handle.register_agent(agent.clone()).await?;
        Ok(agent)
    }

    /// Bulk-register agents (the effect of a CSV import)
    ///
    /// Agents whose mobile number is already in the roster are skipped.
    /// Returns the number actually inserted.
    pub async fn import_agents(
        &self,
        ctx: &ActorContext,
        new_agents: Vec<NewAgent>,
    ) -> Result<usize> {
        self.require_mutation(ctx)?;
        for new_agent in &new_agents {
            Self::validate_new_agent(new_agent)?;
        }

        let agents = new_agents.into_iter().map(Self::build_agent).collect();
        self.handle.import_agents(agents).await
    }

    /// Remove agents from the roster (explicit purge, the only deletion path)
    pub async fn purge_agents(&self, ctx: &ActorContext, agent_ids: Vec<Uuid>) -> Result<()> {
        self.require_mutation(ctx)?;
        self.handle.purge_agents(agent_ids).await
    }

    // Officer directory feed

    /// Insert or replace an officer directory entry
    pub fn upsert_officer(&self, user: User) -> Result<()> {
        self.storage.put_user(&user)
    }

    /// Look up an officer by ID
    pub fn officer(&self, officer_id: Uuid) -> Result<User> {
        self.storage
            .get_user(officer_id)?
            .ok_or(Error::OfficerNotFound(officer_id))
    }

    /// List the whole user directory
    pub fn officers(&self) -> Result<Vec<User>> {
        self.storage.list_users()
    }

    // Read-only queries (direct storage, scoped)

    /// Get agent by ID
    pub fn agent(&self, agent_id: Uuid) -> Result<Agent> {
        self.storage
            .get_agent(agent_id)?
            .ok_or(Error::AgentNotFound(agent_id))
    }

    /// Agents visible to the actor
    pub fn agents(&self, ctx: &ActorContext) -> Result<Vec<Agent>> {
        Ok(scoping::visible_agents(ctx, self.storage.list_agents()?))
    }

    /// Open transactions visible to the actor
    pub fn open_transactions(&self, ctx: &ActorContext) -> Result<Vec<Transaction>> {
        Ok(scoping::visible_transactions(
            ctx,
            self.storage.list_transactions()?,
        ))
    }

    /// Open transactions for one agent (ledger detail screen)
    pub fn agent_transactions(&self, agent_id: Uuid) -> Result<Vec<Transaction>> {
        let mut transactions = self.storage.list_transactions()?;
        transactions.retain(|t| t.agent_id == agent_id);
        Ok(transactions)
    }

    /// Get archived snapshot by ID
    pub fn snapshot(&self, snapshot_id: Uuid) -> Result<HistorySnapshot> {
        self.storage
            .get_snapshot(snapshot_id)?
            .ok_or(Error::SnapshotNotFound(snapshot_id))
    }

    /// Archived snapshots visible to the actor
    pub fn snapshots(&self, ctx: &ActorContext) -> Result<Vec<HistorySnapshot>> {
        Ok(scoping::visible_snapshots(
            ctx,
            self.storage.list_snapshots()?,
        ))
    }

    /// Shutdown ledger
    pub async fn shutdown(self) -> Result<()> {
        self.handle.shutdown().await
    }

    // Preconditions

    /// Check mutation permission once per operation
    fn require_mutation(&self, ctx: &ActorContext) -> Result<()> {
        if !scoping::can_mutate(ctx.role) {
            return Err(Error::PermissionDenied(
                "MASTER is read-only over the ledger".to_string(),
            ));
        }
        Ok(())
    }

    /// Mutation permission plus an operating officer to record against
    fn mutation_officer(&self, ctx: &ActorContext) -> Result<Uuid> {
        self.require_mutation(ctx)?;
        ctx.officer
            .as_ref()
            .map(|o| o.id)
            .ok_or_else(|| Error::Validation("No operating officer selected".to_string()))
    }

    /// Validate draft invariants
    fn validate_draft(draft: &TransactionDraft) -> Result<()> {
        if draft.amount == 0 {
            return Err(Error::Validation("Amount must be non-zero".to_string()));
        }

        // Only due adjustments carry a signed delta; flow amounts are
        // strictly positive.
        if draft.amount < 0 && draft.kind != TransactionType::DueAdjustment {
            return Err(Error::Validation(
                "Amount must be positive for flow transactions".to_string(),
            ));
        }

        Ok(())
    }

    fn validate_new_agent(new_agent: &NewAgent) -> Result<()> {
        if new_agent.name.trim().is_empty() {
            return Err(Error::Validation("Agent name is required".to_string()));
        }
        if new_agent.mobile.as_str().trim().is_empty() {
            return Err(Error::Validation("Agent mobile is required".to_string()));
        }
        Ok(())
    }

    fn build_agent(new_agent: NewAgent) -> Agent {
        Agent {
            id: Uuid::now_v7(),
            name: new_agent.name,
            mobile: new_agent.mobile,
            area: new_agent.area,
            current_due: 0,
            assigned_officer_mobile: new_agent.assigned_officer_mobile,
            status: AgentStatus::Active,
            created_at: Utc::now(),
        }
    }
}
