//! Storage layer using RocksDB
//!
//! # Column Families
//!
//! - `agents` - Agent roster with current due balances (key: agent_id)
//! - `transactions` - Open transaction set only; archived records live
//!   inside their snapshot (key: transaction_id)
//! - `snapshots` - Settled-period archive (key: snapshot_id)
//! - `users` - Officer directory (key: user_id)
//!
//! Every mutating ledger operation is committed through a single
//! [`WriteBatch`], so a balance mutation and its transaction record are
//! durable together or not at all.

use crate::{
    error::{Error, Result},
    types::{Agent, HistorySnapshot, Transaction, User},
    Config,
};
use rocksdb::{ColumnFamily, ColumnFamilyDescriptor, IteratorMode, Options, WriteBatch, DB};
use std::sync::Arc;
use uuid::Uuid;

/// Column family names
const CF_AGENTS: &str = "agents";
const CF_TRANSACTIONS: &str = "transactions";
const CF_SNAPSHOTS: &str = "snapshots";
const CF_USERS: &str = "users";

/// Storage wrapper for RocksDB
pub struct Storage {
    db: Arc<DB>,
}

impl Storage {
    /// Open or create database
    pub fn open(config: &Config) -> Result<Self> {
        let path = &config.data_dir;

        // Create directory if not exists
        std::fs::create_dir_all(path)?;

        // Database options
        let mut db_opts = Options::default();
        db_opts.create_if_missing(true);
        db_opts.create_missing_column_families(true);

        // Tuning from config
        db_opts.set_write_buffer_size(config.rocksdb.write_buffer_size_mb * 1024 * 1024);
        db_opts.set_max_background_jobs(config.rocksdb.max_background_jobs);

        // Column family descriptors
        let cf_descriptors = vec![
            ColumnFamilyDescriptor::new(CF_AGENTS, Self::cf_options_live()),
            ColumnFamilyDescriptor::new(CF_TRANSACTIONS, Self::cf_options_live()),
            ColumnFamilyDescriptor::new(CF_SNAPSHOTS, Self::cf_options_archive()),
            ColumnFamilyDescriptor::new(CF_USERS, Self::cf_options_live()),
        ];

        // Open database
        let db = DB::open_cf_descriptors(&db_opts, path, cf_descriptors)?;

        tracing::info!("Opened RocksDB at {:?}", path);

        Ok(Self { db: Arc::new(db) })
    }

    // Column family options

    fn cf_options_live() -> Options {
        let mut opts = Options::default();
        // Live collections are read on every screen, use LZ4 for speed
        opts.set_compression_type(rocksdb::DBCompressionType::Lz4);
        opts
    }

    fn cf_options_archive() -> Options {
        let mut opts = Options::default();
        // Snapshots are written once and rarely read
        opts.set_compression_type(rocksdb::DBCompressionType::Zstd);
        opts
    }

    // Helper: get column family handle

    fn cf_handle(&self, name: &str) -> Result<&ColumnFamily> {
        self.db
            .cf_handle(name)
            .ok_or_else(|| Error::Storage(format!("Column family {} not found", name)))
    }

    // Agent operations

    /// Put agent (insert or replace)
    pub fn put_agent(&self, agent: &Agent) -> Result<()> {
        let cf = self.cf_handle(CF_AGENTS)?;
        let value = bincode::serialize(agent)?;
        self.db.put_cf(cf, agent.id.as_bytes(), &value)?;
        Ok(())
    }

    /// Get agent by ID, `None` if absent
    pub fn get_agent(&self, agent_id: Uuid) -> Result<Option<Agent>> {
        let cf = self.cf_handle(CF_AGENTS)?;
        match self.db.get_cf(cf, agent_id.as_bytes())? {
            Some(value) => Ok(Some(bincode::deserialize(&value)?)),
            None => Ok(None),
        }
    }

    /// List all agents
    pub fn list_agents(&self) -> Result<Vec<Agent>> {
        let cf = self.cf_handle(CF_AGENTS)?;
        let iter = self.db.iterator_cf(cf, IteratorMode::Start);

        let mut agents = Vec::new();
        for item in iter {
            let (_, value) = item?;
            agents.push(bincode::deserialize(&value)?);
        }
        Ok(agents)
    }

    /// Delete a set of agents (explicit purge, atomic)
    pub fn delete_agents(&self, agent_ids: &[Uuid]) -> Result<()> {
        let cf = self.cf_handle(CF_AGENTS)?;
        let mut batch = WriteBatch::default();
        for id in agent_ids {
            batch.delete_cf(cf, id.as_bytes());
        }
        self.db.write(batch)?;
        Ok(())
    }

    // Transaction operations (open set)

    /// Get open transaction by ID, `None` if absent
    pub fn get_transaction(&self, tx_id: Uuid) -> Result<Option<Transaction>> {
        let cf = self.cf_handle(CF_TRANSACTIONS)?;
        match self.db.get_cf(cf, tx_id.as_bytes())? {
            Some(value) => Ok(Some(bincode::deserialize(&value)?)),
            None => Ok(None),
        }
    }

    /// List all open transactions, in key (time) order
    pub fn list_transactions(&self) -> Result<Vec<Transaction>> {
        let cf = self.cf_handle(CF_TRANSACTIONS)?;
        let iter = self.db.iterator_cf(cf, IteratorMode::Start);

        let mut transactions = Vec::new();
        for item in iter {
            let (_, value) = item?;
            transactions.push(bincode::deserialize(&value)?);
        }
        Ok(transactions)
    }

    /// List open transactions with the given officer of record
    pub fn list_officer_transactions(&self, officer_id: Uuid) -> Result<Vec<Transaction>> {
        let mut transactions = self.list_transactions()?;
        transactions.retain(|t| t.officer_id == officer_id);
        Ok(transactions)
    }

    // User directory operations

    /// Put user (insert or replace)
    pub fn put_user(&self, user: &User) -> Result<()> {
        let cf = self.cf_handle(CF_USERS)?;
        let value = bincode::serialize(user)?;
        self.db.put_cf(cf, user.id.as_bytes(), &value)?;
        Ok(())
    }

    /// Get user by ID, `None` if absent
    pub fn get_user(&self, user_id: Uuid) -> Result<Option<User>> {
        let cf = self.cf_handle(CF_USERS)?;
        match self.db.get_cf(cf, user_id.as_bytes())? {
            Some(value) => Ok(Some(bincode::deserialize(&value)?)),
            None => Ok(None),
        }
    }

    /// List all users
    pub fn list_users(&self) -> Result<Vec<User>> {
        let cf = self.cf_handle(CF_USERS)?;
        let iter = self.db.iterator_cf(cf, IteratorMode::Start);

        let mut users = Vec::new();
        for item in iter {
            let (_, value) = item?;
            users.push(bincode::deserialize(&value)?);
        }
        Ok(users)
    }

    // Snapshot archive operations

    /// Get snapshot by ID, `None` if absent
    pub fn get_snapshot(&self, snapshot_id: Uuid) -> Result<Option<HistorySnapshot>> {
        let cf = self.cf_handle(CF_SNAPSHOTS)?;
        match self.db.get_cf(cf, snapshot_id.as_bytes())? {
            Some(value) => Ok(Some(bincode::deserialize(&value)?)),
            None => Ok(None),
        }
    }

    /// List all snapshots, in key (capture time) order
    pub fn list_snapshots(&self) -> Result<Vec<HistorySnapshot>> {
        let cf = self.cf_handle(CF_SNAPSHOTS)?;
        let iter = self.db.iterator_cf(cf, IteratorMode::Start);

        let mut snapshots = Vec::new();
        for item in iter {
            let (_, value) = item?;
            snapshots.push(bincode::deserialize(&value)?);
        }
        Ok(snapshots)
    }

    /// Delete snapshot by ID
    pub fn delete_snapshot(&self, snapshot_id: Uuid) -> Result<()> {
        let cf = self.cf_handle(CF_SNAPSHOTS)?;
        self.db.delete_cf(cf, snapshot_id.as_bytes())?;
        Ok(())
    }

    // Batch operations (atomic)

    /// Commit a recorded transaction with its balance mutation (atomic)
    pub fn commit_record(&self, transaction: &Transaction, agent: &Agent) -> Result<()> {
        let mut batch = WriteBatch::default();

        let cf_tx = self.cf_handle(CF_TRANSACTIONS)?;
        batch.put_cf(cf_tx, transaction.id.as_bytes(), bincode::serialize(transaction)?);

        let cf_agents = self.cf_handle(CF_AGENTS)?;
        batch.put_cf(cf_agents, agent.id.as_bytes(), bincode::serialize(agent)?);

        self.db.write(batch)?;

        tracing::debug!(
            transaction_id = %transaction.id,
            agent_id = %agent.id,
            kind = %transaction.kind,
            "Transaction committed"
        );

        Ok(())
    }

    /// Commit an edited transaction with its reversed/reapplied balances
    /// (atomic); `agents` holds one entry when the agent is unchanged and
    /// two when the edit moved the transaction to another agent
    pub fn commit_edit(&self, transaction: &Transaction, agents: &[Agent]) -> Result<()> {
        let mut batch = WriteBatch::default();

        let cf_tx = self.cf_handle(CF_TRANSACTIONS)?;
        batch.put_cf(cf_tx, transaction.id.as_bytes(), bincode::serialize(transaction)?);

        let cf_agents = self.cf_handle(CF_AGENTS)?;
        for agent in agents {
            batch.put_cf(cf_agents, agent.id.as_bytes(), bincode::serialize(agent)?);
        }

        self.db.write(batch)?;
        Ok(())
    }

    /// Commit a transaction deletion with its reversed balance (atomic);
    /// `agent` is `None` when the owning agent no longer exists
    pub fn commit_delete(&self, tx_id: Uuid, agent: Option<&Agent>) -> Result<()> {
        let mut batch = WriteBatch::default();

        let cf_tx = self.cf_handle(CF_TRANSACTIONS)?;
        batch.delete_cf(cf_tx, tx_id.as_bytes());

        if let Some(agent) = agent {
            let cf_agents = self.cf_handle(CF_AGENTS)?;
            batch.put_cf(cf_agents, agent.id.as_bytes(), bincode::serialize(agent)?);
        }

        self.db.write(batch)?;
        Ok(())
    }

    /// Commit a settlement capture (atomic): snapshot insert, open-set
    /// purge, and balance zeroing happen in one write
    pub fn commit_settlement(
        &self,
        snapshot: &HistorySnapshot,
        purged_tx_ids: &[Uuid],
        zeroed_agents: &[Agent],
    ) -> Result<()> {
        let mut batch = WriteBatch::default();

        let cf_snapshots = self.cf_handle(CF_SNAPSHOTS)?;
        batch.put_cf(cf_snapshots, snapshot.id.as_bytes(), bincode::serialize(snapshot)?);

        let cf_tx = self.cf_handle(CF_TRANSACTIONS)?;
        for tx_id in purged_tx_ids {
            batch.delete_cf(cf_tx, tx_id.as_bytes());
        }

        let cf_agents = self.cf_handle(CF_AGENTS)?;
        for agent in zeroed_agents {
            batch.put_cf(cf_agents, agent.id.as_bytes(), bincode::serialize(agent)?);
        }

        self.db.write(batch)?;

        tracing::info!(
            snapshot_id = %snapshot.id,
            officer_id = %snapshot.officer_id,
            archived = purged_tx_ids.len(),
            agents_reset = zeroed_agents.len(),
            "Settlement committed"
        );

        Ok(())
    }

    /// Close database (graceful shutdown)
    pub fn close(self) -> Result<()> {
        drop(self.db);
        tracing::info!("RocksDB closed gracefully");
        Ok(())
    }
}
