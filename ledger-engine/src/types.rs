//! Core types for the distributor ledger
//!
//! All types are designed for:
//! - Deterministic serialization (bincode)
//! - Memory safety (no unsafe code)
//! - Exact arithmetic (integer amounts in the smallest currency unit)

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Mobile number identifying a user or agent within the network
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MobileNumber(String);

impl MobileNumber {
    /// Create new mobile number
    pub fn new(number: impl Into<String>) -> Self {
        Self(number.into())
    }

    /// Get as string
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for MobileNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Role of a user in the distribution network
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum Role {
    /// Field officer operating one ledger scope
    Dso = 1,
    /// Administrator, may operate as any officer
    Admin = 2,
    /// Distributor head, read/audit only over the ledger
    Master = 3,
}

/// Account status of a user
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[repr(u8)]
pub enum UserStatus {
    /// Active, may log in and operate
    Active = 1,
    /// Temporarily suspended
    Suspended = 2,
    /// Soft-deleted
    Deleted = 3,
}

/// User record (officer directory entry)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Unique user ID
    pub id: Uuid,

    /// Display name
    pub name: String,

    /// Mobile number (login and agent-assignment key)
    pub mobile: MobileNumber,

    /// Password (verified outside the ledger core)
    pub password: String,

    /// Role
    pub role: Role,

    /// Account status
    pub status: UserStatus,
}

/// Status of an agent point
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[repr(u8)]
pub enum AgentStatus {
    /// Trading normally
    Active = 1,
    /// Not currently trading
    Inactive = 2,
}

/// Agent: a retail/distribution point with an outstanding due balance
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Agent {
    /// Unique agent ID
    pub id: Uuid,

    /// Shop or owner name
    pub name: String,

    /// Agent mobile number (unique within the roster)
    pub mobile: MobileNumber,

    /// Market area
    pub area: String,

    /// Outstanding due balance in the smallest currency unit. May be
    /// negative (agent holds a credit). Single source of truth for the
    /// balance; mutated only through the ledger engine.
    pub current_due: i64,

    /// Mobile number of the officer this agent is assigned to
    pub assigned_officer_mobile: Option<MobileNumber>,

    /// Status
    pub status: AgentStatus,

    /// Registration timestamp
    pub created_at: DateTime<Utc>,
}

/// Transaction type
///
/// Only `DueAdjustment` carries balance impact; the four flow types are
/// informational records and never move `current_due`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum TransactionType {
    /// Cash handed to the agent
    CashGiven = 1,
    /// Cash collected from the agent
    CashReceived = 2,
    /// Business-to-business balance sent
    B2bSend = 3,
    /// Business-to-business balance received
    B2bReceive = 4,
    /// Manual due-balance adjustment (signed delta)
    DueAdjustment = 5,
}

impl TransactionType {
    /// Wire/log code
    pub fn code(&self) -> &'static str {
        match self {
            TransactionType::CashGiven => "CASH_GIVEN",
            TransactionType::CashReceived => "CASH_RECEIVED",
            TransactionType::B2bSend => "B2B_SEND",
            TransactionType::B2bReceive => "B2B_RECEIVE",
            TransactionType::DueAdjustment => "DUE_ADJUSTMENT",
        }
    }
}

impl fmt::Display for TransactionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// A ledger transaction
///
/// Open transactions (not yet archived) are editable and deletable; a copy
/// archived into a [`HistorySnapshot`] is immutable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    /// Unique transaction ID (UUIDv7 for time-ordering)
    pub id: Uuid,

    /// Agent this transaction belongs to
    pub agent_id: Uuid,

    /// Officer of record at creation time (not the currently-operating actor)
    pub officer_id: Uuid,

    /// Transaction type
    pub kind: TransactionType,

    /// Amount in the smallest currency unit. Strictly positive for flow
    /// types; a signed delta for `DueAdjustment`.
    pub amount: i64,

    /// Free-form note
    pub note: String,

    /// Creation timestamp, captured once and immutable thereafter
    pub timestamp: DateTime<Utc>,
}

impl Transaction {
    /// Balance impact of this transaction on its agent's `current_due`
    ///
    /// Only `DueAdjustment` moves the balance; every other type is a pure
    /// flow record with zero impact.
    pub fn due_impact(&self) -> i64 {
        match self.kind {
            TransactionType::DueAdjustment => self.amount,
            _ => 0,
        }
    }
}

/// Caller-supplied fields for recording or editing a transaction
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionDraft {
    /// Target agent
    pub agent_id: Uuid,

    /// Transaction type
    pub kind: TransactionType,

    /// Amount (see [`Transaction::amount`] for sign rules)
    pub amount: i64,

    /// Free-form note
    pub note: String,
}

/// Caller-supplied fields for registering an agent
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewAgent {
    /// Shop or owner name
    pub name: String,

    /// Agent mobile number
    pub mobile: MobileNumber,

    /// Market area
    pub area: String,

    /// Officer the agent is assigned to
    pub assigned_officer_mobile: Option<MobileNumber>,
}

/// Per-type amount sums over a transaction set
///
/// Derived on demand from the transaction collection; never cached.
/// `DueAdjustment` amounts are deliberately excluded.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeTotals {
    /// Sum of `CashGiven` amounts
    pub cash_given: i64,

    /// Sum of `CashReceived` amounts
    pub cash_received: i64,

    /// Sum of `B2bSend` amounts
    pub b2b_send: i64,

    /// Sum of `B2bReceive` amounts
    pub b2b_receive: i64,
}

/// Archived snapshot of one officer's settled period
///
/// Append-only and immutable after capture. Holds an owned copy of the
/// archived transactions, so deleting a snapshot never touches live data
/// and purging live data never touches a snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistorySnapshot {
    /// Unique snapshot ID
    pub id: Uuid,

    /// Capture timestamp
    pub date: DateTime<Utc>,

    /// Officer whose ledger was settled
    pub officer_id: Uuid,

    /// Officer display name at capture time
    pub officer_name: String,

    /// Sum of `current_due` over the officer's assigned agents at capture
    /// time, before balances were reset
    pub total_due: i64,

    /// Per-type sums over the archived transactions
    pub stats: TypeTotals,

    /// Owned copy of every archived transaction, in open-set order
    pub transactions: Vec<Transaction>,
}
