//! Access scoping policy
//!
//! Centralizes every role/visibility decision behind single policy
//! functions, so individual operations check permissions exactly once
//! instead of re-deriving role rules at each call site.
//!
//! Scope rules:
//! - A DSO operates their own ledger (agents assigned to their mobile).
//! - An ADMIN operates a chosen officer's ledger with full mutation rights.
//! - A MASTER is read/audit only: all transactions are always visible to
//!   them, agents follow the chosen officer (or all agents with no
//!   selection), and every mutation is denied.

use crate::types::{Agent, HistorySnapshot, MobileNumber, Role, Transaction, User};
use uuid::Uuid;

/// The operating officer an actor is currently working as
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OfficerRef {
    /// Officer user ID (officer of record for new transactions)
    pub id: Uuid,

    /// Officer mobile number (agent-assignment key)
    pub mobile: MobileNumber,
}

impl OfficerRef {
    /// Reference an officer from their directory record
    pub fn from_user(user: &User) -> Self {
        Self {
            id: user.id,
            mobile: user.mobile.clone(),
        }
    }
}

/// The acting user plus their operating-officer selection
///
/// For a DSO the officer is themself; for an ADMIN it is the chosen DSO;
/// for a MASTER it is the officer under review, or `None` for the global
/// read-only view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActorContext {
    /// Acting user ID
    pub user_id: Uuid,

    /// Acting user role
    pub role: Role,

    /// Operating officer selection
    pub officer: Option<OfficerRef>,
}

impl ActorContext {
    /// Context for a DSO operating their own ledger
    pub fn dso(user: &User) -> Self {
        Self {
            user_id: user.id,
            role: Role::Dso,
            officer: Some(OfficerRef::from_user(user)),
        }
    }

    /// Context for an ADMIN or MASTER operating as the given officer
    pub fn operating_as(user: &User, officer: &User) -> Self {
        Self {
            user_id: user.id,
            role: user.role,
            officer: Some(OfficerRef::from_user(officer)),
        }
    }

    /// Context for a MASTER with no officer selected (global audit view)
    pub fn master_global(user: &User) -> Self {
        Self {
            user_id: user.id,
            role: Role::Master,
            officer: None,
        }
    }
}

/// Whether the role may mutate the ledger at all
///
/// MASTER is strictly read/audit only; ADMIN and DSO mutate within their
/// visible scope.
pub fn can_mutate(role: Role) -> bool {
    !matches!(role, Role::Master)
}

/// Agents visible to the actor
///
/// Agents are scoped by assignment to the operating officer's mobile.
/// MASTER with no officer selected sees the whole roster; a non-MASTER
/// actor with no operating officer sees nothing.
pub fn visible_agents(ctx: &ActorContext, agents: Vec<Agent>) -> Vec<Agent> {
    match (&ctx.officer, ctx.role) {
        (Some(officer), _) => agents
            .into_iter()
            .filter(|a| a.assigned_officer_mobile.as_ref() == Some(&officer.mobile))
            .collect(),
        (None, Role::Master) => agents,
        (None, _) => Vec::new(),
    }
}

/// Open transactions visible to the actor
///
/// MASTER always sees every transaction irrespective of officer selection
/// (global audit view); everyone else sees their operating officer's.
pub fn visible_transactions(
    ctx: &ActorContext,
    transactions: Vec<Transaction>,
) -> Vec<Transaction> {
    if ctx.role == Role::Master {
        return transactions;
    }
    match &ctx.officer {
        Some(officer) => transactions
            .into_iter()
            .filter(|t| t.officer_id == officer.id)
            .collect(),
        None => Vec::new(),
    }
}

/// Archived snapshots visible to the actor
///
/// MASTER sees the whole archive; everyone else sees their operating
/// officer's snapshots.
pub fn visible_snapshots(
    ctx: &ActorContext,
    snapshots: Vec<HistorySnapshot>,
) -> Vec<HistorySnapshot> {
    if ctx.role == Role::Master {
        return snapshots;
    }
    match &ctx.officer {
        Some(officer) => snapshots
            .into_iter()
            .filter(|s| s.officer_id == officer.id)
            .collect(),
        None => Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{AgentStatus, TransactionType, UserStatus};
    use chrono::Utc;

    fn user(role: Role, mobile: &str) -> User {
        User {
            id: Uuid::now_v7(),
            name: "Test".to_string(),
            mobile: MobileNumber::new(mobile),
            password: "112233".to_string(),
            role,
            status: UserStatus::Active,
        }
    }

    fn agent(assigned: Option<&str>) -> Agent {
        Agent {
            id: Uuid::now_v7(),
            name: "Shop".to_string(),
            mobile: MobileNumber::new("01800000000"),
            area: "Uttara".to_string(),
            current_due: 0,
            assigned_officer_mobile: assigned.map(MobileNumber::new),
            status: AgentStatus::Active,
            created_at: Utc::now(),
        }
    }

    fn tx(officer_id: Uuid) -> Transaction {
        Transaction {
            id: Uuid::now_v7(),
            agent_id: Uuid::now_v7(),
            officer_id,
            kind: TransactionType::CashGiven,
            amount: 100,
            note: String::new(),
            timestamp: Utc::now(),
        }
    }

    #[test]
    fn test_master_cannot_mutate() {
        assert!(can_mutate(Role::Dso));
        assert!(can_mutate(Role::Admin));
        assert!(!can_mutate(Role::Master));
    }

    #[test]
    fn test_dso_sees_own_agents_only() {
        let dso = user(Role::Dso, "01700000001");
        let ctx = ActorContext::dso(&dso);

        let agents = vec![
            agent(Some("01700000001")),
            agent(Some("01700000002")),
            agent(None),
        ];

        let visible = visible_agents(&ctx, agents);
        assert_eq!(visible.len(), 1);
        assert_eq!(
            visible[0].assigned_officer_mobile,
            Some(MobileNumber::new("01700000001"))
        );
    }

    #[test]
    fn test_master_global_sees_all_agents() {
        let master = user(Role::Master, "01900000000");
        let ctx = ActorContext::master_global(&master);

        let agents = vec![agent(Some("01700000001")), agent(None)];
        assert_eq!(visible_agents(&ctx, agents).len(), 2);
    }

    #[test]
    fn test_master_with_selection_sees_that_officer_agents() {
        let master = user(Role::Master, "01900000000");
        let dso = user(Role::Dso, "01700000001");
        let ctx = ActorContext::operating_as(&master, &dso);

        let agents = vec![agent(Some("01700000001")), agent(Some("01700000002"))];
        assert_eq!(visible_agents(&ctx, agents).len(), 1);
    }

    #[test]
    fn test_master_always_sees_all_transactions() {
        let master = user(Role::Master, "01900000000");
        let dso = user(Role::Dso, "01700000001");
        // Even with an officer selected, transactions stay global for MASTER.
        let ctx = ActorContext::operating_as(&master, &dso);

        let transactions = vec![tx(dso.id), tx(Uuid::now_v7())];
        assert_eq!(visible_transactions(&ctx, transactions).len(), 2);
    }

    #[test]
    fn test_admin_sees_operating_officer_transactions() {
        let admin = user(Role::Admin, "01600000000");
        let dso = user(Role::Dso, "01700000001");
        let ctx = ActorContext::operating_as(&admin, &dso);

        let transactions = vec![tx(dso.id), tx(Uuid::now_v7())];
        let visible = visible_transactions(&ctx, transactions);
        assert_eq!(visible.len(), 1);
        assert_eq!(visible[0].officer_id, dso.id);
    }
}
