//! Account lifecycle state machine.
//!
//! ```text
//! Activated ──deactivate──▶ Deactivated ──mark_deleted──▶ Deleted
//!     ▲                          │
//!     └────────reactivate────────┘
//! ```
//!
//! Explicit transitions are driven by authorized callers; the time-based ones
//! are driven by the daily sweeps, which select rows by [`Sweep`].

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use orgguard_core::{Account, AccountStatus, DomainError, DomainResult};

/// Activated → Deactivated. Refreshes `updated_at`, which starts the
/// retention clock.
pub fn deactivate<A: Account>(account: &mut A, now: DateTime<Utc>) -> DomainResult<()> {
    match account.status() {
        AccountStatus::Deleted => Err(DomainError::AccountDeleted),
        AccountStatus::Deactivated => Err(DomainError::invalid_transition(format!(
            "{} is already deactivated",
            A::LABEL
        ))),
        AccountStatus::Activated => {
            account.set_status(AccountStatus::Deactivated);
            account.touch(now);
            Ok(())
        }
    }
}

/// Deactivated → Activated.
pub fn reactivate<A: Account>(account: &mut A, now: DateTime<Utc>) -> DomainResult<()> {
    match account.status() {
        AccountStatus::Deleted => Err(DomainError::AccountDeleted),
        AccountStatus::Activated => Err(DomainError::invalid_transition(format!(
            "{} is already activated",
            A::LABEL
        ))),
        AccountStatus::Deactivated => {
            account.set_status(AccountStatus::Activated);
            account.touch(now);
            Ok(())
        }
    }
}

/// Deactivated → Deleted. There is no shortcut from Activated.
pub fn mark_deleted<A: Account>(account: &mut A, now: DateTime<Utc>) -> DomainResult<()> {
    match account.status() {
        AccountStatus::Deleted => Err(DomainError::AccountDeleted),
        AccountStatus::Activated => Err(DomainError::invalid_transition(format!(
            "{} must be deactivated before it can be deleted",
            A::LABEL
        ))),
        AccountStatus::Deactivated => {
            account.set_status(AccountStatus::Deleted);
            account.touch(now);
            Ok(())
        }
    }
}

/// Retention windows, measured from the last status change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetentionPolicy {
    /// Deactivated users are removed after this long.
    pub user_purge_after: Duration,
    /// Deactivated orgs are marked Deleted after this long.
    pub org_mark_deleted_after: Duration,
    /// Deleted orgs are removed after this long.
    pub org_purge_after: Duration,
}

impl Default for RetentionPolicy {
    fn default() -> Self {
        Self {
            user_purge_after: Duration::days(30),
            org_mark_deleted_after: Duration::days(5),
            org_purge_after: Duration::days(45),
        }
    }
}

/// The three scheduled sweeps.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Sweep {
    PurgeDeactivatedUsers,
    MarkDeactivatedOrgsDeleted,
    PurgeDeletedOrgs,
}

impl Sweep {
    pub const ALL: [Sweep; 3] = [
        Self::PurgeDeactivatedUsers,
        Self::MarkDeactivatedOrgsDeleted,
        Self::PurgeDeletedOrgs,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Self::PurgeDeactivatedUsers => "purge_deactivated_users",
            Self::MarkDeactivatedOrgsDeleted => "mark_deactivated_orgs_deleted",
            Self::PurgeDeletedOrgs => "purge_deleted_orgs",
        }
    }

    /// Status a row must have to be selected.
    pub fn selects(&self) -> AccountStatus {
        match self {
            Self::PurgeDeactivatedUsers | Self::MarkDeactivatedOrgsDeleted => {
                AccountStatus::Deactivated
            }
            Self::PurgeDeletedOrgs => AccountStatus::Deleted,
        }
    }

    pub fn threshold(&self, policy: &RetentionPolicy) -> Duration {
        match self {
            Self::PurgeDeactivatedUsers => policy.user_purge_after,
            Self::MarkDeactivatedOrgsDeleted => policy.org_mark_deleted_after,
            Self::PurgeDeletedOrgs => policy.org_purge_after,
        }
    }

    /// Rows last updated at or before this instant are due.
    pub fn cutoff(&self, policy: &RetentionPolicy, now: DateTime<Utc>) -> DateTime<Utc> {
        now - self.threshold(policy)
    }
}

/// `status == expected && now - updated_at >= threshold`.
pub fn is_due<A: Account>(
    account: &A,
    expected: AccountStatus,
    threshold: Duration,
    now: DateTime<Utc>,
) -> bool {
    account.status() == expected && now - account.updated_at() >= threshold
}
