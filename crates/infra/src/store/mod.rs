//! Persistence seam.
//!
//! One repository trait per table family plus the association (join-row)
//! operations. Services depend on [`SharedStore`] and never on a concrete
//! backend, so the same code runs against [`InMemoryStore`] in tests and
//! [`PostgresStore`] in production.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;

use orgguard_accounts::{Group, Link, LinkOwner, Lookup, Org, Task, User};
use orgguard_auth::Role;
use orgguard_core::{AccountStatus, DomainError, DomainResult, GroupId, OrgId, RoleId, TaskId, UserId};

pub mod memory;
pub mod postgres;

pub use memory::InMemoryStore;
pub use postgres::PostgresStore;

/// Storage-level failure.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StoreError {
    /// A unique constraint (email, name, join-row primary key) was violated.
    #[error("unique violation: {0}")]
    UniqueViolation(String),

    /// A referenced row is missing, or a row is still referenced.
    #[error("foreign key violation: {0}")]
    ForeignKey(String),

    #[error("storage backend error: {0}")]
    Backend(String),
}

pub type StoreResult<T> = Result<T, StoreError>;

impl From<StoreError> for DomainError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::UniqueViolation(msg) => DomainError::conflict(msg),
            StoreError::ForeignKey(msg) => DomainError::internal(format!("foreign key: {msg}")),
            StoreError::Backend(msg) => DomainError::internal(msg),
        }
    }
}

#[async_trait]
pub trait OrgRepository: Send + Sync {
    async fn insert_org(&self, org: &Org) -> StoreResult<()>;

    async fn update_org(&self, org: &Org) -> StoreResult<()>;

    /// Bulk save; all-or-nothing.
    async fn update_orgs(&self, orgs: &[Org]) -> StoreResult<()>;

    async fn find_org(&self, id: OrgId) -> StoreResult<Option<Org>>;

    async fn find_org_by_email(&self, email: &str) -> StoreResult<Option<Org>>;

    /// Orgs with `status` whose `updated_at <= cutoff`.
    async fn orgs_due(&self, status: AccountStatus, cutoff: DateTime<Utc>) -> StoreResult<Vec<Org>>;

    /// Fails with [`StoreError::ForeignKey`] while users still reference it.
    async fn delete_org(&self, id: OrgId) -> StoreResult<bool>;
}

#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn insert_user(&self, user: &User) -> StoreResult<()>;

    /// Writes scalar columns only; associations go through
    /// [`AssociationRepository`].
    async fn update_user(&self, user: &User) -> StoreResult<()>;

    /// Hydrated with roles and groups (each group with its roles).
    async fn find_user(&self, id: UserId) -> StoreResult<Option<User>>;

    async fn find_user_by_username(&self, org_id: OrgId, username: &str) -> StoreResult<Option<User>>;

    async fn list_users(&self, org_id: OrgId) -> StoreResult<Vec<User>>;

    async fn users_due(&self, status: AccountStatus, cutoff: DateTime<Utc>) -> StoreResult<Vec<User>>;

    /// Fails with [`StoreError::ForeignKey`] while join rows still reference it.
    async fn delete_user(&self, id: UserId) -> StoreResult<bool>;
}

#[async_trait]
pub trait RoleRepository: Send + Sync {
    async fn insert_role(&self, role: &Role) -> StoreResult<()>;

    async fn find_role(&self, id: RoleId) -> StoreResult<Option<Role>>;

    async fn find_role_by_name(&self, name: &str) -> StoreResult<Option<Role>>;

    async fn list_roles(&self) -> StoreResult<Vec<Role>>;

    async fn delete_role(&self, id: RoleId) -> StoreResult<bool>;
}

#[async_trait]
pub trait GroupRepository: Send + Sync {
    async fn insert_group(&self, group: &Group) -> StoreResult<()>;

    async fn find_group(&self, id: GroupId) -> StoreResult<Option<Group>>;

    async fn find_group_by_name(&self, name: &str) -> StoreResult<Option<Group>>;

    async fn list_groups(&self) -> StoreResult<Vec<Group>>;

    async fn delete_group(&self, id: GroupId) -> StoreResult<bool>;
}

#[async_trait]
pub trait TaskRepository: Send + Sync {
    async fn insert_task(&self, task: &Task) -> StoreResult<()>;

    async fn find_task(&self, id: TaskId) -> StoreResult<Option<Task>>;

    async fn find_task_by_name(&self, name: &str) -> StoreResult<Option<Task>>;

    async fn list_tasks(&self) -> StoreResult<Vec<Task>>;

    async fn delete_task(&self, id: TaskId) -> StoreResult<bool>;
}

/// Many-to-many join rows.
#[async_trait]
pub trait AssociationRepository: Send + Sync {
    /// Append a join row. Both ends must exist; a duplicate row is a
    /// [`StoreError::UniqueViolation`].
    async fn append_link(&self, link: Link) -> StoreResult<()>;

    /// Returns whether a row was removed.
    async fn delete_link(&self, link: Link) -> StoreResult<bool>;

    /// Remove every join row that references `owner`. Returns the count.
    async fn clear_links(&self, owner: LinkOwner) -> StoreResult<u64>;
}

/// Everything the services need from persistence.
pub trait Store:
    OrgRepository
    + UserRepository
    + RoleRepository
    + GroupRepository
    + TaskRepository
    + AssociationRepository
{
}

impl<T> Store for T where
    T: OrgRepository
        + UserRepository
        + RoleRepository
        + GroupRepository
        + TaskRepository
        + AssociationRepository
{
}

pub type SharedStore = Arc<dyn Store>;

// ─────────────────────────────────────────────────────────────────────────────
// Id-or-name resolution
// ─────────────────────────────────────────────────────────────────────────────

pub async fn resolve_role(store: &dyn Store, lookup: &Lookup<RoleId>) -> DomainResult<Role> {
    let found = match lookup {
        Lookup::Id(id) => store.find_role(*id).await?,
        Lookup::Name(name) => store.find_role_by_name(name).await?,
    };
    found.ok_or_else(|| DomainError::not_found("Role"))
}

pub async fn resolve_group(store: &dyn Store, lookup: &Lookup<GroupId>) -> DomainResult<Group> {
    let found = match lookup {
        Lookup::Id(id) => store.find_group(*id).await?,
        Lookup::Name(name) => store.find_group_by_name(name).await?,
    };
    found.ok_or_else(|| DomainError::not_found("Group"))
}

pub async fn resolve_task(store: &dyn Store, lookup: &Lookup<TaskId>) -> DomainResult<Task> {
    let found = match lookup {
        Lookup::Id(id) => store.find_task(*id).await?,
        Lookup::Name(name) => store.find_task_by_name(name).await?,
    };
    found.ok_or_else(|| DomainError::not_found("Task"))
}

pub async fn require_user(store: &dyn Store, id: UserId) -> DomainResult<User> {
    store
        .find_user(id)
        .await?
        .ok_or_else(|| DomainError::not_found("User"))
}

pub async fn require_org(store: &dyn Store, id: OrgId) -> DomainResult<Org> {
    store
        .find_org(id)
        .await?
        .ok_or_else(|| DomainError::not_found("Account"))
}
