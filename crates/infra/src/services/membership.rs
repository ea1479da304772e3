//! Add/remove operations on the many-to-many associations.

use serde::Serialize;
use tracing::info;

use orgguard_accounts::{
    Association, AssociationKind, Group, Link, Lookup, Task, User, ensure_absent, ensure_present,
};
use orgguard_auth::{Principal, group_has_role, roles::required, user_has_group};
use orgguard_core::{AccountStatus, DomainError, DomainResult, UserId};

use crate::policy::AccessPolicy;
use crate::store::{
    AssociationRepository, SharedStore, StoreError, require_user, resolve_group, resolve_role,
    resolve_task,
};

/// The parent side of an association, re-read after the change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Parent {
    User(User),
    Group(Group),
    Task(Task),
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
enum Op {
    Add,
    Remove,
}

#[derive(Clone)]
pub struct MembershipService {
    store: SharedStore,
    policy: AccessPolicy,
}

impl MembershipService {
    pub fn new(store: SharedStore, policy: AccessPolicy) -> Self {
        Self { store, policy }
    }

    /// Fails with `AlreadyAssociated` when the child is linked already.
    pub async fn add(&self, principal: &Principal, assoc: Association) -> DomainResult<Parent> {
        self.apply(principal, assoc, Op::Add).await
    }

    /// Fails with `NotAssociated` when the child is not linked.
    pub async fn remove(&self, principal: &Principal, assoc: Association) -> DomainResult<Parent> {
        self.apply(principal, assoc, Op::Remove).await
    }

    async fn apply(&self, principal: &Principal, assoc: Association, op: Op) -> DomainResult<Parent> {
        let kind = assoc.kind();
        let store = self.store.as_ref();

        match assoc {
            Association::RoleToUser { user, role } => {
                let parent = self.writable_user(principal, user).await?;
                let role = resolve_role(store, &role).await?;
                let linked = parent.roles.iter().any(|r| r.id == role.id);
                self.mutate(op, linked, Link::UserRole(parent.id, role.id), kind).await?;
                Ok(Parent::User(require_user(store, parent.id).await?))
            }
            Association::GroupToUser { user, group } => {
                let parent = self.writable_user(principal, user).await?;
                let group = resolve_group(store, &group).await?;
                let linked = user_has_group(&parent.to_principal(), group.id);
                self.mutate(op, linked, Link::UserGroup(parent.id, group.id), kind).await?;
                Ok(Parent::User(require_user(store, parent.id).await?))
            }
            Association::RoleToGroup { group, role } => {
                self.policy.require(principal, required::GROUPS_WRITE).await?;
                let parent = resolve_group(store, &group).await?;
                let role = resolve_role(store, &role).await?;
                let linked = group_has_role(&parent.to_grant(), role.id);
                self.mutate(op, linked, Link::GroupRole(parent.id, role.id), kind).await?;
                let group = resolve_group(store, &Lookup::Id(parent.id)).await?;
                Ok(Parent::Group(group))
            }
            Association::RoleToTask { task, role } => {
                self.policy.require(principal, required::TASKS_WRITE).await?;
                let parent = resolve_task(store, &task).await?;
                let role = resolve_role(store, &role).await?;
                let linked = parent.roles.iter().any(|r| r.id == role.id);
                self.mutate(op, linked, Link::TaskRole(parent.id, role.id), kind).await?;
                let task = resolve_task(store, &Lookup::Id(parent.id)).await?;
                Ok(Parent::Task(task))
            }
        }
    }

    /// Target user in the caller's tenant, caller allowed to write users, and
    /// the target itself Activated.
    async fn writable_user(&self, principal: &Principal, id: UserId) -> DomainResult<User> {
        let user = require_user(self.store.as_ref(), id).await?;
        self.policy
            .require_in(principal, user.org_id, required::USERS_WRITE)
            .await?;
        if user.status != AccountStatus::Activated {
            return Err(DomainError::forbidden("Account is deactivated"));
        }
        Ok(user)
    }

    async fn mutate(&self, op: Op, linked: bool, link: Link, kind: AssociationKind) -> DomainResult<()> {
        match op {
            Op::Add => {
                ensure_absent(linked, kind)?;
                self.store.append_link(link).await.map_err(|err| match err {
                    // lost a race with a concurrent add
                    StoreError::UniqueViolation(_) => kind.already_associated(),
                    other => other.into(),
                })?;
            }
            Op::Remove => {
                ensure_present(linked, kind)?;
                if !self.store.delete_link(link).await? {
                    return Err(kind.not_associated());
                }
            }
        }
        info!(?link, ?op, "association updated");
        Ok(())
    }
}
