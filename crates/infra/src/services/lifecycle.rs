//! Explicit (caller-driven) lifecycle transitions.
//!
//! Time-driven transitions live in [`crate::jobs`]; both go through the same
//! state machine in `orgguard_accounts::lifecycle`.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use orgguard_accounts::{LinkOwner, Org, User, deactivate, reactivate};
use orgguard_auth::{Capability, Principal, roles::required};
use orgguard_core::{Clock, DomainError, DomainResult, OrgId, UserId};

use crate::policy::AccessPolicy;
use crate::store::{
    AssociationRepository, OrgRepository, SharedStore, UserRepository, require_org, require_user,
};

#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Org,
    User,
}

/// The entity a transition was applied to, after the change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum AccountRecord {
    Org(Org),
    User(User),
}

#[derive(Clone)]
pub struct LifecycleService {
    store: SharedStore,
    policy: AccessPolicy,
    clock: Arc<dyn Clock>,
}

impl LifecycleService {
    pub fn new(store: SharedStore, policy: AccessPolicy, clock: Arc<dyn Clock>) -> Self {
        Self {
            store,
            policy,
            clock,
        }
    }

    /// Activated → Deactivated.
    pub async fn deactivate(
        &self,
        principal: &Principal,
        kind: EntityKind,
        id: Uuid,
    ) -> DomainResult<AccountRecord> {
        let now = self.clock.now();
        match kind {
            EntityKind::User => {
                let mut user = self.authorized_user(principal, id, required::USERS_WRITE).await?;
                deactivate(&mut user, now)?;
                self.store.update_user(&user).await?;
                info!(user_id = %user.id, org_id = %user.org_id, "user deactivated");
                Ok(AccountRecord::User(user))
            }
            EntityKind::Org => {
                let mut org = self.authorized_org(principal, id).await?;
                deactivate(&mut org, now)?;
                self.store.update_org(&org).await?;
                info!(org_id = %org.id, "org deactivated");
                Ok(AccountRecord::Org(org))
            }
        }
    }

    /// Deactivated → Activated.
    pub async fn reactivate(
        &self,
        principal: &Principal,
        kind: EntityKind,
        id: Uuid,
    ) -> DomainResult<AccountRecord> {
        let now = self.clock.now();
        match kind {
            EntityKind::User => {
                let mut user = self.authorized_user(principal, id, required::USERS_WRITE).await?;
                reactivate(&mut user, now)?;
                self.store.update_user(&user).await?;
                info!(user_id = %user.id, org_id = %user.org_id, "user reactivated");
                Ok(AccountRecord::User(user))
            }
            EntityKind::Org => {
                let mut org = self.authorized_org(principal, id).await?;
                reactivate(&mut org, now)?;
                self.store.update_org(&org).await?;
                info!(org_id = %org.id, "org reactivated");
                Ok(AccountRecord::Org(org))
            }
        }
    }

    /// Users are removed at once (links first). Orgs are only deactivated;
    /// the sweeps mark them Deleted and later purge them.
    pub async fn delete(
        &self,
        principal: &Principal,
        kind: EntityKind,
        id: Uuid,
    ) -> DomainResult<AccountRecord> {
        match kind {
            EntityKind::User => {
                let user = self.authorized_user(principal, id, required::USERS_DELETE).await?;
                let cleared = self.store.clear_links(LinkOwner::User(user.id)).await?;
                if !self.store.delete_user(user.id).await? {
                    return Err(DomainError::not_found("User"));
                }
                info!(user_id = %user.id, org_id = %user.org_id, links = cleared, "user deleted");
                Ok(AccountRecord::User(user))
            }
            EntityKind::Org => self.deactivate(principal, EntityKind::Org, id).await,
        }
    }

    async fn authorized_user(
        &self,
        principal: &Principal,
        id: Uuid,
        caps: &[Capability],
    ) -> DomainResult<User> {
        let user = require_user(self.store.as_ref(), UserId::from_uuid(id)).await?;
        self.policy.require_in(principal, user.org_id, caps).await?;
        Ok(user)
    }

    async fn authorized_org(&self, principal: &Principal, id: Uuid) -> DomainResult<Org> {
        let org = require_org(self.store.as_ref(), OrgId::from_uuid(id)).await?;
        self.policy
            .require_in(principal, org.id, required::ORG_ADMIN)
            .await?;
        Ok(org)
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use orgguard_accounts::Link;
    use orgguard_core::AccountStatus;

    use super::*;
    use crate::services::testing::{Harness, grant};

    #[tokio::test]
    async fn org_deactivates_and_reactivates_its_user() {
        let h = Harness::new().await;
        let user = h.user("alice").await;
        let svc = h.lifecycle();

        let rec = svc.deactivate(&h.org_principal(), EntityKind::User, user.id.into()).await.unwrap();
        assert!(matches!(rec, AccountRecord::User(ref u) if u.status == AccountStatus::Deactivated));

        let err = svc.deactivate(&h.org_principal(), EntityKind::User, user.id.into()).await.unwrap_err();
        assert!(matches!(err, DomainError::InvalidTransition(_)));

        svc.reactivate(&h.org_principal(), EntityKind::User, user.id.into()).await.unwrap();
        let err = svc.reactivate(&h.org_principal(), EntityKind::User, user.id.into()).await.unwrap_err();
        assert!(matches!(err, DomainError::InvalidTransition(_)));
    }

    #[tokio::test]
    async fn deactivation_refreshes_updated_at() {
        let h = Harness::new().await;
        let user = h.user("alice").await;
        h.clock.advance(chrono::Duration::days(3));

        let rec = h
            .lifecycle()
            .deactivate(&h.org_principal(), EntityKind::User, user.id.into())
            .await
            .unwrap();
        let AccountRecord::User(updated) = rec else { panic!("expected user") };
        assert_eq!(updated.updated_at, h.clock.now());
        assert!(updated.updated_at > user.updated_at);
    }

    #[tokio::test]
    async fn user_without_capability_is_forbidden() {
        let h = Harness::new().await;
        let actor = h.user("bob").await;
        let target = h.user("alice").await;

        let err = h
            .lifecycle()
            .deactivate(&h.user_principal(&actor).await, EntityKind::User, target.id.into())
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Forbidden(_)));

        grant(&h, &actor, "USER_WRITE_ACCESS").await;
        h.lifecycle()
            .deactivate(&h.user_principal(&actor).await, EntityKind::User, target.id.into())
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn cross_tenant_targets_are_forbidden() {
        let h = Harness::new().await;
        let other = Harness::with_store(h.store.clone(), h.clock.clone(), "globex").await;
        let target = other.user("carol").await;

        let err = h
            .lifecycle()
            .deactivate(&h.org_principal(), EntityKind::User, target.id.into())
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Forbidden(_)));

        let err = h
            .lifecycle()
            .delete(&h.org_principal(), EntityKind::Org, other.org.id.into())
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Forbidden(_)));
    }

    #[tokio::test]
    async fn deleting_a_user_clears_links_first() {
        let h = Harness::new().await;
        let user = h.user("alice").await;
        let admin = h.role_id("ORG_READ_ACCESS").await;
        let viewer = h.role_id("USER_READ_ACCESS").await;
        let group = h.group("ops").await;
        for link in [
            Link::UserRole(user.id, admin),
            Link::UserRole(user.id, viewer),
            Link::UserGroup(user.id, group.id),
        ] {
            h.store.append_link(link).await.unwrap();
        }

        h.lifecycle()
            .delete(&h.org_principal(), EntityKind::User, user.id.into())
            .await
            .unwrap();

        assert_eq!(h.store.link_count(LinkOwner::User(user.id)), 0);
        assert!(h.store.find_user(user.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn deleting_an_org_only_deactivates_it() {
        let h = Harness::new().await;
        let rec = h
            .lifecycle()
            .delete(&h.org_principal(), EntityKind::Org, h.org.id.into())
            .await
            .unwrap();
        assert!(matches!(rec, AccountRecord::Org(ref o) if o.status == AccountStatus::Deactivated));
        assert!(h.store.find_org(h.org.id).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn deleted_entities_reject_transitions() {
        let h = Harness::new().await;
        let mut user = h.user("alice").await;
        user.status = AccountStatus::Deleted;
        user.updated_at = Utc::now();
        h.store.update_user(&user).await.unwrap();

        let err = h
            .lifecycle()
            .deactivate(&h.org_principal(), EntityKind::User, user.id.into())
            .await
            .unwrap_err();
        assert_eq!(err, DomainError::AccountDeleted);
    }
}
