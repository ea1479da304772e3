//! Endpoint-level access checks.
//!
//! Capability requirements are expressed as [`Capability`] labels; this module
//! turns them into the seeded [`Role`] rows (identity-bearing) and hands the
//! decision to the pure engine in `orgguard-auth`.

use tracing::{debug, warn};

use orgguard_auth::{AuthzError, Capability, Principal, Role, authorize, is_authorized};
use orgguard_core::{DomainError, DomainResult, OrgId};

use crate::store::{RoleRepository, SharedStore};

const DENIED: &str = "insufficient permissions";

#[derive(Clone)]
pub struct AccessPolicy {
    store: SharedStore,
}

impl AccessPolicy {
    pub fn new(store: SharedStore) -> Self {
        Self { store }
    }

    /// Resolve capability labels to role rows. Unseeded capabilities are
    /// skipped; they can only narrow the allowed set.
    pub async fn capability_roles(&self, caps: &[Capability]) -> DomainResult<Vec<Role>> {
        let mut roles = Vec::with_capacity(caps.len());
        for cap in caps {
            match self.store.find_role_by_name(cap.as_str()).await? {
                Some(role) => roles.push(role),
                None => warn!(capability = %cap, "capability role is not seeded"),
            }
        }
        Ok(roles)
    }

    /// Check a tenant-less operation (the role/group/task catalog).
    pub async fn require(&self, principal: &Principal, caps: &[Capability]) -> DomainResult<()> {
        if matches!(principal, Principal::Org(_)) {
            return Ok(());
        }
        let roles = self.capability_roles(caps).await?;
        if is_authorized(principal, &roles) {
            Ok(())
        } else {
            debug!(subject = %principal.subject(), "capability check failed");
            Err(DomainError::forbidden(DENIED))
        }
    }

    /// Check an operation on data owned by `tenant`.
    pub async fn require_in(
        &self,
        principal: &Principal,
        tenant: OrgId,
        caps: &[Capability],
    ) -> DomainResult<()> {
        if principal.tenant_id() != tenant {
            debug!(subject = %principal.subject(), %tenant, "cross-tenant access refused");
            return Err(DomainError::forbidden(DENIED));
        }
        let roles = match principal {
            Principal::Org(_) => Vec::new(),
            Principal::User(_) => self.capability_roles(caps).await?,
        };
        authorize(principal, tenant, &roles).map_err(|err| {
            if let AuthzError::Forbidden(needed) = &err {
                debug!(subject = %principal.subject(), needed = %needed, "capability check failed");
            }
            DomainError::forbidden(DENIED)
        })
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use chrono::Utc;
    use orgguard_accounts::{Link, Org, User};
    use orgguard_auth::roles::required;

    use super::*;
    use crate::store::{AssociationRepository, InMemoryStore, OrgRepository, UserRepository};
    use crate::services::seed_capability_roles;

    async fn setup() -> (Arc<InMemoryStore>, AccessPolicy, Org, User) {
        let store = Arc::new(InMemoryStore::new());
        seed_capability_roles(store.as_ref()).await.unwrap();
        let now = Utc::now();
        let org = Org::new("acme", "ops@acme.test", "hash", now);
        store.insert_org(&org).await.unwrap();
        let user = User::new(org.id, "alice", "hash", now);
        store.insert_user(&user).await.unwrap();
        (store.clone(), AccessPolicy::new(store), org, user)
    }

    async fn principal(store: &InMemoryStore, user: &User) -> Principal {
        Principal::User(store.find_user(user.id).await.unwrap().unwrap().to_principal())
    }

    #[tokio::test]
    async fn org_passes_everything_in_its_tenant() {
        let (_, policy, org, _) = setup().await;
        let p = Principal::Org(org.to_principal());
        policy.require(&p, required::ROLES_WRITE).await.unwrap();
        policy.require_in(&p, org.id, required::ORG_ADMIN).await.unwrap();
    }

    #[tokio::test]
    async fn user_needs_one_of_the_capabilities() {
        let (store, policy, org, user) = setup().await;

        let p = principal(&store, &user).await;
        let err = policy.require_in(&p, org.id, required::USERS_READ).await.unwrap_err();
        assert!(matches!(err, DomainError::Forbidden(_)));

        let reader = store.find_role_by_name("USER_READ_ACCESS").await.unwrap().unwrap();
        store.append_link(Link::UserRole(user.id, reader.id)).await.unwrap();

        let p = principal(&store, &user).await;
        policy.require_in(&p, org.id, required::USERS_READ).await.unwrap();
        assert!(policy.require_in(&p, org.id, required::USERS_WRITE).await.is_err());
    }

    #[tokio::test]
    async fn other_tenants_are_refused_even_for_orgs() {
        let (store, policy, _, _) = setup().await;
        let other = Org::new("globex", "ops@globex.test", "hash", Utc::now());
        store.insert_org(&other).await.unwrap();

        let p = Principal::Org(other.to_principal());
        let foreign = orgguard_core::OrgId::new();
        let err = policy.require_in(&p, foreign, required::USERS_READ).await.unwrap_err();
        assert!(matches!(err, DomainError::Forbidden(_)));
    }
}
