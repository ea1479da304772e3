//! Shared fixtures for service tests.

use std::sync::Arc;

use chrono::{Duration, TimeZone, Utc};

use orgguard_accounts::{Group, Link, Org, Task, User};
use orgguard_auth::{Hs256TokenIssuer, PasswordHasher, Principal};
use orgguard_core::{Clock, DomainResult, ManualClock, RoleId};

use super::{CatalogService, DirectoryService, LifecycleService, MembershipService, seed_capability_roles};
use crate::policy::AccessPolicy;
use crate::store::{
    AssociationRepository, GroupRepository, InMemoryStore, OrgRepository, RoleRepository,
    TaskRepository, UserRepository,
};

pub const PASSWORD: &str = "S3cret-pass!";

/// Reversible stand-in for Argon2; keeps tests fast.
pub struct PlainHasher;

impl PasswordHasher for PlainHasher {
    fn hash(&self, plaintext: &str) -> DomainResult<String> {
        Ok(format!("plain:{plaintext}"))
    }

    fn verify(&self, digest: &str, plaintext: &str) -> DomainResult<bool> {
        Ok(digest.strip_prefix("plain:") == Some(plaintext))
    }
}

pub struct Harness {
    pub store: Arc<InMemoryStore>,
    pub clock: Arc<ManualClock>,
    pub org: Org,
}

impl Harness {
    /// Seeded catalog plus one org, "acme".
    pub async fn new() -> Self {
        let store = Arc::new(InMemoryStore::new());
        let clock = Arc::new(ManualClock::new(Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap()));
        seed_capability_roles(store.as_ref()).await.unwrap();
        Self::with_store(store, clock, "acme").await
    }

    /// Another org sharing the same store and clock.
    pub async fn with_store(store: Arc<InMemoryStore>, clock: Arc<ManualClock>, name: &str) -> Self {
        let org = Org::new(name, format!("ops@{name}.test"), PlainHasher.hash(PASSWORD).unwrap(), clock.now());
        store.insert_org(&org).await.unwrap();
        Self { store, clock, org }
    }

    pub fn org_principal(&self) -> Principal {
        Principal::Org(self.org.to_principal())
    }

    /// Fresh read so roles and groups are hydrated.
    pub async fn user_principal(&self, user: &User) -> Principal {
        let user = self.store.find_user(user.id).await.unwrap().unwrap();
        Principal::User(user.to_principal())
    }

    pub async fn user(&self, username: &str) -> User {
        let user = User::new(self.org.id, username, PlainHasher.hash(PASSWORD).unwrap(), self.clock.now());
        self.store.insert_user(&user).await.unwrap();
        user
    }

    pub async fn role_id(&self, name: &str) -> RoleId {
        self.store.find_role_by_name(name).await.unwrap().unwrap().id
    }

    pub async fn group(&self, name: &str) -> Group {
        let group = Group::new(name, self.clock.now());
        self.store.insert_group(&group).await.unwrap();
        group
    }

    pub async fn task(&self, name: &str) -> Task {
        let task = Task::new(name, self.clock.now());
        self.store.insert_task(&task).await.unwrap();
        task
    }

    pub fn policy(&self) -> AccessPolicy {
        AccessPolicy::new(self.store.clone())
    }

    pub fn lifecycle(&self) -> LifecycleService {
        LifecycleService::new(self.store.clone(), self.policy(), self.clock.clone())
    }

    pub fn membership(&self) -> MembershipService {
        MembershipService::new(self.store.clone(), self.policy())
    }

    pub fn catalog(&self) -> CatalogService {
        CatalogService::new(self.store.clone(), self.policy(), self.clock.clone())
    }

    pub fn directory(&self) -> DirectoryService {
        DirectoryService::new(
            self.store.clone(),
            self.policy(),
            Arc::new(PlainHasher),
            Arc::new(Hs256TokenIssuer::new(b"test-secret".to_vec(), Duration::hours(24))),
            self.clock.clone(),
        )
    }
}

/// Give `user` the seeded capability role `name` directly.
pub async fn grant(h: &Harness, user: &User, name: &str) {
    let role = h.role_id(name).await;
    h.store.append_link(Link::UserRole(user.id, role)).await.unwrap();
}
