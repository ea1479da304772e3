use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use orgguard_auth::{GroupGrant, OrgPrincipal, Role, UserPrincipal};
use orgguard_core::{Account, AccountStatus, Entity, GroupId, OrgId, TaskId, UserId};

/// Tenant root. Signs in with its email.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Org {
    pub id: OrgId,
    pub username: String,
    pub email: String,
    #[serde(skip_serializing, default)]
    pub password_hash: String,
    pub status: AccountStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Org {
    pub fn new(
        username: impl Into<String>,
        email: impl Into<String>,
        password_hash: impl Into<String>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: OrgId::new(),
            username: username.into(),
            email: email.into(),
            password_hash: password_hash.into(),
            status: AccountStatus::Activated,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn to_principal(&self) -> OrgPrincipal {
        OrgPrincipal {
            id: self.id,
            status: self.status,
        }
    }
}

/// A user inside exactly one org.
///
/// `roles` and `groups` are the hydrated many-to-many associations; they are
/// filled by the store on read and ignored on write.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub org_id: OrgId,
    pub username: String,
    #[serde(skip_serializing, default)]
    pub password_hash: String,
    pub status: AccountStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub roles: Vec<Role>,
    pub groups: Vec<GroupGrant>,
}

impl User {
    pub fn new(
        org_id: OrgId,
        username: impl Into<String>,
        password_hash: impl Into<String>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: UserId::new(),
            org_id,
            username: username.into(),
            password_hash: password_hash.into(),
            status: AccountStatus::Activated,
            created_at: now,
            updated_at: now,
            roles: Vec::new(),
            groups: Vec::new(),
        }
    }

    pub fn to_principal(&self) -> UserPrincipal {
        UserPrincipal {
            id: self.id,
            org_id: self.org_id,
            username: self.username.clone(),
            roles: self.roles.clone(),
            groups: self.groups.clone(),
            status: self.status,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Group {
    pub id: GroupId,
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub roles: Vec<Role>,
}

impl Group {
    pub fn new(name: impl Into<String>, now: DateTime<Utc>) -> Self {
        Self {
            id: GroupId::new(),
            name: name.into(),
            created_at: now,
            updated_at: now,
            roles: Vec::new(),
        }
    }

    pub fn to_grant(&self) -> GroupGrant {
        GroupGrant {
            id: self.id,
            name: self.name.clone(),
            roles: self.roles.clone(),
        }
    }
}

/// A protected resource whose roles decide who may use it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub id: TaskId,
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub roles: Vec<Role>,
}

impl Task {
    pub fn new(name: impl Into<String>, now: DateTime<Utc>) -> Self {
        Self {
            id: TaskId::new(),
            name: name.into(),
            created_at: now,
            updated_at: now,
            roles: Vec::new(),
        }
    }
}

macro_rules! impl_entity {
    ($t:ty, $id:ty) => {
        impl Entity for $t {
            type Id = $id;

            fn id(&self) -> &Self::Id {
                &self.id
            }
        }
    };
}

impl_entity!(Org, OrgId);
impl_entity!(User, UserId);
impl_entity!(Group, GroupId);
impl_entity!(Task, TaskId);

macro_rules! impl_account {
    ($t:ty, $label:literal) => {
        impl Account for $t {
            const LABEL: &'static str = $label;

            fn status(&self) -> AccountStatus {
                self.status
            }

            fn set_status(&mut self, status: AccountStatus) {
                self.status = status;
            }

            fn updated_at(&self) -> DateTime<Utc> {
                self.updated_at
            }

            fn touch(&mut self, now: DateTime<Utc>) {
                self.updated_at = now;
            }
        }
    };
}

impl_account!(Org, "Account");
impl_account!(User, "User");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn password_hash_is_never_serialized() {
        let now = Utc::now();
        let org = Org::new("acme", "ops@acme.test", "$argon2id$secret", now);
        let user = User::new(org.id, "alice", "$argon2id$secret", now);

        for json in [serde_json::to_string(&org), serde_json::to_string(&user)] {
            assert!(!json.unwrap().contains("secret"));
        }
    }

    #[test]
    fn principal_reflects_hydrated_associations() {
        let now = Utc::now();
        let mut group = Group::new("ops", now);
        group.roles.push(Role::custom("EDITOR"));

        let mut user = User::new(OrgId::new(), "alice", "h", now);
        user.roles.push(Role::custom("ADMIN"));
        user.groups.push(group.to_grant());

        let principal = user.to_principal();
        assert_eq!(principal.org_id, user.org_id);
        assert_eq!(principal.roles.len(), 1);
        assert_eq!(principal.groups[0].roles[0].name, "EDITOR");
    }
}
