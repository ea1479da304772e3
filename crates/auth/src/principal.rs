use serde::{Deserialize, Serialize};

use orgguard_core::{AccountStatus, GroupId, OrgId, UserId};

use crate::Role;

/// A group membership as carried on a user principal: the group's identity
/// plus the roles the group grants.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupGrant {
    pub id: GroupId,
    pub name: String,
    pub roles: Vec<Role>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrgPrincipal {
    pub id: OrgId,
    pub status: AccountStatus,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserPrincipal {
    pub id: UserId,
    pub org_id: OrgId,
    pub username: String,
    pub roles: Vec<Role>,
    pub groups: Vec<GroupGrant>,
    pub status: AccountStatus,
}

/// A fully resolved caller identity.
///
/// Construction of this object is intentionally decoupled from storage and
/// transport: the identity resolver builds it from a verified token and the
/// account tables, and everything downstream matches on it exhaustively.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Principal {
    Org(OrgPrincipal),
    User(UserPrincipal),
}

impl Principal {
    /// The org this principal acts within.
    pub fn tenant_id(&self) -> OrgId {
        match self {
            Principal::Org(org) => org.id,
            Principal::User(user) => user.org_id,
        }
    }

    pub fn status(&self) -> AccountStatus {
        match self {
            Principal::Org(org) => org.status,
            Principal::User(user) => user.status,
        }
    }

    /// Token subject for this principal.
    pub fn subject(&self) -> uuid::Uuid {
        match self {
            Principal::Org(org) => *org.id.as_uuid(),
            Principal::User(user) => *user.id.as_uuid(),
        }
    }

    pub fn as_user(&self) -> Option<&UserPrincipal> {
        match self {
            Principal::User(user) => Some(user),
            Principal::Org(_) => None,
        }
    }
}
