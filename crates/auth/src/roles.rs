use serde::{Deserialize, Serialize};

use orgguard_core::RoleId;

/// A role as seen by the authorization engine.
///
/// The `id` is the identity used for every comparison; `name` is a unique
/// label and `kind` a free-form classifier (`system` for built-in capability
/// roles, `custom` otherwise).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Role {
    pub id: RoleId,
    pub name: String,
    pub kind: String,
}

impl Role {
    pub const KIND_SYSTEM: &'static str = "system";
    pub const KIND_CUSTOM: &'static str = "custom";

    pub fn new(id: RoleId, name: impl Into<String>, kind: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            kind: kind.into(),
        }
    }

    pub fn custom(name: impl Into<String>) -> Self {
        Self::new(RoleId::new(), name, Self::KIND_CUSTOM)
    }
}

/// Built-in capability names.
///
/// Each capability is backed by a seeded `system` role of the same name; the
/// enum only provides the label, the role id is looked up at runtime.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Capability {
    OrgFullAccess,
    OrgWriteAccess,
    OrgReadAccess,
    UserFullAccess,
    UserWriteAccess,
    UserReadAccess,
    RoleFullAccess,
    RoleWriteAccess,
    RoleReadAccess,
    GroupFullAccess,
    GroupWriteAccess,
    GroupReadAccess,
    TasksFullAccess,
    TasksWriteAccess,
    TasksReadAccess,
}

impl Capability {
    pub const ALL: [Capability; 15] = [
        Self::OrgFullAccess,
        Self::OrgWriteAccess,
        Self::OrgReadAccess,
        Self::UserFullAccess,
        Self::UserWriteAccess,
        Self::UserReadAccess,
        Self::RoleFullAccess,
        Self::RoleWriteAccess,
        Self::RoleReadAccess,
        Self::GroupFullAccess,
        Self::GroupWriteAccess,
        Self::GroupReadAccess,
        Self::TasksFullAccess,
        Self::TasksWriteAccess,
        Self::TasksReadAccess,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::OrgFullAccess => "ORG_FULL_ACCESS",
            Self::OrgWriteAccess => "ORG_WRITE_ACCESS",
            Self::OrgReadAccess => "ORG_READ_ACCESS",
            Self::UserFullAccess => "USER_FULL_ACCESS",
            Self::UserWriteAccess => "USER_WRITE_ACCESS",
            Self::UserReadAccess => "USER_READ_ACCESS",
            Self::RoleFullAccess => "ROLE_FULL_ACCESS",
            Self::RoleWriteAccess => "ROLE_WRITE_ACCESS",
            Self::RoleReadAccess => "ROLE_READ_ACCESS",
            Self::GroupFullAccess => "GROUP_FULL_ACCESS",
            Self::GroupWriteAccess => "GROUP_WRITE_ACCESS",
            Self::GroupReadAccess => "GROUP_READ_ACCESS",
            Self::TasksFullAccess => "TASKS_FULL_ACCESS",
            Self::TasksWriteAccess => "TASKS_WRITE_ACCESS",
            Self::TasksReadAccess => "TASKS_READ_ACCESS",
        }
    }
}

impl core::fmt::Display for Capability {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Endpoint requirements
// ─────────────────────────────────────────────────────────────────────────────

/// Capability sets required per operation family. A principal needs any one.
pub mod required {
    use super::Capability::{self, *};

    pub const USERS_READ: &[Capability] = &[
        UserReadAccess,
        UserWriteAccess,
        UserFullAccess,
        OrgReadAccess,
        OrgWriteAccess,
        OrgFullAccess,
    ];
    pub const USERS_WRITE: &[Capability] =
        &[UserWriteAccess, UserFullAccess, OrgWriteAccess, OrgFullAccess];
    pub const USERS_DELETE: &[Capability] = &[UserFullAccess, OrgWriteAccess, OrgFullAccess];

    pub const ROLES_READ: &[Capability] = &[
        RoleReadAccess,
        RoleWriteAccess,
        RoleFullAccess,
        OrgReadAccess,
        OrgWriteAccess,
        OrgFullAccess,
    ];
    pub const ROLES_WRITE: &[Capability] =
        &[RoleWriteAccess, RoleFullAccess, OrgWriteAccess, OrgFullAccess];

    pub const GROUPS_READ: &[Capability] = &[
        GroupReadAccess,
        GroupWriteAccess,
        GroupFullAccess,
        OrgReadAccess,
        OrgWriteAccess,
        OrgFullAccess,
    ];
    pub const GROUPS_WRITE: &[Capability] =
        &[GroupWriteAccess, GroupFullAccess, OrgWriteAccess, OrgFullAccess];

    pub const TASKS_READ: &[Capability] = &[
        TasksReadAccess,
        TasksWriteAccess,
        TasksFullAccess,
        OrgReadAccess,
        OrgWriteAccess,
        OrgFullAccess,
    ];
    pub const TASKS_WRITE: &[Capability] =
        &[TasksWriteAccess, TasksFullAccess, OrgWriteAccess, OrgFullAccess];

    /// Org-level credentials (password of the org account).
    pub const ORG_WRITE: &[Capability] = &[OrgWriteAccess, OrgFullAccess];

    /// Deactivating the whole org account.
    pub const ORG_ADMIN: &[Capability] = &[OrgFullAccess];
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    #[test]
    fn capability_names_are_unique_and_match_serde() {
        let names: HashSet<&str> = Capability::ALL.iter().map(|c| c.as_str()).collect();
        assert_eq!(names.len(), Capability::ALL.len());

        for cap in Capability::ALL {
            let json = serde_json::to_string(&cap).unwrap();
            assert_eq!(json, format!("\"{}\"", cap.as_str()));
        }
    }

    #[test]
    fn full_org_access_satisfies_every_requirement() {
        for set in [
            required::USERS_READ,
            required::USERS_WRITE,
            required::USERS_DELETE,
            required::ROLES_READ,
            required::ROLES_WRITE,
            required::GROUPS_READ,
            required::GROUPS_WRITE,
            required::TASKS_READ,
            required::TASKS_WRITE,
            required::ORG_ADMIN,
        ] {
            assert!(set.contains(&Capability::OrgFullAccess));
        }
    }
}
