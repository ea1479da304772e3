//! Association vocabulary for membership operations.
//!
//! An [`Association`] is what a caller asks for (parent and child may be named
//! by id or by unique name); a [`Link`] is the resolved join row the store
//! appends or deletes.

use serde::{Deserialize, Serialize};

use orgguard_core::{DomainError, DomainResult, GroupId, RoleId, TaskId, UserId};

/// Reference to an entity by identity or by its unique name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Lookup<I> {
    Id(I),
    Name(String),
}

impl<I> Lookup<I> {
    /// Exactly one of `id` / `name` must be present.
    ///
    /// `what` is the entity label used in the error ("Role", "Group", ...).
    pub fn from_parts(id: Option<I>, name: Option<String>, what: &str) -> DomainResult<Self> {
        let name = name.filter(|n| !n.trim().is_empty());
        match (id, name) {
            (Some(id), None) => Ok(Self::Id(id)),
            (None, Some(name)) => Ok(Self::Name(name)),
            (None, None) => Err(DomainError::bad_request(format!(
                "{what} ID or {what} Name is required"
            ))),
            (Some(_), Some(_)) => Err(DomainError::bad_request(format!(
                "provide either {what} ID or {what} Name, not both"
            ))),
        }
    }
}

impl<I: core::fmt::Display> core::fmt::Display for Lookup<I> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Lookup::Id(id) => write!(f, "id {id}"),
            Lookup::Name(name) => write!(f, "name '{name}'"),
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssociationKind {
    RoleToUser,
    RoleToGroup,
    RoleToTask,
    GroupToUser,
}

impl AssociationKind {
    pub fn parent_label(&self) -> &'static str {
        match self {
            Self::RoleToUser | Self::GroupToUser => "User",
            Self::RoleToGroup => "Group",
            Self::RoleToTask => "Task",
        }
    }

    pub fn child_label(&self) -> &'static str {
        match self {
            Self::GroupToUser => "group",
            _ => "role",
        }
    }

    pub fn already_associated(&self) -> DomainError {
        DomainError::already_associated(format!(
            "{} already has the {}",
            self.parent_label(),
            self.child_label()
        ))
    }

    pub fn not_associated(&self) -> DomainError {
        DomainError::not_associated(format!(
            "{} does not have the {}",
            self.parent_label(),
            self.child_label()
        ))
    }
}

/// An association request: parent plus child, each not yet resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Association {
    RoleToUser { user: UserId, role: Lookup<RoleId> },
    RoleToGroup { group: Lookup<GroupId>, role: Lookup<RoleId> },
    RoleToTask { task: Lookup<TaskId>, role: Lookup<RoleId> },
    GroupToUser { user: UserId, group: Lookup<GroupId> },
}

impl Association {
    pub fn kind(&self) -> AssociationKind {
        match self {
            Self::RoleToUser { .. } => AssociationKind::RoleToUser,
            Self::RoleToGroup { .. } => AssociationKind::RoleToGroup,
            Self::RoleToTask { .. } => AssociationKind::RoleToTask,
            Self::GroupToUser { .. } => AssociationKind::GroupToUser,
        }
    }
}

/// A resolved many-to-many join row.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Link {
    UserRole(UserId, RoleId),
    GroupRole(GroupId, RoleId),
    TaskRole(TaskId, RoleId),
    UserGroup(UserId, GroupId),
}

impl Link {
    pub fn kind(&self) -> AssociationKind {
        match self {
            Self::UserRole(..) => AssociationKind::RoleToUser,
            Self::GroupRole(..) => AssociationKind::RoleToGroup,
            Self::TaskRole(..) => AssociationKind::RoleToTask,
            Self::UserGroup(..) => AssociationKind::GroupToUser,
        }
    }

    /// Does this join row reference `owner` on either side?
    pub fn touches(&self, owner: LinkOwner) -> bool {
        match (*self, owner) {
            (Self::UserRole(u, _), LinkOwner::User(o)) => u == o,
            (Self::UserGroup(u, _), LinkOwner::User(o)) => u == o,
            (Self::UserRole(_, r), LinkOwner::Role(o)) => r == o,
            (Self::GroupRole(_, r), LinkOwner::Role(o)) => r == o,
            (Self::TaskRole(_, r), LinkOwner::Role(o)) => r == o,
            (Self::GroupRole(g, _), LinkOwner::Group(o)) => g == o,
            (Self::UserGroup(_, g), LinkOwner::Group(o)) => g == o,
            (Self::TaskRole(t, _), LinkOwner::Task(o)) => t == o,
            _ => false,
        }
    }
}

/// An entity whose join rows must be cleared before it is removed.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum LinkOwner {
    User(UserId),
    Role(RoleId),
    Group(GroupId),
    Task(TaskId),
}

/// Precondition for `add`: the child must not already be linked.
pub fn ensure_absent(linked: bool, kind: AssociationKind) -> DomainResult<()> {
    if linked {
        return Err(kind.already_associated());
    }
    Ok(())
}

/// Precondition for `remove`: the child must be linked.
pub fn ensure_present(linked: bool, kind: AssociationKind) -> DomainResult<()> {
    if !linked {
        return Err(kind.not_associated());
    }
    Ok(())
}
