use std::collections::HashSet;

use thiserror::Error;

use orgguard_core::{GroupId, OrgId, RoleId};

use crate::{GroupGrant, Principal, Role, UserPrincipal};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthzError {
    #[error("tenant mismatch")]
    TenantMismatch,

    #[error("forbidden: requires one of [{0}]")]
    Forbidden(String),
}

/// Direct roles followed by group-inherited roles, deduplicated by role
/// identity. First occurrence wins, so a role held directly keeps its
/// position even when a group grants it too.
///
/// Two distinct roles that happen to share a label are both kept.
pub fn effective_roles(user: &UserPrincipal) -> Vec<Role> {
    let mut seen: HashSet<RoleId> = HashSet::new();
    user.roles
        .iter()
        .chain(user.groups.iter().flat_map(|g| g.roles.iter()))
        .filter(|role| seen.insert(role.id))
        .cloned()
        .collect()
}

fn effective_role_ids(user: &UserPrincipal) -> HashSet<RoleId> {
    user.roles
        .iter()
        .chain(user.groups.iter().flat_map(|g| g.roles.iter()))
        .map(|role| role.id)
        .collect()
}

/// Does the principal hold any of `required`?
///
/// Org principals are root-equivalent inside their tenant and always pass.
/// Never fails; callers turn `false` into a forbidden response.
pub fn is_authorized(principal: &Principal, required: &[Role]) -> bool {
    match principal {
        Principal::Org(_) => true,
        Principal::User(user) => {
            let held = effective_role_ids(user);
            required.iter().any(|role| held.contains(&role.id))
        }
    }
}

/// Authorize a principal for an action inside `tenant`.
///
/// - No IO
/// - No panics
/// - Tenant boundary first, then the capability intersection
pub fn authorize(principal: &Principal, tenant: OrgId, required: &[Role]) -> Result<(), AuthzError> {
    if principal.tenant_id() != tenant {
        return Err(AuthzError::TenantMismatch);
    }

    if is_authorized(principal, required) {
        Ok(())
    } else {
        let names: Vec<&str> = required.iter().map(|r| r.name.as_str()).collect();
        Err(AuthzError::Forbidden(names.join(", ")))
    }
}

/// Membership test within a single group's own role list (no inheritance).
pub fn group_has_role(group: &GroupGrant, role: RoleId) -> bool {
    group.roles.iter().any(|r| r.id == role)
}

/// Resource-level check: may this principal use a task guarded by
/// `task_roles`? Same effective-role computation as [`is_authorized`].
pub fn task_authorized(principal: &Principal, task_roles: &[Role]) -> bool {
    is_authorized(principal, task_roles)
}

pub fn user_has_group(user: &UserPrincipal, group: GroupId) -> bool {
    user.groups.iter().any(|g| g.id == group)
}
