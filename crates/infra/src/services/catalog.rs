//! Roles, groups and tasks. The catalog is global: names are unique across
//! all tenants.

use std::sync::Arc;

use tracing::info;

use orgguard_accounts::{Group, LinkOwner, Link, Lookup, Task};
use orgguard_auth::{
    Capability, Principal, Role, roles::required, task_authorized, user_has_group,
};
use orgguard_core::{Clock, DomainError, DomainResult, GroupId, RoleId, TaskId};

use crate::policy::AccessPolicy;
use crate::store::{
    AssociationRepository, GroupRepository, RoleRepository, SharedStore, Store, TaskRepository,
    resolve_group, resolve_role, resolve_task,
};

/// Insert one `system` role per built-in capability that is not present yet.
/// Returns how many were created.
pub async fn seed_capability_roles(store: &dyn Store) -> DomainResult<usize> {
    let mut created = 0;
    for cap in Capability::ALL {
        if store.find_role_by_name(cap.as_str()).await?.is_none() {
            store
                .insert_role(&Role::new(RoleId::new(), cap.as_str(), Role::KIND_SYSTEM))
                .await?;
            created += 1;
        }
    }
    if created > 0 {
        info!(created, "seeded capability roles");
    }
    Ok(created)
}

/// Capability labels belong to the seeded system roles.
fn is_capability_label(name: &str) -> bool {
    Capability::ALL
        .iter()
        .any(|cap| cap.as_str().eq_ignore_ascii_case(name))
}

fn required_name(name: &str, what: &str) -> DomainResult<String> {
    let name = name.trim();
    if name.is_empty() {
        return Err(DomainError::validation(format!("{what} name is required")));
    }
    Ok(name.to_string())
}

#[derive(Clone)]
pub struct CatalogService {
    store: SharedStore,
    policy: AccessPolicy,
    clock: Arc<dyn Clock>,
}

impl CatalogService {
    pub fn new(store: SharedStore, policy: AccessPolicy, clock: Arc<dyn Clock>) -> Self {
        Self {
            store,
            policy,
            clock,
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Roles
    // ─────────────────────────────────────────────────────────────────────────

    pub async fn create_role(
        &self,
        principal: &Principal,
        name: &str,
        kind: Option<String>,
    ) -> DomainResult<Role> {
        self.policy.require(principal, required::ROLES_WRITE).await?;
        let name = required_name(name, "Role")?;
        if is_capability_label(&name) {
            return Err(DomainError::conflict("Role name is reserved"));
        }
        let kind = kind
            .filter(|k| !k.trim().is_empty())
            .unwrap_or_else(|| Role::KIND_CUSTOM.to_string());
        if kind.trim().eq_ignore_ascii_case(Role::KIND_SYSTEM) {
            return Err(DomainError::validation("Role kind 'system' is reserved"));
        }

        let role = Role::new(RoleId::new(), name, kind);
        self.store.insert_role(&role).await?;
        info!(role_id = %role.id, name = %role.name, "role created");
        Ok(role)
    }

    pub async fn list_roles(&self, principal: &Principal) -> DomainResult<Vec<Role>> {
        self.policy.require(principal, required::ROLES_READ).await?;
        Ok(self.store.list_roles().await?)
    }

    pub async fn get_role(&self, principal: &Principal, id: RoleId) -> DomainResult<Role> {
        self.policy.require(principal, required::ROLES_READ).await?;
        resolve_role(self.store.as_ref(), &Lookup::Id(id)).await
    }

    /// Removes every user/group/task link to the role, then the role.
    /// Seeded capability roles are shared by every tenant and stay put.
    pub async fn delete_role(&self, principal: &Principal, id: RoleId) -> DomainResult<Role> {
        self.policy.require(principal, required::ROLES_WRITE).await?;
        let role = resolve_role(self.store.as_ref(), &Lookup::Id(id)).await?;
        if role.kind == Role::KIND_SYSTEM || is_capability_label(&role.name) {
            return Err(DomainError::forbidden("System roles cannot be deleted"));
        }
        let cleared = self.store.clear_links(LinkOwner::Role(id)).await?;
        self.store.delete_role(id).await?;
        info!(role_id = %id, links = cleared, "role deleted");
        Ok(role)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Groups
    // ─────────────────────────────────────────────────────────────────────────

    pub async fn create_group(
        &self,
        principal: &Principal,
        name: &str,
        role_ids: &[RoleId],
    ) -> DomainResult<Group> {
        self.policy.require(principal, required::GROUPS_WRITE).await?;
        let name = required_name(name, "Group")?;
        let roles = self.known_roles(role_ids).await?;

        let group = Group::new(name, self.clock.now());
        self.store.insert_group(&group).await?;
        for role in &roles {
            self.store.append_link(Link::GroupRole(group.id, role.id)).await?;
        }
        info!(group_id = %group.id, roles = roles.len(), "group created");
        resolve_group(self.store.as_ref(), &Lookup::Id(group.id)).await
    }

    pub async fn list_groups(&self, principal: &Principal) -> DomainResult<Vec<Group>> {
        self.policy.require(principal, required::GROUPS_READ).await?;
        Ok(self.store.list_groups().await?)
    }

    pub async fn get_group(&self, principal: &Principal, id: GroupId) -> DomainResult<Group> {
        self.policy.require(principal, required::GROUPS_READ).await?;
        resolve_group(self.store.as_ref(), &Lookup::Id(id)).await
    }

    pub async fn delete_group(&self, principal: &Principal, id: GroupId) -> DomainResult<Group> {
        self.policy.require(principal, required::GROUPS_WRITE).await?;
        let group = resolve_group(self.store.as_ref(), &Lookup::Id(id)).await?;
        let cleared = self.store.clear_links(LinkOwner::Group(id)).await?;
        self.store.delete_group(id).await?;
        info!(group_id = %id, links = cleared, "group deleted");
        Ok(group)
    }

    /// Does the principal belong to the group? Orgs always do.
    pub async fn group_check(&self, principal: &Principal, group: &Lookup<GroupId>) -> DomainResult<bool> {
        let group = resolve_group(self.store.as_ref(), group).await?;
        Ok(match principal {
            Principal::Org(_) => true,
            Principal::User(user) => user_has_group(user, group.id),
        })
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Tasks
    // ─────────────────────────────────────────────────────────────────────────

    pub async fn create_task(
        &self,
        principal: &Principal,
        name: &str,
        role_ids: &[RoleId],
    ) -> DomainResult<Task> {
        self.policy.require(principal, required::TASKS_WRITE).await?;
        let name = required_name(name, "Task")?;
        let roles = self.known_roles(role_ids).await?;

        let task = Task::new(name, self.clock.now());
        self.store.insert_task(&task).await?;
        for role in &roles {
            self.store.append_link(Link::TaskRole(task.id, role.id)).await?;
        }
        info!(task_id = %task.id, roles = roles.len(), "task created");
        resolve_task(self.store.as_ref(), &Lookup::Id(task.id)).await
    }

    pub async fn list_tasks(&self, principal: &Principal) -> DomainResult<Vec<Task>> {
        self.policy.require(principal, required::TASKS_READ).await?;
        Ok(self.store.list_tasks().await?)
    }

    pub async fn get_task(&self, principal: &Principal, id: TaskId) -> DomainResult<Task> {
        self.policy.require(principal, required::TASKS_READ).await?;
        resolve_task(self.store.as_ref(), &Lookup::Id(id)).await
    }

    pub async fn delete_task(&self, principal: &Principal, id: TaskId) -> DomainResult<Task> {
        self.policy.require(principal, required::TASKS_WRITE).await?;
        let task = resolve_task(self.store.as_ref(), &Lookup::Id(id)).await?;
        let cleared = self.store.clear_links(LinkOwner::Task(id)).await?;
        self.store.delete_task(id).await?;
        info!(task_id = %id, links = cleared, "task deleted");
        Ok(task)
    }

    /// May the principal use the task? Same effective-role rule as endpoint
    /// checks, tested against the task's own roles.
    pub async fn task_check(&self, principal: &Principal, task: &Lookup<TaskId>) -> DomainResult<bool> {
        let task = resolve_task(self.store.as_ref(), task).await?;
        Ok(task_authorized(principal, &task.roles))
    }

    /// All ids must exist; duplicates collapse.
    async fn known_roles(&self, ids: &[RoleId]) -> DomainResult<Vec<Role>> {
        let mut roles: Vec<Role> = Vec::with_capacity(ids.len());
        for id in ids {
            if roles.iter().any(|r| r.id == *id) {
                continue;
            }
            match self.store.find_role(*id).await? {
                Some(role) => roles.push(role),
                None => return Err(DomainError::validation("Invalid Role IDs")),
            }
        }
        Ok(roles)
    }
}

#[cfg(test)]
mod tests {
    use orgguard_accounts::Association;

    use super::*;
    use crate::services::testing::{Harness, grant};

    #[tokio::test]
    async fn seeding_is_idempotent() {
        let h = Harness::new().await;
        assert_eq!(seed_capability_roles(h.store.as_ref()).await.unwrap(), 0);
        let roles = h.store.list_roles().await.unwrap();
        assert_eq!(roles.len(), Capability::ALL.len());
        assert!(roles.iter().all(|r| r.kind == Role::KIND_SYSTEM));
    }

    #[tokio::test]
    async fn role_names_are_unique() {
        let h = Harness::new().await;
        let svc = h.catalog();
        let org = h.org_principal();

        let role = svc.create_role(&org, "EDITOR", None).await.unwrap();
        assert_eq!(role.kind, Role::KIND_CUSTOM);

        let err = svc.create_role(&org, "EDITOR", None).await.unwrap_err();
        assert_eq!(err, DomainError::Conflict("Role already exists".into()));

        let err = svc.create_role(&org, "   ", None).await.unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
    }

    #[tokio::test]
    async fn capability_roles_cannot_be_deleted_or_shadowed() {
        let h = Harness::new().await;
        let reader = h.user("alice").await;
        grant(&h, &reader, "USER_READ_ACCESS").await;
        let original = h.role_id("USER_READ_ACCESS").await;

        // Another tenant's org passes the ROLES_WRITE check.
        let other = Harness::with_store(h.store.clone(), h.clock.clone(), "globex").await;
        let svc = other.catalog();
        let err = svc.delete_role(&other.org_principal(), original).await.unwrap_err();
        assert_eq!(err, DomainError::Forbidden("System roles cannot be deleted".into()));

        let err = svc
            .create_role(&other.org_principal(), "user_read_access", None)
            .await
            .unwrap_err();
        assert_eq!(err, DomainError::Conflict("Role name is reserved".into()));

        let err = svc
            .create_role(&other.org_principal(), "AUDITOR", Some("system".into()))
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));

        assert_eq!(h.role_id("USER_READ_ACCESS").await, original);
        h.directory()
            .list_users(&h.user_principal(&reader).await)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn group_with_unknown_role_ids_is_rejected() {
        let h = Harness::new().await;
        let svc = h.catalog();
        let known = h.role_id("GROUP_READ_ACCESS").await;

        let err = svc
            .create_group(&h.org_principal(), "ops", &[known, RoleId::new()])
            .await
            .unwrap_err();
        assert_eq!(err, DomainError::Validation("Invalid Role IDs".into()));
        assert!(h.store.find_group_by_name("ops").await.unwrap().is_none());

        let group = svc.create_group(&h.org_principal(), "ops", &[known, known]).await.unwrap();
        assert_eq!(group.roles.len(), 1);
    }

    #[tokio::test]
    async fn deleting_a_role_unlinks_it_everywhere() {
        let h = Harness::new().await;
        let svc = h.catalog();
        let org = h.org_principal();
        let user = h.user("alice").await;

        let role = svc.create_role(&org, "EDITOR", None).await.unwrap();
        let group = svc.create_group(&org, "ops", &[role.id]).await.unwrap();
        let task = svc.create_task(&org, "export", &[role.id]).await.unwrap();
        h.store.append_link(Link::UserRole(user.id, role.id)).await.unwrap();

        svc.delete_role(&org, role.id).await.unwrap();

        assert_eq!(h.store.link_count(LinkOwner::Role(role.id)), 0);
        assert!(svc.get_group(&org, group.id).await.unwrap().roles.is_empty());
        assert!(svc.get_task(&org, task.id).await.unwrap().roles.is_empty());
        assert_eq!(svc.get_role(&org, role.id).await.unwrap_err(), DomainError::NotFound("Role".into()));
    }

    #[tokio::test]
    async fn catalog_reads_need_a_read_capability() {
        let h = Harness::new().await;
        let user = h.user("bob").await;

        let err = h.catalog().list_roles(&h.user_principal(&user).await).await.unwrap_err();
        assert!(matches!(err, DomainError::Forbidden(_)));

        grant(&h, &user, "ROLE_READ_ACCESS").await;
        h.catalog().list_roles(&h.user_principal(&user).await).await.unwrap();
    }

    #[tokio::test]
    async fn task_check_uses_effective_roles() {
        let h = Harness::new().await;
        let org = h.org_principal();
        let svc = h.catalog();
        let user = h.user("alice").await;

        let editor = svc.create_role(&org, "EDITOR", None).await.unwrap();
        let task = svc.create_task(&org, "export", &[editor.id]).await.unwrap();
        let group = svc.create_group(&org, "editors", &[editor.id]).await.unwrap();
        let by_name = Lookup::Name("export".to_string());

        assert!(svc.task_check(&org, &by_name).await.unwrap());
        assert!(!svc.task_check(&h.user_principal(&user).await, &by_name).await.unwrap());

        h.membership()
            .add(&org, Association::GroupToUser { user: user.id, group: Lookup::Id(group.id) })
            .await
            .unwrap();
        let p = h.user_principal(&user).await;
        assert!(svc.task_check(&p, &Lookup::Id(task.id)).await.unwrap());
        assert!(svc.group_check(&p, &Lookup::Name("editors".into())).await.unwrap());
    }
}
