//! In-memory store.
//!
//! Intended for tests/dev. Mirrors the relational schema closely enough that
//! ordering bugs show up here too: join rows behave like foreign keys without
//! cascade, so removing a row that is still referenced fails.

use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use orgguard_accounts::{Group, Link, LinkOwner, Org, Task, User};
use orgguard_auth::{GroupGrant, Role};
use orgguard_core::{AccountStatus, GroupId, OrgId, RoleId, TaskId, UserId};

use super::{
    AssociationRepository, GroupRepository, OrgRepository, RoleRepository, StoreError, StoreResult,
    TaskRepository, UserRepository,
};

#[derive(Debug, Default)]
struct Tables {
    orgs: HashMap<OrgId, Org>,
    users: HashMap<UserId, User>,
    roles: HashMap<RoleId, Role>,
    groups: HashMap<GroupId, Group>,
    tasks: HashMap<TaskId, Task>,
    /// Join rows in insertion order; hydrated lists follow this order.
    links: Vec<Link>,
}

impl Tables {
    fn role_list(&self, ids: impl Iterator<Item = RoleId>) -> Vec<Role> {
        ids.filter_map(|id| self.roles.get(&id).cloned()).collect()
    }

    fn group_roles(&self, group: GroupId) -> Vec<Role> {
        self.role_list(self.links.iter().filter_map(|l| match l {
            Link::GroupRole(g, r) if *g == group => Some(*r),
            _ => None,
        }))
    }

    fn hydrate_group(&self, group: &Group) -> Group {
        let mut group = group.clone();
        group.roles = self.group_roles(group.id);
        group
    }

    fn hydrate_task(&self, task: &Task) -> Task {
        let mut task = task.clone();
        task.roles = self.role_list(self.links.iter().filter_map(|l| match l {
            Link::TaskRole(t, r) if *t == task.id => Some(*r),
            _ => None,
        }));
        task
    }

    fn hydrate_user(&self, user: &User) -> User {
        let mut user = user.clone();
        user.roles = self.role_list(self.links.iter().filter_map(|l| match l {
            Link::UserRole(u, r) if *u == user.id => Some(*r),
            _ => None,
        }));
        user.groups = self
            .links
            .iter()
            .filter_map(|l| match l {
                Link::UserGroup(u, g) if *u == user.id => self.groups.get(g),
                _ => None,
            })
            .map(|g| GroupGrant {
                id: g.id,
                name: g.name.clone(),
                roles: self.group_roles(g.id),
            })
            .collect();
        user
    }

    fn link_ends_exist(&self, link: &Link) -> bool {
        match *link {
            Link::UserRole(u, r) => self.users.contains_key(&u) && self.roles.contains_key(&r),
            Link::GroupRole(g, r) => self.groups.contains_key(&g) && self.roles.contains_key(&r),
            Link::TaskRole(t, r) => self.tasks.contains_key(&t) && self.roles.contains_key(&r),
            Link::UserGroup(u, g) => self.users.contains_key(&u) && self.groups.contains_key(&g),
        }
    }

    fn ensure_unreferenced(&self, owner: LinkOwner) -> StoreResult<()> {
        let refs = self.links.iter().filter(|l| l.touches(owner)).count();
        if refs > 0 {
            return Err(StoreError::ForeignKey(format!(
                "{owner:?} is still referenced by {refs} association row(s)"
            )));
        }
        Ok(())
    }
}

#[derive(Debug, Default)]
pub struct InMemoryStore {
    tables: RwLock<Tables>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of join rows referencing `owner`.
    pub fn link_count(&self, owner: LinkOwner) -> usize {
        let t = self.tables.read().unwrap();
        t.links.iter().filter(|l| l.touches(owner)).count()
    }
}

fn sorted_by_creation<T, K: Ord>(mut items: Vec<T>, key: impl Fn(&T) -> K) -> Vec<T> {
    items.sort_by_key(|item| key(item));
    items
}

#[async_trait]
impl OrgRepository for InMemoryStore {
    async fn insert_org(&self, org: &Org) -> StoreResult<()> {
        let mut t = self.tables.write().unwrap();
        if t.orgs.values().any(|o| o.email == org.email) {
            return Err(StoreError::UniqueViolation("Email already in use".to_string()));
        }
        t.orgs.insert(org.id, org.clone());
        Ok(())
    }

    async fn update_org(&self, org: &Org) -> StoreResult<()> {
        let mut t = self.tables.write().unwrap();
        match t.orgs.get_mut(&org.id) {
            Some(existing) => {
                *existing = org.clone();
                Ok(())
            }
            None => Err(StoreError::Backend(format!("org {} does not exist", org.id))),
        }
    }

    async fn update_orgs(&self, orgs: &[Org]) -> StoreResult<()> {
        let mut t = self.tables.write().unwrap();
        if let Some(missing) = orgs.iter().find(|o| !t.orgs.contains_key(&o.id)) {
            return Err(StoreError::Backend(format!("org {} does not exist", missing.id)));
        }
        for org in orgs {
            t.orgs.insert(org.id, org.clone());
        }
        Ok(())
    }

    async fn find_org(&self, id: OrgId) -> StoreResult<Option<Org>> {
        Ok(self.tables.read().unwrap().orgs.get(&id).cloned())
    }

    async fn find_org_by_email(&self, email: &str) -> StoreResult<Option<Org>> {
        let t = self.tables.read().unwrap();
        Ok(t.orgs.values().find(|o| o.email == email).cloned())
    }

    async fn orgs_due(&self, status: AccountStatus, cutoff: DateTime<Utc>) -> StoreResult<Vec<Org>> {
        let t = self.tables.read().unwrap();
        let due = t
            .orgs
            .values()
            .filter(|o| o.status == status && o.updated_at <= cutoff)
            .cloned()
            .collect();
        Ok(sorted_by_creation(due, |o: &Org| o.created_at))
    }

    async fn delete_org(&self, id: OrgId) -> StoreResult<bool> {
        let mut t = self.tables.write().unwrap();
        let members = t.users.values().filter(|u| u.org_id == id).count();
        if members > 0 {
            return Err(StoreError::ForeignKey(format!(
                "org {id} still owns {members} user(s)"
            )));
        }
        Ok(t.orgs.remove(&id).is_some())
    }
}

#[async_trait]
impl UserRepository for InMemoryStore {
    async fn insert_user(&self, user: &User) -> StoreResult<()> {
        let mut t = self.tables.write().unwrap();
        if !t.orgs.contains_key(&user.org_id) {
            return Err(StoreError::ForeignKey(format!("org {} does not exist", user.org_id)));
        }
        if t
            .users
            .values()
            .any(|u| u.org_id == user.org_id && u.username == user.username)
        {
            return Err(StoreError::UniqueViolation("Username already in use".to_string()));
        }
        let mut row = user.clone();
        row.roles.clear();
        row.groups.clear();
        t.users.insert(row.id, row);
        Ok(())
    }

    async fn update_user(&self, user: &User) -> StoreResult<()> {
        let mut t = self.tables.write().unwrap();
        if t
            .users
            .values()
            .any(|u| u.id != user.id && u.org_id == user.org_id && u.username == user.username)
        {
            return Err(StoreError::UniqueViolation("Username already in use".to_string()));
        }
        match t.users.get_mut(&user.id) {
            Some(existing) => {
                existing.username = user.username.clone();
                existing.password_hash = user.password_hash.clone();
                existing.status = user.status;
                existing.updated_at = user.updated_at;
                Ok(())
            }
            None => Err(StoreError::Backend(format!("user {} does not exist", user.id))),
        }
    }

    async fn find_user(&self, id: UserId) -> StoreResult<Option<User>> {
        let t = self.tables.read().unwrap();
        Ok(t.users.get(&id).map(|u| t.hydrate_user(u)))
    }

    async fn find_user_by_username(&self, org_id: OrgId, username: &str) -> StoreResult<Option<User>> {
        let t = self.tables.read().unwrap();
        Ok(t
            .users
            .values()
            .find(|u| u.org_id == org_id && u.username == username)
            .map(|u| t.hydrate_user(u)))
    }

    async fn list_users(&self, org_id: OrgId) -> StoreResult<Vec<User>> {
        let t = self.tables.read().unwrap();
        let users = t
            .users
            .values()
            .filter(|u| u.org_id == org_id)
            .map(|u| t.hydrate_user(u))
            .collect();
        Ok(sorted_by_creation(users, |u: &User| (u.created_at, u.id)))
    }

    async fn users_due(&self, status: AccountStatus, cutoff: DateTime<Utc>) -> StoreResult<Vec<User>> {
        let t = self.tables.read().unwrap();
        let users = t
            .users
            .values()
            .filter(|u| u.status == status && u.updated_at <= cutoff)
            .map(|u| t.hydrate_user(u))
            .collect();
        Ok(sorted_by_creation(users, |u: &User| (u.created_at, u.id)))
    }

    async fn delete_user(&self, id: UserId) -> StoreResult<bool> {
        let mut t = self.tables.write().unwrap();
        t.ensure_unreferenced(LinkOwner::User(id))?;
        Ok(t.users.remove(&id).is_some())
    }
}

#[async_trait]
impl RoleRepository for InMemoryStore {
    async fn insert_role(&self, role: &Role) -> StoreResult<()> {
        let mut t = self.tables.write().unwrap();
        if t.roles.values().any(|r| r.name == role.name) {
            return Err(StoreError::UniqueViolation("Role already exists".to_string()));
        }
        t.roles.insert(role.id, role.clone());
        Ok(())
    }

    async fn find_role(&self, id: RoleId) -> StoreResult<Option<Role>> {
        Ok(self.tables.read().unwrap().roles.get(&id).cloned())
    }

    async fn find_role_by_name(&self, name: &str) -> StoreResult<Option<Role>> {
        let t = self.tables.read().unwrap();
        Ok(t.roles.values().find(|r| r.name == name).cloned())
    }

    async fn list_roles(&self) -> StoreResult<Vec<Role>> {
        let t = self.tables.read().unwrap();
        let roles = t.roles.values().cloned().collect();
        Ok(sorted_by_creation(roles, |r: &Role| r.id))
    }

    async fn delete_role(&self, id: RoleId) -> StoreResult<bool> {
        let mut t = self.tables.write().unwrap();
        t.ensure_unreferenced(LinkOwner::Role(id))?;
        Ok(t.roles.remove(&id).is_some())
    }
}

#[async_trait]
impl GroupRepository for InMemoryStore {
    async fn insert_group(&self, group: &Group) -> StoreResult<()> {
        let mut t = self.tables.write().unwrap();
        if t.groups.values().any(|g| g.name == group.name) {
            return Err(StoreError::UniqueViolation("Group already exists".to_string()));
        }
        let mut row = group.clone();
        row.roles.clear();
        t.groups.insert(row.id, row);
        Ok(())
    }

    async fn find_group(&self, id: GroupId) -> StoreResult<Option<Group>> {
        let t = self.tables.read().unwrap();
        Ok(t.groups.get(&id).map(|g| t.hydrate_group(g)))
    }

    async fn find_group_by_name(&self, name: &str) -> StoreResult<Option<Group>> {
        let t = self.tables.read().unwrap();
        Ok(t.groups.values().find(|g| g.name == name).map(|g| t.hydrate_group(g)))
    }

    async fn list_groups(&self) -> StoreResult<Vec<Group>> {
        let t = self.tables.read().unwrap();
        let groups = t.groups.values().map(|g| t.hydrate_group(g)).collect();
        Ok(sorted_by_creation(groups, |g: &Group| (g.created_at, g.id)))
    }

    async fn delete_group(&self, id: GroupId) -> StoreResult<bool> {
        let mut t = self.tables.write().unwrap();
        t.ensure_unreferenced(LinkOwner::Group(id))?;
        Ok(t.groups.remove(&id).is_some())
    }
}

#[async_trait]
impl TaskRepository for InMemoryStore {
    async fn insert_task(&self, task: &Task) -> StoreResult<()> {
        let mut t = self.tables.write().unwrap();
        if t.tasks.values().any(|x| x.name == task.name) {
            return Err(StoreError::UniqueViolation("Task already exists".to_string()));
        }
        let mut row = task.clone();
        row.roles.clear();
        t.tasks.insert(row.id, row);
        Ok(())
    }

    async fn find_task(&self, id: TaskId) -> StoreResult<Option<Task>> {
        let t = self.tables.read().unwrap();
        Ok(t.tasks.get(&id).map(|x| t.hydrate_task(x)))
    }

    async fn find_task_by_name(&self, name: &str) -> StoreResult<Option<Task>> {
        let t = self.tables.read().unwrap();
        Ok(t.tasks.values().find(|x| x.name == name).map(|x| t.hydrate_task(x)))
    }

    async fn list_tasks(&self) -> StoreResult<Vec<Task>> {
        let t = self.tables.read().unwrap();
        let tasks = t.tasks.values().map(|x| t.hydrate_task(x)).collect();
        Ok(sorted_by_creation(tasks, |x: &Task| (x.created_at, x.id)))
    }

    async fn delete_task(&self, id: TaskId) -> StoreResult<bool> {
        let mut t = self.tables.write().unwrap();
        t.ensure_unreferenced(LinkOwner::Task(id))?;
        Ok(t.tasks.remove(&id).is_some())
    }
}

#[async_trait]
impl AssociationRepository for InMemoryStore {
    async fn append_link(&self, link: Link) -> StoreResult<()> {
        let mut t = self.tables.write().unwrap();
        if !t.link_ends_exist(&link) {
            return Err(StoreError::ForeignKey(format!("{link:?} references a missing row")));
        }
        if t.links.contains(&link) {
            return Err(StoreError::UniqueViolation(format!("{link:?} already exists")));
        }
        t.links.push(link);
        Ok(())
    }

    async fn delete_link(&self, link: Link) -> StoreResult<bool> {
        let mut t = self.tables.write().unwrap();
        let before = t.links.len();
        t.links.retain(|l| *l != link);
        Ok(t.links.len() != before)
    }

    async fn clear_links(&self, owner: LinkOwner) -> StoreResult<u64> {
        let mut t = self.tables.write().unwrap();
        let before = t.links.len();
        t.links.retain(|l| !l.touches(owner));
        Ok((before - t.links.len()) as u64)
    }
}
