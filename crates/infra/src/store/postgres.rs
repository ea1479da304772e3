//! Postgres-backed store.
//!
//! ## Error Mapping
//!
//! | SQLx Error | PostgreSQL Error Code | StoreError |
//! |------------|----------------------|------------|
//! | Database (unique violation) | `23505` | `UniqueViolation` |
//! | Database (foreign key violation) | `23503` | `ForeignKey` |
//! | Database (other) | Any other | `Backend` |
//! | PoolClosed / RowNotFound / Other | N/A | `Backend` |
//!
//! ## Thread Safety
//!
//! `PostgresStore` is `Send + Sync`; all access goes through the SQLx pool.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Row, postgres::PgRow};
use tracing::instrument;
use uuid::Uuid;

use orgguard_accounts::{Group, Link, LinkOwner, Org, Task, User};
use orgguard_auth::{GroupGrant, Role};
use orgguard_core::{AccountStatus, GroupId, OrgId, RoleId, TaskId, UserId};

use super::{
    AssociationRepository, GroupRepository, OrgRepository, RoleRepository, StoreError, StoreResult,
    TaskRepository, UserRepository,
};

const SCHEMA: &str = include_str!("../../migrations/0001_accounts.sql");

#[derive(Debug, Clone)]
pub struct PostgresStore {
    pool: Arc<PgPool>,
}

impl PostgresStore {
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool: Arc::new(pool),
        }
    }

    /// Connect and apply the schema (idempotent).
    pub async fn connect(database_url: &str) -> StoreResult<Self> {
        let pool = PgPool::connect(database_url)
            .await
            .map_err(|e| map_sqlx_error("connect", e))?;
        let store = Self::new(pool);
        store.migrate().await?;
        Ok(store)
    }

    #[instrument(skip(self), err)]
    pub async fn migrate(&self) -> StoreResult<()> {
        sqlx::raw_sql(SCHEMA)
            .execute(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("migrate", e))?;
        Ok(())
    }

    async fn roles_via(&self, sql: &str, owner: Uuid) -> StoreResult<Vec<Role>> {
        let rows = sqlx::query(sql)
            .bind(owner)
            .fetch_all(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("load_roles", e))?;
        rows.iter().map(role_from_row).collect()
    }

    async fn group_roles(&self, group: GroupId) -> StoreResult<Vec<Role>> {
        self.roles_via(
            "SELECT r.id, r.name, r.kind FROM group_roles gr JOIN roles r ON r.id = gr.role_id \
             WHERE gr.group_id = $1 ORDER BY gr.seq",
            *group.as_uuid(),
        )
        .await
    }

    async fn hydrate_user(&self, mut user: User) -> StoreResult<User> {
        user.roles = self
            .roles_via(
                "SELECT r.id, r.name, r.kind FROM user_roles ur JOIN roles r ON r.id = ur.role_id \
                 WHERE ur.user_id = $1 ORDER BY ur.seq",
                *user.id.as_uuid(),
            )
            .await?;

        let rows = sqlx::query(
            "SELECT g.id, g.name FROM group_users gu JOIN groups g ON g.id = gu.group_id \
             WHERE gu.user_id = $1 ORDER BY gu.seq",
        )
        .bind(user.id.as_uuid())
        .fetch_all(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("load_user_groups", e))?;

        let mut groups = Vec::with_capacity(rows.len());
        for row in &rows {
            let id = GroupId::from_uuid(get(row, "id")?);
            groups.push(GroupGrant {
                id,
                name: get(row, "name")?,
                roles: self.group_roles(id).await?,
            });
        }
        user.groups = groups;
        Ok(user)
    }

    async fn hydrate_users(&self, rows: Vec<PgRow>) -> StoreResult<Vec<User>> {
        let mut users = Vec::with_capacity(rows.len());
        for row in &rows {
            users.push(self.hydrate_user(user_from_row(row)?).await?);
        }
        Ok(users)
    }

    async fn hydrate_group(&self, mut group: Group) -> StoreResult<Group> {
        group.roles = self.group_roles(group.id).await?;
        Ok(group)
    }

    async fn hydrate_task(&self, mut task: Task) -> StoreResult<Task> {
        task.roles = self
            .roles_via(
                "SELECT r.id, r.name, r.kind FROM task_roles tr JOIN roles r ON r.id = tr.role_id \
                 WHERE tr.task_id = $1 ORDER BY tr.seq",
                *task.id.as_uuid(),
            )
            .await?;
        Ok(task)
    }

    async fn delete_by_id(&self, operation: &str, sql: &str, id: Uuid) -> StoreResult<bool> {
        let result = sqlx::query(sql)
            .bind(id)
            .execute(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error(operation, e))?;
        Ok(result.rows_affected() > 0)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Orgs
// ─────────────────────────────────────────────────────────────────────────────

#[async_trait]
impl OrgRepository for PostgresStore {
    #[instrument(skip(self, org), fields(org_id = %org.id), err)]
    async fn insert_org(&self, org: &Org) -> StoreResult<()> {
        sqlx::query(
            "INSERT INTO orgs (id, username, email, password_hash, account_status, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7)",
        )
        .bind(org.id.as_uuid())
        .bind(&org.username)
        .bind(&org.email)
        .bind(&org.password_hash)
        .bind(org.status.as_str())
        .bind(org.created_at)
        .bind(org.updated_at)
        .execute(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("insert_org", e))?;
        Ok(())
    }

    #[instrument(skip(self, org), fields(org_id = %org.id), err)]
    async fn update_org(&self, org: &Org) -> StoreResult<()> {
        sqlx::query(
            "UPDATE orgs SET username = $2, email = $3, password_hash = $4, account_status = $5, \
             updated_at = $6 WHERE id = $1",
        )
        .bind(org.id.as_uuid())
        .bind(&org.username)
        .bind(&org.email)
        .bind(&org.password_hash)
        .bind(org.status.as_str())
        .bind(org.updated_at)
        .execute(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("update_org", e))?;
        Ok(())
    }

    #[instrument(skip(self, orgs), fields(count = orgs.len()), err)]
    async fn update_orgs(&self, orgs: &[Org]) -> StoreResult<()> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| map_sqlx_error("begin_transaction", e))?;

        for org in orgs {
            sqlx::query("UPDATE orgs SET account_status = $2, updated_at = $3 WHERE id = $1")
                .bind(org.id.as_uuid())
                .bind(org.status.as_str())
                .bind(org.updated_at)
                .execute(&mut *tx)
                .await
                .map_err(|e| map_sqlx_error("update_orgs", e))?;
        }

        tx.commit().await.map_err(|e| map_sqlx_error("commit", e))
    }

    async fn find_org(&self, id: OrgId) -> StoreResult<Option<Org>> {
        let row = sqlx::query("SELECT * FROM orgs WHERE id = $1")
            .bind(id.as_uuid())
            .fetch_optional(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("find_org", e))?;
        row.as_ref().map(org_from_row).transpose()
    }

    async fn find_org_by_email(&self, email: &str) -> StoreResult<Option<Org>> {
        let row = sqlx::query("SELECT * FROM orgs WHERE email = $1")
            .bind(email)
            .fetch_optional(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("find_org_by_email", e))?;
        row.as_ref().map(org_from_row).transpose()
    }

    #[instrument(skip(self), err)]
    async fn orgs_due(&self, status: AccountStatus, cutoff: DateTime<Utc>) -> StoreResult<Vec<Org>> {
        let rows = sqlx::query(
            "SELECT * FROM orgs WHERE account_status = $1 AND updated_at <= $2 ORDER BY created_at",
        )
        .bind(status.as_str())
        .bind(cutoff)
        .fetch_all(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("orgs_due", e))?;
        rows.iter().map(org_from_row).collect()
    }

    #[instrument(skip(self), err)]
    async fn delete_org(&self, id: OrgId) -> StoreResult<bool> {
        self.delete_by_id("delete_org", "DELETE FROM orgs WHERE id = $1", *id.as_uuid())
            .await
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Users
// ─────────────────────────────────────────────────────────────────────────────

#[async_trait]
impl UserRepository for PostgresStore {
    #[instrument(skip(self, user), fields(user_id = %user.id, org_id = %user.org_id), err)]
    async fn insert_user(&self, user: &User) -> StoreResult<()> {
        sqlx::query(
            "INSERT INTO users (id, org_id, username, password_hash, account_status, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7)",
        )
        .bind(user.id.as_uuid())
        .bind(user.org_id.as_uuid())
        .bind(&user.username)
        .bind(&user.password_hash)
        .bind(user.status.as_str())
        .bind(user.created_at)
        .bind(user.updated_at)
        .execute(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("insert_user", e))?;
        Ok(())
    }

    #[instrument(skip(self, user), fields(user_id = %user.id), err)]
    async fn update_user(&self, user: &User) -> StoreResult<()> {
        sqlx::query(
            "UPDATE users SET username = $2, password_hash = $3, account_status = $4, updated_at = $5 \
             WHERE id = $1",
        )
        .bind(user.id.as_uuid())
        .bind(&user.username)
        .bind(&user.password_hash)
        .bind(user.status.as_str())
        .bind(user.updated_at)
        .execute(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("update_user", e))?;
        Ok(())
    }

    async fn find_user(&self, id: UserId) -> StoreResult<Option<User>> {
        let row = sqlx::query("SELECT * FROM users WHERE id = $1")
            .bind(id.as_uuid())
            .fetch_optional(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("find_user", e))?;
        match row {
            Some(row) => Ok(Some(self.hydrate_user(user_from_row(&row)?).await?)),
            None => Ok(None),
        }
    }

    async fn find_user_by_username(&self, org_id: OrgId, username: &str) -> StoreResult<Option<User>> {
        let row = sqlx::query("SELECT * FROM users WHERE org_id = $1 AND username = $2")
            .bind(org_id.as_uuid())
            .bind(username)
            .fetch_optional(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("find_user_by_username", e))?;
        match row {
            Some(row) => Ok(Some(self.hydrate_user(user_from_row(&row)?).await?)),
            None => Ok(None),
        }
    }

    async fn list_users(&self, org_id: OrgId) -> StoreResult<Vec<User>> {
        let rows = sqlx::query("SELECT * FROM users WHERE org_id = $1 ORDER BY created_at, id")
            .bind(org_id.as_uuid())
            .fetch_all(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("list_users", e))?;
        self.hydrate_users(rows).await
    }

    #[instrument(skip(self), err)]
    async fn users_due(&self, status: AccountStatus, cutoff: DateTime<Utc>) -> StoreResult<Vec<User>> {
        let rows = sqlx::query(
            "SELECT * FROM users WHERE account_status = $1 AND updated_at <= $2 ORDER BY created_at, id",
        )
        .bind(status.as_str())
        .bind(cutoff)
        .fetch_all(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("users_due", e))?;
        self.hydrate_users(rows).await
    }

    #[instrument(skip(self), err)]
    async fn delete_user(&self, id: UserId) -> StoreResult<bool> {
        self.delete_by_id("delete_user", "DELETE FROM users WHERE id = $1", *id.as_uuid())
            .await
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Catalog
// ─────────────────────────────────────────────────────────────────────────────

#[async_trait]
impl RoleRepository for PostgresStore {
    async fn insert_role(&self, role: &Role) -> StoreResult<()> {
        sqlx::query("INSERT INTO roles (id, name, kind) VALUES ($1, $2, $3)")
            .bind(role.id.as_uuid())
            .bind(&role.name)
            .bind(&role.kind)
            .execute(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("insert_role", e))?;
        Ok(())
    }

    async fn find_role(&self, id: RoleId) -> StoreResult<Option<Role>> {
        let row = sqlx::query("SELECT id, name, kind FROM roles WHERE id = $1")
            .bind(id.as_uuid())
            .fetch_optional(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("find_role", e))?;
        row.as_ref().map(role_from_row).transpose()
    }

    async fn find_role_by_name(&self, name: &str) -> StoreResult<Option<Role>> {
        let row = sqlx::query("SELECT id, name, kind FROM roles WHERE name = $1")
            .bind(name)
            .fetch_optional(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("find_role_by_name", e))?;
        row.as_ref().map(role_from_row).transpose()
    }

    async fn list_roles(&self) -> StoreResult<Vec<Role>> {
        let rows = sqlx::query("SELECT id, name, kind FROM roles ORDER BY id")
            .fetch_all(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("list_roles", e))?;
        rows.iter().map(role_from_row).collect()
    }

    #[instrument(skip(self), err)]
    async fn delete_role(&self, id: RoleId) -> StoreResult<bool> {
        self.delete_by_id("delete_role", "DELETE FROM roles WHERE id = $1", *id.as_uuid())
            .await
    }
}

#[async_trait]
impl GroupRepository for PostgresStore {
    async fn insert_group(&self, group: &Group) -> StoreResult<()> {
        sqlx::query("INSERT INTO groups (id, name, created_at, updated_at) VALUES ($1, $2, $3, $4)")
            .bind(group.id.as_uuid())
            .bind(&group.name)
            .bind(group.created_at)
            .bind(group.updated_at)
            .execute(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("insert_group", e))?;
        Ok(())
    }

    async fn find_group(&self, id: GroupId) -> StoreResult<Option<Group>> {
        let row = sqlx::query("SELECT * FROM groups WHERE id = $1")
            .bind(id.as_uuid())
            .fetch_optional(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("find_group", e))?;
        match row {
            Some(row) => Ok(Some(self.hydrate_group(group_from_row(&row)?).await?)),
            None => Ok(None),
        }
    }

    async fn find_group_by_name(&self, name: &str) -> StoreResult<Option<Group>> {
        let row = sqlx::query("SELECT * FROM groups WHERE name = $1")
            .bind(name)
            .fetch_optional(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("find_group_by_name", e))?;
        match row {
            Some(row) => Ok(Some(self.hydrate_group(group_from_row(&row)?).await?)),
            None => Ok(None),
        }
    }

    async fn list_groups(&self) -> StoreResult<Vec<Group>> {
        let rows = sqlx::query("SELECT * FROM groups ORDER BY created_at, id")
            .fetch_all(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("list_groups", e))?;
        let mut groups = Vec::with_capacity(rows.len());
        for row in &rows {
            groups.push(self.hydrate_group(group_from_row(row)?).await?);
        }
        Ok(groups)
    }

    #[instrument(skip(self), err)]
    async fn delete_group(&self, id: GroupId) -> StoreResult<bool> {
        self.delete_by_id("delete_group", "DELETE FROM groups WHERE id = $1", *id.as_uuid())
            .await
    }
}

#[async_trait]
impl TaskRepository for PostgresStore {
    async fn insert_task(&self, task: &Task) -> StoreResult<()> {
        sqlx::query("INSERT INTO tasks (id, name, created_at, updated_at) VALUES ($1, $2, $3, $4)")
            .bind(task.id.as_uuid())
            .bind(&task.name)
            .bind(task.created_at)
            .bind(task.updated_at)
            .execute(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("insert_task", e))?;
        Ok(())
    }

    async fn find_task(&self, id: TaskId) -> StoreResult<Option<Task>> {
        let row = sqlx::query("SELECT * FROM tasks WHERE id = $1")
            .bind(id.as_uuid())
            .fetch_optional(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("find_task", e))?;
        match row {
            Some(row) => Ok(Some(self.hydrate_task(task_from_row(&row)?).await?)),
            None => Ok(None),
        }
    }

    async fn find_task_by_name(&self, name: &str) -> StoreResult<Option<Task>> {
        let row = sqlx::query("SELECT * FROM tasks WHERE name = $1")
            .bind(name)
            .fetch_optional(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("find_task_by_name", e))?;
        match row {
            Some(row) => Ok(Some(self.hydrate_task(task_from_row(&row)?).await?)),
            None => Ok(None),
        }
    }

    async fn list_tasks(&self) -> StoreResult<Vec<Task>> {
        let rows = sqlx::query("SELECT * FROM tasks ORDER BY created_at, id")
            .fetch_all(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("list_tasks", e))?;
        let mut tasks = Vec::with_capacity(rows.len());
        for row in &rows {
            tasks.push(self.hydrate_task(task_from_row(row)?).await?);
        }
        Ok(tasks)
    }

    #[instrument(skip(self), err)]
    async fn delete_task(&self, id: TaskId) -> StoreResult<bool> {
        self.delete_by_id("delete_task", "DELETE FROM tasks WHERE id = $1", *id.as_uuid())
            .await
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Associations
// ─────────────────────────────────────────────────────────────────────────────

/// (table, left column, right column, left id, right id)
fn link_row(link: Link) -> (&'static str, &'static str, &'static str, Uuid, Uuid) {
    match link {
        Link::UserRole(u, r) => ("user_roles", "user_id", "role_id", u.into(), r.into()),
        Link::GroupRole(g, r) => ("group_roles", "group_id", "role_id", g.into(), r.into()),
        Link::TaskRole(t, r) => ("task_roles", "task_id", "role_id", t.into(), r.into()),
        Link::UserGroup(u, g) => ("group_users", "user_id", "group_id", u.into(), g.into()),
    }
}

/// Every (table, column) that can reference `owner`.
fn owner_refs(owner: LinkOwner) -> (&'static [(&'static str, &'static str)], Uuid) {
    match owner {
        LinkOwner::User(id) => (&[("user_roles", "user_id"), ("group_users", "user_id")], id.into()),
        LinkOwner::Role(id) => (
            &[("user_roles", "role_id"), ("group_roles", "role_id"), ("task_roles", "role_id")],
            id.into(),
        ),
        LinkOwner::Group(id) => (&[("group_roles", "group_id"), ("group_users", "group_id")], id.into()),
        LinkOwner::Task(id) => (&[("task_roles", "task_id")], id.into()),
    }
}

#[async_trait]
impl AssociationRepository for PostgresStore {
    #[instrument(skip(self), err)]
    async fn append_link(&self, link: Link) -> StoreResult<()> {
        let (table, left, right, a, b) = link_row(link);
        sqlx::query(&format!("INSERT INTO {table} ({left}, {right}) VALUES ($1, $2)"))
            .bind(a)
            .bind(b)
            .execute(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("append_link", e))?;
        Ok(())
    }

    #[instrument(skip(self), err)]
    async fn delete_link(&self, link: Link) -> StoreResult<bool> {
        let (table, left, right, a, b) = link_row(link);
        let result = sqlx::query(&format!("DELETE FROM {table} WHERE {left} = $1 AND {right} = $2"))
            .bind(a)
            .bind(b)
            .execute(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("delete_link", e))?;
        Ok(result.rows_affected() > 0)
    }

    #[instrument(skip(self), err)]
    async fn clear_links(&self, owner: LinkOwner) -> StoreResult<u64> {
        let (refs, id) = owner_refs(owner);
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| map_sqlx_error("begin_transaction", e))?;

        let mut cleared = 0;
        for (table, column) in refs {
            let result = sqlx::query(&format!("DELETE FROM {table} WHERE {column} = $1"))
                .bind(id)
                .execute(&mut *tx)
                .await
                .map_err(|e| map_sqlx_error("clear_links", e))?;
            cleared += result.rows_affected();
        }

        tx.commit().await.map_err(|e| map_sqlx_error("commit", e))?;
        Ok(cleared)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Row mapping
// ─────────────────────────────────────────────────────────────────────────────

fn get<'r, T>(row: &'r PgRow, column: &str) -> StoreResult<T>
where
    T: sqlx::Decode<'r, sqlx::Postgres> + sqlx::Type<sqlx::Postgres>,
{
    row.try_get(column)
        .map_err(|e| StoreError::Backend(format!("failed to decode column {column}: {e}")))
}

fn status(row: &PgRow) -> StoreResult<AccountStatus> {
    let raw: String = get(row, "account_status")?;
    raw.parse()
        .map_err(|e| StoreError::Backend(format!("bad account_status: {e}")))
}

fn org_from_row(row: &PgRow) -> StoreResult<Org> {
    Ok(Org {
        id: OrgId::from_uuid(get(row, "id")?),
        username: get(row, "username")?,
        email: get(row, "email")?,
        password_hash: get(row, "password_hash")?,
        status: status(row)?,
        created_at: get(row, "created_at")?,
        updated_at: get(row, "updated_at")?,
    })
}

fn user_from_row(row: &PgRow) -> StoreResult<User> {
    Ok(User {
        id: UserId::from_uuid(get(row, "id")?),
        org_id: OrgId::from_uuid(get(row, "org_id")?),
        username: get(row, "username")?,
        password_hash: get(row, "password_hash")?,
        status: status(row)?,
        created_at: get(row, "created_at")?,
        updated_at: get(row, "updated_at")?,
        roles: Vec::new(),
        groups: Vec::new(),
    })
}

fn role_from_row(row: &PgRow) -> StoreResult<Role> {
    Ok(Role {
        id: RoleId::from_uuid(get(row, "id")?),
        name: get(row, "name")?,
        kind: get(row, "kind")?,
    })
}

fn group_from_row(row: &PgRow) -> StoreResult<Group> {
    Ok(Group {
        id: GroupId::from_uuid(get(row, "id")?),
        name: get(row, "name")?,
        created_at: get(row, "created_at")?,
        updated_at: get(row, "updated_at")?,
        roles: Vec::new(),
    })
}

fn task_from_row(row: &PgRow) -> StoreResult<Task> {
    Ok(Task {
        id: TaskId::from_uuid(get(row, "id")?),
        name: get(row, "name")?,
        created_at: get(row, "created_at")?,
        updated_at: get(row, "updated_at")?,
        roles: Vec::new(),
    })
}

/// Map SQLx errors to `StoreError`.
fn map_sqlx_error(operation: &str, err: sqlx::Error) -> StoreError {
    match err {
        sqlx::Error::Database(db_err) => {
            let msg = format!("database error in {}: {}", operation, db_err.message());
            match db_err.code().as_deref() {
                Some("23505") => StoreError::UniqueViolation(unique_message(db_err.constraint())),
                Some("23503") => StoreError::ForeignKey(msg),
                _ => StoreError::Backend(msg),
            }
        }
        sqlx::Error::PoolClosed => {
            StoreError::Backend(format!("connection pool closed in {}", operation))
        }
        other => StoreError::Backend(format!("{} failed: {}", operation, other)),
    }
}

/// Caller-facing wording for a unique violation, keyed by constraint name.
fn unique_message(constraint: Option<&str>) -> String {
    match constraint {
        Some("orgs_email_key") => "Email already in use",
        Some("users_org_id_username_key") => "Username already in use",
        Some("roles_name_key") => "Role already exists",
        Some("groups_name_key") => "Group already exists",
        Some("tasks_name_key") => "Task already exists",
        _ => "Already exists",
    }
    .to_string()
}
