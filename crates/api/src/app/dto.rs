use serde::Deserialize;

use orgguard_accounts::Lookup;
use orgguard_core::{DomainResult, GroupId, OrgId, RoleId, TaskId};
use orgguard_infra::{NewUser, PasswordChange, SignUp};

// -------------------------
// Auth
// -------------------------

#[derive(Debug, Deserialize)]
pub struct SignUpRequest {
    pub username: String,
    pub email: String,
    pub password: String,
    pub confirm_password: String,
}

impl From<SignUpRequest> for SignUp {
    fn from(r: SignUpRequest) -> Self {
        SignUp {
            username: r.username,
            email: r.email,
            password: r.password,
            confirm_password: r.confirm_password,
        }
    }
}

/// Org sign-in and credential-based reactivation.
#[derive(Debug, Deserialize)]
pub struct OrgCredentials {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct UserCredentials {
    pub org_id: OrgId,
    pub username: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct PasswordRequest {
    pub password: String,
    pub confirm_password: String,
}

impl From<PasswordRequest> for PasswordChange {
    fn from(r: PasswordRequest) -> Self {
        PasswordChange {
            password: r.password,
            confirm_password: r.confirm_password,
        }
    }
}

// -------------------------
// Users
// -------------------------

#[derive(Debug, Deserialize)]
pub struct CreateUserRequest {
    pub username: String,
    pub password: Option<String>,
    pub confirm_password: Option<String>,
}

impl From<CreateUserRequest> for NewUser {
    fn from(r: CreateUserRequest) -> Self {
        NewUser {
            username: r.username,
            password: r.password,
            confirm_password: r.confirm_password,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct UpdateUserRequest {
    pub username: String,
}

// -------------------------
// Catalog
// -------------------------

#[derive(Debug, Deserialize)]
pub struct CreateRoleRequest {
    pub name: String,
    #[serde(default)]
    pub kind: Option<String>,
}

/// Groups and tasks share this shape.
#[derive(Debug, Deserialize)]
pub struct CreateGuardedRequest {
    pub name: String,
    #[serde(default)]
    pub role_ids: Vec<RoleId>,
}

// -------------------------
// Id-or-name references
// -------------------------

#[derive(Debug, Default, Deserialize)]
pub struct RoleRef {
    pub role_id: Option<RoleId>,
    pub role_name: Option<String>,
}

impl RoleRef {
    pub fn lookup(self) -> DomainResult<Lookup<RoleId>> {
        Lookup::from_parts(self.role_id, self.role_name, "Role")
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct GroupRef {
    pub group_id: Option<GroupId>,
    pub group_name: Option<String>,
}

impl GroupRef {
    pub fn lookup(self) -> DomainResult<Lookup<GroupId>> {
        Lookup::from_parts(self.group_id, self.group_name, "Group")
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct TaskRef {
    pub task_id: Option<TaskId>,
    pub task_name: Option<String>,
}

impl TaskRef {
    pub fn lookup(self) -> DomainResult<Lookup<TaskId>> {
        Lookup::from_parts(self.task_id, self.task_name, "Task")
    }
}

#[derive(Debug, Deserialize)]
pub struct GroupRoleRequest {
    #[serde(flatten)]
    pub group: GroupRef,
    #[serde(flatten)]
    pub role: RoleRef,
}

#[derive(Debug, Deserialize)]
pub struct TaskRoleRequest {
    #[serde(flatten)]
    pub task: TaskRef,
    #[serde(flatten)]
    pub role: RoleRef,
}
