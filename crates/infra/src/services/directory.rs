//! Account onboarding, sign-in and credentials.
//!
//! Sign-in failures are deliberately vague: unknown account, deleted account
//! and wrong password all produce [`DomainError::InvalidCredentials`].

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{info, warn};
use uuid::Uuid;

use orgguard_accounts::{Org, User, reactivate};
use orgguard_auth::{
    PasswordHasher, Principal, TokenIssuer, generate_password, roles::required,
    validate_password_policy,
};
use orgguard_core::{AccountStatus, Clock, DomainError, DomainResult, OrgId, UserId};

use crate::policy::AccessPolicy;
use crate::services::AccountRecord;
use crate::store::{OrgRepository, SharedStore, UserRepository, require_org, require_user};

#[derive(Debug, Clone)]
pub struct SignUp {
    pub username: String,
    pub email: String,
    pub password: String,
    pub confirm_password: String,
}

#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    /// Generated when absent.
    pub password: Option<String>,
    pub confirm_password: Option<String>,
}

#[derive(Debug, Clone)]
pub struct PasswordChange {
    pub password: String,
    pub confirm_password: String,
}

/// An issued access token and who it was issued to.
#[derive(Debug, Clone, Serialize)]
pub struct Session {
    pub token: String,
    pub expires_at: DateTime<Utc>,
    pub principal: Principal,
}

#[derive(Debug, Clone, Serialize)]
pub struct CreatedUser {
    pub user: User,
    /// Only set when the password was generated; shown once.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub passcode: Option<String>,
}

#[derive(Clone)]
pub struct DirectoryService {
    store: SharedStore,
    policy: AccessPolicy,
    hasher: Arc<dyn PasswordHasher>,
    issuer: Arc<dyn TokenIssuer>,
    clock: Arc<dyn Clock>,
}

impl DirectoryService {
    pub fn new(
        store: SharedStore,
        policy: AccessPolicy,
        hasher: Arc<dyn PasswordHasher>,
        issuer: Arc<dyn TokenIssuer>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            store,
            policy,
            hasher,
            issuer,
            clock,
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Org accounts
    // ─────────────────────────────────────────────────────────────────────────

    pub async fn sign_up_org(&self, req: SignUp) -> DomainResult<Org> {
        let username = req.username.trim();
        if username.is_empty() {
            return Err(DomainError::validation("Username is required"));
        }
        let email = normalize_email(&req.email)?;
        check_new_password(&req.password, &req.confirm_password)?;

        if let Some(existing) = self.store.find_org_by_email(&email).await? {
            return Err(if existing.status == AccountStatus::Deleted {
                DomainError::conflict("Email cannot be used. Contact support.")
            } else {
                DomainError::conflict("Email already in use")
            });
        }

        let hash = self.hasher.hash(&req.password)?;
        let org = Org::new(username, email, hash, self.clock.now());
        self.store.insert_org(&org).await?;
        info!(org_id = %org.id, "org signed up");
        Ok(org)
    }

    pub async fn sign_in_org(&self, email: &str, password: &str) -> DomainResult<Session> {
        let org = self.authenticate_org(email, password).await?;
        if org.status == AccountStatus::Deactivated {
            return Err(DomainError::AccountDeactivated);
        }
        self.session(org.id.into(), Principal::Org(org.to_principal()))
    }

    /// Deactivated orgs cannot authenticate, so this is their way back: prove
    /// the credentials and the org is moved to Activated.
    pub async fn reactivate_org(&self, email: &str, password: &str) -> DomainResult<Org> {
        let mut org = self.authenticate_org(email, password).await?;
        reactivate(&mut org, self.clock.now())?;
        self.store.update_org(&org).await?;
        info!(org_id = %org.id, "org reactivated by credentials");
        Ok(org)
    }

    pub async fn sign_in_user(&self, org_id: OrgId, username: &str, password: &str) -> DomainResult<Session> {
        let org = self
            .store
            .find_org(org_id)
            .await?
            .filter(|o| o.status != AccountStatus::Deleted)
            .ok_or(DomainError::InvalidCredentials)?;

        let user = self
            .store
            .find_user_by_username(org.id, &username.trim().to_lowercase())
            .await?
            .filter(|u| u.status != AccountStatus::Deleted)
            .ok_or(DomainError::InvalidCredentials)?;

        if !self.hasher.verify(&user.password_hash, password)? {
            return Err(DomainError::InvalidCredentials);
        }
        if org.status == AccountStatus::Deactivated || user.status == AccountStatus::Deactivated {
            return Err(DomainError::AccountDeactivated);
        }
        self.session(user.id.into(), Principal::User(user.to_principal()))
    }

    pub async fn change_org_password(
        &self,
        principal: &Principal,
        org_id: OrgId,
        change: PasswordChange,
    ) -> DomainResult<()> {
        let mut org = require_org(self.store.as_ref(), org_id).await?;
        self.policy
            .require_in(principal, org.id, required::ORG_WRITE)
            .await?;
        ensure_active(org.status)?;
        org.password_hash = self.replacement_hash(&org.password_hash, &change)?;
        org.updated_at = self.clock.now();
        self.store.update_org(&org).await?;
        info!(org_id = %org.id, "org password changed");
        Ok(())
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Users
    // ─────────────────────────────────────────────────────────────────────────

    /// Creates a user in the principal's own org. Usernames are unique per
    /// org and stored lower-case.
    pub async fn create_user(&self, principal: &Principal, req: NewUser) -> DomainResult<CreatedUser> {
        let tenant = principal.tenant_id();
        self.policy
            .require_in(principal, tenant, required::USERS_WRITE)
            .await?;

        let username = normalize_username(&req.username)?;
        let (password, passcode) = match req.password {
            Some(password) => {
                check_new_password(&password, req.confirm_password.as_deref().unwrap_or_default())?;
                (password, None)
            }
            None => {
                let generated = generate_password();
                (generated.clone(), Some(generated))
            }
        };

        if self.store.find_user_by_username(tenant, &username).await?.is_some() {
            return Err(DomainError::conflict("Username already in use"));
        }

        let user = User::new(tenant, username, self.hasher.hash(&password)?, self.clock.now());
        self.store.insert_user(&user).await?;
        info!(user_id = %user.id, org_id = %tenant, generated = passcode.is_some(), "user created");
        Ok(CreatedUser { user, passcode })
    }

    pub async fn change_user_password(
        &self,
        principal: &Principal,
        id: UserId,
        change: PasswordChange,
    ) -> DomainResult<()> {
        let mut user = require_user(self.store.as_ref(), id).await?;
        self.policy
            .require_in(principal, user.org_id, required::USERS_WRITE)
            .await?;
        ensure_active(user.status)?;
        user.password_hash = self.replacement_hash(&user.password_hash, &change)?;
        user.updated_at = self.clock.now();
        self.store.update_user(&user).await?;
        info!(user_id = %user.id, "user password changed");
        Ok(())
    }

    pub async fn rename_user(&self, principal: &Principal, id: UserId, username: &str) -> DomainResult<User> {
        let mut user = require_user(self.store.as_ref(), id).await?;
        self.policy
            .require_in(principal, user.org_id, required::USERS_WRITE)
            .await?;
        ensure_active(user.status)?;

        let username = normalize_username(username)?;
        if username == user.username {
            return Ok(user);
        }
        if self
            .store
            .find_user_by_username(user.org_id, &username)
            .await?
            .is_some()
        {
            return Err(DomainError::conflict("Username already in use"));
        }

        user.username = username;
        user.updated_at = self.clock.now();
        self.store.update_user(&user).await?;
        Ok(user)
    }

    pub async fn list_users(&self, principal: &Principal) -> DomainResult<Vec<User>> {
        let tenant = principal.tenant_id();
        self.policy
            .require_in(principal, tenant, required::USERS_READ)
            .await?;
        Ok(self.store.list_users(tenant).await?)
    }

    /// A user may always read itself.
    pub async fn get_user(&self, principal: &Principal, id: UserId) -> DomainResult<User> {
        let user = require_user(self.store.as_ref(), id).await?;
        let is_self = principal.as_user().is_some_and(|p| p.id == user.id);
        if !is_self {
            self.policy
                .require_in(principal, user.org_id, required::USERS_READ)
                .await?;
        }
        Ok(user)
    }

    pub async fn me(&self, principal: &Principal) -> DomainResult<AccountRecord> {
        match principal {
            Principal::Org(org) => Ok(AccountRecord::Org(require_org(self.store.as_ref(), org.id).await?)),
            Principal::User(user) => {
                Ok(AccountRecord::User(require_user(self.store.as_ref(), user.id).await?))
            }
        }
    }

    // ─────────────────────────────────────────────────────────────────────────

    /// Credentials check shared by sign-in and reactivation. Does not look at
    /// Deactivated; callers decide.
    async fn authenticate_org(&self, email: &str, password: &str) -> DomainResult<Org> {
        let org = self
            .store
            .find_org_by_email(&email.trim().to_lowercase())
            .await?
            .filter(|o| o.status != AccountStatus::Deleted)
            .ok_or(DomainError::InvalidCredentials)?;

        if !self.hasher.verify(&org.password_hash, password)? {
            warn!(org_id = %org.id, "org sign-in with wrong password");
            return Err(DomainError::InvalidCredentials);
        }
        Ok(org)
    }

    fn session(&self, subject: Uuid, principal: Principal) -> DomainResult<Session> {
        let now = self.clock.now();
        Ok(Session {
            token: self.issuer.issue(subject, now)?,
            expires_at: now + self.issuer.ttl(),
            principal,
        })
    }

    fn replacement_hash(&self, current: &str, change: &PasswordChange) -> DomainResult<String> {
        check_new_password(&change.password, &change.confirm_password)?;
        if self.hasher.verify(current, &change.password)? {
            return Err(DomainError::validation(
                "New password must be different from the old password",
            ));
        }
        self.hasher.hash(&change.password)
    }
}

fn check_new_password(password: &str, confirm: &str) -> DomainResult<()> {
    if password != confirm {
        return Err(DomainError::validation("Passwords do not match"));
    }
    validate_password_policy(password)
}

fn ensure_active(status: AccountStatus) -> DomainResult<()> {
    if status == AccountStatus::Activated {
        Ok(())
    } else {
        Err(DomainError::forbidden("Account is deactivated"))
    }
}

fn normalize_email(email: &str) -> DomainResult<String> {
    let email = email.trim().to_lowercase();
    match email.split_once('@') {
        Some((local, domain)) if !local.is_empty() && domain.contains('.') => Ok(email),
        _ => Err(DomainError::validation("Invalid email address")),
    }
}

fn normalize_username(username: &str) -> DomainResult<String> {
    let username = username.trim().to_lowercase();
    if username.is_empty() {
        return Err(DomainError::validation("Username is required"));
    }
    Ok(username)
}

#[cfg(test)]
mod tests {
    use chrono::Duration;

    use super::*;
    use crate::services::testing::{Harness, PASSWORD, grant};

    fn signup(email: &str) -> SignUp {
        SignUp {
            username: "Acme".into(),
            email: email.into(),
            password: PASSWORD.into(),
            confirm_password: PASSWORD.into(),
        }
    }

    fn change(to: &str) -> PasswordChange {
        PasswordChange {
            password: to.into(),
            confirm_password: to.into(),
        }
    }

    #[tokio::test]
    async fn sign_up_normalizes_email_and_rejects_duplicates() {
        let h = Harness::new().await;
        let dir = h.directory();

        let org = dir.sign_up_org(signup("Owner@Globex.Test")).await.unwrap();
        assert_eq!(org.email, "owner@globex.test");
        assert_eq!(org.status, AccountStatus::Activated);

        let err = dir.sign_up_org(signup("owner@globex.test")).await.unwrap_err();
        assert_eq!(err, DomainError::Conflict("Email already in use".into()));
    }

    #[tokio::test]
    async fn deleted_org_email_cannot_be_reused() {
        let h = Harness::new().await;
        let mut org = h.directory().sign_up_org(signup("gone@globex.test")).await.unwrap();
        org.status = AccountStatus::Deleted;
        h.store.update_org(&org).await.unwrap();

        let err = h.directory().sign_up_org(signup("gone@globex.test")).await.unwrap_err();
        assert_eq!(err, DomainError::Conflict("Email cannot be used. Contact support.".into()));
    }

    #[tokio::test]
    async fn sign_up_enforces_password_rules() {
        let h = Harness::new().await;
        let mut req = signup("x@globex.test");
        req.confirm_password = "Different1!".into();
        assert!(matches!(h.directory().sign_up_org(req).await, Err(DomainError::Validation(_))));

        let mut req = signup("x@globex.test");
        req.password = "weakpass".into();
        req.confirm_password = "weakpass".into();
        assert!(matches!(h.directory().sign_up_org(req).await, Err(DomainError::Validation(_))));
    }

    #[tokio::test]
    async fn org_sign_in_is_vague_and_respects_status() {
        let h = Harness::new().await;
        let dir = h.directory();
        let org = dir.sign_up_org(signup("root@globex.test")).await.unwrap();

        let session = dir.sign_in_org("ROOT@globex.test", PASSWORD).await.unwrap();
        assert_eq!(session.expires_at, h.clock.now() + Duration::hours(24));
        assert!(matches!(session.principal, Principal::Org(ref p) if p.id == org.id));

        assert_eq!(
            dir.sign_in_org("root@globex.test", "Wrong-pass1!").await.unwrap_err(),
            DomainError::InvalidCredentials
        );
        assert_eq!(
            dir.sign_in_org("nobody@globex.test", PASSWORD).await.unwrap_err(),
            DomainError::InvalidCredentials
        );

        h.lifecycle()
            .delete(&Principal::Org(org.to_principal()), crate::services::EntityKind::Org, org.id.into())
            .await
            .unwrap();
        assert_eq!(
            dir.sign_in_org("root@globex.test", PASSWORD).await.unwrap_err(),
            DomainError::AccountDeactivated
        );

        let back = dir.reactivate_org("root@globex.test", PASSWORD).await.unwrap();
        assert_eq!(back.status, AccountStatus::Activated);
        dir.sign_in_org("root@globex.test", PASSWORD).await.unwrap();
    }

    #[tokio::test]
    async fn created_user_can_sign_in_with_generated_passcode() {
        let h = Harness::new().await;
        let created = h
            .directory()
            .create_user(
                &h.org_principal(),
                NewUser {
                    username: "Alice".into(),
                    password: None,
                    confirm_password: None,
                },
            )
            .await
            .unwrap();
        assert_eq!(created.user.username, "alice");
        let passcode = created.passcode.unwrap();
        validate_password_policy(&passcode).unwrap();

        let session = h.directory().sign_in_user(h.org.id, "ALICE", &passcode).await.unwrap();
        assert!(matches!(session.principal, Principal::User(ref p) if p.id == created.user.id));
    }

    #[tokio::test]
    async fn usernames_are_unique_per_org_only() {
        let h = Harness::new().await;
        h.user("alice").await;
        let other = Harness::with_store(h.store.clone(), h.clock.clone(), "globex").await;

        let req = || NewUser {
            username: "alice".into(),
            password: Some(PASSWORD.into()),
            confirm_password: Some(PASSWORD.into()),
        };
        let err = h.directory().create_user(&h.org_principal(), req()).await.unwrap_err();
        assert_eq!(err, DomainError::Conflict("Username already in use".into()));

        other.directory().create_user(&other.org_principal(), req()).await.unwrap();
    }

    #[tokio::test]
    async fn user_sign_in_is_blocked_by_org_status() {
        let h = Harness::new().await;
        h.user("alice").await;
        let mut org = h.org.clone();
        org.status = AccountStatus::Deactivated;
        h.store.update_org(&org).await.unwrap();

        assert_eq!(
            h.directory().sign_in_user(h.org.id, "alice", PASSWORD).await.unwrap_err(),
            DomainError::AccountDeactivated
        );

        org.status = AccountStatus::Deleted;
        h.store.update_org(&org).await.unwrap();
        assert_eq!(
            h.directory().sign_in_user(h.org.id, "alice", PASSWORD).await.unwrap_err(),
            DomainError::InvalidCredentials
        );
    }

    #[tokio::test]
    async fn password_change_rules() {
        let h = Harness::new().await;
        let user = h.user("alice").await;
        let dir = h.directory();
        let org = h.org_principal();

        let err = dir.change_user_password(&org, user.id, change(PASSWORD)).await.unwrap_err();
        assert!(matches!(err, DomainError::Validation(ref m) if m.contains("different")));

        dir.change_user_password(&org, user.id, change("N3w-Secret!")).await.unwrap();
        dir.sign_in_user(h.org.id, "alice", "N3w-Secret!").await.unwrap();

        let mut stored = h.store.find_user(user.id).await.unwrap().unwrap();
        stored.status = AccountStatus::Deactivated;
        h.store.update_user(&stored).await.unwrap();
        let err = dir.change_user_password(&org, user.id, change("Other-1pass")).await.unwrap_err();
        assert_eq!(err, DomainError::Forbidden("Account is deactivated".into()));
    }

    #[tokio::test]
    async fn org_password_needs_org_write() {
        let h = Harness::new().await;
        let user = h.user("bob").await;
        let dir = h.directory();

        let err = dir
            .change_org_password(&h.user_principal(&user).await, h.org.id, change("N3w-Secret!"))
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Forbidden(_)));

        grant(&h, &user, "ORG_WRITE_ACCESS").await;
        dir.change_org_password(&h.user_principal(&user).await, h.org.id, change("N3w-Secret!"))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn users_read_themselves_without_capabilities() {
        let h = Harness::new().await;
        let alice = h.user("alice").await;
        let bob = h.user("bob").await;
        let p = h.user_principal(&alice).await;

        h.directory().get_user(&p, alice.id).await.unwrap();
        assert!(matches!(
            h.directory().get_user(&p, bob.id).await,
            Err(DomainError::Forbidden(_))
        ));
        assert!(matches!(h.directory().me(&p).await.unwrap(), AccountRecord::User(u) if u.id == alice.id));
    }

    #[tokio::test]
    async fn rename_keeps_per_org_uniqueness() {
        let h = Harness::new().await;
        let alice = h.user("alice").await;
        h.user("bob").await;

        let err = h.directory().rename_user(&h.org_principal(), alice.id, "Bob").await.unwrap_err();
        assert_eq!(err, DomainError::Conflict("Username already in use".into()));

        let renamed = h.directory().rename_user(&h.org_principal(), alice.id, "carol").await.unwrap();
        assert_eq!(renamed.username, "carol");
    }
}
