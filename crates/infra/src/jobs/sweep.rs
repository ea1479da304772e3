//! Retention sweeps.
//!
//! Each sweep selects rows by status and age only, so re-running one is
//! harmless. A failure aborts the remaining work of that sweep for this run;
//! the other sweeps are unaffected.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{error, info};

use orgguard_accounts::{LinkOwner, RetentionPolicy, Sweep, User, is_due, mark_deleted};
use orgguard_core::{Clock, DomainResult};

use crate::store::{AssociationRepository, OrgRepository, SharedStore, UserRepository};

/// Outcome of one sweep in one run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SweepReport {
    pub sweep: Sweep,
    pub affected: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl SweepReport {
    fn from_result(sweep: Sweep, result: DomainResult<usize>) -> Self {
        match result {
            Ok(affected) => Self {
                sweep,
                affected,
                error: None,
            },
            Err(err) => {
                error!(sweep = sweep.name(), error = %err, "sweep failed");
                Self {
                    sweep,
                    affected: 0,
                    error: Some(err.to_string()),
                }
            }
        }
    }
}

#[derive(Clone)]
pub struct SweepRunner {
    store: SharedStore,
    clock: Arc<dyn Clock>,
    policy: RetentionPolicy,
}

impl SweepRunner {
    pub fn new(store: SharedStore, clock: Arc<dyn Clock>) -> Self {
        Self {
            store,
            clock,
            policy: RetentionPolicy::default(),
        }
    }

    pub fn with_policy(mut self, policy: RetentionPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn clock(&self) -> &Arc<dyn Clock> {
        &self.clock
    }

    /// All three sweeps, concurrently, against one `now`.
    pub async fn run_daily_sweep(&self) -> Vec<SweepReport> {
        let now = self.clock.now();
        info!(%now, "daily sweep started");

        let (users, marked, purged) = tokio::join!(
            self.purge_deactivated_users(now),
            self.mark_deactivated_orgs_deleted(now),
            self.purge_deleted_orgs(now),
        );

        vec![
            SweepReport::from_result(Sweep::PurgeDeactivatedUsers, users),
            SweepReport::from_result(Sweep::MarkDeactivatedOrgsDeleted, marked),
            SweepReport::from_result(Sweep::PurgeDeletedOrgs, purged),
        ]
    }

    /// Deactivated users past the user window: links cleared, row removed.
    pub async fn purge_deactivated_users(&self, now: DateTime<Utc>) -> DomainResult<usize> {
        let sweep = Sweep::PurgeDeactivatedUsers;
        let due = self
            .store
            .users_due(sweep.selects(), sweep.cutoff(&self.policy, now))
            .await?;

        let mut purged = 0;
        for user in due.iter().filter(|u| is_due(*u, sweep.selects(), sweep.threshold(&self.policy), now)) {
            if self.remove_user(user).await? {
                purged += 1;
            }
        }
        info!(sweep = sweep.name(), count = purged, "sweep finished");
        Ok(purged)
    }

    /// Deactivated orgs past the grace window become Deleted; one bulk save.
    pub async fn mark_deactivated_orgs_deleted(&self, now: DateTime<Utc>) -> DomainResult<usize> {
        let sweep = Sweep::MarkDeactivatedOrgsDeleted;
        let due = self
            .store
            .orgs_due(sweep.selects(), sweep.cutoff(&self.policy, now))
            .await?;

        let mut batch = Vec::with_capacity(due.len());
        for mut org in due {
            if !is_due(&org, sweep.selects(), sweep.threshold(&self.policy), now) {
                continue;
            }
            mark_deleted(&mut org, now)?;
            batch.push(org);
        }

        if !batch.is_empty() {
            self.store.update_orgs(&batch).await?;
        }
        info!(sweep = sweep.name(), count = batch.len(), "sweep finished");
        Ok(batch.len())
    }

    /// Deleted orgs past the retention window: every user of the org is
    /// removed (links first), then the org row.
    pub async fn purge_deleted_orgs(&self, now: DateTime<Utc>) -> DomainResult<usize> {
        let sweep = Sweep::PurgeDeletedOrgs;
        let due = self
            .store
            .orgs_due(sweep.selects(), sweep.cutoff(&self.policy, now))
            .await?;

        let mut purged = 0;
        for org in due.iter().filter(|o| is_due(*o, sweep.selects(), sweep.threshold(&self.policy), now)) {
            let users = self.store.list_users(org.id).await?;
            for user in &users {
                self.remove_user(user).await?;
            }
            if self.store.delete_org(org.id).await? {
                info!(org_id = %org.id, users = users.len(), "org purged");
                purged += 1;
            }
        }
        info!(sweep = sweep.name(), count = purged, "sweep finished");
        Ok(purged)
    }

    async fn remove_user(&self, user: &User) -> DomainResult<bool> {
        self.store.clear_links(LinkOwner::User(user.id)).await?;
        Ok(self.store.delete_user(user.id).await?)
    }
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;
    use chrono::Duration;
    use orgguard_accounts::{Group, Link, Org, Task};
    use orgguard_auth::Role;
    use orgguard_core::{AccountStatus, GroupId, OrgId, RoleId, TaskId, UserId};

    use super::*;
    use crate::store::{
        GroupRepository, InMemoryStore, RoleRepository, StoreError, StoreResult, TaskRepository,
    };
    use crate::services::testing::Harness;

    /// In-memory store whose bulk org update always fails.
    struct BrokenBulkUpdate(Arc<InMemoryStore>);

    #[async_trait]
    impl OrgRepository for BrokenBulkUpdate {
        async fn insert_org(&self, org: &Org) -> StoreResult<()> {
            self.0.insert_org(org).await
        }
        async fn update_org(&self, org: &Org) -> StoreResult<()> {
            self.0.update_org(org).await
        }
        async fn update_orgs(&self, _orgs: &[Org]) -> StoreResult<()> {
            Err(StoreError::Backend("connection reset".into()))
        }
        async fn find_org(&self, id: OrgId) -> StoreResult<Option<Org>> {
            self.0.find_org(id).await
        }
        async fn find_org_by_email(&self, email: &str) -> StoreResult<Option<Org>> {
            self.0.find_org_by_email(email).await
        }
        async fn orgs_due(&self, status: AccountStatus, cutoff: DateTime<Utc>) -> StoreResult<Vec<Org>> {
            self.0.orgs_due(status, cutoff).await
        }
        async fn delete_org(&self, id: OrgId) -> StoreResult<bool> {
            self.0.delete_org(id).await
        }
    }

    #[async_trait]
    impl UserRepository for BrokenBulkUpdate {
        async fn insert_user(&self, user: &User) -> StoreResult<()> {
            self.0.insert_user(user).await
        }
        async fn update_user(&self, user: &User) -> StoreResult<()> {
            self.0.update_user(user).await
        }
        async fn find_user(&self, id: UserId) -> StoreResult<Option<User>> {
            self.0.find_user(id).await
        }
        async fn find_user_by_username(&self, org_id: OrgId, username: &str) -> StoreResult<Option<User>> {
            self.0.find_user_by_username(org_id, username).await
        }
        async fn list_users(&self, org_id: OrgId) -> StoreResult<Vec<User>> {
            self.0.list_users(org_id).await
        }
        async fn users_due(&self, status: AccountStatus, cutoff: DateTime<Utc>) -> StoreResult<Vec<User>> {
            self.0.users_due(status, cutoff).await
        }
        async fn delete_user(&self, id: UserId) -> StoreResult<bool> {
            self.0.delete_user(id).await
        }
    }

    #[async_trait]
    impl RoleRepository for BrokenBulkUpdate {
        async fn insert_role(&self, role: &Role) -> StoreResult<()> {
            self.0.insert_role(role).await
        }
        async fn find_role(&self, id: RoleId) -> StoreResult<Option<Role>> {
            self.0.find_role(id).await
        }
        async fn find_role_by_name(&self, name: &str) -> StoreResult<Option<Role>> {
            self.0.find_role_by_name(name).await
        }
        async fn list_roles(&self) -> StoreResult<Vec<Role>> {
            self.0.list_roles().await
        }
        async fn delete_role(&self, id: RoleId) -> StoreResult<bool> {
            self.0.delete_role(id).await
        }
    }

    #[async_trait]
    impl GroupRepository for BrokenBulkUpdate {
        async fn insert_group(&self, group: &Group) -> StoreResult<()> {
            self.0.insert_group(group).await
        }
        async fn find_group(&self, id: GroupId) -> StoreResult<Option<Group>> {
            self.0.find_group(id).await
        }
        async fn find_group_by_name(&self, name: &str) -> StoreResult<Option<Group>> {
            self.0.find_group_by_name(name).await
        }
        async fn list_groups(&self) -> StoreResult<Vec<Group>> {
            self.0.list_groups().await
        }
        async fn delete_group(&self, id: GroupId) -> StoreResult<bool> {
            self.0.delete_group(id).await
        }
    }

    #[async_trait]
    impl TaskRepository for BrokenBulkUpdate {
        async fn insert_task(&self, task: &Task) -> StoreResult<()> {
            self.0.insert_task(task).await
        }
        async fn find_task(&self, id: TaskId) -> StoreResult<Option<Task>> {
            self.0.find_task(id).await
        }
        async fn find_task_by_name(&self, name: &str) -> StoreResult<Option<Task>> {
            self.0.find_task_by_name(name).await
        }
        async fn list_tasks(&self) -> StoreResult<Vec<Task>> {
            self.0.list_tasks().await
        }
        async fn delete_task(&self, id: TaskId) -> StoreResult<bool> {
            self.0.delete_task(id).await
        }
    }

    #[async_trait]
    impl AssociationRepository for BrokenBulkUpdate {
        async fn append_link(&self, link: Link) -> StoreResult<()> {
            self.0.append_link(link).await
        }
        async fn delete_link(&self, link: Link) -> StoreResult<bool> {
            self.0.delete_link(link).await
        }
        async fn clear_links(&self, owner: LinkOwner) -> StoreResult<u64> {
            self.0.clear_links(owner).await
        }
    }

    fn runner(h: &Harness) -> SweepRunner {
        SweepRunner::new(h.store.clone(), h.clock.clone())
    }

    /// Put `org` into `status` as of `age` ago.
    async fn age_org(h: &Harness, org: &Org, status: AccountStatus, age: Duration) {
        let mut org = org.clone();
        org.status = status;
        org.updated_at = h.clock.now() - age;
        h.store.update_org(&org).await.unwrap();
    }

    async fn status_of(h: &Harness, org: &Org) -> Option<AccountStatus> {
        h.store.find_org(org.id).await.unwrap().map(|o| o.status)
    }

    #[tokio::test]
    async fn org_grace_window_is_five_days() {
        let h = Harness::new().await;
        let young = Harness::with_store(h.store.clone(), h.clock.clone(), "young").await;
        age_org(&h, &h.org, AccountStatus::Deactivated, Duration::days(6)).await;
        age_org(&young, &young.org, AccountStatus::Deactivated, Duration::days(4)).await;

        let reports = runner(&h).run_daily_sweep().await;
        assert!(reports.iter().all(|r| r.error.is_none()));

        assert_eq!(status_of(&h, &h.org).await, Some(AccountStatus::Deleted));
        assert_eq!(status_of(&h, &young.org).await, Some(AccountStatus::Deactivated));
        let marked = h.store.find_org(h.org.id).await.unwrap().unwrap();
        assert_eq!(marked.updated_at, h.clock.now());
    }

    #[tokio::test]
    async fn deactivated_users_are_purged_after_thirty_days_with_links_first() {
        let h = Harness::new().await;
        let stale = h.user("stale").await;
        let fresh = h.user("fresh").await;
        let active = h.user("active").await;
        let group = h.group("ops").await;
        let r1 = h.role_id("USER_READ_ACCESS").await;
        let r2 = h.role_id("TASKS_READ_ACCESS").await;
        for link in [
            Link::UserRole(stale.id, r1),
            Link::UserRole(stale.id, r2),
            Link::UserGroup(stale.id, group.id),
        ] {
            h.store.append_link(link).await.unwrap();
        }

        for (user, age) in [(&stale, 30), (&fresh, 29)] {
            let mut u = user.clone();
            u.status = AccountStatus::Deactivated;
            u.updated_at = h.clock.now() - Duration::days(age);
            h.store.update_user(&u).await.unwrap();
        }
        let mut old_active = active.clone();
        old_active.updated_at = h.clock.now() - Duration::days(400);
        h.store.update_user(&old_active).await.unwrap();

        let purged = runner(&h).purge_deactivated_users(h.clock.now()).await.unwrap();
        assert_eq!(purged, 1);
        assert!(h.store.find_user(stale.id).await.unwrap().is_none());
        assert_eq!(h.store.link_count(LinkOwner::User(stale.id)), 0);
        assert!(h.store.find_user(fresh.id).await.unwrap().is_some());
        assert!(h.store.find_user(active.id).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn deleted_orgs_are_purged_with_their_users() {
        let h = Harness::new().await;
        let alice = h.user("alice").await;
        let role = h.role_id("USER_READ_ACCESS").await;
        h.store.append_link(Link::UserRole(alice.id, role)).await.unwrap();
        age_org(&h, &h.org, AccountStatus::Deleted, Duration::days(45)).await;

        let purged = runner(&h).purge_deleted_orgs(h.clock.now()).await.unwrap();
        assert_eq!(purged, 1);
        assert_eq!(status_of(&h, &h.org).await, None);
        assert!(h.store.find_user(alice.id).await.unwrap().is_none());
        assert_eq!(h.store.link_count(LinkOwner::User(alice.id)), 0);
    }

    #[tokio::test]
    async fn second_run_changes_nothing() {
        let h = Harness::new().await;
        let other = Harness::with_store(h.store.clone(), h.clock.clone(), "globex").await;
        let user = h.user("alice").await;
        let mut u = user.clone();
        u.status = AccountStatus::Deactivated;
        u.updated_at = h.clock.now() - Duration::days(31);
        h.store.update_user(&u).await.unwrap();
        age_org(&h, &h.org, AccountStatus::Deactivated, Duration::days(10)).await;
        age_org(&other, &other.org, AccountStatus::Deleted, Duration::days(50)).await;

        let first = runner(&h).run_daily_sweep().await;
        let affected: Vec<usize> = first.iter().map(|r| r.affected).collect();
        assert_eq!(affected, vec![1, 1, 1]);

        let second = runner(&h).run_daily_sweep().await;
        assert!(second.iter().all(|r| r.affected == 0 && r.error.is_none()));
    }

    #[tokio::test]
    async fn activated_accounts_are_never_selected() {
        let h = Harness::new().await;
        age_org(&h, &h.org, AccountStatus::Activated, Duration::days(1000)).await;
        let reports = runner(&h).run_daily_sweep().await;
        assert!(reports.iter().all(|r| r.affected == 0));
        assert_eq!(status_of(&h, &h.org).await, Some(AccountStatus::Activated));
    }

    #[tokio::test]
    async fn one_failing_sweep_leaves_the_others_running() {
        let h = Harness::new().await;
        let gone = Harness::with_store(h.store.clone(), h.clock.clone(), "gone").await;
        let user = h.user("alice").await;
        let mut u = user.clone();
        u.status = AccountStatus::Deactivated;
        u.updated_at = h.clock.now() - Duration::days(31);
        h.store.update_user(&u).await.unwrap();
        age_org(&h, &h.org, AccountStatus::Deactivated, Duration::days(10)).await;
        age_org(&gone, &gone.org, AccountStatus::Deleted, Duration::days(50)).await;

        let store: SharedStore = Arc::new(BrokenBulkUpdate(h.store.clone()));
        let reports = SweepRunner::new(store, h.clock.clone()).run_daily_sweep().await;

        let by_sweep = |sweep: Sweep| reports.iter().find(|r| r.sweep == sweep).unwrap();
        let marked = by_sweep(Sweep::MarkDeactivatedOrgsDeleted);
        assert_eq!(marked.affected, 0);
        assert!(marked.error.as_deref().unwrap().contains("connection reset"));

        let users = by_sweep(Sweep::PurgeDeactivatedUsers);
        assert_eq!((users.affected, users.error.as_deref()), (1, None));
        let purged = by_sweep(Sweep::PurgeDeletedOrgs);
        assert_eq!((purged.affected, purged.error.as_deref()), (1, None));

        assert!(h.store.find_user(user.id).await.unwrap().is_none());
        assert_eq!(status_of(&h, &gone.org).await, None);
        assert_eq!(status_of(&h, &h.org).await, Some(AccountStatus::Deactivated));
    }
}
