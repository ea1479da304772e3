//! Service wiring: one store, one clock, every service built on top.

use std::sync::Arc;

use chrono::NaiveTime;
use tracing::info;

use orgguard_auth::{Argon2PasswordHasher, Hs256JwtValidator, Hs256TokenIssuer};
use orgguard_core::{Clock, DomainResult, SystemClock};
use orgguard_infra::{
    AccessPolicy, CatalogService, Config, DailyScheduler, DirectoryService, IdentityResolver,
    InMemoryStore, LifecycleService, MembershipService, PostgresStore, SharedStore, SweepRunner,
    seed_capability_roles,
};

#[derive(Clone)]
pub struct AppServices {
    pub resolver: Arc<IdentityResolver>,
    pub directory: DirectoryService,
    pub catalog: CatalogService,
    pub lifecycle: LifecycleService,
    pub membership: MembershipService,
    pub sweeps: SweepRunner,
}

impl AppServices {
    pub fn new(store: SharedStore, config: &Config, clock: Arc<dyn Clock>) -> Self {
        let secret = config.jwt_secret.clone().into_bytes();
        let policy = AccessPolicy::new(store.clone());

        Self {
            resolver: Arc::new(IdentityResolver::new(
                store.clone(),
                Arc::new(Hs256JwtValidator::new(secret.clone())),
                clock.clone(),
            )),
            directory: DirectoryService::new(
                store.clone(),
                policy.clone(),
                Arc::new(Argon2PasswordHasher::new(config.password_pepper.clone())),
                Arc::new(Hs256TokenIssuer::new(secret, config.token_ttl)),
                clock.clone(),
            ),
            catalog: CatalogService::new(store.clone(), policy.clone(), clock.clone()),
            lifecycle: LifecycleService::new(store.clone(), policy.clone(), clock.clone()),
            membership: MembershipService::new(store.clone(), policy),
            sweeps: SweepRunner::new(store, clock),
        }
    }

    /// Dev/test wiring: in-memory store, system clock, seeded catalog.
    pub async fn in_memory(config: &Config) -> DomainResult<Self> {
        let store: SharedStore = Arc::new(InMemoryStore::new());
        seed_capability_roles(store.as_ref()).await?;
        Ok(Self::new(store, config, Arc::new(SystemClock)))
    }

    /// Postgres when `DATABASE_URL` is configured, in-memory otherwise.
    pub async fn from_config(config: &Config) -> anyhow::Result<Self> {
        let Some(url) = config.database_url.as_deref() else {
            info!("DATABASE_URL not set; using in-memory store");
            return Ok(Self::in_memory(config).await?);
        };

        let store: SharedStore = Arc::new(PostgresStore::connect(url).await?);
        seed_capability_roles(store.as_ref()).await?;
        info!("connected to postgres");
        Ok(Self::new(store, config, Arc::new(SystemClock)))
    }

    pub fn scheduler(&self, at: NaiveTime) -> DailyScheduler {
        DailyScheduler::new(at, self.sweeps.clone())
    }
}
