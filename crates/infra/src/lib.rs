//! `orgguard-infra`: everything that does IO.
//!
//! - `store`: repository traits plus in-memory and Postgres backends
//! - `identity`: bearer token → principal
//! - `policy`: capability checks against seeded role rows
//! - `services`: directory, catalog, lifecycle and membership operations
//! - `jobs`: retention sweeps and the daily scheduler
//! - `config`: environment configuration

pub mod config;
pub mod identity;
pub mod jobs;
pub mod policy;
pub mod services;
pub mod store;

pub use config::{Config, ConfigError};
pub use identity::IdentityResolver;
pub use jobs::{DailyScheduler, SweepReport, SweepRunner};
pub use policy::AccessPolicy;
pub use services::{
    AccountRecord, CatalogService, CreatedUser, DirectoryService, EntityKind, LifecycleService,
    MembershipService, NewUser, Parent, PasswordChange, Session, SignUp, seed_capability_roles,
};
pub use store::{InMemoryStore, PostgresStore, SharedStore, Store, StoreError};
