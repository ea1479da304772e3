//! Application services: every request-driven operation, authorized against
//! a resolved [`orgguard_auth::Principal`] and executed through the store.

pub mod catalog;
pub mod directory;
pub mod lifecycle;
pub mod membership;

#[cfg(test)]
pub(crate) mod testing;

pub use catalog::{CatalogService, seed_capability_roles};
pub use directory::{CreatedUser, DirectoryService, NewUser, PasswordChange, Session, SignUp};
pub use lifecycle::{AccountRecord, EntityKind, LifecycleService};
pub use membership::{MembershipService, Parent};
