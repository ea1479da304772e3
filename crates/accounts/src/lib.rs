//! `orgguard-accounts`: account/RBAC domain model.
//!
//! Entities, the account lifecycle state machine with its retention windows,
//! and the association vocabulary used by membership operations. No IO.

pub mod entities;
pub mod lifecycle;
pub mod membership;

pub use entities::{Group, Org, Task, User};
pub use lifecycle::{RetentionPolicy, Sweep, deactivate, is_due, mark_deleted, reactivate};
pub use membership::{
    Association, AssociationKind, Link, LinkOwner, Lookup, ensure_absent, ensure_present,
};
