//! `orgguard-core`: shared building blocks for the account/RBAC domain.
//!
//! This crate contains **pure** primitives (no infrastructure concerns):
//! identifiers, account status, the error taxonomy and an injectable clock.

pub mod clock;
pub mod entity;
pub mod error;
pub mod id;
pub mod status;

pub use clock::{Clock, ManualClock, SystemClock};
pub use entity::{Account, Entity};
pub use error::{DomainError, DomainResult};
pub use id::{GroupId, OrgId, RoleId, TaskId, UserId};
pub use status::AccountStatus;
