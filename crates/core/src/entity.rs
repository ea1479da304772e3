//! Entity trait: identity + continuity across state changes.

use chrono::{DateTime, Utc};

use crate::AccountStatus;

/// Entity marker + minimal interface.
pub trait Entity {
    /// Strongly-typed entity identifier.
    type Id: Copy + Eq + core::hash::Hash + core::fmt::Debug + core::fmt::Display;

    /// Returns the entity identifier.
    fn id(&self) -> &Self::Id;
}

/// An entity that carries an account status (orgs and users).
///
/// The lifecycle state machine and the retention sweeps are written against
/// this trait so they apply identically to both account kinds.
pub trait Account: Entity {
    /// Label used in user-facing lifecycle messages.
    const LABEL: &'static str;

    fn status(&self) -> AccountStatus;

    fn set_status(&mut self, status: AccountStatus);

    fn updated_at(&self) -> DateTime<Utc>;

    fn touch(&mut self, now: DateTime<Utc>);
}
