//! Identity resolution: bearer token → [`Principal`].

use std::sync::Arc;

use tracing::debug;
use uuid::Uuid;

use orgguard_auth::{JwtValidator, Principal};
use orgguard_core::{AccountStatus, Clock, DomainError, DomainResult, OrgId, UserId};

use crate::store::{OrgRepository, SharedStore, UserRepository};

/// Verifies a token and loads the subject it names.
///
/// The subject id is looked up as a user first and as an org second; token
/// claims carry no discriminator.
#[derive(Clone)]
pub struct IdentityResolver {
    store: SharedStore,
    validator: Arc<dyn JwtValidator>,
    clock: Arc<dyn Clock>,
}

impl IdentityResolver {
    pub fn new(store: SharedStore, validator: Arc<dyn JwtValidator>, clock: Arc<dyn Clock>) -> Self {
        Self {
            store,
            validator,
            clock,
        }
    }

    pub async fn resolve(&self, token: &str) -> DomainResult<Principal> {
        let claims = self
            .validator
            .validate(token, self.clock.now())
            .map_err(|err| {
                debug!(error = %err, "token rejected");
                DomainError::InvalidToken
            })?;

        let subject = Uuid::parse_str(&claims.sub).map_err(|_| DomainError::InvalidToken)?;

        if let Some(user) = self.store.find_user(UserId::from_uuid(subject)).await? {
            let org = self
                .store
                .find_org(user.org_id)
                .await?
                .ok_or(DomainError::InvalidToken)?;
            gate(org.status)?;
            gate(user.status)?;
            return Ok(Principal::User(user.to_principal()));
        }

        if let Some(org) = self.store.find_org(OrgId::from_uuid(subject)).await? {
            gate(org.status)?;
            return Ok(Principal::Org(org.to_principal()));
        }

        Err(DomainError::InvalidToken)
    }
}

/// Deleted identities are treated as non-existent.
fn gate(status: AccountStatus) -> DomainResult<()> {
    match status {
        AccountStatus::Activated => Ok(()),
        AccountStatus::Deactivated => Err(DomainError::AccountDeactivated),
        AccountStatus::Deleted => Err(DomainError::InvalidToken),
    }
}
