//! `orgguard-auth`: pure authentication/authorization boundary.
//!
//! This crate is intentionally decoupled from HTTP and storage: principals are
//! built by the caller (see `orgguard-infra`'s identity resolver) and every
//! decision here is a pure function of its inputs.

pub mod authorize;
pub mod claims;
pub mod password;
pub mod principal;
pub mod roles;

pub use authorize::{
    AuthzError, authorize, effective_roles, group_has_role, is_authorized, task_authorized,
    user_has_group,
};
pub use claims::{
    Hs256JwtValidator, Hs256TokenIssuer, JwtClaims, JwtValidator, TokenIssuer, TokenValidationError,
    validate_claims,
};
pub use password::{Argon2PasswordHasher, PasswordHasher, generate_password, validate_password_policy};
pub use principal::{GroupGrant, OrgPrincipal, Principal, UserPrincipal};
pub use roles::{Capability, Role};
