//! Password hashing (Argon2id), password policy and generated passwords.

use argon2::{
    Argon2, PasswordHash, PasswordVerifier,
    password_hash::{PasswordHasher as _, SaltString, rand_core::OsRng},
};
use rand::{Rng, seq::SliceRandom};

use orgguard_core::{DomainError, DomainResult};

/// Characters that satisfy the "special character" rule of the policy.
pub const SPECIAL_CHARS: &str = "@$!%*#?&";

pub const MIN_PASSWORD_LEN: usize = 8;

/// One-way password digest capability.
pub trait PasswordHasher: Send + Sync {
    fn hash(&self, plaintext: &str) -> DomainResult<String>;

    /// `Ok(false)` on mismatch; `Err` only when the stored digest is unusable.
    fn verify(&self, digest: &str, plaintext: &str) -> DomainResult<bool>;
}

/// Argon2id with library defaults and an optional pepper.
///
/// The pepper, if set, is prepended before hashing and must be identical at
/// verification time.
#[derive(Debug, Clone, Default)]
pub struct Argon2PasswordHasher {
    pepper: Option<String>,
}

impl Argon2PasswordHasher {
    pub fn new(pepper: Option<String>) -> Self {
        Self { pepper }
    }

    fn peppered(&self, plaintext: &str) -> Vec<u8> {
        match &self.pepper {
            Some(p) => format!("{p}{plaintext}").into_bytes(),
            None => plaintext.as_bytes().to_vec(),
        }
    }
}

impl PasswordHasher for Argon2PasswordHasher {
    fn hash(&self, plaintext: &str) -> DomainResult<String> {
        let salt = SaltString::generate(&mut OsRng);
        Argon2::default()
            .hash_password(&self.peppered(plaintext), &salt)
            .map(|h| h.to_string())
            .map_err(|e| DomainError::internal(format!("password hash: {e}")))
    }

    fn verify(&self, digest: &str, plaintext: &str) -> DomainResult<bool> {
        let parsed = PasswordHash::new(digest)
            .map_err(|e| DomainError::internal(format!("invalid hash format: {e}")))?;

        match Argon2::default().verify_password(&self.peppered(plaintext), &parsed) {
            Ok(()) => Ok(true),
            Err(argon2::password_hash::Error::Password) => Ok(false),
            Err(e) => Err(DomainError::internal(format!("password verify: {e}"))),
        }
    }
}

/// At least 8 characters with an upper-case letter, a lower-case letter, a
/// digit and one of `@$!%*#?&`.
pub fn validate_password_policy(password: &str) -> DomainResult<()> {
    let long_enough = password.chars().count() >= MIN_PASSWORD_LEN;
    let upper = password.chars().any(|c| c.is_ascii_uppercase());
    let lower = password.chars().any(|c| c.is_ascii_lowercase());
    let digit = password.chars().any(|c| c.is_ascii_digit());
    let special = password.chars().any(|c| SPECIAL_CHARS.contains(c));

    if long_enough && upper && lower && digit && special {
        Ok(())
    } else {
        Err(DomainError::validation(
            "Password must be at least 8 characters long and contain at least one uppercase letter, \
             one lowercase letter, one digit, and one special character",
        ))
    }
}

/// Random 10-character password: 4 digits, 2 specials, the rest letters with
/// at least one of each case. Always passes [`validate_password_policy`].
pub fn generate_password() -> String {
    const LOWER: &[u8] = b"abcdefghijklmnopqrstuvwxyz";
    const UPPER: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ";
    const DIGITS: &[u8] = b"0123456789";
    const LETTERS: &[u8] = b"abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ";

    let mut rng = rand::thread_rng();
    let mut pick = |set: &[u8]| set[rng.gen_range(0..set.len())] as char;

    let mut chars: Vec<char> = Vec::with_capacity(10);
    chars.push(pick(LOWER));
    chars.push(pick(UPPER));
    for _ in 0..2 {
        chars.push(pick(LETTERS));
    }
    for _ in 0..4 {
        chars.push(pick(DIGITS));
    }
    for _ in 0..2 {
        chars.push(pick(SPECIAL_CHARS.as_bytes()));
    }

    chars.shuffle(&mut rand::thread_rng());
    chars.into_iter().collect()
}
