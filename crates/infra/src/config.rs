//! Process configuration, read once from the environment at start-up.

use chrono::{Duration, NaiveTime};
use thiserror::Error;
use tracing::warn;

pub const DEFAULT_JWT_SECRET: &str = "dev-secret";
pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";
pub const DEFAULT_TOKEN_TTL_HOURS: i64 = 24;
pub const DEFAULT_SWEEP_AT: &str = "00:30";

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{var}: {reason}")]
    Invalid { var: &'static str, reason: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub jwt_secret: String,
    pub token_ttl: Duration,
    pub bind_addr: String,
    /// Postgres when set, in-memory otherwise.
    pub database_url: Option<String>,
    /// Local wall-clock time of the daily sweep.
    pub sweep_at: NaiveTime,
    pub password_pepper: Option<String>,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Empty values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let jwt_secret = get("JWT_SECRET").unwrap_or_else(|| {
            warn!("JWT_SECRET not set; using insecure development default");
            DEFAULT_JWT_SECRET.to_string()
        });

        let token_ttl = match get("TOKEN_TTL_HOURS") {
            Some(raw) => match raw.trim().parse::<i64>() {
                Ok(hours) if hours > 0 => Duration::hours(hours),
                _ => {
                    return Err(ConfigError::Invalid {
                        var: "TOKEN_TTL_HOURS",
                        reason: format!("expected a positive number of hours, got '{raw}'"),
                    });
                }
            },
            None => Duration::hours(DEFAULT_TOKEN_TTL_HOURS),
        };

        let sweep_raw = get("SWEEP_AT").unwrap_or_else(|| DEFAULT_SWEEP_AT.to_string());
        let sweep_at = NaiveTime::parse_from_str(sweep_raw.trim(), "%H:%M").map_err(|e| {
            ConfigError::Invalid {
                var: "SWEEP_AT",
                reason: format!("expected HH:MM, got '{sweep_raw}': {e}"),
            }
        })?;

        Ok(Self {
            jwt_secret,
            token_ttl,
            bind_addr: get("BIND_ADDR").unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string()),
            database_url: get("DATABASE_URL"),
            sweep_at,
            password_pepper: get("PASSWORD_PEPPER"),
        })
    }
}
