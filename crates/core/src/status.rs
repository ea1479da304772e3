//! Account status shared by orgs and users.

use core::str::FromStr;
use serde::{Deserialize, Serialize};

use crate::DomainError;

/// Lifecycle state of an account.
///
/// `Activated ⇄ Deactivated → Deleted`. `Deleted` is terminal.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AccountStatus {
    #[default]
    Activated,
    Deactivated,
    Deleted,
}

impl AccountStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Activated => "ACTIVATED",
            Self::Deactivated => "DEACTIVATED",
            Self::Deleted => "DELETED",
        }
    }

    pub fn is_active(&self) -> bool {
        matches!(self, Self::Activated)
    }
}

impl core::fmt::Display for AccountStatus {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AccountStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ACTIVATED" => Ok(Self::Activated),
            "DEACTIVATED" => Ok(Self::Deactivated),
            "DELETED" => Ok(Self::Deleted),
            other => Err(DomainError::validation(format!("unknown account status '{other}'"))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_accounts_start_activated() {
        assert_eq!(AccountStatus::default(), AccountStatus::Activated);
    }

    #[test]
    fn storage_form_matches_serde_form() {
        for status in [AccountStatus::Activated, AccountStatus::Deactivated, AccountStatus::Deleted] {
            let json = serde_json::to_string(&status).unwrap();
            assert_eq!(json, format!("\"{}\"", status.as_str()));
            assert_eq!(status.as_str().parse::<AccountStatus>().unwrap(), status);
        }
    }

    #[test]
    fn unknown_status_is_rejected() {
        assert!("SUSPENDED".parse::<AccountStatus>().is_err());
    }
}
