//! Persisted migration status

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::models::Validate;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub enum MigrationState {
    #[default]
    NotStarted,
    BackingUp,
    Transferring,
    Verifying,
    Committed,
    RolledBack,
}

impl fmt::Display for MigrationState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::NotStarted => "not started",
            Self::BackingUp => "backing up",
            Self::Transferring => "transferring",
            Self::Verifying => "verifying",
            Self::Committed => "committed",
            Self::RolledBack => "rolled back",
        };
        f.write_str(label)
    }
}

/// Stored under the `migrationStatus` key of the current backend
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MigrationStatus {
    pub state: MigrationState,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_error: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
}

impl MigrationStatus {
    pub fn committed() -> Self {
        Self {
            state: MigrationState::Committed,
            last_error: None,
            completed_at: Some(Utc::now()),
        }
    }

    pub fn rolled_back(error: impl Into<String>) -> Self {
        Self {
            state: MigrationState::RolledBack,
            last_error: Some(error.into()),
            completed_at: None,
        }
    }

    pub fn is_complete(&self) -> bool {
        self.state == MigrationState::Committed
    }
}

impl Validate for MigrationStatus {
    fn validate(&self) -> Result<(), String> {
        if self.state == MigrationState::Committed && self.completed_at.is_none() {
            return Err("committed migration must record its completion time".into());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wire_format() {
        let status = MigrationStatus::rolled_back("disk full");
        let json = serde_json::to_value(&status).unwrap();
        assert_eq!(json["state"], "rolledBack");
        assert_eq!(json["lastError"], "disk full");
        assert!(json.get("completedAt").is_none());
    }

    #[test]
    fn test_committed_requires_timestamp() {
        let mut status = MigrationStatus::committed();
        assert!(status.validate().is_ok());
        status.completed_at = None;
        assert!(status.validate().is_err());
    }
}
