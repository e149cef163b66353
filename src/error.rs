//! Custom error types for Touchline
//!
//! This module defines the error taxonomy for the persistence layer using
//! thiserror for ergonomic error definitions.

use thiserror::Error;

/// The main error type for Touchline operations
#[derive(Error, Debug)]
pub enum TouchlineError {
    /// A key lock could not be acquired before the configured timeout
    #[error("Timed out after {waited_ms}ms waiting for lock on '{key}'")]
    LockTimeout { key: String, waited_ms: u64 },

    /// The storage backend cannot be used. Fatal, there is no fallback.
    #[error("Storage unavailable ({backend}): {reason}")]
    StorageUnavailable {
        backend: &'static str,
        reason: String,
    },

    /// A stored value could not be parsed or failed validation
    #[error("Corrupt data under '{key}': {reason}")]
    CorruptData { key: String, reason: String },

    /// A single record failed schema validation
    #[error("Validation error: {0}")]
    ValidationFailed(String),

    /// Migration failed and was rolled back
    #[error("Migration failed: {0}")]
    MigrationFailed(String),

    /// Entity not found errors
    #[error("{entity_type} not found: {identifier}")]
    NotFound {
        entity_type: &'static str,
        identifier: String,
    },

    /// Case/Unicode-insensitive name collision
    #[error("{entity_type} name already in use: {name}")]
    DuplicateName {
        entity_type: &'static str,
        name: String,
    },

    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// File I/O errors
    #[error("I/O error: {0}")]
    Io(String),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(String),
}

impl TouchlineError {
    /// Create a "not found" error for teams
    pub fn team_not_found(identifier: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type: "Team",
            identifier: identifier.into(),
        }
    }

    /// Create a "not found" error for saved games
    pub fn game_not_found(identifier: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type: "Game",
            identifier: identifier.into(),
        }
    }

    /// Create a "not found" error for personnel
    pub fn personnel_not_found(identifier: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type: "Personnel",
            identifier: identifier.into(),
        }
    }

    /// Create a "not found" error for roster players
    pub fn player_not_found(identifier: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type: "Player",
            identifier: identifier.into(),
        }
    }

    pub fn corrupt(key: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::CorruptData {
            key: key.into(),
            reason: reason.into(),
        }
    }

    /// Check if this is a "not found" error
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Check if this is a validation error
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::ValidationFailed(_))
    }

    /// Check if this is a duplicate name error
    pub fn is_duplicate_name(&self) -> bool {
        matches!(self, Self::DuplicateName { .. })
    }

    /// Errors that mean the operation could not safely complete and must
    /// never be absorbed by a lenient read path.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Self::LockTimeout { .. } | Self::StorageUnavailable { .. }
        )
    }
}

// Implement From traits for common error types

impl From<std::io::Error> for TouchlineError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

impl From<serde_json::Error> for TouchlineError {
    fn from(err: serde_json::Error) -> Self {
        Self::Json(err.to_string())
    }
}

/// Result type alias for Touchline operations
pub type TouchlineResult<T> = Result<T, TouchlineError>;
