//! Core error types for fitweek-core.
//!
//! One `thiserror` hierarchy: `CoreError` at the top, with focused
//! sub-enums per concern so callers can match on what actually failed.

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for fitweek-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Database-related errors
    #[error("Database error: {0}")]
    Database(#[from] DatabaseError),

    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Validation errors
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// Ledger commit errors
    #[error("Ledger error: {0}")]
    Ledger(#[from] LedgerError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic errors with context
    #[error("{0}")]
    Custom(String),
}

/// Database-specific errors.
#[derive(Error, Debug)]
pub enum DatabaseError {
    /// Failed to open database connection
    #[error("Failed to open database at {path}: {source}")]
    OpenFailed {
        path: PathBuf,
        #[source]
        source: rusqlite::Error,
    },

    /// Query execution failed
    #[error("Query failed: {0}")]
    QueryFailed(String),

    /// Migration failed
    #[error("Database migration failed: {0}")]
    MigrationFailed(String),

    /// Database is locked
    #[error("Database is locked")]
    Locked,
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to load configuration
    #[error("Failed to load configuration from {path}: {message}")]
    LoadFailed { path: PathBuf, message: String },

    /// Failed to save configuration
    #[error("Failed to save configuration to {path}: {message}")]
    SaveFailed { path: PathBuf, message: String },

    /// Invalid configuration value
    #[error("Invalid configuration value for '{key}': {message}")]
    InvalidValue { key: String, message: String },
}

/// Validation errors.
///
/// Session input validation is recovered locally (the step re-prompts);
/// these variants surface only for non-conversational callers such as
/// config loading.
#[derive(Error, Debug)]
pub enum ValidationError {
    /// Answer is not a whole number
    #[error("'{input}' is not a whole number")]
    NotANumber { input: String },

    /// Answer outside the question's inclusive range
    #[error("{value} is outside the allowed range {min}..={max}")]
    OutOfRange { value: u32, min: u32, max: u32 },

    /// Option token not offered by the current step
    #[error("Unrecognized option '{token}'")]
    UnknownOption { token: String },

    /// Invalid value
    #[error("Invalid value for '{field}': {message}")]
    InvalidValue { field: String, message: String },
}

/// Ledger commit errors.
#[derive(Error, Debug)]
pub enum LedgerError {
    /// No ledger exists for the submitting user
    #[error("No ledger found for user {user_id}")]
    UserNotFound { user_id: i64 },

    /// Breakdown handed to the writer with total != category sum
    #[error("Breakdown total {total} does not match category sum {sum}")]
    InconsistentBreakdown { total: u32, sum: u32 },

    /// User-side write failed; nothing was persisted
    #[error("Failed to update user ledger: {0}")]
    UserWrite(#[source] crate::ledger::StoreError),

    /// Team-side write failed after the user write succeeded.
    /// The user write is retained (documented inconsistency window).
    #[error("Failed to update team ledger {team_id}: {message}")]
    TeamWrite { team_id: String, message: String },
}

impl From<rusqlite::Error> for DatabaseError {
    fn from(err: rusqlite::Error) -> Self {
        match &err {
            rusqlite::Error::SqliteFailure(err, _msg) => {
                if err.code == rusqlite::ErrorCode::DatabaseLocked {
                    DatabaseError::Locked
                } else {
                    DatabaseError::QueryFailed(err.to_string())
                }
            }
            _ => DatabaseError::QueryFailed(err.to_string()),
        }
    }
}

impl From<Box<dyn std::error::Error + Send + Sync>> for CoreError {
    fn from(err: Box<dyn std::error::Error + Send + Sync>) -> Self {
        CoreError::Custom(err.to_string())
    }
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;
