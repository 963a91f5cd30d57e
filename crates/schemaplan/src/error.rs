//! Error types for the schemaplan tool.

use std::path::PathBuf;

use schemaplan_core::PlanError;
use schemaplan_mysql::ParseVersionError;

/// Errors that can occur while loading, planning or rendering changes.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The planner rejected the changes.
    #[error("Planning failed: {0}")]
    Plan(#[from] PlanError),

    /// Database error while probing the server.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// IO error (reading change files).
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Failed to parse a change file.
    #[error("Failed to parse change file '{path}': {message}")]
    ParseError {
        /// Path to the change file.
        path: PathBuf,
        /// Error message.
        message: String,
    },

    /// Serialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The server reported a version the planner cannot read.
    #[error(transparent)]
    InvalidVersion(#[from] ParseVersionError),

    /// A reverse script was requested for a plan that cannot be undone.
    #[error("Plan '{0}' is not reversible")]
    NotReversible(String),
}

/// Result type for schemaplan operations.
pub type Result<T> = std::result::Result<T, Error>;
