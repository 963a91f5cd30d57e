//! Error types for migration planning.

use thiserror::Error;

/// Errors that abort a planning call.
///
/// No partial plan is ever returned alongside an error.
#[derive(Debug, Error)]
pub enum PlanError {
    /// A top-level change the planner cannot express.
    #[error("Unsupported change {0}")]
    UnsupportedChange(&'static str),

    /// A table edit the planner cannot express.
    #[error("Unsupported table change {0}")]
    UnsupportedTableChange(&'static str),

    /// A foreign key being created is structurally incomplete.
    #[error("Invalid foreign key {symbol:?}: missing {}", missing.join(", "))]
    InvalidForeignKey {
        /// Constraint name.
        symbol: String,
        /// Which pieces are missing.
        missing: Vec<&'static str>,
    },

    /// A dependency cycle survived detaching.
    #[error("Dependency cycle between tables: {}", tables.join(", "))]
    Cycle {
        /// Tables on the cycle.
        tables: Vec<String>,
    },

    /// A table option was given without the value it needs.
    #[error("Missing value for table option {0}")]
    MissingAttrValue(&'static str),

    /// One or more clauses of an `ALTER TABLE` batch could not be rendered.
    #[error("Alter table {table:?}: {}", errors.join("; "))]
    AlterTable {
        /// Table being altered.
        table: String,
        /// Collected clause errors.
        errors: Vec<String>,
    },

    /// A quoted string literal is malformed.
    #[error("Invalid quoted string {0:?}")]
    InvalidQuoted(String),
}

/// Result type for planning operations.
pub type Result<T> = std::result::Result<T, PlanError>;
