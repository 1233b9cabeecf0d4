//! Error types for the migration engine
//!
//! Mapping failures are surfaced before any SQL reaches the database;
//! everything raised inside a migration transaction aborts it and propagates.

use thiserror::Error;

/// Result type alias for migration operations
pub type MigrationResult<T> = Result<T, MigrationError>;

/// Error types for migration operations
#[derive(Debug, Error)]
pub enum MigrationError {
    /// A type modifier was applied to a logical type it is not valid for
    #[error("unsupported modifier for column '{column}': {modifier} cannot refine {column_type}")]
    UnsupportedModifier {
        column: String,
        column_type: String,
        modifier: String,
    },

    /// A default value does not match the column's logical type
    #[error("unsupported default for column '{column}': {value} is not a valid {column_type} default")]
    UnsupportedDefault {
        column: String,
        column_type: String,
        value: String,
    },

    /// Two migrations were registered with the same version
    #[error("duplicate migration version: {version}")]
    DuplicateVersion { version: String },

    /// Database connection, statement execution, or ledger failure
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}
