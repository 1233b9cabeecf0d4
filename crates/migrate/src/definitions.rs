//! Core types for the migration system
//!
//! Configuration, per-invocation outcomes, and the report structures
//! returned by batch runs.

use serde::{Deserialize, Serialize};

/// Configuration for the migrator
#[derive(Debug, Clone)]
pub struct MigratorConfig {
    /// Name of the ledger table tracking applied `(version, schema)` pairs.
    /// The table always lives in the `public` schema.
    pub ledger_table: String,
    /// Suppress the per-migration report line
    pub quiet: bool,
}

impl Default for MigratorConfig {
    fn default() -> Self {
        Self {
            ledger_table: "schema_migrations".to_string(),
            quiet: false,
        }
    }
}

/// Outcome of a single `up` or `down` invocation
///
/// The already-* variants are idempotent no-ops, not errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MigrateOutcome {
    /// The migration was applied and its ledger entry inserted
    Applied,
    /// The ledger already contained the entry; nothing was executed
    AlreadyApplied,
    /// The migration was reverted and its ledger entry deleted
    RolledBack,
    /// The ledger did not contain the entry; nothing was executed
    AlreadyRolledBack,
}

/// Direction of a single migration invocation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MigrationDirection {
    /// Apply the migration (run the `up` body)
    Up,
    /// Revert the migration (run the `down` body)
    Down,
}

/// Whether a registered migration has been applied to its schema
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MigrationStatus {
    Pending,
    Applied,
}

/// One row of a status listing
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusEntry {
    pub version: String,
    pub schema: String,
    pub status: MigrationStatus,
}

/// Result of applying all pending migrations
#[derive(Debug)]
pub struct RunReport {
    /// Versions applied by this run, in application order
    pub applied_versions: Vec<String>,
    /// Number of migrations skipped because they were already applied
    pub skipped_count: usize,
    /// Total execution time in milliseconds
    pub execution_time_ms: u128,
}

/// Result of rolling back applied migrations
#[derive(Debug)]
pub struct RollbackReport {
    /// Versions rolled back by this run, most recent first
    pub rolled_back_versions: Vec<String>,
    /// Total execution time in milliseconds
    pub execution_time_ms: u128,
}
