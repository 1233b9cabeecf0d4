//! Migration trait
//!
//! One implementation per versioned, schema-scoped unit of DDL change. The
//! version is an explicit field set by the author (or the `strata new`
//! scaffolder), never derived from the type name.

use crate::builder::SchemaBuilder;
use crate::error::MigrationResult;

/// The default schema every unqualified migration resolves to
pub const PUBLIC_SCHEMA: &str = "public";

/// A versioned, schema-scoped unit of forward/backward DDL change
///
/// `up` and `down` receive a fresh [`SchemaBuilder`] and declare statements
/// on it; they never touch the database themselves. Down logic is authored
/// explicitly, it is not derived from `up`.
pub trait Migration: Send + Sync {
    /// Ordered version identifier, typically a UTC timestamp like
    /// `"20230101120000"`. Ordering across migrations is the lexicographic
    /// order of these strings.
    fn version(&self) -> &str;

    /// Target schema for this migration's statements
    ///
    /// An empty string resolves to [`PUBLIC_SCHEMA`].
    fn schema(&self) -> &str {
        PUBLIC_SCHEMA
    }

    /// Pin the migration to the default schema, overriding [`Self::schema`]
    fn is_public(&self) -> bool {
        false
    }

    /// Declare the forward statements
    fn up(&self, schema: &mut SchemaBuilder) -> MigrationResult<()>;

    /// Declare the rollback statements
    fn down(&self, schema: &mut SchemaBuilder) -> MigrationResult<()>;

    /// The schema this migration actually runs against
    fn resolved_schema(&self) -> &str {
        if self.is_public() || self.schema().is_empty() {
            PUBLIC_SCHEMA
        } else {
            self.schema()
        }
    }
}
