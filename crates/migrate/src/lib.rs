//! # strata-migrate: versioned, schema-aware PostgreSQL migrations
//!
//! Ordered, named schema changes applied forward (`up`) or backward (`down`)
//! against a target database, with a durable `(version, schema)` ledger kept
//! in the same transaction as the DDL it guards.
//!
//! Migration bodies declare their statements through a typed column DSL:
//!
//! ```no_run
//! use strata_migrate::{ColumnType, Migration, MigrationResult, SchemaBuilder};
//!
//! struct AddUserEmail;
//!
//! impl Migration for AddUserEmail {
//!     fn version(&self) -> &str {
//!         "20230101120000"
//!     }
//!
//!     fn up(&self, schema: &mut SchemaBuilder) -> MigrationResult<()> {
//!         schema.alter_table("users", |t| {
//!             t.add("email", ColumnType::Text)?;
//!             t.add("age", ColumnType::Int32.nullable())?;
//!             Ok(())
//!         })?;
//!         Ok(())
//!     }
//!
//!     fn down(&self, schema: &mut SchemaBuilder) -> MigrationResult<()> {
//!         schema.alter_table("users", |t| {
//!             t.remove("email");
//!             t.remove("age");
//!             Ok(())
//!         })?;
//!         Ok(())
//!     }
//! }
//! ```

pub mod builder;
pub mod column;
pub mod definitions;
pub mod error;
pub mod ledger;
pub mod migration;
pub mod registry;
pub mod runner;

// Re-export core traits and types
pub use builder::*;
pub use column::*;
pub use definitions::*;
pub use error::*;
pub use ledger::*;
pub use migration::*;
pub use registry::*;
pub use runner::*;
