//! Migration registry
//!
//! Explicit ordered collection of migrations, built by the application's
//! bootstrap step and handed to the runner. Registration is the only way a
//! migration becomes visible; there is no global side-effect registration.

use crate::error::{MigrationError, MigrationResult};
use crate::migration::Migration;

/// Ordered collection of all known migrations
///
/// Iteration is always in ascending version order, whatever order the
/// migrations were registered in. Registering the same `(version, schema)`
/// pair twice is rejected.
pub struct Registry {
    migrations: Vec<Box<dyn Migration>>,
}

impl Registry {
    pub fn new() -> Self {
        Self {
            migrations: Vec::new(),
        }
    }

    /// Add a migration, keeping the collection sorted by version
    ///
    /// Equal versions targeting different schemas are allowed and keep their
    /// registration order relative to each other.
    pub fn register(&mut self, migration: Box<dyn Migration>) -> MigrationResult<&mut Self> {
        let duplicate = self.migrations.iter().any(|m| {
            m.version() == migration.version()
                && m.resolved_schema() == migration.resolved_schema()
        });
        if duplicate {
            return Err(MigrationError::DuplicateVersion {
                version: migration.version().to_string(),
            });
        }

        let at = self
            .migrations
            .partition_point(|m| m.version() <= migration.version());
        self.migrations.insert(at, migration);
        Ok(self)
    }

    /// Migrations in ascending version order
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &dyn Migration> {
        self.migrations.iter().map(|m| m.as_ref())
    }

    /// Look up a migration by version and resolved schema
    pub fn get(&self, version: &str, schema: &str) -> Option<&dyn Migration> {
        self.migrations
            .iter()
            .find(|m| m.version() == version && m.resolved_schema() == schema)
            .map(|m| m.as_ref())
    }

    pub fn len(&self) -> usize {
        self.migrations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.migrations.is_empty()
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}
