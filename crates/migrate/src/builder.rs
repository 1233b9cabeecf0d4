//! Schema Builder - DSL for building DDL statements
//!
//! Provides the statement collector handed to migration bodies and the
//! per-table ALTER builder it drives. Column operations go through the typed
//! mapping in [`crate::column`], so an unsupported combination fails before
//! any statement is collected.

use crate::column::ColumnSpec;
use crate::error::MigrationResult;

/// Collects the prepared statements of one migration body
///
/// A fresh builder is created for every `up`/`down` invocation and consumed
/// by the migrator; statements execute in the exact order they were added.
pub struct SchemaBuilder {
    statements: Vec<String>,
}

impl SchemaBuilder {
    /// Create a new, empty schema builder
    pub fn new() -> Self {
        Self {
            statements: Vec::new(),
        }
    }

    /// Alter an existing table
    ///
    /// The callback receives the table-scoped builder and declares column
    /// additions and drops on it.
    pub fn alter_table<F>(&mut self, table_name: &str, body: F) -> MigrationResult<&mut Self>
    where
        F: FnOnce(&mut AlterTableBuilder) -> MigrationResult<()>,
    {
        let mut table = AlterTableBuilder::new(table_name);
        body(&mut table)?;
        self.statements.extend(table.statements());
        Ok(self)
    }

    /// Append a raw SQL statement verbatim
    pub fn sql(&mut self, statement: impl Into<String>) -> &mut Self {
        self.statements.push(statement.into());
        self
    }

    /// All collected statements, in execution order
    pub fn statements(&self) -> &[String] {
        &self.statements
    }

    pub(crate) fn into_statements(self) -> Vec<String> {
        self.statements
    }
}

impl Default for SchemaBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Builder for a single `ALTER TABLE` statement
///
/// Adds and drops are kept in separate ordered lists; rendering emits every
/// add before every drop, whatever order the body declared them in.
pub struct AlterTableBuilder {
    table_name: String,
    rows: Vec<String>,
    dropped_rows: Vec<String>,
}

impl AlterTableBuilder {
    pub fn new(table_name: &str) -> Self {
        Self {
            table_name: table_name.to_string(),
            rows: Vec::new(),
            dropped_rows: Vec::new(),
        }
    }

    /// Declare a column addition
    ///
    /// Accepts a bare [`crate::column::ColumnType`] for a required column or
    /// a refined [`ColumnSpec`] (`.nullable()`, `.length(..)`,
    /// `.default_value(..)`).
    pub fn add(&mut self, name: &str, spec: impl Into<ColumnSpec>) -> MigrationResult<&mut Self> {
        let spec = spec.into();
        let mut row = format!("  ADD {} {}", name, spec.render_type(name)?);
        if !spec.nullable {
            row.push_str(" NOT NULL");
        }
        if let Some(default) = spec.render_default(name)? {
            row.push_str(" DEFAULT ");
            row.push_str(&default);
        }
        self.rows.push(row);
        Ok(self)
    }

    /// Declare a column drop by name
    pub fn remove(&mut self, name: &str) -> &mut Self {
        self.dropped_rows.push(format!("  DROP {}", name));
        self
    }

    /// Render the finished statement list
    ///
    /// Always a single `ALTER TABLE` statement; empty when no operations
    /// were declared.
    pub fn statements(&self) -> Vec<String> {
        if self.rows.is_empty() && self.dropped_rows.is_empty() {
            return Vec::new();
        }

        let mut lines = self.rows.clone();
        lines.extend(self.dropped_rows.clone());
        vec![format!(
            "ALTER TABLE {}\n{}",
            self.table_name,
            lines.join(",\n")
        )]
    }
}
