//! Migration ledger
//!
//! Durable record of applied `(version, schema)` pairs in a tracking table
//! that always lives in the default schema. Point lookup, insert and delete
//! only;
//! insert and delete always run inside the same transaction as the DDL they
//! guard. The composite primary key makes a concurrent apply of the same
//! version fail cleanly instead of double-recording it.
//!
//! Every statement references the table through its default-schema-qualified
//! name: ledger mutations run inside transactions whose search_path may point
//! at the migration's target schema, and an unqualified name there would
//! resolve to a table that does not exist.

use sqlx::{PgPool, Postgres, Transaction};

use crate::error::MigrationResult;
use crate::migration::PUBLIC_SCHEMA;

/// SQL access to the ledger table
pub struct Ledger {
    table: String,
}

impl Ledger {
    pub fn new(table: impl Into<String>) -> Self {
        Self {
            table: table.into(),
        }
    }

    /// Table reference pinned to the default schema
    fn qualified(&self) -> String {
        format!("{}.{}", PUBLIC_SCHEMA, self.table)
    }

    /// DDL bootstrapping the ledger table
    pub fn create_table_sql(&self) -> String {
        format!(
            "CREATE TABLE IF NOT EXISTS {} (\n    \
                version VARCHAR(255) NOT NULL,\n    \
                \"schema\" VARCHAR(255) NOT NULL,\n    \
                PRIMARY KEY (version, \"schema\")\n\
            )",
            self.qualified()
        )
    }

    /// SQL for the exact `(version, schema)` point lookup
    pub fn contains_sql(&self, version: &str, schema: &str) -> (String, Vec<String>) {
        (
            format!(
                "SELECT version FROM {} WHERE version = $1 AND \"schema\" = $2",
                self.qualified()
            ),
            vec![version.to_string(), schema.to_string()],
        )
    }

    /// SQL recording a migration as applied
    pub fn insert_sql(&self, version: &str, schema: &str) -> (String, Vec<String>) {
        (
            format!(
                "INSERT INTO {} (version, \"schema\") VALUES ($1, $2)",
                self.qualified()
            ),
            vec![version.to_string(), schema.to_string()],
        )
    }

    /// SQL removing a migration record on rollback
    pub fn delete_sql(&self, version: &str, schema: &str) -> (String, Vec<String>) {
        (
            format!(
                "DELETE FROM {} WHERE version = $1 AND \"schema\" = $2",
                self.qualified()
            ),
            vec![version.to_string(), schema.to_string()],
        )
    }

    /// Create the ledger table if it does not exist yet
    pub async fn ensure_table(&self, pool: &PgPool) -> MigrationResult<()> {
        sqlx::query(&self.create_table_sql()).execute(pool).await?;
        Ok(())
    }

    /// Whether `(version, schema)` is recorded as applied
    pub async fn contains(
        &self,
        pool: &PgPool,
        version: &str,
        schema: &str,
    ) -> MigrationResult<bool> {
        let (sql, params) = self.contains_sql(version, schema);
        let mut query = sqlx::query(&sql);
        for param in params {
            query = query.bind(param);
        }
        let row = query.fetch_optional(pool).await?;
        Ok(row.is_some())
    }

    pub(crate) async fn insert(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        version: &str,
        schema: &str,
    ) -> MigrationResult<()> {
        let (sql, params) = self.insert_sql(version, schema);
        let mut query = sqlx::query(&sql);
        for param in params {
            query = query.bind(param);
        }
        query.execute(&mut **tx).await?;
        Ok(())
    }

    pub(crate) async fn delete(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        version: &str,
        schema: &str,
    ) -> MigrationResult<()> {
        let (sql, params) = self.delete_sql(version, schema);
        let mut query = sqlx::query(&sql);
        for param in params {
            query = query.bind(param);
        }
        query.execute(&mut **tx).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_table_sql_has_composite_primary_key() {
        let ledger = Ledger::new("schema_migrations");
        let sql = ledger.create_table_sql();
        assert!(sql.contains("CREATE TABLE IF NOT EXISTS public.schema_migrations"));
        assert!(sql.contains("version VARCHAR(255) NOT NULL"));
        assert!(sql.contains("\"schema\" VARCHAR(255) NOT NULL"));
        assert!(sql.contains("PRIMARY KEY (version, \"schema\")"));
    }

    #[test]
    fn lookup_is_parameterized_by_version_and_schema() {
        let ledger = Ledger::new("schema_migrations");
        let (sql, params) = ledger.contains_sql("20230101120000", "reporting");
        assert_eq!(
            sql,
            "SELECT version FROM public.schema_migrations WHERE version = $1 AND \"schema\" = $2"
        );
        assert_eq!(params, vec!["20230101120000", "reporting"]);
    }

    #[test]
    fn insert_and_delete_target_the_same_pair() {
        let ledger = Ledger::new("schema_migrations");

        let (insert, params) = ledger.insert_sql("20230101120000", "public");
        assert_eq!(
            insert,
            "INSERT INTO public.schema_migrations (version, \"schema\") VALUES ($1, $2)"
        );
        assert_eq!(params, vec!["20230101120000", "public"]);

        let (delete, params) = ledger.delete_sql("20230101120000", "public");
        assert_eq!(
            delete,
            "DELETE FROM public.schema_migrations WHERE version = $1 AND \"schema\" = $2"
        );
        assert_eq!(params, vec!["20230101120000", "public"]);
    }

    #[test]
    fn statements_resolve_identically_under_a_moved_search_path() {
        // Mutations run after `SET search_path TO <schema>`; only a
        // default-schema-qualified name reaches the same table the pool-side
        // lookup reads.
        let ledger = Ledger::new("schema_migrations");
        assert!(ledger
            .create_table_sql()
            .starts_with("CREATE TABLE IF NOT EXISTS public.schema_migrations"));
        assert!(ledger
            .contains_sql("20230101120000", "reporting")
            .0
            .starts_with("SELECT version FROM public.schema_migrations"));
        assert!(ledger
            .insert_sql("20230101120000", "reporting")
            .0
            .starts_with("INSERT INTO public.schema_migrations"));
        assert!(ledger
            .delete_sql("20230101120000", "reporting")
            .0
            .starts_with("DELETE FROM public.schema_migrations"));
    }

    #[test]
    fn custom_table_name_is_used_everywhere() {
        let ledger = Ledger::new("app_migrations");
        assert!(ledger.create_table_sql().contains("public.app_migrations"));
        assert!(ledger.contains_sql("1", "public").0.contains("public.app_migrations"));
        assert!(ledger.insert_sql("1", "public").0.contains("public.app_migrations"));
        assert!(ledger.delete_sql("1", "public").0.contains("public.app_migrations"));
    }
}
