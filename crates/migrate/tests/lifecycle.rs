//! Database-backed lifecycle tests
//!
//! These run only when `DATABASE_URL` points at a disposable PostgreSQL
//! database; without it every test returns early. Each test owns its ledger
//! table and target objects and resets them up front, so reruns are safe.

use sqlx::PgPool;
use strata_migrate::{
    ColumnType, MigrateOutcome, Migration, MigrationResult, Migrator, MigratorConfig, Registry,
    SchemaBuilder,
};

async fn connect() -> Option<PgPool> {
    let url = std::env::var("DATABASE_URL").ok()?;
    let pool = PgPool::connect(&url)
        .await
        .expect("failed to connect to DATABASE_URL");
    Some(pool)
}

fn migrator(pool: PgPool, ledger_table: &str) -> Migrator {
    Migrator::with_config(
        pool,
        MigratorConfig {
            ledger_table: ledger_table.to_string(),
            quiet: true,
        },
    )
}

async fn reset(pool: &PgPool, statements: &[&str]) {
    for statement in statements {
        sqlx::query(statement)
            .execute(pool)
            .await
            .expect("reset statement failed");
    }
}

async fn ledger_rows(pool: &PgPool, table: &str, version: &str, schema: &str) -> i64 {
    sqlx::query_scalar(&format!(
        "SELECT COUNT(*) FROM public.{} WHERE version = $1 AND \"schema\" = $2",
        table
    ))
    .bind(version)
    .bind(schema)
    .fetch_one(pool)
    .await
    .expect("ledger count query failed")
}

async fn table_exists(pool: &PgPool, qualified: &str) -> bool {
    let found: Option<String> = sqlx::query_scalar("SELECT to_regclass($1)::text")
        .bind(qualified)
        .fetch_one(pool)
        .await
        .expect("to_regclass query failed");
    found.is_some()
}

struct CreateWidgets {
    schema: &'static str,
}

impl Migration for CreateWidgets {
    fn version(&self) -> &str {
        "20230101120000"
    }

    fn schema(&self) -> &str {
        self.schema
    }

    fn up(&self, schema: &mut SchemaBuilder) -> MigrationResult<()> {
        schema.sql("CREATE TABLE widgets (id integer)");
        schema.alter_table("widgets", |t| {
            t.add("label", ColumnType::Text)?;
            Ok(())
        })?;
        Ok(())
    }

    fn down(&self, schema: &mut SchemaBuilder) -> MigrationResult<()> {
        schema.sql("DROP TABLE widgets");
        Ok(())
    }
}

#[tokio::test]
async fn scoped_schema_apply_is_idempotent_and_reversible() {
    let Some(pool) = connect().await else { return };
    reset(
        &pool,
        &[
            "DROP TABLE IF EXISTS public.lifecycle_ledger",
            "DROP SCHEMA IF EXISTS reporting CASCADE",
            "CREATE SCHEMA reporting",
        ],
    )
    .await;

    let migrator = migrator(pool.clone(), "lifecycle_ledger");
    let migration = CreateWidgets {
        schema: "reporting",
    };

    assert!(migrator.is_pending(&migration).await.unwrap());

    assert_eq!(
        migrator.up(&migration).await.unwrap(),
        MigrateOutcome::Applied
    );
    assert!(table_exists(&pool, "reporting.widgets").await);
    assert!(migrator.is_migrated(&migration).await.unwrap());
    assert_eq!(
        ledger_rows(&pool, "lifecycle_ledger", "20230101120000", "reporting").await,
        1
    );

    // A second up is a no-op and the ledger row stays unique.
    assert_eq!(
        migrator.up(&migration).await.unwrap(),
        MigrateOutcome::AlreadyApplied
    );
    assert_eq!(
        ledger_rows(&pool, "lifecycle_ledger", "20230101120000", "reporting").await,
        1
    );

    assert_eq!(
        migrator.down(&migration).await.unwrap(),
        MigrateOutcome::RolledBack
    );
    assert!(!table_exists(&pool, "reporting.widgets").await);
    assert!(migrator.is_pending(&migration).await.unwrap());
    assert_eq!(
        ledger_rows(&pool, "lifecycle_ledger", "20230101120000", "reporting").await,
        0
    );

    assert_eq!(
        migrator.down(&migration).await.unwrap(),
        MigrateOutcome::AlreadyRolledBack
    );
}

struct BrokenInTheMiddle;

impl Migration for BrokenInTheMiddle {
    fn version(&self) -> &str {
        "20230101130000"
    }

    fn up(&self, schema: &mut SchemaBuilder) -> MigrationResult<()> {
        schema.sql("CREATE TABLE txn_first (id integer)");
        schema.sql("ALTER TABLE txn_missing\n  ADD flag boolean NOT NULL");
        schema.sql("CREATE TABLE txn_last (id integer)");
        Ok(())
    }

    fn down(&self, _schema: &mut SchemaBuilder) -> MigrationResult<()> {
        Ok(())
    }
}

#[tokio::test]
async fn failing_statement_leaves_schema_and_ledger_unchanged() {
    let Some(pool) = connect().await else { return };
    reset(
        &pool,
        &[
            "DROP TABLE IF EXISTS public.atomicity_ledger",
            "DROP TABLE IF EXISTS public.txn_first",
            "DROP TABLE IF EXISTS public.txn_last",
        ],
    )
    .await;

    let migrator = migrator(pool.clone(), "atomicity_ledger");
    let migration = BrokenInTheMiddle;

    assert!(migrator.up(&migration).await.is_err());

    assert!(!table_exists(&pool, "public.txn_first").await);
    assert!(!table_exists(&pool, "public.txn_last").await);
    assert!(migrator.is_pending(&migration).await.unwrap());
    assert_eq!(
        ledger_rows(&pool, "atomicity_ledger", "20230101130000", "public").await,
        0
    );
}

struct CreateNamedTable {
    version: &'static str,
    table: &'static str,
}

impl Migration for CreateNamedTable {
    fn version(&self) -> &str {
        self.version
    }

    fn up(&self, schema: &mut SchemaBuilder) -> MigrationResult<()> {
        schema.sql(format!("CREATE TABLE {} (id integer)", self.table));
        Ok(())
    }

    fn down(&self, schema: &mut SchemaBuilder) -> MigrationResult<()> {
        schema.sql(format!("DROP TABLE {}", self.table));
        Ok(())
    }
}

#[tokio::test]
async fn rollback_skips_pending_migrations() {
    let Some(pool) = connect().await else { return };
    reset(
        &pool,
        &[
            "DROP TABLE IF EXISTS public.rollback_ledger",
            "DROP TABLE IF EXISTS public.rb_first",
            "DROP TABLE IF EXISTS public.rb_second",
        ],
    )
    .await;

    let migrator = migrator(pool.clone(), "rollback_ledger");
    let mut registry = Registry::new();
    registry
        .register(Box::new(CreateNamedTable {
            version: "20230101140000",
            table: "rb_first",
        }))
        .unwrap();
    registry
        .register(Box::new(CreateNamedTable {
            version: "20230101150000",
            table: "rb_second",
        }))
        .unwrap();

    // Apply only the older migration; the newer one stays pending and must
    // be walked past silently on rollback.
    let older = CreateNamedTable {
        version: "20230101140000",
        table: "rb_first",
    };
    assert_eq!(migrator.up(&older).await.unwrap(), MigrateOutcome::Applied);

    let report = migrator.rollback(&registry, 1).await.unwrap();
    assert_eq!(report.rolled_back_versions, vec!["20230101140000"]);
    assert!(!table_exists(&pool, "public.rb_first").await);
    assert_eq!(
        ledger_rows(&pool, "rollback_ledger", "20230101140000", "public").await,
        0
    );
}
