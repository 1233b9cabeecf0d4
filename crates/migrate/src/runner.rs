//! Migrator - executes migrations against the database
//!
//! Drives the per-migration lifecycle (`up`/`down` with the ledger mutation
//! in the same transaction) and the batch operations over a [`Registry`].
//! Statement preparation is pure; only execution touches the pool.

use std::time::Instant;

use sqlx::{Connection, PgPool};
use tracing::{info, warn};

use crate::builder::SchemaBuilder;
use crate::definitions::{
    MigrateOutcome, MigrationDirection, MigrationStatus, MigratorConfig, RollbackReport,
    RunReport, StatusEntry,
};
use crate::error::MigrationResult;
use crate::ledger::Ledger;
use crate::migration::{Migration, PUBLIC_SCHEMA};
use crate::registry::Registry;

/// Build the ordered statement list one invocation executes in its transaction
///
/// Runs the user body against a fresh [`SchemaBuilder`], then prefixes the
/// schema-scoping statement when the migration targets a non-default schema.
/// The ledger mutation is not part of this list; the migrator always appends
/// it as the final, parameterized statement of the transaction.
pub fn prepared_statements(
    migration: &dyn Migration,
    direction: MigrationDirection,
) -> MigrationResult<Vec<String>> {
    let mut builder = SchemaBuilder::new();
    match direction {
        MigrationDirection::Up => migration.up(&mut builder)?,
        MigrationDirection::Down => migration.down(&mut builder)?,
    }

    let schema = migration.resolved_schema();
    let mut statements = Vec::new();
    if schema != PUBLIC_SCHEMA {
        statements.push(format!("SET search_path TO {}", schema));
    }
    statements.extend(builder.into_statements());
    Ok(statements)
}

/// Migration executor bound to one database
pub struct Migrator {
    pool: PgPool,
    ledger: Ledger,
    config: MigratorConfig,
}

impl Migrator {
    /// Create a migrator with the default configuration
    pub fn new(pool: PgPool) -> Self {
        Self::with_config(pool, MigratorConfig::default())
    }

    /// Create a migrator with custom configuration
    pub fn with_config(pool: PgPool, config: MigratorConfig) -> Self {
        let ledger = Ledger::new(config.ledger_table.clone());
        Self {
            pool,
            ledger,
            config,
        }
    }

    /// Create a migrator from a database URL
    pub async fn from_url(database_url: &str) -> MigrationResult<Self> {
        let pool = PgPool::connect(database_url).await?;
        Ok(Self::new(pool))
    }

    /// Get the database pool
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Whether the migration's `(version, schema)` pair is in the ledger
    pub async fn is_migrated(&self, migration: &dyn Migration) -> MigrationResult<bool> {
        self.ledger.ensure_table(&self.pool).await?;
        self.ledger
            .contains(
                &self.pool,
                migration.version(),
                migration.resolved_schema(),
            )
            .await
    }

    /// Logical negation of [`Self::is_migrated`]
    pub async fn is_pending(&self, migration: &dyn Migration) -> MigrationResult<bool> {
        Ok(!self.is_migrated(migration).await?)
    }

    /// Apply one migration
    ///
    /// No-ops with [`MigrateOutcome::AlreadyApplied`] when the ledger already
    /// holds the entry. Otherwise executes the prepared statements and the
    /// ledger insert inside a single transaction; any failure rolls the whole
    /// transaction back and leaves both schema and ledger unchanged.
    pub async fn up(&self, migration: &dyn Migration) -> MigrationResult<MigrateOutcome> {
        if self.is_migrated(migration).await? {
            self.report(migration, MigrateOutcome::AlreadyApplied);
            return Ok(MigrateOutcome::AlreadyApplied);
        }

        let statements = prepared_statements(migration, MigrationDirection::Up)?;

        let mut conn = self.pool.acquire().await?;
        let mut tx = conn.begin().await?;
        for statement in &statements {
            sqlx::query(statement).execute(&mut *tx).await?;
        }
        self.ledger
            .insert(&mut tx, migration.version(), migration.resolved_schema())
            .await?;
        tx.commit().await?;
        self.restore_search_path(migration, &mut conn).await;

        self.report(migration, MigrateOutcome::Applied);
        Ok(MigrateOutcome::Applied)
    }

    /// Revert one migration
    ///
    /// No-ops with [`MigrateOutcome::AlreadyRolledBack`] when the ledger has
    /// no entry. Otherwise runs the rollback body's statements and the ledger
    /// delete inside a single transaction.
    pub async fn down(&self, migration: &dyn Migration) -> MigrationResult<MigrateOutcome> {
        if self.is_pending(migration).await? {
            self.report(migration, MigrateOutcome::AlreadyRolledBack);
            return Ok(MigrateOutcome::AlreadyRolledBack);
        }

        let statements = prepared_statements(migration, MigrationDirection::Down)?;

        let mut conn = self.pool.acquire().await?;
        let mut tx = conn.begin().await?;
        for statement in &statements {
            sqlx::query(statement).execute(&mut *tx).await?;
        }
        self.ledger
            .delete(&mut tx, migration.version(), migration.resolved_schema())
            .await?;
        tx.commit().await?;
        self.restore_search_path(migration, &mut conn).await;

        self.report(migration, MigrateOutcome::RolledBack);
        Ok(MigrateOutcome::RolledBack)
    }

    /// Apply every pending migration in ascending version order
    pub async fn run(&self, registry: &Registry) -> MigrationResult<RunReport> {
        let start = Instant::now();
        self.ledger.ensure_table(&self.pool).await?;

        let mut applied_versions = Vec::new();
        let mut skipped_count = 0;

        for migration in registry.iter() {
            match self.up(migration).await? {
                MigrateOutcome::Applied => applied_versions.push(migration.version().to_string()),
                _ => skipped_count += 1,
            }
        }

        Ok(RunReport {
            applied_versions,
            skipped_count,
            execution_time_ms: start.elapsed().as_millis(),
        })
    }

    /// Revert up to `steps` applied migrations, most recent version first
    ///
    /// Pending migrations along the way are skipped without a report line.
    pub async fn rollback(
        &self,
        registry: &Registry,
        steps: usize,
    ) -> MigrationResult<RollbackReport> {
        let start = Instant::now();
        self.ledger.ensure_table(&self.pool).await?;

        let mut rolled_back_versions = Vec::new();

        for migration in registry.iter().rev() {
            if rolled_back_versions.len() == steps {
                break;
            }
            if self.is_pending(migration).await? {
                continue;
            }
            if let MigrateOutcome::RolledBack = self.down(migration).await? {
                rolled_back_versions.push(migration.version().to_string());
            }
        }

        Ok(RollbackReport {
            rolled_back_versions,
            execution_time_ms: start.elapsed().as_millis(),
        })
    }

    /// Revert every applied migration known to the registry
    pub async fn rollback_all(&self, registry: &Registry) -> MigrationResult<RollbackReport> {
        self.rollback(registry, registry.len()).await
    }

    /// Status of every registered migration against the ledger
    pub async fn status(&self, registry: &Registry) -> MigrationResult<Vec<StatusEntry>> {
        let mut entries = Vec::new();
        for migration in registry.iter() {
            let status = if self.is_migrated(migration).await? {
                MigrationStatus::Applied
            } else {
                MigrationStatus::Pending
            };
            entries.push(StatusEntry {
                version: migration.version().to_string(),
                schema: migration.resolved_schema().to_string(),
                status,
            });
        }
        Ok(entries)
    }

    /// Undo the transaction's `SET search_path` before the connection goes
    /// back to the pool
    ///
    /// A plain `SET` survives commit on the session, and a later invocation
    /// on the same pooled connection must see the default path again. A
    /// failure here is logged, not raised: the migration itself committed.
    async fn restore_search_path(
        &self,
        migration: &dyn Migration,
        conn: &mut sqlx::pool::PoolConnection<sqlx::Postgres>,
    ) {
        if migration.resolved_schema() == PUBLIC_SCHEMA {
            return;
        }
        let statement = format!("SET search_path TO {}", PUBLIC_SCHEMA);
        if let Err(error) = sqlx::query(&statement).execute(&mut **conn).await {
            warn!(%error, "failed to restore search_path after commit");
        }
    }

    fn report(&self, migration: &dyn Migration, outcome: MigrateOutcome) {
        if self.config.quiet {
            return;
        }
        let outcome = match outcome {
            MigrateOutcome::Applied => "applied",
            MigrateOutcome::AlreadyApplied => "already applied",
            MigrateOutcome::RolledBack => "rolled back",
            MigrateOutcome::AlreadyRolledBack => "already rolled back",
        };
        info!(
            version = migration.version(),
            schema = migration.resolved_schema(),
            "migration {}",
            outcome
        );
    }
}
