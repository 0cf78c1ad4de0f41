// PgDatabase — PostgreSQL backend implementing the DedupStore trait.
//
// Uses sqlx PgPool for native async queries. All queries use runtime
// parameter binding (not compile-time macros) to avoid requiring
// DATABASE_URL at compile time.
//
// Differences from SQLite:
// - TIMESTAMPTZ instead of TEXT for observed_at
// - $1/$2 parameter syntax (handled by sqlx)

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx_core::pool::Pool;
use sqlx_core::row::Row;
use sqlx_postgres::Postgres;

use super::models::{PostTally, RecordOutcome, SeenReaction};
use super::traits::DedupStore;

/// Type alias for the PostgreSQL connection pool.
pub type PgPool = Pool<Postgres>;

pub struct PgDatabase {
    pool: PgPool,
}

impl PgDatabase {
    /// Connect to PostgreSQL and run migrations.
    pub async fn connect(database_url: &str) -> Result<Self> {
        let pool = PgPool::connect(database_url)
            .await
            .context("Failed to connect to PostgreSQL")?;

        let db = Self { pool };
        db.run_migrations().await?;
        Ok(db)
    }

    /// Run all pending migrations.
    ///
    /// Holds a session-level advisory lock so two processes starting at the
    /// same time don't race to apply the same migration. Session locks are
    /// bound to the backend session that took them, so lock and unlock run
    /// on one dedicated connection; the migrations themselves use the pool.
    /// The unlock always runs, even when a migration fails.
    async fn run_migrations(&self) -> Result<()> {
        // ASCII "REACTWCH" as a big-endian i64.
        const MIGRATION_LOCK_KEY: i64 = 0x5245_4143_5457_4348_u64 as i64;

        let mut lock_conn = self
            .pool
            .acquire()
            .await
            .context("Failed to acquire connection for migration advisory lock")?;

        sqlx_core::query::query("SELECT pg_advisory_lock($1)")
            .bind(MIGRATION_LOCK_KEY)
            .execute(&mut *lock_conn)
            .await
            .context("Failed to acquire migration advisory lock")?;

        let migration_result: Result<()> = async {
            sqlx_core::query::query(
                "CREATE TABLE IF NOT EXISTS schema_version (
                    version INTEGER PRIMARY KEY,
                    applied_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
                )",
            )
            .execute(&self.pool)
            .await?;

            let migrations = [
                (
                    1,
                    include_str!("../../migrations/postgres/0001_initial.sql"),
                ),
                (
                    2,
                    include_str!("../../migrations/postgres/0002_observed_index.sql"),
                ),
            ];

            for (version, sql) in migrations {
                let applied: bool = sqlx_core::query::query(
                    "SELECT COUNT(*) > 0 FROM schema_version WHERE version = $1",
                )
                .bind(version)
                .fetch_one(&self.pool)
                .await
                .map(|row| row.get::<bool, _>(0))
                .unwrap_or(false);

                if !applied {
                    // Schema change and schema_version insert commit together
                    let mut tx = self.pool.begin().await?;
                    sqlx_core::raw_sql::raw_sql(sql).execute(&mut *tx).await?;
                    tx.commit()
                        .await
                        .with_context(|| format!("Migration v{version} failed"))?;
                }
            }

            Ok(())
        }
        .await;

        let unlock_result = sqlx_core::query::query("SELECT pg_advisory_unlock($1)")
            .bind(MIGRATION_LOCK_KEY)
            .execute(&mut *lock_conn)
            .await
            .context("Failed to release migration advisory lock");

        // Migration error takes priority over unlock error.
        migration_result?;
        unlock_result?;

        Ok(())
    }
}

#[async_trait]
impl DedupStore for PgDatabase {
    async fn table_count(&self) -> Result<i64> {
        let row = sqlx_core::query::query(
            "SELECT COUNT(*)::bigint FROM information_schema.tables
             WHERE table_schema = 'public' AND table_type = 'BASE TABLE'",
        )
        .fetch_one(&self.pool)
        .await?;
        Ok(row.get::<i64, _>(0))
    }

    async fn has_seen(&self, reaction_id: &str) -> Result<bool> {
        let row = sqlx_core::query::query("SELECT 1 FROM seen_reactions WHERE reaction_id = $1")
            .bind(reaction_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.is_some())
    }

    async fn record_seen(
        &self,
        reaction_id: &str,
        post_id: &str,
        observed_at: DateTime<Utc>,
    ) -> Result<RecordOutcome> {
        let result = sqlx_core::query::query(
            "INSERT INTO seen_reactions (reaction_id, post_id, observed_at)
             VALUES ($1, $2, $3)
             ON CONFLICT (reaction_id) DO NOTHING",
        )
        .bind(reaction_id)
        .bind(post_id)
        .bind(observed_at)
        .execute(&self.pool)
        .await?;

        Ok(if result.rows_affected() == 0 {
            RecordOutcome::AlreadyRecorded
        } else {
            RecordOutcome::Inserted
        })
    }

    async fn seen_count(&self) -> Result<i64> {
        let row = sqlx_core::query::query("SELECT COUNT(*)::bigint FROM seen_reactions")
            .fetch_one(&self.pool)
            .await?;
        Ok(row.get::<i64, _>(0))
    }

    async fn seen_counts_by_post(&self, limit: u32) -> Result<Vec<PostTally>> {
        let rows = sqlx_core::query::query(
            "SELECT post_id, COUNT(*)::bigint AS reactions
             FROM seen_reactions
             GROUP BY post_id
             ORDER BY reactions DESC, post_id ASC
             LIMIT $1",
        )
        .bind(i64::from(limit))
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .iter()
            .map(|r| PostTally {
                post_id: r.get::<String, _>(0),
                reactions: r.get::<i64, _>(1),
            })
            .collect())
    }

    async fn recent_seen(&self, limit: u32) -> Result<Vec<SeenReaction>> {
        let rows = sqlx_core::query::query(
            "SELECT reaction_id, post_id, observed_at
             FROM seen_reactions
             ORDER BY observed_at DESC
             LIMIT $1",
        )
        .bind(i64::from(limit))
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .iter()
            .map(|r| SeenReaction {
                reaction_id: r.get::<String, _>(0),
                post_id: r.get::<String, _>(1),
                observed_at: r.get::<DateTime<Utc>, _>(2),
            })
            .collect())
    }
}
