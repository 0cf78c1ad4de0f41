// Dedup store trait — backend-agnostic async interface for seen reactions.
//
// Implementors: SqliteDatabase (wraps rusqlite), PgDatabase (wraps sqlx).
// All methods are async so both sync (rusqlite via Mutex) and native async
// (sqlx) backends fit behind a single interface.
//
// The store is append-only: there is no update or delete. `has_seen` and
// `record_seen` are each atomic, which is all the pipeline relies on when
// cycles overlap.

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};

use super::models::{PostTally, RecordOutcome, SeenReaction};

#[async_trait]
pub trait DedupStore: Send + Sync {
    // --- Lifecycle ---

    /// Count the number of user-created tables in the database.
    async fn table_count(&self) -> Result<i64>;

    // --- Dedup ---

    /// True iff a seen record exists for this reaction id.
    async fn has_seen(&self, reaction_id: &str) -> Result<bool>;

    /// Insert a seen record.
    ///
    /// Returns `AlreadyRecorded` instead of an error when the key exists.
    /// An `Err` means the backend is unavailable and nothing was written.
    async fn record_seen(
        &self,
        reaction_id: &str,
        post_id: &str,
        observed_at: DateTime<Utc>,
    ) -> Result<RecordOutcome>;

    // --- Reporting ---

    /// Total number of seen records.
    async fn seen_count(&self) -> Result<i64>;

    /// Seen-record counts grouped by post, busiest post first.
    async fn seen_counts_by_post(&self, limit: u32) -> Result<Vec<PostTally>>;

    /// Most recently observed records, newest first.
    async fn recent_seen(&self, limit: u32) -> Result<Vec<SeenReaction>>;
}
