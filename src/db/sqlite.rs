// SqliteDatabase — rusqlite backend implementing the DedupStore trait.
//
// The Connection is wrapped in tokio::sync::Mutex because Connection is !Sync.
// Trait methods lock the mutex, do synchronous rusqlite work, and return.
// The lock is never held across .await points.
//
// The free functions in queries.rs stay usable against a bare Connection so
// they can be tested without the async wrapper.

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rusqlite::Connection;
use tokio::sync::Mutex;

use super::models::{PostTally, RecordOutcome, SeenReaction};
use super::traits::DedupStore;

pub struct SqliteDatabase {
    conn: Mutex<Connection>,
}

impl SqliteDatabase {
    /// Wrap an already-opened rusqlite Connection.
    pub fn new(conn: Connection) -> Self {
        Self {
            conn: Mutex::new(conn),
        }
    }
}

#[async_trait]
impl DedupStore for SqliteDatabase {
    async fn table_count(&self) -> Result<i64> {
        let conn = self.conn.lock().await;
        super::schema::table_count(&conn)
    }

    async fn has_seen(&self, reaction_id: &str) -> Result<bool> {
        let conn = self.conn.lock().await;
        super::queries::has_seen(&conn, reaction_id)
    }

    async fn record_seen(
        &self,
        reaction_id: &str,
        post_id: &str,
        observed_at: DateTime<Utc>,
    ) -> Result<RecordOutcome> {
        let conn = self.conn.lock().await;
        super::queries::record_seen(&conn, reaction_id, post_id, observed_at)
    }

    async fn seen_count(&self) -> Result<i64> {
        let conn = self.conn.lock().await;
        super::queries::seen_count(&conn)
    }

    async fn seen_counts_by_post(&self, limit: u32) -> Result<Vec<PostTally>> {
        let conn = self.conn.lock().await;
        super::queries::seen_counts_by_post(&conn, limit)
    }

    async fn recent_seen(&self, limit: u32) -> Result<Vec<SeenReaction>> {
        let conn = self.conn.lock().await;
        super::queries::recent_seen(&conn, limit)
    }
}
