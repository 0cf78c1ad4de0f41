// Data models — Rust structs that map to database rows.
//
// Kept separate from the queries so the pipeline can use them without
// depending on rusqlite or sqlx directly.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Durable proof that a reaction has been announced.
///
/// Created once, after the first successful notification for the reaction.
/// Never updated or deleted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeenReaction {
    pub reaction_id: String,
    pub post_id: String,
    /// When reactwatch first observed the reaction (not LinkedIn's event time).
    pub observed_at: DateTime<Utc>,
}

/// Result of inserting a seen record.
///
/// A backend failure is the `Err` side of `DedupStore::record_seen`; both
/// variants here mean the reaction is now handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordOutcome {
    /// This call created the record.
    Inserted,
    /// Another writer got there first (the key appeared between the
    /// existence check and the insert).
    AlreadyRecorded,
}

/// Number of seen reactions recorded for one post.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostTally {
    pub post_id: String,
    pub reactions: i64,
}
