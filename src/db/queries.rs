// Database queries — SQLite operations on the seen_reactions table.
//
// Every SQLite interaction goes through this module. This keeps SQL
// contained in one place and gives the rest of the app clean Rust interfaces.

use anyhow::{Context, Result};
use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::{params, Connection, OptionalExtension};

use super::models::{PostTally, RecordOutcome, SeenReaction};

/// Timestamps are stored as fixed-width RFC 3339 UTC strings so that
/// lexical order matches chronological order.
fn format_timestamp(ts: DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>> {
    let parsed = DateTime::parse_from_rfc3339(raw)
        .with_context(|| format!("Invalid observed_at timestamp in database: {raw}"))?;
    Ok(parsed.with_timezone(&Utc))
}

// --- Dedup ---

/// Check whether a reaction has already been recorded.
pub fn has_seen(conn: &Connection, reaction_id: &str) -> Result<bool> {
    let mut stmt = conn.prepare("SELECT 1 FROM seen_reactions WHERE reaction_id = ?1")?;
    let found: Option<i64> = stmt
        .query_row(params![reaction_id], |row| row.get(0))
        .optional()?;
    Ok(found.is_some())
}

/// Insert a seen record, reporting a pre-existing key as `AlreadyRecorded`.
///
/// The conflict check and the insert are one statement, so two writers
/// racing on the same key produce exactly one `Inserted`.
pub fn record_seen(
    conn: &Connection,
    reaction_id: &str,
    post_id: &str,
    observed_at: DateTime<Utc>,
) -> Result<RecordOutcome> {
    let changed = conn.execute(
        "INSERT INTO seen_reactions (reaction_id, post_id, observed_at)
         VALUES (?1, ?2, ?3)
         ON CONFLICT(reaction_id) DO NOTHING",
        params![reaction_id, post_id, format_timestamp(observed_at)],
    )?;

    Ok(if changed == 0 {
        RecordOutcome::AlreadyRecorded
    } else {
        RecordOutcome::Inserted
    })
}

// --- Reporting ---

/// Total number of seen records.
pub fn seen_count(conn: &Connection) -> Result<i64> {
    let count = conn.query_row("SELECT COUNT(*) FROM seen_reactions", [], |row| row.get(0))?;
    Ok(count)
}

/// Seen-record counts per post, busiest first.
pub fn seen_counts_by_post(conn: &Connection, limit: u32) -> Result<Vec<PostTally>> {
    let mut stmt = conn.prepare(
        "SELECT post_id, COUNT(*) AS reactions
         FROM seen_reactions
         GROUP BY post_id
         ORDER BY reactions DESC, post_id ASC
         LIMIT ?1",
    )?;

    let rows = stmt.query_map(params![limit], |row| {
        Ok(PostTally {
            post_id: row.get(0)?,
            reactions: row.get(1)?,
        })
    })?;

    let mut tallies = Vec::new();
    for row in rows {
        tallies.push(row?);
    }
    Ok(tallies)
}

/// Most recently observed records, newest first.
pub fn recent_seen(conn: &Connection, limit: u32) -> Result<Vec<SeenReaction>> {
    let mut stmt = conn.prepare(
        "SELECT reaction_id, post_id, observed_at
         FROM seen_reactions
         ORDER BY observed_at DESC
         LIMIT ?1",
    )?;

    let rows = stmt.query_map(params![limit], |row| {
        Ok((
            row.get::<_, String>(0)?,
            row.get::<_, String>(1)?,
            row.get::<_, String>(2)?,
        ))
    })?;

    let mut records = Vec::new();
    for row in rows {
        let (reaction_id, post_id, observed_at) = row?;
        records.push(SeenReaction {
            reaction_id,
            post_id,
            observed_at: parse_timestamp(&observed_at)?,
        });
    }
    Ok(records)
}
