// System status display — seen-reaction totals, busiest posts, latest records.

use anyhow::Result;
use colored::Colorize;
use std::path::Path;
use std::sync::Arc;

use crate::db::DedupStore;

/// How many posts and recent records to list.
const LIST_LIMIT: u32 = 5;

/// Display system status to the terminal.
///
/// `db_display_path` is only used for the SQLite file-size line; pass the
/// redacted URL (or any label) for PostgreSQL.
pub async fn show(db: &Arc<dyn DedupStore>, db_display_path: &str) -> Result<()> {
    if Path::new(db_display_path).is_file() {
        let file_size = std::fs::metadata(db_display_path)
            .map(|m| format_bytes(m.len()))
            .unwrap_or_else(|_| "unknown".to_string());
        println!("Database: {} ({})", db_display_path, file_size);
    } else {
        println!("Database: {}", db_display_path);
    }

    let total = db.seen_count().await?;
    println!("Reactions announced: {}", total.to_string().bold());

    if total == 0 {
        println!("  {}", "Nothing announced yet. Run `reactwatch run` to start polling.".dimmed());
        return Ok(());
    }

    let tallies = db.seen_counts_by_post(LIST_LIMIT).await?;
    println!("Busiest posts:");
    for tally in &tallies {
        println!("  {:>5}  {}", tally.reactions, tally.post_id);
    }

    let recent = db.recent_seen(LIST_LIMIT).await?;
    println!("Most recent:");
    for record in &recent {
        println!(
            "  {}  {} on {}",
            record.observed_at.format("%Y-%m-%d %H:%M:%S"),
            record.reaction_id,
            record.post_id
        );
    }

    Ok(())
}

fn format_bytes(bytes: u64) -> String {
    if bytes < 1024 {
        format!("{} B", bytes)
    } else if bytes < 1024 * 1024 {
        format!("{:.1} KB", bytes as f64 / 1024.0)
    } else {
        format!("{:.1} MB", bytes as f64 / (1024.0 * 1024.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_bytes() {
        assert_eq!(format_bytes(512), "512 B");
        assert_eq!(format_bytes(2048), "2.0 KB");
        assert_eq!(format_bytes(3 * 1024 * 1024), "3.0 MB");
    }
}
