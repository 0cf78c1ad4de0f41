// Reaction processor: one post's reactions -> announcements + seen records.
//
// For each reaction, in listing order:
//   1. skip it if the dedup store has already seen it
//   2. announce it through the notifier
//   3. record it, only after the announcement succeeded
//
// A failed announcement leaves the reaction unrecorded so the next cycle
// retries it. A failed record after a successful announcement means the
// next cycle announces it again. Both are accepted at-least-once outcomes;
// nothing here ever drops a reaction silently.

use anyhow::{Context, Result};
use tracing::{debug, info, warn};

use super::PollContext;
use crate::db::models::RecordOutcome;
use crate::notify::format_reaction_message;

/// What happened to one post's reactions during a cycle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PostOutcome {
    /// Reactions returned by the listing.
    pub fetched: usize,
    /// Skipped because a seen record already existed.
    pub already_seen: usize,
    /// Announced successfully.
    pub announced: usize,
    /// Announced and now durably recorded (including lost insert races).
    pub recorded: usize,
    /// Announcement failed; left for the next cycle.
    pub notify_failures: usize,
    /// Store lookup or insert failed; may be announced again next cycle.
    pub store_failures: usize,
}

/// Process the reactions of one post.
///
/// Returns `Err` only when the reaction listing itself failed, in which
/// case nothing was announced or recorded for this post. Per-reaction
/// failures are logged and counted in the outcome.
pub async fn process_post(ctx: &PollContext, post_id: &str) -> Result<PostOutcome> {
    let reactions = ctx
        .social
        .list_reactions(post_id)
        .await
        .with_context(|| format!("Skipping post {post_id} this cycle"))?;

    let mut outcome = PostOutcome {
        fetched: reactions.len(),
        ..PostOutcome::default()
    };

    if reactions.is_empty() {
        return Ok(outcome);
    }

    for reaction in &reactions {
        match ctx.store.has_seen(&reaction.id).await {
            Ok(true) => {
                debug!(reaction_id = reaction.id.as_str(), "Already announced, skipping");
                outcome.already_seen += 1;
                continue;
            }
            Ok(false) => {}
            Err(e) => {
                // Can't tell whether it was announced; try again next cycle
                // rather than risk announcing twice now.
                warn!(
                    post_id = post_id,
                    reaction_id = reaction.id.as_str(),
                    error = %e,
                    "Dedup lookup failed, leaving reaction for next cycle"
                );
                outcome.store_failures += 1;
                continue;
            }
        }

        let message = format_reaction_message(reaction);
        if let Err(e) = ctx.notifier.send(&message).await {
            warn!(
                post_id = post_id,
                reaction_id = reaction.id.as_str(),
                error = %e,
                "Failed to announce reaction, will retry next cycle"
            );
            outcome.notify_failures += 1;
            continue;
        }
        outcome.announced += 1;

        info!(
            post_id = post_id,
            reaction_id = reaction.id.as_str(),
            actor = reaction.actor_name.as_str(),
            kind = reaction.kind.as_str(),
            "Announced new reaction"
        );

        match ctx
            .store
            .record_seen(&reaction.id, post_id, reaction.observed_at)
            .await
        {
            Ok(RecordOutcome::Inserted) => outcome.recorded += 1,
            Ok(RecordOutcome::AlreadyRecorded) => {
                debug!(
                    reaction_id = reaction.id.as_str(),
                    "Seen record already written by an overlapping cycle"
                );
                outcome.recorded += 1;
            }
            Err(e) => {
                warn!(
                    post_id = post_id,
                    reaction_id = reaction.id.as_str(),
                    error = %e,
                    "Failed to record announced reaction, it may be announced again"
                );
                outcome.store_failures += 1;
            }
        }
    }

    Ok(outcome)
}
