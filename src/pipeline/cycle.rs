// Poll cycle: one pass over the tracked posts.
//
// Posts are processed strictly one after another with a fixed pause in
// between to stay polite towards the LinkedIn API. Each post runs in its
// own task so that even a panic in one post is contained; the cycle always
// walks the whole list unless shutdown is requested.

use std::sync::Arc;

use tracing::{error, info, warn};

use super::processor::process_post;
use super::shutdown::ShutdownSignal;
use super::PollContext;

/// Summary of one cycle, logged by the scheduler and printed by `poll-once`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CycleReport {
    pub posts_listed: usize,
    pub posts_processed: usize,
    pub posts_failed: usize,
    pub reactions_fetched: usize,
    pub announced: usize,
    pub recorded: usize,
    pub notify_failures: usize,
    pub store_failures: usize,
    /// True when shutdown cut the cycle short before the last post.
    pub interrupted: bool,
}

/// Run one poll cycle. Never fails: every error is logged and counted.
pub async fn run_cycle(ctx: Arc<PollContext>, shutdown: ShutdownSignal) -> CycleReport {
    let mut report = CycleReport::default();
    let mut shutdown = shutdown;

    let posts = match ctx.social.list_tracked_posts().await {
        Ok(posts) => posts,
        Err(e) => {
            warn!(error = %e, "Failed to list tracked posts, nothing to do this cycle");
            Vec::new()
        }
    };
    report.posts_listed = posts.len();

    if posts.is_empty() {
        info!("No LinkedIn posts to track");
        return report;
    }

    let total = posts.len();
    for (index, post_id) in posts.into_iter().enumerate() {
        if shutdown.is_triggered() {
            report.interrupted = true;
            break;
        }

        let task_ctx = Arc::clone(&ctx);
        let task_post = post_id.clone();
        let joined =
            tokio::spawn(async move { process_post(&task_ctx, &task_post).await }).await;

        match joined {
            Ok(Ok(outcome)) => {
                report.posts_processed += 1;
                report.reactions_fetched += outcome.fetched;
                report.announced += outcome.announced;
                report.recorded += outcome.recorded;
                report.notify_failures += outcome.notify_failures;
                report.store_failures += outcome.store_failures;
            }
            Ok(Err(e)) => {
                warn!(
                    post_id = post_id.as_str(),
                    error = %format!("{e:#}"),
                    "Post processing failed"
                );
                report.posts_failed += 1;
            }
            Err(e) => {
                error!(post_id = post_id.as_str(), error = %e, "Post processing task aborted");
                report.posts_failed += 1;
            }
        }

        if index + 1 < total {
            tokio::select! {
                _ = tokio::time::sleep(ctx.post_delay) => {}
                _ = shutdown.wait() => {
                    report.interrupted = true;
                    break;
                }
            }
        }
    }

    report
}
