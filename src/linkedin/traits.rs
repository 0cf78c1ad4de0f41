// Social client trait — the seam between the pipeline and LinkedIn.
//
// The pipeline only needs two read operations. Tests drive the pipeline
// through in-memory implementations of this trait.

use anyhow::Result;
use async_trait::async_trait;

use super::reactions::Reaction;

#[async_trait]
pub trait SocialClient: Send + Sync {
    /// The most recent posts of the tracked entity, newest first.
    ///
    /// Recomputed on every call. An empty list is a valid answer (nothing
    /// configured to track, or the entity has no posts).
    async fn list_tracked_posts(&self) -> Result<Vec<String>>;

    /// The most recent reactions on one post, in listing order.
    ///
    /// A failed fetch is an `Err`, never an empty list; deciding what an
    /// error means for the cycle is the caller's job.
    async fn list_reactions(&self, post_id: &str) -> Result<Vec<Reaction>>;
}
