// Notifier trait — the swap-ready abstraction for the chat destination.
//
// The destination is fixed at construction time, so a send only carries
// the message text.

use anyhow::Result;
use async_trait::async_trait;

/// Delivers a plain-text message to one chat channel.
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Send one message. An `Err` means the message may not have arrived;
    /// callers must not treat the reaction as announced.
    async fn send(&self, text: &str) -> Result<()>;
}
