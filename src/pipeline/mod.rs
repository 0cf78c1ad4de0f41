// Polling pipeline: list posts -> diff reactions -> notify -> persist.
//
// The scheduler starts a cycle on every tick; a cycle walks the tracked
// posts one at a time; the processor handles the reactions of one post.
// All three share a single PollContext built once at startup.

pub mod cycle;
pub mod processor;
pub mod scheduler;
pub mod shutdown;

use std::sync::Arc;
use std::time::Duration;

use crate::db::DedupStore;
use crate::linkedin::SocialClient;
use crate::notify::Notifier;

/// Everything a cycle needs, constructed once at startup and shared by
/// reference with the scheduler and every cycle it starts.
pub struct PollContext {
    pub social: Arc<dyn SocialClient>,
    pub notifier: Arc<dyn Notifier>,
    pub store: Arc<dyn DedupStore>,
    /// Pause between two posts of the same cycle.
    pub post_delay: Duration,
}

pub use cycle::{run_cycle, CycleReport};
pub use processor::{process_post, PostOutcome};
pub use scheduler::{Scheduler, SchedulerState, SchedulerSummary};
pub use shutdown::{shutdown_channel, ShutdownSignal, ShutdownTrigger};
