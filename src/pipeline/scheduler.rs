// Fixed-interval scheduler.
//
// Ticks are anchored to the start of the previous tick, not the end of the
// previous cycle. Each tick spawns a cycle task, so a cycle that outlives
// the interval overlaps with the next one. That overlap is allowed: the
// dedup store's lookup and insert are each atomic, and a lost insert race
// surfaces as `AlreadyRecorded`, which the processor treats as success.
//
// State: Idle (no cycle in flight) <-> Running (one or more in flight).

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinSet;
use tokio::time::MissedTickBehavior;
use tracing::{error, info, warn};

use super::cycle::{run_cycle, CycleReport};
use super::shutdown::ShutdownSignal;
use super::PollContext;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedulerState {
    Idle,
    Running,
}

/// What the scheduler did before it stopped.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SchedulerSummary {
    pub cycles_started: u64,
    pub cycles_completed: u64,
    /// Cycles that started while an earlier one was still running.
    pub cycles_overlapped: u64,
}

pub struct Scheduler {
    ctx: Arc<PollContext>,
    interval: Duration,
    state: SchedulerState,
    summary: SchedulerSummary,
}

impl Scheduler {
    pub fn new(ctx: Arc<PollContext>, interval: Duration) -> Self {
        Self {
            ctx,
            interval,
            state: SchedulerState::Idle,
            summary: SchedulerSummary::default(),
        }
    }

    pub fn state(&self) -> SchedulerState {
        self.state
    }

    /// Tick forever until shutdown is requested, then wait for the cycles
    /// still in flight to wind down.
    ///
    /// The first cycle starts immediately; later ones every `interval`.
    pub async fn run(mut self, shutdown: ShutdownSignal) -> SchedulerSummary {
        let mut shutdown = shutdown;
        let mut ticker = tokio::time::interval(self.interval);
        // Keep the fixed cadence after a stall instead of bursting.
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        let mut cycles: JoinSet<CycleReport> = JoinSet::new();

        info!(
            interval_secs = self.interval.as_secs(),
            "Scheduler started"
        );

        loop {
            tokio::select! {
                biased;

                _ = shutdown.wait() => {
                    info!(in_flight = cycles.len(), "Shutdown requested, stopping scheduler");
                    break;
                }
                joined = cycles.join_next(), if !cycles.is_empty() => {
                    if let Some(joined) = joined {
                        self.finish_cycle(joined, cycles.is_empty());
                    }
                }
                _ = ticker.tick() => {
                    self.start_cycle(&mut cycles, &shutdown);
                }
            }
        }

        while let Some(joined) = cycles.join_next().await {
            self.finish_cycle(joined, cycles.is_empty());
        }

        info!(
            cycles_started = self.summary.cycles_started,
            cycles_completed = self.summary.cycles_completed,
            "Scheduler stopped"
        );
        self.summary
    }

    fn start_cycle(&mut self, cycles: &mut JoinSet<CycleReport>, shutdown: &ShutdownSignal) {
        if self.state == SchedulerState::Running {
            warn!(
                in_flight = cycles.len(),
                "Previous cycle still running, starting an overlapping cycle"
            );
            self.summary.cycles_overlapped += 1;
        }

        self.summary.cycles_started += 1;
        self.state = SchedulerState::Running;
        cycles.spawn(run_cycle(Arc::clone(&self.ctx), shutdown.clone()));
    }

    fn finish_cycle(
        &mut self,
        joined: Result<CycleReport, tokio::task::JoinError>,
        none_left: bool,
    ) {
        self.summary.cycles_completed += 1;
        match joined {
            Ok(report) => info!(
                posts = report.posts_listed,
                failed_posts = report.posts_failed,
                announced = report.announced,
                notify_failures = report.notify_failures,
                store_failures = report.store_failures,
                interrupted = report.interrupted,
                "Cycle complete"
            ),
            Err(e) => error!(error = %e, "Cycle task aborted"),
        }

        if none_left {
            self.state = SchedulerState::Idle;
        }
    }
}
