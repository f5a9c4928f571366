//! Cycle driver.
//!
//! Alternates between running a cycle and sleeping for a fixed interval,
//! forever. Nothing that happens inside a cycle stops the loop.

use std::time::Duration;

use tracing::{error, info, warn};

use crate::directory::{SourceDirectory, TargetDirectory};
use crate::engine::Reconciler;
use crate::error::{SyncError, SyncResult};
use crate::report::CycleOutcome;

/// Driver state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DriverState {
    /// Waiting for the next cycle.
    Idle,

    /// A cycle is in progress.
    Running,
}

/// Runs [`Reconciler`] cycles on a fixed timer.
#[derive(Debug)]
pub struct CycleDriver<T, S> {
    reconciler: Reconciler<T, S>,
    interval: Duration,
    state: DriverState,
    cycles: u64,
}

impl<T, S> CycleDriver<T, S>
where
    T: TargetDirectory,
    S: SourceDirectory,
{
    /// Creates a driver. The interval must be positive.
    pub fn new(reconciler: Reconciler<T, S>, interval: Duration) -> SyncResult<Self> {
        if interval.is_zero() {
            return Err(SyncError::config("reconcile interval must be positive"));
        }
        Ok(Self {
            reconciler,
            interval,
            state: DriverState::Idle,
            cycles: 0,
        })
    }

    /// Returns the current state.
    #[must_use]
    pub const fn state(&self) -> DriverState {
        self.state
    }

    /// Returns the delay between two cycles.
    #[must_use]
    pub const fn interval(&self) -> Duration {
        self.interval
    }

    /// Returns the number of cycles started so far.
    #[must_use]
    pub const fn cycles(&self) -> u64 {
        self.cycles
    }

    /// Returns the reconciler.
    #[must_use]
    pub const fn reconciler(&self) -> &Reconciler<T, S> {
        &self.reconciler
    }

    /// Runs a single cycle and logs its outcome.
    pub async fn tick(&mut self) -> CycleOutcome {
        self.state = DriverState::Running;
        self.cycles += 1;

        let outcome = self.reconciler.run_cycle().await;
        match &outcome {
            CycleOutcome::Completed(report) if report.has_failures() => {
                warn!(
                    cycle = self.cycles,
                    failures = report.failures.len(),
                    transient = report.transient_failures(),
                    "reconcile cycle finished with failures: {}",
                    report.summary()
                );
            }
            CycleOutcome::Completed(report) => {
                info!(cycle = self.cycles, "reconcile cycle finished: {}", report.summary());
            }
            CycleOutcome::Aborted(abort) => {
                error!(
                    cycle = self.cycles,
                    stage = %abort.stage,
                    transient = abort.transient,
                    error = %abort.message,
                    "reconcile cycle aborted"
                );
            }
        }

        self.state = DriverState::Idle;
        outcome
    }

    /// Runs cycles until the process is terminated.
    pub async fn run_forever(&mut self) {
        loop {
            self.tick().await;

            info!(
                "reconcile group finished. waiting for the next loop in {}",
                humantime::format_duration(self.interval)
            );
            tokio::time::sleep(self.interval).await;
        }
    }
}
