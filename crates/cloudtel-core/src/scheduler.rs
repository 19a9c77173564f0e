// ── Poll scheduler ──
//
// Drives the acquisition pipeline on a fixed interval. Each tick runs on
// its own task behind an Idle/Running guard, so a tick that fires while a
// run is in flight is skipped instead of overlapping it. Manual triggers
// go through the same guard.

use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use tokio::sync::watch;
use tokio::task::JoinSet;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::pipeline::{Acquisition, PollOutcome};

/// Whether a poll is currently executing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, strum::Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum PollState {
    Idle,
    Running,
}

/// Resets the state to `Idle` when the run ends, even on panic.
struct RunGuard<'a> {
    state: &'a watch::Sender<PollState>,
}

impl<'a> RunGuard<'a> {
    fn acquire(state: &'a watch::Sender<PollState>) -> Option<Self> {
        let acquired = state.send_if_modified(|s| {
            if *s == PollState::Idle {
                *s = PollState::Running;
                true
            } else {
                false
            }
        });
        acquired.then(|| Self { state })
    }
}

impl Drop for RunGuard<'_> {
    fn drop(&mut self) {
        self.state.send_replace(PollState::Idle);
    }
}

struct PollerInner {
    acquisition: Acquisition,
    interval: Duration,
    state: watch::Sender<PollState>,
    last_outcome: watch::Sender<Option<PollOutcome>>,
    cancel: CancellationToken,
}

/// Fixed-interval, non-overlapping poll driver.
///
/// Cheaply cloneable; all clones share one state.
#[derive(Clone)]
pub struct Poller {
    inner: Arc<PollerInner>,
}

impl Poller {
    pub fn new(acquisition: Acquisition, interval: Duration) -> Self {
        let (state, _) = watch::channel(PollState::Idle);
        let (last_outcome, _) = watch::channel(None);
        Self {
            inner: Arc::new(PollerInner {
                acquisition,
                interval,
                state,
                last_outcome,
                cancel: CancellationToken::new(),
            }),
        }
    }

    pub fn interval(&self) -> Duration {
        self.inner.interval
    }

    pub fn acquisition(&self) -> &Acquisition {
        &self.inner.acquisition
    }

    /// Subscribe to Idle/Running transitions.
    pub fn state(&self) -> watch::Receiver<PollState> {
        self.inner.state.subscribe()
    }

    /// Subscribe to the outcome of the most recent completed run.
    pub fn last_outcome(&self) -> watch::Receiver<Option<PollOutcome>> {
        self.inner.last_outcome.subscribe()
    }

    /// Token that stops [`run`](Self::run) when cancelled.
    pub fn cancellation_token(&self) -> CancellationToken {
        self.inner.cancel.clone()
    }

    pub fn shutdown(&self) {
        self.inner.cancel.cancel();
    }

    /// Poll now, unless a run is already in flight.
    pub async fn trigger(&self) -> PollOutcome {
        let Some(_guard) = RunGuard::acquire(&self.inner.state) else {
            warn!("poll skipped: previous run still in flight");
            return PollOutcome::Skipped;
        };

        let outcome = self.inner.acquisition.run_once().await;
        self.inner.last_outcome.send_replace(Some(outcome.clone()));
        outcome
    }

    /// Tick until cancelled. The first tick fires immediately.
    ///
    /// On cancellation, an in-flight run is allowed to finish.
    pub async fn run(&self) {
        // tokio panics on a zero period.
        let period = self.inner.interval.max(Duration::from_millis(1));
        let mut interval = tokio::time::interval(period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
        let mut runs = JoinSet::new();

        info!(interval = ?self.inner.interval, "scheduler started");

        loop {
            tokio::select! {
                biased;
                () = self.inner.cancel.cancelled() => break,
                _ = interval.tick() => {
                    while runs.try_join_next().is_some() {}
                    let poller = self.clone();
                    runs.spawn(async move { poller.trigger().await });
                }
            }
        }

        if !runs.is_empty() {
            debug!(in_flight = runs.len(), "waiting for in-flight poll");
        }
        while runs.join_next().await.is_some() {}
        info!("scheduler stopped");
    }

    /// Spawn [`run`](Self::run) on the current runtime.
    pub fn spawn(&self) -> tokio::task::JoinHandle<()> {
        let poller = self.clone();
        tokio::spawn(async move { poller.run().await })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn refused_guard_leaves_running_state_alone() {
        let (state, _) = watch::channel(PollState::Idle);
        let held = RunGuard::acquire(&state);
        assert!(held.is_some());

        assert!(RunGuard::acquire(&state).is_none());
        assert_eq!(*state.borrow(), PollState::Running);

        drop(held);
        assert_eq!(*state.borrow(), PollState::Idle);
    }
}
