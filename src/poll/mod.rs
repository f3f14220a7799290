use std::future::Future;
use std::sync::{Arc, RwLock};
use std::time::Duration;

use tracing::{debug, error, info, warn};

use crate::api::error::ApiError;
use crate::models::station::StationSnapshot;
use crate::notify::Notifier;
use crate::retry::{self, RetryOutcome};
use crate::source::DataSource;

/// Default cadence between poll cycles. Comfortably above the worst-case
/// retry span (5 attempts x 15 s backoff), so cycles never overlap.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(300);

/// Latest outcome of the poll loop. Single writer (the coordinator), mutated
/// only at the end of a cycle; the snapshot is replaced wholesale so readers
/// always see a complete one.
#[derive(Debug, Default)]
struct PollState {
    snapshot: Option<StationSnapshot>,
    last_success: bool,
    last_error: Option<ApiError>,
}

/// Owns the update cadence for one group of tracked stations and exposes the
/// latest snapshot to read-only consumers.
pub struct PollCoordinator {
    source: Box<dyn DataSource>,
    notifier: Arc<dyn Notifier>,
    interval: Duration,
    max_attempts: u32,
    state: Arc<RwLock<PollState>>,
}

impl PollCoordinator {
    pub fn new(
        source: Box<dyn DataSource>,
        notifier: Arc<dyn Notifier>,
        interval: Duration,
        max_attempts: u32,
    ) -> Self {
        Self {
            source,
            notifier,
            interval,
            max_attempts,
            state: Arc::new(RwLock::new(PollState::default())),
        }
    }

    /// Latest complete snapshot, if any cycle has succeeded yet.
    pub fn snapshot(&self) -> Option<StationSnapshot> {
        self.state
            .read()
            .expect("poll state lock poisoned")
            .snapshot
            .clone()
    }

    pub fn last_update_success(&self) -> bool {
        self.state
            .read()
            .expect("poll state lock poisoned")
            .last_success
    }

    pub fn last_error(&self) -> Option<ApiError> {
        self.state
            .read()
            .expect("poll state lock poisoned")
            .last_error
            .clone()
    }

    /// Terminal signal: the source rejected our configuration and the host
    /// must re-prompt for setup. Ticks keep firing regardless.
    pub fn needs_reauth(&self) -> bool {
        matches!(
            self.state
                .read()
                .expect("poll state lock poisoned")
                .last_error,
            Some(ApiError::AuthFailed { .. })
        )
    }

    /// Run one retry-wrapped fetch cycle and fold the outcome into the poll
    /// state. A failed cycle keeps the previous snapshot as the last-good
    /// value.
    pub async fn refresh(&self) {
        let outcome = retry::with_retries(self.notifier.as_ref(), self.max_attempts, || {
            self.source.fetch()
        })
        .await;

        let mut state = self.state.write().expect("poll state lock poisoned");
        match outcome {
            Ok(RetryOutcome::Success(snapshot)) => {
                debug!(
                    "Successfully fetched data for {} stations from {}",
                    snapshot.len(),
                    self.source.name()
                );
                state.snapshot = Some(snapshot);
                state.last_success = true;
                state.last_error = None;
            }
            Ok(RetryOutcome::Exhausted(err)) => {
                warn!("{} update spent its retry budget: {}", self.source.name(), err);
                state.last_success = false;
                state.last_error = Some(err);
            }
            Err(err) => {
                error!("{} update aborted: {}", self.source.name(), err);
                state.last_success = false;
                state.last_error = Some(err);
            }
        }
    }

    /// Poll on a fixed interval until `shutdown` resolves.
    ///
    /// Cycles are serialized: the next tick is not armed until the current
    /// cycle (including its retry sleeps) finishes. Aborting mid-cycle drops
    /// the in-flight request and leaves the previous state untouched.
    pub async fn run(&self, shutdown: impl Future<Output = ()>) {
        info!(
            "Polling {} every {}s",
            self.source.name(),
            self.interval.as_secs()
        );
        tokio::pin!(shutdown);

        loop {
            tokio::select! {
                _ = &mut shutdown => {
                    info!("Shutdown requested; stopping poll loop");
                    return;
                }
                _ = self.refresh() => {}
            }

            tokio::select! {
                _ = &mut shutdown => {
                    info!("Shutdown requested; stopping poll loop");
                    return;
                }
                _ = tokio::time::sleep(self.interval) => {}
            }
        }
    }
}
