use std::future::Future;
use std::time::Duration;

use rand::Rng;
use tracing::warn;

use crate::api::error::ApiError;
use crate::notify::Notifier;

/// Attempts per fetch cycle before giving up until the next tick.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 5;

/// Jittered backoff window between attempts, in seconds. Randomized so many
/// pollers never hit the shared public API in lockstep.
const BACKOFF_SECS: (f64, f64) = (5.0, 15.0);

/// Outcome of a retry-wrapped fetch cycle.
#[derive(Debug)]
pub enum RetryOutcome<T> {
    Success(T),
    /// Every attempt failed with a retryable error. The last error is kept
    /// for the poll state; the user has already been notified.
    Exhausted(ApiError),
}

/// Run `op` up to `max_attempts` times.
///
/// An auth failure is terminal and propagates as `Err` immediately. Every
/// other `ApiError` is logged and retried after a jittered sleep. When all
/// attempts are spent the user is notified once and `Exhausted` is returned
/// instead of an error — a flaky upstream degrades to "no new data this
/// cycle", it never crashes the poll loop.
pub async fn with_retries<T, F, Fut>(
    notifier: &dyn Notifier,
    max_attempts: u32,
    mut op: F,
) -> Result<RetryOutcome<T>, ApiError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, ApiError>>,
{
    let attempts = max_attempts.max(1);
    let mut last_error = ApiError::DataNotFound {
        name: "Unknown".to_string(),
    };

    for attempt in 1..=attempts {
        match op().await {
            Ok(value) => return Ok(RetryOutcome::Success(value)),
            Err(err @ ApiError::AuthFailed { .. }) => return Err(err),
            Err(err) => {
                warn!("{}. Retrying... ({}/{})", err, attempt, attempts);
                last_error = err;
            }
        }

        if attempt < attempts {
            let secs = rand::thread_rng().gen_range(BACKOFF_SECS.0..BACKOFF_SECS.1);
            tokio::time::sleep(Duration::from_secs_f64(secs)).await;
        }
    }

    notifier
        .notify(
            "FloodWatch Error",
            &format!(
                "Failed to fetch data after {} attempts in the {} API.",
                attempts,
                last_error.source_name()
            ),
        )
        .await;

    Ok(RetryOutcome::Exhausted(last_error))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;
    use tokio::time::Instant;

    use crate::notify::RecordingNotifier;

    fn retryable(name: &str) -> ApiError {
        ApiError::RequestTimeout {
            name: name.into(),
            detail: "deadline exceeded".into(),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn succeeds_after_transient_failures() {
        let notifier = RecordingNotifier::new();
        let calls = Arc::new(AtomicU32::new(0));
        let failures = 3;

        let start = Instant::now();
        let outcome = {
            let calls = calls.clone();
            with_retries(&notifier, DEFAULT_MAX_ATTEMPTS, move || {
                let calls = calls.clone();
                async move {
                    if calls.fetch_add(1, Ordering::SeqCst) < failures {
                        Err(retryable("Test"))
                    } else {
                        Ok(42)
                    }
                }
            })
            .await
        };
        let elapsed = start.elapsed();

        assert!(matches!(outcome, Ok(RetryOutcome::Success(42))));
        assert_eq!(calls.load(Ordering::SeqCst), failures + 1);
        assert_eq!(notifier.count(), 0);

        // one jittered sleep per failed attempt, each in [5, 15) seconds
        assert!(elapsed >= Duration::from_secs(5 * failures as u64));
        assert!(elapsed < Duration::from_secs(15 * failures as u64));
    }

    #[tokio::test(start_paused = true)]
    async fn exhaustion_notifies_once_and_keeps_the_last_error() {
        let notifier = RecordingNotifier::new();
        let calls = Arc::new(AtomicU32::new(0));

        let outcome = {
            let calls = calls.clone();
            with_retries::<u32, _, _>(&notifier, DEFAULT_MAX_ATTEMPTS, move || {
                calls.fetch_add(1, Ordering::SeqCst);
                async { Err(retryable("Test")) }
            })
            .await
        };

        assert_eq!(calls.load(Ordering::SeqCst), DEFAULT_MAX_ATTEMPTS);
        match outcome {
            Ok(RetryOutcome::Exhausted(err)) => assert_eq!(err, retryable("Test")),
            other => panic!("expected exhaustion, got {:?}", other),
        }

        assert_eq!(notifier.count(), 1);
        let (title, text) = notifier.last().unwrap();
        assert_eq!(title, "FloodWatch Error");
        assert!(text.contains("Test API"), "notification names the source: {}", text);
        assert!(text.contains("5 attempts"));
    }

    #[tokio::test(start_paused = true)]
    async fn auth_failure_propagates_immediately() {
        let notifier = RecordingNotifier::new();
        let calls = Arc::new(AtomicU32::new(0));

        let start = Instant::now();
        let outcome = {
            let calls = calls.clone();
            with_retries::<u32, _, _>(&notifier, DEFAULT_MAX_ATTEMPTS, move || {
                calls.fetch_add(1, Ordering::SeqCst);
                async {
                    Err(ApiError::AuthFailed {
                        name: "Test".into(),
                    })
                }
            })
            .await
        };

        assert!(matches!(outcome, Err(ApiError::AuthFailed { .. })));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(notifier.count(), 0);
        assert_eq!(start.elapsed(), Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn zero_attempts_is_clamped_to_one() {
        let notifier = RecordingNotifier::new();
        let outcome =
            with_retries(&notifier, 0, || async { Ok::<_, ApiError>(7) }).await;
        assert!(matches!(outcome, Ok(RetryOutcome::Success(7))));
    }
}
