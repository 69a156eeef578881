//! Bounded polling for asynchronous server-side work.

use std::future::Future;

use contentful_core::{Backoff, ContentfulError, Result};
use tracing::debug;

/// Outcome of one status check.
#[derive(Debug, Clone, PartialEq)]
pub enum PollStatus<T> {
    Pending,
    Ready(T),
    Failed(String),
}

/// Calls `check` until it reports `Ready` or `Failed`, sleeping according to
/// `backoff` in between. Gives up with `ProcessingTimeout` after
/// `backoff.max_attempts` checks. An error from `check` ends polling at once.
pub(crate) async fn poll_until<T, F, Fut>(
    backoff: Backoff,
    resource_type: &str,
    id: &str,
    mut check: F,
) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<PollStatus<T>>>,
{
    let attempts = backoff.max_attempts.max(1);
    for attempt in 0..attempts {
        match check().await? {
            PollStatus::Ready(value) => return Ok(value),
            PollStatus::Failed(reason) => {
                return Err(ContentfulError::ProcessingFailed {
                    resource_type: resource_type.to_string(),
                    id: id.to_string(),
                    reason,
                });
            }
            PollStatus::Pending => {}
        }
        if attempt + 1 < attempts {
            let wait = backoff.delay(attempt);
            debug!(resource_type, id, attempt, wait_ms = wait.as_millis() as u64, "still processing");
            tokio::time::sleep(wait).await;
        }
    }

    Err(ContentfulError::ProcessingTimeout {
        resource_type: resource_type.to_string(),
        id: id.to_string(),
        attempts,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn fast(max_attempts: u32) -> Backoff {
        Backoff {
            initial: Duration::from_millis(1),
            max_interval: Duration::from_millis(2),
            multiplier: 2,
            max_attempts,
        }
    }

    #[tokio::test]
    async fn returns_once_ready() {
        let mut calls = 0;
        let value = poll_until(fast(5), "contentful_asset", "a", || {
            calls += 1;
            let status = if calls < 3 {
                PollStatus::Pending
            } else {
                PollStatus::Ready(calls)
            };
            async move { Ok(status) }
        })
        .await
        .unwrap();
        assert_eq!(value, 3);
    }

    #[tokio::test]
    async fn times_out_after_max_attempts() {
        let mut calls = 0;
        let err = poll_until::<(), _, _>(fast(4), "contentful_asset", "a", || {
            calls += 1;
            async { Ok(PollStatus::Pending) }
        })
        .await
        .unwrap_err();
        assert_eq!(calls, 4);
        assert!(matches!(err, ContentfulError::ProcessingTimeout { attempts: 4, .. }));
    }

    #[tokio::test]
    async fn failure_stops_polling() {
        let err = poll_until::<(), _, _>(fast(4), "contentful_asset", "a", || async {
            Ok(PollStatus::Failed("unsupported file".into()))
        })
        .await
        .unwrap_err();
        assert!(err.to_string().contains("unsupported file"));
    }
}
