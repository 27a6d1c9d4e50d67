//! Back-off policy for backend reads.
//!
//! Only transient failures are repeated: connect errors, timeouts, 5xx and
//! 429. A rejected query or an unparseable body fails on the first attempt.

use std::future::Future;
use std::time::Duration;

use crate::error::StoreError;

const MAX_DELAY_MS: u64 = 30_000;

pub(crate) fn is_retriable(err: &StoreError) -> bool {
    match err {
        StoreError::Http(e) => {
            e.is_timeout() || e.is_connect() || e.status().is_some_and(|s| s.is_server_error())
        }
        StoreError::Api { status, .. } => *status == 429 || *status >= 500,
        StoreError::Deserialize { .. }
        | StoreError::InvalidBaseUrl { .. }
        | StoreError::UnknownTable(_) => false,
    }
}

/// Delay before retry number `retry` (1-based): `base * 2^(retry-1)`, capped
/// at 30 s, then scaled by `jitter` (expected in `0.75..1.25`).
fn backoff_delay(base_ms: u64, retry: u32, jitter: f64) -> Duration {
    let exponent = retry.saturating_sub(1).min(10);
    let capped = base_ms.saturating_mul(1 << exponent).min(MAX_DELAY_MS);
    #[allow(
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss,
        clippy::cast_precision_loss
    )]
    let millis = (capped as f64 * jitter) as u64;
    Duration::from_millis(millis)
}

/// Calls `operation` once, then up to `max_retries` more times while it keeps
/// failing with a transient error.
pub(crate) async fn retry_with_backoff<T, F, Fut>(
    max_retries: u32,
    backoff_base_ms: u64,
    mut operation: F,
) -> Result<T, StoreError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, StoreError>>,
{
    let mut retry = 0u32;
    loop {
        let err = match operation().await {
            Ok(rows) => return Ok(rows),
            Err(err) if retry < max_retries && is_retriable(&err) => err,
            Err(err) => return Err(err),
        };
        retry += 1;
        let delay = backoff_delay(backoff_base_ms, retry, 0.75 + rand::random::<f64>() / 2.0);
        tracing::warn!(
            retry,
            max_retries,
            delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
            error = %err,
            "store read failed, backing off"
        );
        tokio::time::sleep(delay).await;
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicU32, Ordering};

    use super::*;

    fn api_err(status: u16) -> StoreError {
        StoreError::Api {
            status,
            message: "boom".to_owned(),
        }
    }

    #[test]
    fn delay_doubles_per_retry_and_caps() {
        assert_eq!(backoff_delay(250, 1, 1.0), Duration::from_millis(250));
        assert_eq!(backoff_delay(250, 3, 1.0), Duration::from_millis(1_000));
        assert_eq!(backoff_delay(250, 20, 1.0), Duration::from_millis(30_000));
        assert_eq!(backoff_delay(1_000, 1, 0.75), Duration::from_millis(750));
    }

    #[test]
    fn server_errors_and_rate_limits_are_retriable() {
        assert!(is_retriable(&api_err(500)));
        assert!(is_retriable(&api_err(503)));
        assert!(is_retriable(&api_err(429)));
    }

    #[test]
    fn client_errors_are_not_retriable() {
        assert!(!is_retriable(&api_err(400)));
        assert!(!is_retriable(&api_err(401)));
        assert!(!is_retriable(&api_err(404)));
    }

    #[test]
    fn unknown_table_is_not_retriable() {
        assert!(!is_retriable(&StoreError::UnknownTable("x".to_owned())));
    }

    #[test]
    fn deserialize_error_is_not_retriable() {
        let source = serde_json::from_str::<()>("invalid").unwrap_err();
        assert!(!is_retriable(&StoreError::Deserialize {
            context: "test".to_owned(),
            source,
        }));
    }

    /// Runs `retry_with_backoff` over a fixed list of outcomes, one per call,
    /// and reports the result plus how many calls were made.
    async fn run_script(
        max_retries: u32,
        script: Vec<Result<u32, u16>>,
    ) -> (Result<u32, StoreError>, u32) {
        let calls = AtomicU32::new(0);
        let result = retry_with_backoff(max_retries, 0, || {
            let n = calls.fetch_add(1, Ordering::SeqCst) as usize;
            let outcome = script[n.min(script.len() - 1)];
            async move { outcome.map_err(api_err) }
        })
        .await;
        (result, calls.load(Ordering::SeqCst))
    }

    #[tokio::test]
    async fn first_success_is_returned_without_retrying() {
        let (result, calls) = run_script(3, vec![Ok(42)]).await;
        assert_eq!(result.unwrap(), 42);
        assert_eq!(calls, 1);
    }

    #[tokio::test]
    async fn transient_failures_are_retried_until_success() {
        let (result, calls) = run_script(3, vec![Err(503), Err(429), Ok(99)]).await;
        assert_eq!(result.unwrap(), 99);
        assert_eq!(calls, 3);
    }

    #[tokio::test]
    async fn last_error_is_returned_once_retries_run_out() {
        let (result, calls) = run_script(2, vec![Err(502)]).await;
        assert!(matches!(result, Err(StoreError::Api { status: 502, .. })));
        assert_eq!(calls, 3, "one call plus two retries");
    }

    #[tokio::test]
    async fn rejected_query_fails_on_first_call() {
        let (result, calls) = run_script(3, vec![Err(401), Ok(1)]).await;
        assert!(matches!(result, Err(StoreError::Api { status: 401, .. })));
        assert_eq!(calls, 1);
    }
}
