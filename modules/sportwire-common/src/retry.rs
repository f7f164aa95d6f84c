use std::future::Future;
use std::time::Duration;

use rand::Rng;

/// Max attempts for a jittered-backoff retry loop (spec.md §7: "retried with
/// jittered backoff up to 3 attempts").
pub const MAX_ATTEMPTS: u32 = 3;

/// Exponential backoff with full jitter: `base * 2^(attempt-1)`, scaled by a
/// uniform `[0,1)` factor, attempt counted from 1.
fn backoff_delay(attempt: u32, base: Duration) -> Duration {
    let exp = base.as_millis() as u64 * (1u64 << (attempt - 1).min(16));
    let jitter = rand::rng().random::<f64>();
    Duration::from_millis((exp as f64 * jitter) as u64)
}

/// Retries `op` up to `MAX_ATTEMPTS` times while `is_transient` holds on the
/// error, with jittered exponential backoff between attempts. The final
/// failure (transient or not) is returned as-is.
pub async fn retry_transient<T, E, F, Fut>(base_delay: Duration, mut op: F, is_transient: impl Fn(&E) -> bool) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
{
    let mut attempt = 1;
    loop {
        match op().await {
            Ok(v) => return Ok(v),
            Err(e) if attempt < MAX_ATTEMPTS && is_transient(&e) => {
                tokio::time::sleep(backoff_delay(attempt, base_delay)).await;
                attempt += 1;
            }
            Err(e) => return Err(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[tokio::test]
    async fn retries_until_success() {
        let calls = AtomicU32::new(0);
        let result: Result<&str, &str> = retry_transient(
            Duration::from_millis(1),
            || {
                let n = calls.fetch_add(1, Ordering::SeqCst);
                async move { if n < 2 { Err("transient") } else { Ok("done") } }
            },
            |_| true,
        )
        .await;
        assert_eq!(result, Ok("done"));
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn gives_up_after_max_attempts() {
        let calls = AtomicU32::new(0);
        let result: Result<&str, &str> = retry_transient(
            Duration::from_millis(1),
            || {
                calls.fetch_add(1, Ordering::SeqCst);
                async move { Err("always transient") }
            },
            |_| true,
        )
        .await;
        assert_eq!(result, Err("always transient"));
        assert_eq!(calls.load(Ordering::SeqCst), MAX_ATTEMPTS);
    }

    #[tokio::test]
    async fn non_transient_error_stops_immediately() {
        let calls = AtomicU32::new(0);
        let result: Result<&str, &str> = retry_transient(
            Duration::from_millis(1),
            || {
                calls.fetch_add(1, Ordering::SeqCst);
                async move { Err("permanent") }
            },
            |_| false,
        )
        .await;
        assert_eq!(result, Err("permanent"));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
