use std::time::Duration;

use rand::Rng;

use crate::chat::{ChatClient, ChatError, SendOutcome};

/// Up to this many attempts before giving up on rate-limited sends
/// (spec.md §4.10).
const MAX_ATTEMPTS: u32 = 3;

fn jittered_wait(retry_after_secs: f64) -> Duration {
    let jitter = rand::rng().random_range(0.0..0.3 * retry_after_secs);
    Duration::from_secs_f64(retry_after_secs + jitter)
}

/// Sends `text`, retrying up to [`MAX_ATTEMPTS`] times on `RateLimited`
/// responses with `retry_after + U(0, 0.3*retry_after)` sleeps between
/// attempts. Any other platform error bubbles up without further retry.
pub async fn send_text(
    client: &dyn ChatClient,
    chat_id: i64,
    text: &str,
    parse_mode: &str,
    reply_to: Option<i64>,
    disable_preview: bool,
) -> Result<SendOutcome, ChatError> {
    let mut attempt = 1;
    loop {
        match client.send_text(chat_id, text, parse_mode, reply_to, disable_preview).await {
            Ok(outcome) => return Ok(outcome),
            Err(ChatError::RateLimited { retry_after_secs }) if attempt < MAX_ATTEMPTS => {
                tokio::time::sleep(jittered_wait(retry_after_secs)).await;
                attempt += 1;
            }
            Err(ChatError::RateLimited { retry_after_secs }) => {
                return Err(ChatError::Platform(format!(
                    "send_text exhausted {MAX_ATTEMPTS} attempts, still rate limited (retry_after={retry_after_secs}s)"
                )));
            }
            Err(other) => return Err(other),
        }
    }
}

/// Same retry envelope as [`send_text`], applied to `editMessageText`.
pub async fn edit_text(
    client: &dyn ChatClient,
    chat_id: i64,
    message_id: i64,
    text: &str,
    parse_mode: &str,
) -> Result<(), ChatError> {
    let mut attempt = 1;
    loop {
        match client.edit_text(chat_id, message_id, text, parse_mode).await {
            Ok(()) => return Ok(()),
            Err(ChatError::RateLimited { retry_after_secs }) if attempt < MAX_ATTEMPTS => {
                tokio::time::sleep(jittered_wait(retry_after_secs)).await;
                attempt += 1;
            }
            Err(ChatError::RateLimited { retry_after_secs }) => {
                return Err(ChatError::Platform(format!(
                    "edit_text exhausted {MAX_ATTEMPTS} attempts, still rate limited (retry_after={retry_after_secs}s)"
                )));
            }
            Err(other) => return Err(other),
        }
    }
}

/// Same retry envelope as [`send_text`], applied to `reply_text`.
pub async fn reply_text(
    client: &dyn ChatClient,
    chat_id: i64,
    message_id: i64,
    text: &str,
    parse_mode: &str,
) -> Result<SendOutcome, ChatError> {
    let mut attempt = 1;
    loop {
        match client.reply_text(chat_id, message_id, text, parse_mode).await {
            Ok(outcome) => return Ok(outcome),
            Err(ChatError::RateLimited { retry_after_secs }) if attempt < MAX_ATTEMPTS => {
                tokio::time::sleep(jittered_wait(retry_after_secs)).await;
                attempt += 1;
            }
            Err(ChatError::RateLimited { retry_after_secs }) => {
                return Err(ChatError::Platform(format!(
                    "reply_text exhausted {MAX_ATTEMPTS} attempts, still rate limited (retry_after={retry_after_secs}s)"
                )));
            }
            Err(other) => return Err(other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicU32, Ordering};

    struct FlakyClient {
        fails_remaining: AtomicU32,
    }

    #[async_trait]
    impl ChatClient for FlakyClient {
        async fn send_text(
            &self,
            _chat_id: i64,
            _text: &str,
            _parse_mode: &str,
            _reply_to: Option<i64>,
            _disable_preview: bool,
        ) -> Result<SendOutcome, ChatError> {
            if self.fails_remaining.fetch_sub(1, Ordering::SeqCst) > 0 {
                Err(ChatError::RateLimited { retry_after_secs: 0.01 })
            } else {
                Ok(SendOutcome { message_id: 42 })
            }
        }

        async fn edit_text(&self, _chat_id: i64, _message_id: i64, _text: &str, _parse_mode: &str) -> Result<(), ChatError> {
            Ok(())
        }

        async fn reply_text(
            &self,
            _chat_id: i64,
            _message_id: i64,
            _text: &str,
            _parse_mode: &str,
        ) -> Result<SendOutcome, ChatError> {
            Ok(SendOutcome { message_id: 43 })
        }
    }

    struct AlwaysPermanent;

    #[async_trait]
    impl ChatClient for AlwaysPermanent {
        async fn send_text(
            &self,
            _chat_id: i64,
            _text: &str,
            _parse_mode: &str,
            _reply_to: Option<i64>,
            _disable_preview: bool,
        ) -> Result<SendOutcome, ChatError> {
            Err(ChatError::Platform("chat not found".to_string()))
        }

        async fn edit_text(&self, _chat_id: i64, _message_id: i64, _text: &str, _parse_mode: &str) -> Result<(), ChatError> {
            Ok(())
        }

        async fn reply_text(
            &self,
            _chat_id: i64,
            _message_id: i64,
            _text: &str,
            _parse_mode: &str,
        ) -> Result<SendOutcome, ChatError> {
            Ok(SendOutcome { message_id: 0 })
        }
    }

    #[tokio::test]
    async fn retries_on_rate_limit_then_succeeds() {
        let client = FlakyClient {
            fails_remaining: AtomicU32::new(1),
        };
        let outcome = send_text(&client, 1, "hi", "HTML", None, true).await.unwrap();
        assert_eq!(outcome.message_id, 42);
    }

    #[tokio::test]
    async fn gives_up_after_max_attempts_still_rate_limited() {
        let client = FlakyClient {
            fails_remaining: AtomicU32::new(10),
        };
        let err = send_text(&client, 1, "hi", "HTML", None, true).await.unwrap_err();
        assert!(matches!(err, ChatError::Platform(_)));
    }

    #[tokio::test]
    async fn permanent_error_does_not_retry() {
        let client = AlwaysPermanent;
        let err = send_text(&client, 1, "hi", "HTML", None, true).await.unwrap_err();
        assert!(matches!(err, ChatError::Platform(msg) if msg == "chat not found"));
    }
}
