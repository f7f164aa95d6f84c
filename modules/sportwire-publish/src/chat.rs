use async_trait::async_trait;
use thiserror::Error;

/// Platform errors a [`ChatClient`] can raise, distinguishing the one retry
/// trigger (spec.md §4.10) from everything else.
#[derive(Error, Debug)]
pub enum ChatError {
    #[error("rate limited, retry after {retry_after_secs}s")]
    RateLimited { retry_after_secs: f64 },

    #[error("chat platform error: {0}")]
    Platform(String),
}

/// A message successfully dispatched to the chat platform.
#[derive(Debug, Clone, Copy)]
pub struct SendOutcome {
    pub message_id: i64,
}

/// Pluggable chat backend. One call maps to one platform message; callers
/// that need a multi-chunk send issue one call per chunk, threading replies
/// through `reply_to` (spec.md §4.8 "subsequent chunks are sent as a
/// reply-thread to the first").
#[async_trait]
pub trait ChatClient: Send + Sync {
    async fn send_text(
        &self,
        chat_id: i64,
        text: &str,
        parse_mode: &str,
        reply_to: Option<i64>,
        disable_preview: bool,
    ) -> Result<SendOutcome, ChatError>;

    async fn edit_text(&self, chat_id: i64, message_id: i64, text: &str, parse_mode: &str) -> Result<(), ChatError>;

    async fn reply_text(
        &self,
        chat_id: i64,
        message_id: i64,
        text: &str,
        parse_mode: &str,
    ) -> Result<SendOutcome, ChatError>;
}

/// Discards every dispatch. Used in dry-run CLI invocations and tests
/// (grounded on the teacher's `NoopBackend`).
pub struct NullChatClient;

#[async_trait]
impl ChatClient for NullChatClient {
    async fn send_text(
        &self,
        _chat_id: i64,
        _text: &str,
        _parse_mode: &str,
        _reply_to: Option<i64>,
        _disable_preview: bool,
    ) -> Result<SendOutcome, ChatError> {
        Ok(SendOutcome { message_id: 0 })
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

/// Telegram Bot API backend. Parse mode is passed through as either `HTML`
/// or `MarkdownV2` per [`sportwire_compose::RenderMode`].
pub struct TelegramChatClient {
    http: reqwest::Client,
    bot_token: String,
}

impl TelegramChatClient {
    pub fn new(bot_token: String) -> Self {
        Self {
            http: reqwest::Client::new(),
            bot_token,
        }
    }

    fn url(&self, method: &str) -> String {
        format!("https://api.telegram.org/bot{}/{method}", self.bot_token)
    }

    async fn call(&self, method: &str, body: serde_json::Value) -> Result<serde_json::Value, ChatError> {
        let resp = self
            .http
            .post(self.url(method))
            .json(&body)
            .send()
            .await
            .map_err(|e| ChatError::Platform(e.to_string()))?;

        let status = resp.status();
        if status.as_u16() == 429 {
            let retry_after_secs = resp
                .json::<serde_json::Value>()
                .await
                .ok()
                .and_then(|v| v["parameters"]["retry_after"].as_f64())
                .unwrap_or(1.0);
            return Err(ChatError::RateLimited { retry_after_secs });
        }

        let payload: serde_json::Value = resp.json().await.map_err(|e| ChatError::Platform(e.to_string()))?;
        if payload["ok"].as_bool() != Some(true) {
            let description = payload["description"].as_str().unwrap_or("unknown error").to_string();
            return Err(ChatError::Platform(description));
        }
        Ok(payload)
    }
}

fn message_id_of(payload: &serde_json::Value) -> i64 {
    payload["result"]["message_id"].as_i64().unwrap_or(0)
}

#[async_trait]
impl ChatClient for TelegramChatClient {
    async fn send_text(
        &self,
        chat_id: i64,
        text: &str,
        parse_mode: &str,
        reply_to: Option<i64>,
        disable_preview: bool,
    ) -> Result<SendOutcome, ChatError> {
        let mut body = serde_json::json!({
            "chat_id": chat_id,
            "text": text,
            "parse_mode": parse_mode,
            "disable_web_page_preview": disable_preview,
        });
        if let Some(reply_to) = reply_to {
            body["reply_to_message_id"] = serde_json::json!(reply_to);
        }
        let payload = self.call("sendMessage", body).await?;
        Ok(SendOutcome {
            message_id: message_id_of(&payload),
        })
    }

    async fn edit_text(&self, chat_id: i64, message_id: i64, text: &str, parse_mode: &str) -> Result<(), ChatError> {
        let body = serde_json::json!({
            "chat_id": chat_id,
            "message_id": message_id,
            "text": text,
            "parse_mode": parse_mode,
        });
        self.call("editMessageText", body).await?;
        Ok(())
    }

    async fn reply_text(
        &self,
        chat_id: i64,
        message_id: i64,
        text: &str,
        parse_mode: &str,
    ) -> Result<SendOutcome, ChatError> {
        self.send_text(chat_id, text, parse_mode, Some(message_id), true).await
    }
}
