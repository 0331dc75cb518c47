//! Telegram Bot API Client
//!
//! Long-polling `getUpdates` and `sendMessage` over HTTPS.

use reqwest::Client;
use serde::de::DeserializeOwned;
use std::time::Duration;
use thiserror::Error;

use super::types::{ApiResponse, ReplyKeyboardMarkup, ReplyParameters, SendMessageRequest, Update};

/// Public Bot API endpoint
pub const DEFAULT_API_URL: &str = "https://api.telegram.org";

/// Telegram rejects messages longer than this many characters
pub const MAX_MESSAGE_CHARS: usize = 4096;

#[derive(Debug, Error)]
pub enum TelegramError {
    #[error("HTTP error: {0}")]
    Http(String),
    #[error("Telegram API error {code}: {description}")]
    Api { code: i64, description: String },
    #[error("Failed to parse response: {0}")]
    Parse(String),
}

/// Telegram client configuration
#[derive(Debug, Clone)]
pub struct TelegramConfig {
    pub api_url: String,
    pub bot_token: String,
    /// Long-poll window passed to getUpdates
    pub poll_timeout: Duration,
}

#[derive(Debug, Clone)]
pub struct TelegramClient {
    http: Client,
    base_url: String,
    poll_timeout: Duration,
}

impl TelegramClient {
    pub fn new(config: TelegramConfig) -> Result<Self, TelegramError> {
        // Must outlive the server-side long poll
        let http = Client::builder()
            .timeout(config.poll_timeout + Duration::from_secs(10))
            .build()
            .map_err(|e| TelegramError::Http(format!("Failed to create HTTP client: {}", e)))?;

        let base_url = format!(
            "{}/bot{}",
            config.api_url.trim_end_matches('/'),
            config.bot_token
        );

        Ok(Self {
            http,
            base_url,
            poll_timeout: config.poll_timeout,
        })
    }

    fn method_url(&self, method: &str) -> String {
        format!("{}/{}", self.base_url, method)
    }

    /// Wait for updates newer than `offset`
    pub async fn get_updates(&self, offset: Option<i64>) -> Result<Vec<Update>, TelegramError> {
        let mut payload = serde_json::json!({
            "timeout": self.poll_timeout.as_secs(),
            "allowed_updates": ["message"],
        });
        if let Some(offset) = offset {
            payload["offset"] = serde_json::json!(offset);
        }

        let response = self
            .http
            .post(self.method_url("getUpdates"))
            .json(&payload)
            .send()
            .await
            .map_err(|e| TelegramError::Http(e.to_string()))?;

        Self::handle_response(response).await
    }

    /// Send an HTML message, optionally as a reply, with the main keyboard
    pub async fn send_message(
        &self,
        chat_id: i64,
        text: &str,
        reply_to: Option<i64>,
    ) -> Result<(), TelegramError> {
        for chunk in split_message(text, MAX_MESSAGE_CHARS) {
            let request = SendMessageRequest {
                chat_id,
                text: chunk,
                parse_mode: "HTML",
                disable_web_page_preview: true,
                reply_parameters: reply_to.map(|message_id| ReplyParameters {
                    message_id,
                    allow_sending_without_reply: true,
                }),
                reply_markup: Some(ReplyKeyboardMarkup::main_menu()),
            };

            let response = self
                .http
                .post(self.method_url("sendMessage"))
                .json(&request)
                .send()
                .await
                .map_err(|e| TelegramError::Http(e.to_string()))?;

            let _: serde_json::Value = Self::handle_response(response).await?;
        }

        tracing::debug!("Telegram message sent to chat {}", chat_id);
        Ok(())
    }

    async fn handle_response<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, TelegramError> {
        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| TelegramError::Http(e.to_string()))?;

        let parsed: ApiResponse<T> = serde_json::from_str(&body).map_err(|e| {
            TelegramError::Parse(format!("status {}: {} (body: {})", status, e, truncate(&body, 200)))
        })?;

        if !parsed.ok {
            return Err(TelegramError::Api {
                code: parsed.error_code.unwrap_or(i64::from(status.as_u16())),
                description: parsed.description.unwrap_or_default(),
            });
        }

        parsed
            .result
            .ok_or_else(|| TelegramError::Parse("missing result field".to_string()))
    }
}

/// Split text into chunks of at most `max_chars` characters, preferring
/// line boundaries so HTML tags on one line stay intact.
pub fn split_message(text: &str, max_chars: usize) -> Vec<String> {
    if text.chars().count() <= max_chars {
        return vec![text.to_string()];
    }

    let mut chunks = Vec::new();
    let mut current = String::new();
    let mut current_len = 0;

    for line in text.split_inclusive('\n') {
        let line_len = line.chars().count();
        if current_len + line_len > max_chars && !current.is_empty() {
            chunks.push(std::mem::take(&mut current));
            current_len = 0;
        }
        if line_len > max_chars {
            // A single oversized line is cut by characters
            let chars: Vec<char> = line.chars().collect();
            for piece in chars.chunks(max_chars) {
                chunks.push(piece.iter().collect());
            }
            continue;
        }
        current.push_str(line);
        current_len += line_len;
    }

    if !current.is_empty() {
        chunks.push(current);
    }
    chunks
}

fn truncate(s: &str, max_chars: usize) -> String {
    s.chars().take(max_chars).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> TelegramClient {
        TelegramClient::new(TelegramConfig {
            api_url: "https://api.telegram.org/".to_string(),
            bot_token: "123:abc".to_string(),
            poll_timeout: Duration::from_secs(30),
        })
        .unwrap()
    }

    #[test]
    fn test_method_url() {
        assert_eq!(
            client().method_url("getUpdates"),
            "https://api.telegram.org/bot123:abc/getUpdates"
        );
    }

    #[test]
    fn test_short_message_single_chunk() {
        assert_eq!(split_message("hello", 10), vec!["hello".to_string()]);
    }

    #[test]
    fn test_split_on_lines() {
        let text = "aaaa\nbbbb\ncccc\n";
        let chunks = split_message(text, 10);
        assert_eq!(chunks, vec!["aaaa\nbbbb\n".to_string(), "cccc\n".to_string()]);
    }

    #[test]
    fn test_split_oversized_line() {
        let chunks = split_message("abcdefghij", 4);
        assert_eq!(chunks, vec!["abcd", "efgh", "ij"]);
    }

    #[test]
    fn test_error_display() {
        let err = TelegramError::Api { code: 401, description: "Unauthorized".to_string() };
        assert_eq!(err.to_string(), "Telegram API error 401: Unauthorized");
    }
}
