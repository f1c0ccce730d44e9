use crate::error::AlerterError;
use async_trait::async_trait;
use configuration::LineConfig;
use reqwest::Client;
use serde::Serialize;
pub mod error;

/// LINE rejects text messages longer than this.
pub const MAX_MESSAGE_CHARS: usize = 5000;
/// LINE accepts at most this many messages per push request.
pub const MAX_MESSAGES_PER_PUSH: usize = 5;

/// Somewhere a finished report can be delivered.
#[async_trait]
pub trait NotificationSink: Send + Sync {
    async fn send(&self, message: &str) -> Result<(), AlerterError>;
}

/// The JSON payload for the LINE `push` endpoint.
#[derive(Debug, Serialize)]
struct PushPayload<'a> {
    to: &'a str,
    messages: Vec<TextMessage<'a>>,
}

#[derive(Debug, Serialize)]
struct TextMessage<'a> {
    #[serde(rename = "type")]
    kind: &'static str,
    text: &'a str,
}

/// A client for the LINE Messaging API push endpoint.
pub struct LineAlerter {
    client: Client,
    endpoint: String,
    token: String,
    user_id: String,
}

impl LineAlerter {
    /// Creates a new `LineAlerter`.
    ///
    /// Returns `None` if the token or user id is missing, allowing the caller
    /// to fall back to console output.
    pub fn new(config: &LineConfig) -> Option<Self> {
        match Self::try_new(config) {
            Ok(alerter) => Some(alerter),
            Err(e) => {
                tracing::warn!("LINE alerter disabled: {}", e);
                None
            }
        }
    }

    pub fn try_new(config: &LineConfig) -> Result<Self, AlerterError> {
        if config.channel_token.is_empty() || config.user_id.is_empty() {
            return Err(AlerterError::NotConfigured);
        }
        Ok(Self {
            client: Client::new(),
            endpoint: config.endpoint.clone(),
            token: config.channel_token.clone(),
            user_id: config.user_id.clone(),
        })
    }

    async fn push(&self, chunks: &[String]) -> Result<(), AlerterError> {
        let payload = PushPayload {
            to: &self.user_id,
            messages: chunks
                .iter()
                .map(|text| TextMessage { kind: "text", text: text.as_str() })
                .collect(),
        };

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.token)
            .json(&payload)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Failed to decode error response".to_string());
            return Err(AlerterError::ApiError {
                status: status.as_u16(),
                body,
            });
        }
        Ok(())
    }
}

#[async_trait]
impl NotificationSink for LineAlerter {
    /// Sends `message`, split into as many push requests as its length needs.
    async fn send(&self, message: &str) -> Result<(), AlerterError> {
        let chunks = split_message(message, MAX_MESSAGE_CHARS);
        for batch in chunks.chunks(MAX_MESSAGES_PER_PUSH) {
            self.push(batch).await?;
        }
        tracing::debug!(chunks = chunks.len(), "LINE push accepted");
        Ok(())
    }
}

/// Prints reports to stdout. Used for dry runs and when LINE is not configured.
#[derive(Debug, Default, Clone, Copy)]
pub struct ConsoleSink;

#[async_trait]
impl NotificationSink for ConsoleSink {
    async fn send(&self, message: &str) -> Result<(), AlerterError> {
        println!("{}", message);
        Ok(())
    }
}

/// Delivers `message` and logs the outcome. Never fails.
pub async fn deliver(sink: &dyn NotificationSink, message: &str) -> bool {
    match sink.send(message).await {
        Ok(()) => {
            tracing::info!(chars = message.chars().count(), "Report delivered");
            true
        }
        Err(e) => {
            tracing::error!(error = %e, "Failed to deliver report");
            false
        }
    }
}

/// Splits `text` into pieces of at most `max_chars` characters, breaking at
/// line ends where possible.
pub fn split_message(text: &str, max_chars: usize) -> Vec<String> {
    let max_chars = max_chars.max(1);
    let mut chunks = Vec::new();
    let mut current = String::new();
    let mut current_len = 0;

    for line in text.split_inclusive('\n') {
        let line_len = line.chars().count();
        if current_len + line_len > max_chars && !current.is_empty() {
            chunks.push(std::mem::take(&mut current).trim_end().to_string());
            current_len = 0;
        }
        if line_len > max_chars {
            let chars: Vec<char> = line.chars().collect();
            for piece in chars.chunks(max_chars) {
                chunks.push(piece.iter().collect::<String>().trim_end().to_string());
            }
            continue;
        }
        current.push_str(line);
        current_len += line_len;
    }
    if !current.trim().is_empty() {
        chunks.push(current.trim_end().to_string());
    }
    chunks.retain(|chunk| !chunk.is_empty());
    chunks
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_message_is_one_chunk() {
        assert_eq!(split_message("hello\nworld", 5000), vec!["hello\nworld"]);
    }

    #[test]
    fn splits_on_line_boundaries() {
        let text = "aaaa\nbbbb\ncccc";
        assert_eq!(split_message(text, 10), vec!["aaaa\nbbbb", "cccc"]);
    }

    #[test]
    fn long_line_is_hard_split_by_characters() {
        let text = "📈".repeat(7);
        let chunks = split_message(&text, 3);
        assert_eq!(chunks.len(), 3);
        assert!(chunks.iter().all(|c| c.chars().count() <= 3));
        assert_eq!(chunks.concat(), text);
    }

    #[test]
    fn empty_message_has_no_chunks() {
        assert!(split_message("", 10).is_empty());
    }

    #[test]
    fn missing_credentials_disable_alerter() {
        let config = LineConfig::default();
        assert!(LineAlerter::new(&config).is_none());
        assert!(matches!(
            LineAlerter::try_new(&config),
            Err(AlerterError::NotConfigured)
        ));
    }

    #[test]
    fn payload_matches_push_api() {
        let chunks = vec!["one".to_string()];
        let payload = PushPayload {
            to: "U123",
            messages: chunks
                .iter()
                .map(|text| TextMessage { kind: "text", text: text.as_str() })
                .collect(),
        };
        let json = serde_json::to_value(&payload).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"to": "U123", "messages": [{"type": "text", "text": "one"}]})
        );
    }
}
