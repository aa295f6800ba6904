//! Chat transport contract.

use async_trait::async_trait;

/// One inbound chat message, reduced to what the dialogue needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InboundMessage {
    /// Where replies go.
    pub chat_id: i64,
    /// Stable sender identifier, used as the session and ownership key.
    pub user_id: String,
    pub first_name: Option<String>,
    /// `None` for stickers, photos and other non-text messages.
    pub text: Option<String>,
}

#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("Request failed: {0}")]
    Network(String),

    #[error("API error {code}: {description}")]
    Api { code: u16, description: String },

    #[error("Failed to parse response: {0}")]
    Decode(String),
}

impl TransportError {
    /// Whether the API refused the message because its Markdown didn't parse.
    pub fn is_markup_error(&self) -> bool {
        matches!(self, Self::Api { description, .. } if description.contains("can't parse entities"))
    }
}

/// Receives user messages and delivers rendered replies.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ChatTransport: Send + Sync {
    /// Waits for the next batch of messages. An empty batch is normal.
    async fn receive(&self) -> Result<Vec<InboundMessage>, TransportError>;

    /// Sends `text` (legacy Markdown) to `chat_id`.
    async fn send(&self, chat_id: i64, text: &str) -> Result<(), TransportError>;
}
