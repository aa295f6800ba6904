//! Telegram Bot API transport over long polling.

use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicI64, Ordering};
use std::time::Duration;
use tracing::{debug, warn};

use super::transport::{ChatTransport, InboundMessage, TransportError};

/// Headroom over the long-poll timeout before the HTTP client gives up.
const CLIENT_TIMEOUT_MARGIN: Duration = Duration::from_secs(10);

#[derive(Debug, Deserialize)]
struct ApiResponse<T> {
    ok: bool,
    result: Option<T>,
    description: Option<String>,
    error_code: Option<u16>,
}

#[derive(Debug, Deserialize)]
struct Update {
    update_id: i64,
    message: Option<Message>,
}

#[derive(Debug, Deserialize)]
struct Message {
    chat: Chat,
    from: Option<User>,
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Chat {
    id: i64,
}

#[derive(Debug, Deserialize)]
struct User {
    id: i64,
    #[serde(default)]
    is_bot: bool,
    first_name: Option<String>,
}

#[derive(Debug, Serialize)]
struct GetUpdates<'a> {
    offset: i64,
    timeout: u64,
    allowed_updates: &'a [&'a str],
}

#[derive(Debug, Serialize)]
struct SendMessage<'a> {
    chat_id: i64,
    text: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    parse_mode: Option<&'a str>,
    disable_web_page_preview: bool,
}

pub struct TelegramTransport {
    client: Client,
    /// `{api_url}/bot{token}`
    endpoint: String,
    poll_timeout: u64,
    offset: AtomicI64,
}

impl TelegramTransport {
    /// # Errors
    ///
    /// Returns [`TransportError::Network`] if the HTTP client can't be built.
    pub fn new(api_url: &str, token: &str, poll_timeout: u64) -> Result<Self, TransportError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(poll_timeout) + CLIENT_TIMEOUT_MARGIN)
            .build()
            .map_err(|e| TransportError::Network(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            endpoint: format!("{}/bot{}", api_url.trim_end_matches('/'), token),
            poll_timeout,
            offset: AtomicI64::new(0),
        })
    }

    async fn call<B: Serialize + Sync, T: DeserializeOwned>(
        &self,
        method: &str,
        body: &B,
    ) -> Result<T, TransportError> {
        let response = self
            .client
            .post(format!("{}/{}", self.endpoint, method))
            .json(body)
            .send()
            .await
            .map_err(|e| {
                // The error's URL would contain the bot token.
                let e = e.without_url();
                if e.is_timeout() {
                    TransportError::Network(format!("Request timeout: {e}"))
                } else {
                    TransportError::Network(format!("{method} failed: {e}"))
                }
            })?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| TransportError::Network(format!("Failed to read response: {e}")))?;

        parse_response(status.as_u16(), &body)
    }

    async fn send_message(
        &self,
        chat_id: i64,
        text: &str,
        parse_mode: Option<&str>,
    ) -> Result<(), TransportError> {
        let body = SendMessage {
            chat_id,
            text,
            parse_mode,
            disable_web_page_preview: true,
        };

        self.call::<_, serde_json::Value>("sendMessage", &body)
            .await
            .map(|_| ())
    }
}

fn parse_response<T: DeserializeOwned>(status: u16, body: &str) -> Result<T, TransportError> {
    let parsed: ApiResponse<T> =
        serde_json::from_str(body).map_err(|e| TransportError::Decode(e.to_string()))?;

    match parsed {
        ApiResponse {
            ok: true,
            result: Some(result),
            ..
        } => Ok(result),
        ApiResponse {
            description,
            error_code,
            ..
        } => Err(TransportError::Api {
            code: error_code.unwrap_or(status),
            description: description.unwrap_or_else(|| "no description".to_string()),
        }),
    }
}

/// Keeps updates that carry a message from a human sender.
fn to_inbound(update: Update) -> Option<InboundMessage> {
    let message = update.message?;
    let from = message.from.filter(|user| !user.is_bot)?;

    Some(InboundMessage {
        chat_id: message.chat.id,
        user_id: from.id.to_string(),
        first_name: from.first_name,
        text: message.text,
    })
}

#[async_trait]
impl ChatTransport for TelegramTransport {
    async fn receive(&self) -> Result<Vec<InboundMessage>, TransportError> {
        let request = GetUpdates {
            offset: self.offset.load(Ordering::Acquire),
            timeout: self.poll_timeout,
            allowed_updates: &["message"],
        };

        let updates: Vec<Update> = self.call("getUpdates", &request).await?;

        // Acknowledge everything fetched, including skipped updates.
        if let Some(last) = updates.iter().map(|u| u.update_id).max() {
            self.offset.store(last + 1, Ordering::Release);
        }

        debug!(count = updates.len(), "Fetched updates");
        Ok(updates.into_iter().filter_map(to_inbound).collect())
    }

    async fn send(&self, chat_id: i64, text: &str) -> Result<(), TransportError> {
        match self.send_message(chat_id, text, Some("Markdown")).await {
            Err(e) if e.is_markup_error() => {
                warn!(chat_id, error = %e, "Markdown rejected, resending as plain text");
                self.send_message(chat_id, text, None).await
            }
            other => other,
        }
    }
}
