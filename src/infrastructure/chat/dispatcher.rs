//! Routes inbound chat messages to conversation handlers.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinSet;
use tracing::{debug, error, warn};

use super::transport::{ChatTransport, InboundMessage};
use crate::application::services::ConversationEngine;
use crate::domain::conversation::Reply;

/// Pause after a failed poll before asking again.
const POLL_ERROR_BACKOFF: Duration = Duration::from_secs(5);

/// What an inbound message asks for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChatCommand {
    Start,
    Help,
    MyLinks,
    Cancel,
    Text(String),
    /// Sticker, photo, or anything else without text.
    NonText,
    /// A slash command the bot doesn't know. Gets no reply.
    Ignored,
}

impl ChatCommand {
    pub fn parse(text: Option<&str>) -> Self {
        let Some(text) = text else {
            return Self::NonText;
        };

        let Some(command) = text.trim_start().strip_prefix('/') else {
            return Self::Text(text.to_string());
        };

        // "/start@my_bot extra" → "start"
        let name = command
            .split_whitespace()
            .next()
            .unwrap_or_default()
            .split('@')
            .next()
            .unwrap_or_default();

        match name {
            "start" => Self::Start,
            "help" => Self::Help,
            "mylinks" => Self::MyLinks,
            "cancel" => Self::Cancel,
            _ => Self::Ignored,
        }
    }
}

/// Runs the handler for one message. `None` means stay silent.
pub async fn dispatch(engine: &ConversationEngine, message: &InboundMessage) -> Option<Reply> {
    let user_id = message.user_id.as_str();

    let reply = match ChatCommand::parse(message.text.as_deref()) {
        ChatCommand::Start => {
            engine
                .on_session_start(user_id, message.first_name.as_deref())
                .await
        }
        ChatCommand::Help => engine.on_help(),
        ChatCommand::MyLinks => engine.on_list_links_request(user_id).await,
        ChatCommand::Cancel => engine.on_cancel(user_id).await,
        ChatCommand::Text(text) => engine.on_free_text(user_id, &text).await,
        ChatCommand::NonText => Reply::TextOnly,
        ChatCommand::Ignored => {
            debug!(user_id, "Ignoring unknown command");
            return None;
        }
    };

    Some(reply)
}

/// Polls `transport` forever, answering every message.
///
/// Messages of one batch are grouped by user: different users are handled
/// concurrently, one user's messages strictly in arrival order. The next poll
/// starts once the whole batch has been answered.
pub async fn run_chat_loop(transport: Arc<dyn ChatTransport>, engine: Arc<ConversationEngine>) {
    loop {
        let batch = match transport.receive().await {
            Ok(batch) => batch,
            Err(e) => {
                warn!(error = %e, "Failed to fetch chat updates");
                tokio::time::sleep(POLL_ERROR_BACKOFF).await;
                continue;
            }
        };

        let mut tasks = JoinSet::new();
        for messages in group_by_user(batch).into_values() {
            let transport = transport.clone();
            let engine = engine.clone();

            tasks.spawn(async move {
                for message in messages {
                    answer(transport.as_ref(), &engine, &message).await;
                }
            });
        }

        while let Some(result) = tasks.join_next().await {
            if let Err(e) = result {
                error!(error = %e, "Chat handler task failed");
            }
        }
    }
}

async fn answer(transport: &dyn ChatTransport, engine: &ConversationEngine, message: &InboundMessage) {
    let Some(reply) = dispatch(engine, message).await else {
        return;
    };

    if let Err(e) = transport.send(message.chat_id, &reply.to_string()).await {
        error!(user_id = %message.user_id, chat_id = message.chat_id, error = %e, "Failed to send reply");
    }
}

fn group_by_user(batch: Vec<InboundMessage>) -> HashMap<String, Vec<InboundMessage>> {
    let mut by_user: HashMap<String, Vec<InboundMessage>> = HashMap::new();
    for message in batch {
        by_user
            .entry(message.user_id.clone())
            .or_default()
            .push(message);
    }
    by_user
}
