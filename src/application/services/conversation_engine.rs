//! Chat dialogue driver: URL intake, code selection, persistence.

use std::sync::Arc;

use tracing::{error, info, warn};

use super::code_allocator::{AllocationError, CodeAllocator};
use crate::domain::conversation::session_store::SessionGuard;
use crate::domain::conversation::transition::{is_cancel, transition};
use crate::domain::conversation::{
    CodeChoice, ConversationStep, LinkEntry, Reply, SessionStore, Transition,
};
use crate::domain::entities::{NewShortLink, ShortLink};
use crate::domain::repositories::LinkStore;

/// Default number of links shown by the "my links" command.
pub const DEFAULT_LIST_LIMIT: i64 = 10;

/// One handler per chat intent. Every handler returns the reply to send;
/// delivery is the transport's job.
///
/// Messages from the same user are handled one at a time: each handler holds
/// that user's session guard until its reply is decided.
pub struct ConversationEngine {
    store: Arc<dyn LinkStore>,
    sessions: Arc<SessionStore>,
    allocator: CodeAllocator,
    base_url: String,
    list_limit: i64,
}

impl ConversationEngine {
    pub fn new(
        store: Arc<dyn LinkStore>,
        sessions: Arc<SessionStore>,
        allocator: CodeAllocator,
        base_url: impl Into<String>,
        list_limit: i64,
    ) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();

        Self {
            store,
            sessions,
            allocator,
            base_url,
            list_limit,
        }
    }

    pub fn sessions(&self) -> &Arc<SessionStore> {
        &self.sessions
    }

    /// Public URL for `code`.
    pub fn short_url(&self, code: &str) -> String {
        format!("{}/{}", self.base_url, code)
    }

    /// Starts (or restarts) a session and asks for a URL.
    pub async fn on_session_start(&self, user_id: &str, first_name: Option<&str>) -> Reply {
        self.sessions
            .lock(user_id)
            .await
            .set(ConversationStep::AwaitingUrl);

        info!(user_id, "Session started");
        Reply::Welcome {
            first_name: first_name.map(str::to_string),
        }
    }

    /// Drops any session. Replies the same whether or not one existed.
    pub async fn on_cancel(&self, user_id: &str) -> Reply {
        self.sessions.lock(user_id).await.clear();
        Reply::Cancelled
    }

    pub fn on_help(&self) -> Reply {
        Reply::Help
    }

    /// Applies a plain text message to the user's session.
    pub async fn on_free_text(&self, user_id: &str, text: &str) -> Reply {
        let mut guard = self.sessions.lock(user_id).await;

        let Some(session) = guard.current() else {
            return if is_cancel(text) {
                Reply::Cancelled
            } else {
                Reply::NoActiveSession
            };
        };
        let step = session.step.clone();
        guard.touch();

        match transition(&step, text) {
            Transition::Stay(reply) => reply,
            Transition::Advance { next, reply } => {
                guard.set(next);
                reply
            }
            Transition::End(reply) => {
                guard.clear();
                reply
            }
            Transition::SelectCode {
                pending_url,
                choice: CodeChoice::Random,
            } => self.finish_with_random_code(&mut guard, user_id, &pending_url).await,
            Transition::SelectCode {
                pending_url,
                choice: CodeChoice::Custom(code),
            } => {
                self.finish_with_custom_code(&mut guard, user_id, pending_url, code)
                    .await
            }
        }
    }

    /// Lists the user's newest links. Leaves any session untouched.
    pub async fn on_list_links_request(&self, user_id: &str) -> Reply {
        match self.store.list_by_owner(user_id, self.list_limit).await {
            Ok(links) if links.is_empty() => Reply::NoLinks,
            Ok(links) => Reply::Links {
                entries: links.into_iter().map(|link| self.entry(link)).collect(),
            },
            Err(e) => {
                error!(user_id, error = %e, "Failed to list links");
                Reply::TransientFailure
            }
        }
    }

    async fn finish_with_random_code(
        &self,
        guard: &mut SessionGuard,
        user_id: &str,
        pending_url: &str,
    ) -> Reply {
        match self.create_with_random_code(user_id, pending_url).await {
            Ok(link) => {
                guard.clear();
                self.created(link)
            }
            Err(AllocationError::Exhausted { attempts }) => {
                warn!(user_id, attempts, "Random code allocation exhausted");
                guard.clear();
                Reply::AllocationExhausted
            }
            Err(AllocationError::Store(e)) => {
                error!(user_id, error = %e, "Failed to create link with random code");
                Reply::TransientFailure
            }
        }
    }

    /// Allocates and inserts a random code. A code grabbed by a concurrent
    /// insert after the occupancy check counts as one more collision.
    async fn create_with_random_code(
        &self,
        user_id: &str,
        pending_url: &str,
    ) -> Result<ShortLink, AllocationError> {
        let attempts = self.allocator.max_attempts();

        for _ in 0..attempts {
            let code = self.allocator.allocate_unique().await?;

            match self
                .store
                .create(NewShortLink::new(code, pending_url, user_id))
                .await
            {
                Ok(link) => return Ok(link),
                Err(e) if e.is_conflict() => continue,
                Err(e) => return Err(e.into()),
            }
        }

        Err(AllocationError::Exhausted { attempts })
    }

    async fn finish_with_custom_code(
        &self,
        guard: &mut SessionGuard,
        user_id: &str,
        pending_url: String,
        code: String,
    ) -> Reply {
        match self.allocator.is_taken(&code).await {
            Ok(true) => return code_taken(guard, pending_url, code),
            Ok(false) => {}
            Err(e) => {
                error!(user_id, error = %e, "Failed to check custom code");
                return Reply::TransientFailure;
            }
        }

        match self
            .store
            .create(NewShortLink::new(&code, &pending_url, user_id))
            .await
        {
            Ok(link) => {
                guard.clear();
                self.created(link)
            }
            Err(e) if e.is_conflict() => code_taken(guard, pending_url, code),
            Err(e) => {
                error!(user_id, error = %e, "Failed to create link with custom code");
                Reply::TransientFailure
            }
        }
    }

    fn created(&self, link: ShortLink) -> Reply {
        info!(code = %link.short_code, user_id = %link.created_by, "Short link created");

        Reply::Created {
            short_url: self.short_url(&link.short_code),
            code: link.short_code,
            original_url: link.original_url,
        }
    }

    fn entry(&self, link: ShortLink) -> LinkEntry {
        LinkEntry {
            short_url: self.short_url(&link.short_code),
            code: link.short_code,
            clicks: link.click_count,
            created_at: link.created_at,
            original_url: link.original_url,
        }
    }
}

fn code_taken(guard: &mut SessionGuard, pending_url: String, code: String) -> Reply {
    guard.set(ConversationStep::AwaitingRetryCode {
        pending_url,
        taken_code: code.clone(),
    });
    Reply::CodeTaken { code }
}
