//! Shared state injected into HTTP handlers and the chat loop.

use std::sync::Arc;
use tokio::sync::mpsc;

use crate::application::services::{ConversationEngine, RedirectResolver};
use crate::domain::click_event::ClickEvent;
use crate::domain::repositories::LinkStore;
use crate::infrastructure::cache::CacheService;

/// Cheap to clone: every field is reference-counted.
#[derive(Clone)]
pub struct AppState {
    pub link_store: Arc<dyn LinkStore>,
    pub cache: Arc<dyn CacheService>,
    pub click_sender: mpsc::Sender<ClickEvent>,
    pub engine: Arc<ConversationEngine>,
    pub resolver: Arc<RedirectResolver>,
}

impl AppState {
    /// Wires the redirect resolver to the same store, cache and click queue.
    pub fn new(
        link_store: Arc<dyn LinkStore>,
        cache: Arc<dyn CacheService>,
        click_sender: mpsc::Sender<ClickEvent>,
        engine: Arc<ConversationEngine>,
    ) -> Self {
        let resolver = Arc::new(RedirectResolver::new(
            link_store.clone(),
            cache.clone(),
            click_sender.clone(),
        ));

        Self {
            link_store,
            cache,
            click_sender,
            engine,
            resolver,
        }
    }
}
