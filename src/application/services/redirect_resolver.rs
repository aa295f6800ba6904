//! Short code → destination resolution for the redirect endpoint.

use std::sync::Arc;

use serde_json::json;
use tokio::sync::mpsc;
use tracing::{debug, error, warn};

use crate::domain::click_event::ClickEvent;
use crate::domain::repositories::LinkStore;
use crate::error::AppError;
use crate::infrastructure::cache::CacheService;
use crate::utils::code_generator::is_valid_code;
use crate::utils::url_safety::is_acceptable;

/// Why a code did not resolve.
#[derive(Debug, thiserror::Error)]
pub enum ResolveError {
    #[error("short link not found")]
    NotFound,

    /// Malformed code, or a stored URL that no longer passes the safety check.
    #[error("short link is not redirectable")]
    Invalid,

    #[error(transparent)]
    Store(#[from] AppError),
}

/// `NotFound` and `Invalid` render identically so callers can't probe which
/// codes exist behind a blocked URL.
impl From<ResolveError> for AppError {
    fn from(e: ResolveError) -> Self {
        match e {
            ResolveError::NotFound | ResolveError::Invalid => {
                AppError::not_found("Short link not found", json!({}))
            }
            ResolveError::Store(e) => e,
        }
    }
}

pub struct RedirectResolver {
    store: Arc<dyn LinkStore>,
    cache: Arc<dyn CacheService>,
    click_sender: mpsc::Sender<ClickEvent>,
}

impl RedirectResolver {
    pub fn new(
        store: Arc<dyn LinkStore>,
        cache: Arc<dyn CacheService>,
        click_sender: mpsc::Sender<ClickEvent>,
    ) -> Self {
        Self {
            store,
            cache,
            click_sender,
        }
    }

    /// Resolves `code` to the URL to redirect to.
    ///
    /// # Flow
    ///
    /// 1. Reject codes outside `[A-Za-z0-9_-]{3,20}` without touching the store
    /// 2. Check the cache, falling back to the store on a miss
    /// 3. Re-check the stored URL against the safety policy, caching it on a
    ///    store hit that passes
    /// 4. Queue a click event; a full queue drops the click, never the redirect
    ///
    /// # Errors
    ///
    /// - [`ResolveError::Invalid`] for malformed codes and unsafe stored URLs
    /// - [`ResolveError::NotFound`] if no link has this code
    /// - [`ResolveError::Store`] on store failures
    pub async fn resolve(&self, code: &str) -> Result<String, ResolveError> {
        if !is_valid_code(code) {
            return Err(ResolveError::Invalid);
        }

        let (destination, from_cache) = match self.cache.get(code).await {
            Some(url) => (url, true),
            None => {
                let link = self
                    .store
                    .find_by_code(code)
                    .await?
                    .ok_or(ResolveError::NotFound)?;

                (link.original_url, false)
            }
        };

        if !is_acceptable(&destination) {
            warn!(code, "Stored URL failed safety re-check");
            return Err(ResolveError::Invalid);
        }

        // Only destinations that passed the re-check are cached.
        if !from_cache {
            let cache = self.cache.clone();
            let cached_code = code.to_string();
            let cached_url = destination.clone();
            tokio::spawn(async move {
                cache.put(&cached_code, &cached_url, None).await;
            });
        }

        match self.click_sender.try_send(ClickEvent::new(code)) {
            Ok(()) => debug!(code, "Click queued"),
            Err(mpsc::error::TrySendError::Full(_)) => warn!(code, "Click queue full, dropping click"),
            Err(mpsc::error::TrySendError::Closed(_)) => error!(code, "Click worker is gone"),
        }

        Ok(destination)
    }

    /// Remaining capacity of the click queue.
    pub fn click_queue_capacity(&self) -> usize {
        self.click_sender.capacity()
    }
}
