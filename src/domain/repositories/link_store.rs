//! Persistence contract for short links.

use crate::domain::entities::{NewShortLink, ShortLink};
use crate::error::AppError;
use async_trait::async_trait;

/// Store interface the conversation engine and redirect resolver depend on.
///
/// # Implementations
///
/// - [`crate::infrastructure::persistence::PgLinkStore`] - PostgreSQL implementation
/// - [`crate::infrastructure::persistence::MemoryLinkStore`] - in-process map
/// - Test mocks available with `cfg(test)`
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LinkStore: Send + Sync {
    /// Finds a link by its short code.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on store failures.
    async fn find_by_code(&self, code: &str) -> Result<Option<ShortLink>, AppError>;

    /// Persists a new link with `click_count = 0`.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Conflict`] if the short code is already taken, which
    /// callers must treat differently from [`AppError::Internal`].
    async fn create(&self, new_link: NewShortLink) -> Result<ShortLink, AppError>;

    /// Adds one click to the link's counter. Unknown codes are a no-op.
    async fn increment_clicks(&self, code: &str) -> Result<(), AppError>;

    /// Lists links created by `user_id`, newest first.
    async fn list_by_owner(&self, user_id: &str, limit: i64) -> Result<Vec<ShortLink>, AppError>;

    /// Counts all stored links.
    async fn count(&self) -> Result<i64, AppError>;
}
