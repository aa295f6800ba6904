//! ShortLink entity representing a persisted code → URL mapping.

use chrono::{DateTime, Utc};

/// A shortened URL owned by a chat user.
///
/// `short_code` is globally unique (enforced by the store). `click_count`
/// only ever grows; the core never deletes a link.
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct ShortLink {
    pub id: i64,
    pub short_code: String,
    pub original_url: String,
    pub created_by: String,
    pub created_at: DateTime<Utc>,
    pub click_count: i64,
}

impl ShortLink {
    /// Creates a new ShortLink instance.
    pub fn new(
        id: i64,
        short_code: String,
        original_url: String,
        created_by: String,
        created_at: DateTime<Utc>,
        click_count: i64,
    ) -> Self {
        Self {
            id,
            short_code,
            original_url,
            created_by,
            created_at,
            click_count,
        }
    }
}

/// Input data for creating a new link.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewShortLink {
    pub short_code: String,
    pub original_url: String,
    pub created_by: String,
}

impl NewShortLink {
    pub fn new(
        short_code: impl Into<String>,
        original_url: impl Into<String>,
        created_by: impl Into<String>,
    ) -> Self {
        Self {
            short_code: short_code.into(),
            original_url: original_url.into(),
            created_by: created_by.into(),
        }
    }
}
