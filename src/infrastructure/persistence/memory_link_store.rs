//! In-process link store.
//!
//! Used by tests and by local runs without PostgreSQL. Data lives only as
//! long as the process.

use async_trait::async_trait;
use chrono::Utc;
use serde_json::json;
use std::collections::BTreeMap;
use std::sync::Mutex;

use crate::domain::entities::{NewShortLink, ShortLink};
use crate::domain::repositories::LinkStore;
use crate::error::AppError;

#[derive(Default)]
struct Inner {
    links: BTreeMap<String, ShortLink>,
    next_id: i64,
}

/// `LinkStore` backed by a mutex-guarded map keyed by short code.
#[derive(Default)]
pub struct MemoryLinkStore {
    inner: Mutex<Inner>,
}

impl MemoryLinkStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, Inner>, AppError> {
        self.inner
            .lock()
            .map_err(|_| AppError::internal("Link store mutex poisoned", json!({})))
    }
}

#[async_trait]
impl LinkStore for MemoryLinkStore {
    async fn find_by_code(&self, code: &str) -> Result<Option<ShortLink>, AppError> {
        Ok(self.lock()?.links.get(code).cloned())
    }

    async fn create(&self, new_link: NewShortLink) -> Result<ShortLink, AppError> {
        let mut inner = self.lock()?;

        if inner.links.contains_key(&new_link.short_code) {
            return Err(AppError::conflict(
                "Unique constraint violation",
                json!({ "constraint": "short_links_short_code_key" }),
            ));
        }

        inner.next_id += 1;
        let link = ShortLink::new(
            inner.next_id,
            new_link.short_code,
            new_link.original_url,
            new_link.created_by,
            Utc::now(),
            0,
        );
        inner.links.insert(link.short_code.clone(), link.clone());

        Ok(link)
    }

    async fn increment_clicks(&self, code: &str) -> Result<(), AppError> {
        if let Some(link) = self.lock()?.links.get_mut(code) {
            link.click_count += 1;
        }
        Ok(())
    }

    async fn list_by_owner(&self, user_id: &str, limit: i64) -> Result<Vec<ShortLink>, AppError> {
        let inner = self.lock()?;
        let mut links: Vec<_> = inner
            .links
            .values()
            .filter(|link| link.created_by == user_id)
            .cloned()
            .collect();

        // Same tie-break as the SQL store: newer id wins on equal timestamps.
        links.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        links.truncate(limit.max(0) as usize);

        Ok(links)
    }

    async fn count(&self) -> Result<i64, AppError> {
        Ok(self.lock()?.links.len() as i64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_create_and_find() {
        let store = MemoryLinkStore::new();

        let created = store
            .create(NewShortLink::new("abc123", "https://example.com", "42"))
            .await
            .unwrap();
        assert_eq!(created.click_count, 0);
        assert_eq!(created.id, 1);

        let found = store.find_by_code("abc123").await.unwrap().unwrap();
        assert_eq!(found, created);
        assert!(store.find_by_code("other").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_create_duplicate_is_conflict() {
        let store = MemoryLinkStore::new();
        store
            .create(NewShortLink::new("dup", "https://a.com", "1"))
            .await
            .unwrap();

        let err = store
            .create(NewShortLink::new("dup", "https://b.com", "2"))
            .await
            .unwrap_err();

        assert!(err.is_conflict());
        let kept = store.find_by_code("dup").await.unwrap().unwrap();
        assert_eq!(kept.original_url, "https://a.com");
    }

    #[tokio::test]
    async fn test_codes_are_case_sensitive() {
        let store = MemoryLinkStore::new();
        store
            .create(NewShortLink::new("Abc", "https://a.com", "1"))
            .await
            .unwrap();

        assert!(store.find_by_code("abc").await.unwrap().is_none());
        assert!(
            store
                .create(NewShortLink::new("abc", "https://b.com", "1"))
                .await
                .is_ok()
        );
    }

    #[tokio::test]
    async fn test_increment_unknown_code_is_noop() {
        let store = MemoryLinkStore::new();
        store.increment_clicks("missing").await.unwrap();
        assert_eq!(store.count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_list_by_owner_newest_first_with_limit() {
        let store = MemoryLinkStore::new();
        for code in ["one", "two", "three"] {
            store
                .create(NewShortLink::new(code, "https://example.com", "owner"))
                .await
                .unwrap();
        }
        store
            .create(NewShortLink::new("foreign", "https://example.com", "other"))
            .await
            .unwrap();

        let links = store.list_by_owner("owner", 2).await.unwrap();
        let codes: Vec<_> = links.iter().map(|l| l.short_code.as_str()).collect();
        assert_eq!(codes, ["three", "two"]);

        assert!(store.list_by_owner("nobody", 10).await.unwrap().is_empty());
        assert_eq!(store.count().await.unwrap(), 4);
    }
}
