//! Background worker applying click increments.

use std::sync::Arc;

use tokio::sync::{Semaphore, mpsc};
use tokio_retry::Retry;
use tokio_retry::strategy::{ExponentialBackoff, jitter};
use tracing::{debug, info, warn};

use crate::domain::click_event::ClickEvent;
use crate::domain::repositories::LinkStore;

/// Retries after the first failed increment.
const RETRY_ATTEMPTS: usize = 3;

/// Consumes click events until every sender is dropped.
///
/// Up to `concurrency` increments run at once. Failures are logged and
/// dropped; the redirect they belong to has already been served. Returns after
/// in-flight increments finish.
pub async fn run_click_worker(
    mut rx: mpsc::Receiver<ClickEvent>,
    store: Arc<dyn LinkStore>,
    concurrency: usize,
) {
    let concurrency = concurrency.max(1);
    let permits = Arc::new(Semaphore::new(concurrency));

    while let Some(event) = rx.recv().await {
        let Ok(permit) = permits.clone().acquire_owned().await else {
            break;
        };
        let store = store.clone();

        tokio::spawn(async move {
            record_click(store.as_ref(), &event).await;
            drop(permit);
        });
    }

    // Wait for in-flight increments before reporting shutdown.
    let _ = permits.acquire_many(concurrency as u32).await;
    info!("Click worker stopped");
}

/// Increments the counter for one event with a short exponential backoff.
///
/// Returns whether the increment was eventually stored.
pub async fn record_click(store: &dyn LinkStore, event: &ClickEvent) -> bool {
    let strategy = ExponentialBackoff::from_millis(10)
        .map(jitter)
        .take(RETRY_ATTEMPTS);

    match Retry::spawn(strategy, || store.increment_clicks(&event.code)).await {
        Ok(()) => {
            debug!(code = %event.code, "Click recorded");
            true
        }
        Err(e) => {
            warn!(code = %event.code, error = %e, "Failed to record click");
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::NewShortLink;
    use crate::domain::repositories::MockLinkStore;
    use crate::error::AppError;
    use crate::infrastructure::persistence::MemoryLinkStore;
    use serde_json::json;

    #[tokio::test]
    async fn test_record_click_success() {
        let mut store = MockLinkStore::new();
        store
            .expect_increment_clicks()
            .withf(|code| code == "abc123")
            .times(1)
            .returning(|_| Ok(()));

        assert!(record_click(&store, &ClickEvent::new("abc123")).await);
    }

    #[tokio::test(start_paused = true)]
    async fn test_record_click_gives_up_after_retries() {
        let mut store = MockLinkStore::new();
        store
            .expect_increment_clicks()
            .times(RETRY_ATTEMPTS + 1)
            .returning(|_| Err(AppError::internal("Database error", json!({}))));

        assert!(!record_click(&store, &ClickEvent::new("abc123")).await);
    }

    #[tokio::test]
    async fn test_worker_drains_channel() {
        let store = Arc::new(MemoryLinkStore::new());
        store
            .create(NewShortLink::new("abc", "https://example.com", "u1"))
            .await
            .unwrap();
        store
            .create(NewShortLink::new("xyz", "https://example.org", "u1"))
            .await
            .unwrap();

        let (tx, rx) = mpsc::channel(10);
        for code in ["abc", "abc", "xyz", "missing"] {
            tx.send(ClickEvent::new(code)).await.unwrap();
        }
        drop(tx);

        run_click_worker(rx, store.clone(), 2).await;

        let abc = store.find_by_code("abc").await.unwrap().unwrap();
        let xyz = store.find_by_code("xyz").await.unwrap().unwrap();
        assert_eq!(abc.click_count, 2);
        assert_eq!(xyz.click_count, 1);
    }
}
