#![allow(dead_code)]

use axum::extract::ConnectInfo;
use shortlink_bot::application::services::{CodeAllocator, ConversationEngine};
use shortlink_bot::domain::click_event::ClickEvent;
use shortlink_bot::domain::conversation::SessionStore;
use shortlink_bot::domain::entities::NewShortLink;
use shortlink_bot::domain::repositories::LinkStore;
use shortlink_bot::infrastructure::cache::NullCache;
use shortlink_bot::infrastructure::persistence::MemoryLinkStore;
use shortlink_bot::state::AppState;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::sync::mpsc;
use tower::Layer;

pub const BASE_URL: &str = "https://sho.rt";

pub fn peer_addr() -> SocketAddr {
    "127.0.0.1:12345".parse().unwrap()
}

pub async fn create_test_link(store: &MemoryLinkStore, code: &str, url: &str, owner: &str) {
    store
        .create(NewShortLink::new(code, url, owner))
        .await
        .unwrap();
}

pub fn create_test_engine(store: Arc<MemoryLinkStore>) -> ConversationEngine {
    let store: Arc<dyn LinkStore> = store;

    ConversationEngine::new(
        store.clone(),
        Arc::new(SessionStore::default()),
        CodeAllocator::with_defaults(store),
        BASE_URL,
        10,
    )
}

pub fn create_test_state() -> (AppState, Arc<MemoryLinkStore>, mpsc::Receiver<ClickEvent>) {
    let store = Arc::new(MemoryLinkStore::new());
    let (tx, rx) = mpsc::channel(100);
    let engine = Arc::new(create_test_engine(store.clone()));

    let state = AppState::new(store.clone(), Arc::new(NullCache::new()), tx, engine);

    (state, store, rx)
}

/// Supplies the peer address the rate limiter keys on.
#[derive(Clone)]
pub struct MockConnectInfoLayer;

impl<S> Layer<S> for MockConnectInfoLayer {
    type Service = MockConnectInfoService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        MockConnectInfoService { inner }
    }
}

#[derive(Clone)]
pub struct MockConnectInfoService<S> {
    inner: S,
}

impl<S, B> tower::Service<axum::http::Request<B>> for MockConnectInfoService<S>
where
    S: tower::Service<axum::http::Request<B>> + Clone + Send + 'static,
    S::Future: Send + 'static,
    B: Send + 'static,
{
    type Response = S::Response;
    type Error = S::Error;
    type Future = S::Future;

    fn poll_ready(
        &mut self,
        cx: &mut std::task::Context<'_>,
    ) -> std::task::Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, mut req: axum::http::Request<B>) -> Self::Future {
        req.extensions_mut().insert(ConnectInfo(peer_addr()));
        self.inner.call(req)
    }
}
