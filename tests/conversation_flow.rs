mod common;

use chrono::{Duration, Utc};
use shortlink_bot::domain::conversation::{ConversationStep, Reply};
use shortlink_bot::domain::repositories::LinkStore;
use shortlink_bot::infrastructure::chat::{InboundMessage, dispatch};
use shortlink_bot::infrastructure::persistence::MemoryLinkStore;
use shortlink_bot::utils::code_generator::is_valid_code;
use std::sync::Arc;

const USER: &str = "1001";

fn message(user_id: &str, text: Option<&str>) -> InboundMessage {
    InboundMessage {
        chat_id: 77,
        user_id: user_id.to_string(),
        first_name: Some("Grace".to_string()),
        text: text.map(str::to_string),
    }
}

async fn send(
    engine: &shortlink_bot::application::services::ConversationEngine,
    text: &str,
) -> Reply {
    dispatch(engine, &message(USER, Some(text)))
        .await
        .expect("every command here gets a reply")
}

#[tokio::test]
async fn test_create_link_with_random_code() {
    let store = Arc::new(MemoryLinkStore::new());
    let engine = common::create_test_engine(store.clone());

    assert_eq!(
        send(&engine, "/start").await,
        Reply::Welcome {
            first_name: Some("Grace".to_string())
        }
    );
    assert_eq!(
        send(&engine, "https://example.com/a/long/path?x=1").await,
        Reply::ChooseCode {
            url: "https://example.com/a/long/path?x=1".to_string()
        }
    );

    let Reply::Created {
        short_url,
        code,
        original_url,
    } = send(&engine, "random").await
    else {
        panic!("expected a created link");
    };

    assert!(is_valid_code(&code));
    assert_eq!(code.len(), 6);
    assert_eq!(short_url, format!("{}/{}", common::BASE_URL, code));
    assert_eq!(original_url, "https://example.com/a/long/path?x=1");

    let stored = store.find_by_code(&code).await.unwrap().unwrap();
    assert_eq!(stored.created_by, USER);
    assert_eq!(stored.click_count, 0);
    assert!(engine.sessions().snapshot(USER).await.is_none());
}

#[tokio::test]
async fn test_create_link_with_custom_code() {
    let store = Arc::new(MemoryLinkStore::new());
    let engine = common::create_test_engine(store.clone());

    send(&engine, "/start").await;
    send(&engine, "https://example.com").await;

    assert_eq!(
        send(&engine, "my-promo_1").await,
        Reply::Created {
            short_url: "https://sho.rt/my-promo_1".to_string(),
            code: "my-promo_1".to_string(),
            original_url: "https://example.com".to_string(),
        }
    );
    assert!(store.find_by_code("my-promo_1").await.unwrap().is_some());
}

#[tokio::test]
async fn test_taken_code_then_retry() {
    let store = Arc::new(MemoryLinkStore::new());
    common::create_test_link(&store, "promo", "https://other.example.com", "2002").await;
    let engine = common::create_test_engine(store.clone());

    send(&engine, "/start").await;
    send(&engine, "https://example.com/new").await;

    assert_eq!(
        send(&engine, "promo").await,
        Reply::CodeTaken {
            code: "promo".to_string()
        }
    );
    assert_eq!(
        engine.sessions().snapshot(USER).await.unwrap().step,
        ConversationStep::AwaitingRetryCode {
            pending_url: "https://example.com/new".to_string(),
            taken_code: "promo".to_string(),
        }
    );

    assert!(matches!(
        send(&engine, "promo2").await,
        Reply::Created { ref code, .. } if code == "promo2"
    ));

    // The existing link is untouched.
    let original = store.find_by_code("promo").await.unwrap().unwrap();
    assert_eq!(original.original_url, "https://other.example.com");
    assert_eq!(original.created_by, "2002");
}

#[tokio::test]
async fn test_rejected_inputs_keep_step() {
    let engine = common::create_test_engine(Arc::new(MemoryLinkStore::new()));

    send(&engine, "/start").await;
    assert_eq!(send(&engine, "no link here").await, Reply::InvalidUrlFormat);
    assert_eq!(
        send(&engine, "http://localhost:8080/admin").await,
        Reply::UrlRejected
    );
    assert_eq!(
        send(&engine, "http://10.0.0.5/").await,
        Reply::UrlRejected
    );
    assert_eq!(
        engine.sessions().snapshot(USER).await.unwrap().step,
        ConversationStep::AwaitingUrl
    );

    send(&engine, "https://example.com").await;
    assert_eq!(send(&engine, "a!").await, Reply::InvalidCode);
    assert!(matches!(
        engine.sessions().snapshot(USER).await.unwrap().step,
        ConversationStep::AwaitingCode { .. }
    ));
}

#[tokio::test]
async fn test_cancel_from_any_step() {
    let engine = common::create_test_engine(Arc::new(MemoryLinkStore::new()));

    send(&engine, "/start").await;
    assert_eq!(send(&engine, "CANCEL").await, Reply::Cancelled);
    assert!(engine.sessions().snapshot(USER).await.is_none());

    send(&engine, "/start").await;
    send(&engine, "https://example.com").await;
    assert_eq!(send(&engine, "/cancel").await, Reply::Cancelled);
    assert!(engine.sessions().snapshot(USER).await.is_none());

    assert_eq!(send(&engine, "https://example.com").await, Reply::NoActiveSession);
}

#[tokio::test]
async fn test_idle_session_expires() {
    let engine = common::create_test_engine(Arc::new(MemoryLinkStore::new()));

    engine.sessions().lock(USER).await.set_at(
        ConversationStep::AwaitingCode {
            pending_url: "https://example.com".to_string(),
        },
        Utc::now() - Duration::minutes(11),
    );

    assert_eq!(send(&engine, "random").await, Reply::NoActiveSession);
}

#[tokio::test]
async fn test_sweep_drops_only_idle_sessions() {
    let engine = common::create_test_engine(Arc::new(MemoryLinkStore::new()));
    let sessions = engine.sessions();

    sessions
        .lock("idle")
        .await
        .set_at(ConversationStep::AwaitingUrl, Utc::now() - Duration::minutes(30));
    engine.on_session_start("fresh", None).await;

    assert_eq!(sessions.sweep_expired(), 1);
    assert_eq!(sessions.active_sessions(), 1);
    assert!(sessions.snapshot("fresh").await.is_some());
}

#[tokio::test]
async fn test_users_do_not_share_sessions() {
    let engine = common::create_test_engine(Arc::new(MemoryLinkStore::new()));

    engine.on_session_start("a", None).await;
    engine.on_free_text("a", "https://example.com/a").await;

    assert_eq!(
        engine.on_free_text("b", "https://example.com/b").await,
        Reply::NoActiveSession
    );
    assert!(matches!(
        engine.sessions().snapshot("a").await.unwrap().step,
        ConversationStep::AwaitingCode { .. }
    ));
}

#[tokio::test]
async fn test_my_links_lists_only_own_links() {
    let store = Arc::new(MemoryLinkStore::new());
    common::create_test_link(&store, "mine1", "https://example.com/1", USER).await;
    common::create_test_link(&store, "theirs", "https://example.com/x", "9999").await;
    common::create_test_link(&store, "mine2", "https://example.com/2", USER).await;
    let engine = common::create_test_engine(store);

    let Reply::Links { entries } = send(&engine, "/mylinks").await else {
        panic!("expected a link list");
    };

    let codes: Vec<_> = entries.iter().map(|entry| entry.code.as_str()).collect();
    assert_eq!(codes, ["mine2", "mine1"]);
    assert_eq!(entries[0].short_url, "https://sho.rt/mine2");
}

#[tokio::test]
async fn test_my_links_empty() {
    let engine = common::create_test_engine(Arc::new(MemoryLinkStore::new()));

    assert_eq!(send(&engine, "/mylinks").await, Reply::NoLinks);
}

#[tokio::test]
async fn test_non_text_and_unknown_commands() {
    let engine = common::create_test_engine(Arc::new(MemoryLinkStore::new()));

    assert_eq!(
        dispatch(&engine, &message(USER, None)).await,
        Some(Reply::TextOnly)
    );
    assert_eq!(dispatch(&engine, &message(USER, Some("/unknown"))).await, None);
    assert_eq!(send(&engine, "/help").await, Reply::Help);
}

#[tokio::test]
async fn test_reserved_route_name_is_refused_as_code() {
    let store = Arc::new(MemoryLinkStore::new());
    let engine = common::create_test_engine(store.clone());

    send(&engine, "/start").await;
    send(&engine, "https://example.com/page").await;

    assert_eq!(
        send(&engine, "health").await,
        Reply::CodeTaken {
            code: "health".to_string()
        }
    );
    assert!(store.find_by_code("health").await.unwrap().is_none());

    assert!(matches!(
        send(&engine, "random").await,
        Reply::Created { ref code, .. } if code != "health"
    ));
}
