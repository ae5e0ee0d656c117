//! End-to-end tests for the SSE continuous read streams
//!
//! Each stream must deliver the current query result immediately on
//! connect, then a fresh result whenever the watched data changes. These
//! tests drive the HTTP surface and read raw event frames off the wire.

use std::sync::Arc;
use std::time::Duration;

use axum::body::{Body, BodyDataStream};
use axum::http::{Request, StatusCode};
use axum::Router;
use futures::StreamExt;
use serde_json::Value;
use tempfile::TempDir;
use tokio::time::timeout;
use tower::util::ServiceExt; // for `oneshot` method

use gnomercy_common::config::TomlConfig;
use gnomercy_common::db::init_memory_database;
use gnomercy_common::db::models::{Genre, NewModule, NewReview, Players};
use gnomercy_common::events::EventBus;

use gnomercy_mc::catalog::{reviews, store};
use gnomercy_mc::services::identity::{IdentityProvider, UnconfiguredIdentityProvider};
use gnomercy_mc::services::media::MediaStore;
use gnomercy_mc::{build_router, AppState};

const WAIT: Duration = Duration::from_secs(2);

async fn test_app() -> (Router, AppState, TempDir) {
    let db = init_memory_database().await.expect("schema should build");
    let bus = EventBus::new(16);
    let media_dir = TempDir::new().expect("temp dir");
    let media = MediaStore::new(media_dir.path().join("images"));
    let identity: Arc<dyn IdentityProvider> = Arc::new(UnconfiguredIdentityProvider);
    let state = AppState::new(db, bus, media, identity, TomlConfig::default());
    (build_router(state.clone()), state, media_dir)
}

fn module_payload(name: &str) -> NewModule {
    NewModule {
        name: name.to_string(),
        genre: Genre::Fantasy,
        players: Players::Four,
        difficulty: 3,
        description: String::new(),
        photo: String::new(),
    }
}

/// Open an SSE stream and return its frame stream
async fn open_stream(app: &Router, uri: &str) -> BodyDataStream {
    let request = Request::builder()
        .method("GET")
        .uri(uri)
        .body(Body::empty())
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    response.into_body().into_data_stream()
}

/// Read the next data-bearing event frame, skipping heartbeat comments
async fn next_event(stream: &mut BodyDataStream) -> (String, Value) {
    loop {
        let chunk = timeout(WAIT, stream.next())
            .await
            .expect("timed out waiting for an event frame")
            .expect("stream ended unexpectedly")
            .expect("stream read error");
        let text = String::from_utf8(chunk.to_vec()).expect("frame should be UTF-8");

        let mut event = String::new();
        let mut data = String::new();
        for line in text.lines() {
            if let Some(rest) = line.strip_prefix("event: ") {
                event = rest.to_string();
            } else if let Some(rest) = line.strip_prefix("data: ") {
                data.push_str(rest);
            }
        }
        if data.is_empty() {
            continue;
        }
        let value = serde_json::from_str(&data).expect("event data should be JSON");
        return (event, value);
    }
}

#[tokio::test]
async fn test_listing_stream_sends_snapshot_on_connect() {
    let (app, state, _media_dir) = test_app().await;

    store::create_module(&state.db, &state.bus, &module_payload("Gloomhollow"))
        .await
        .unwrap();

    let mut stream = open_stream(&app, "/api/modules/events").await;
    let (event, value) = next_event(&mut stream).await;

    assert_eq!(event, "listing");
    let modules = value.as_array().unwrap();
    assert_eq!(modules.len(), 1);
    assert_eq!(modules[0]["name"], "Gloomhollow");
}

#[tokio::test]
async fn test_listing_stream_delivers_on_change() {
    let (app, state, _media_dir) = test_app().await;

    let mut stream = open_stream(&app, "/api/modules/events").await;

    // Connect delivery first: the catalog is empty
    let (event, value) = next_event(&mut stream).await;
    assert_eq!(event, "listing");
    assert_eq!(value.as_array().unwrap().len(), 0);

    // A new module wakes the stream with a fresh listing
    store::create_module(&state.db, &state.bus, &module_payload("Emberfall"))
        .await
        .unwrap();

    let (event, value) = next_event(&mut stream).await;
    assert_eq!(event, "listing");
    let modules = value.as_array().unwrap();
    assert_eq!(modules.len(), 1);
    assert_eq!(modules[0]["name"], "Emberfall");
}

#[tokio::test]
async fn test_listing_stream_honors_filter() {
    let (app, state, _media_dir) = test_app().await;

    let mut stream = open_stream(&app, "/api/modules/events?genre=Horror").await;
    let (_, value) = next_event(&mut stream).await;
    assert_eq!(value.as_array().unwrap().len(), 0);

    // A module outside the filter still wakes the stream, but the
    // delivered result honors the filter
    store::create_module(&state.db, &state.bus, &module_payload("Springtide Faire"))
        .await
        .unwrap();

    let (_, value) = next_event(&mut stream).await;
    assert_eq!(value.as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn test_module_stream_missing_module_is_null() {
    let (app, _state, _media_dir) = test_app().await;

    let id = uuid::Uuid::new_v4();
    let mut stream = open_stream(&app, &format!("/api/modules/{id}/events")).await;

    let (event, value) = next_event(&mut stream).await;
    assert_eq!(event, "module");
    assert_eq!(value, Value::Null);
}

#[tokio::test]
async fn test_module_stream_delivers_updated_stats() {
    let (app, state, _media_dir) = test_app().await;

    let module = store::create_module(&state.db, &state.bus, &module_payload("Ratcatcher's Debt"))
        .await
        .unwrap();

    let mut stream = open_stream(&app, &format!("/api/modules/{}/events", module.module_id)).await;

    let (event, value) = next_event(&mut stream).await;
    assert_eq!(event, "module");
    assert_eq!(value["num_ratings"], 0);

    reviews::add_review(
        &state.db,
        &state.bus,
        module.module_id,
        &NewReview {
            rating: 4,
            text: "Tight little mystery.".to_string(),
            user_id: "Piper".to_string(),
        },
    )
    .await
    .unwrap();

    let (event, value) = next_event(&mut stream).await;
    assert_eq!(event, "module");
    assert_eq!(value["num_ratings"], 1);
    assert_eq!(value["avg_rating"], 4.0);
}

#[tokio::test]
async fn test_review_stream_delivers_new_reviews() {
    let (app, state, _media_dir) = test_app().await;

    let module = store::create_module(&state.db, &state.bus, &module_payload("The Glass Citadel"))
        .await
        .unwrap();

    let mut stream = open_stream(
        &app,
        &format!("/api/modules/{}/reviews/events", module.module_id),
    )
    .await;

    let (event, value) = next_event(&mut stream).await;
    assert_eq!(event, "reviews");
    assert_eq!(value.as_array().unwrap().len(), 0);

    reviews::add_review(
        &state.db,
        &state.bus,
        module.module_id,
        &NewReview {
            rating: 5,
            text: "Our table talked about it for a week.".to_string(),
            user_id: "Mira".to_string(),
        },
    )
    .await
    .unwrap();

    let (event, value) = next_event(&mut stream).await;
    assert_eq!(event, "reviews");
    let delivered = value.as_array().unwrap();
    assert_eq!(delivered.len(), 1);
    assert_eq!(delivered[0]["text"], "Our table talked about it for a week.");
}

#[tokio::test]
async fn test_dropped_stream_releases_subscription() {
    let (app, state, _media_dir) = test_app().await;

    let mut stream = open_stream(&app, "/api/modules/events").await;
    let _ = next_event(&mut stream).await;
    assert_eq!(state.bus.subscriber_count(), 1);

    drop(stream);

    // The watch task notices cancellation and unsubscribes
    let mut released = false;
    for _ in 0..50 {
        if state.bus.subscriber_count() == 0 {
            released = true;
            break;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    assert!(released, "subscription should be released after disconnect");
}
