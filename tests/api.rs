use std::{sync::Arc, time::Duration};

use axum::{
    body::{to_bytes, Body},
    http::{Method, Request, StatusCode},
    Router,
};
use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use tower::ServiceExt;

use devgotchi_timer::{
    create_router,
    state::AppState,
    storage::{FileStore, KeyValueStore, MemoryStore},
    timer::{ManualClock, PersistentTimer, DEFAULT_STORAGE_KEY},
};

const T0: i64 = 1_700_000_000_000;

struct Harness {
    store: Arc<dyn KeyValueStore>,
    clock: Arc<ManualClock>,
    router: Router,
}

impl Harness {
    fn new() -> Self {
        Self::with_store(Arc::new(MemoryStore::new()), Arc::new(ManualClock::new(T0)))
    }

    fn with_store(store: Arc<dyn KeyValueStore>, clock: Arc<ManualClock>) -> Self {
        let timer = PersistentTimer::attach(store.clone(), clock.clone(), DEFAULT_STORAGE_KEY);
        let state = Arc::new(AppState::new(
            timer,
            20554,
            "127.0.0.1".to_string(),
            Duration::from_secs(1),
        ));
        Self {
            store,
            clock,
            router: create_router(state),
        }
    }

    async fn call(&self, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let builder = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(body) => builder
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };
        (status, value)
    }

    async fn get(&self, uri: &str) -> Value {
        let (status, body) = self.call(Method::GET, uri, None).await;
        assert_eq!(status, StatusCode::OK, "GET {uri}");
        body
    }

    async fn post(&self, uri: &str, body: Value) -> (StatusCode, Value) {
        self.call(Method::POST, uri, Some(body)).await
    }
}

#[tokio::test]
async fn health_reports_ok() {
    let harness = Harness::new();
    let body = harness.get("/health").await;
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn add_then_start_countdown() {
    let harness = Harness::new();

    let (status, body) = harness.post("/timer/add", json!({ "minutes": 5 })).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "applied");
    assert_eq!(body["timer"]["displaySeconds"], 300);
    assert_eq!(body["timer"]["display"], "00:05:00");

    let (status, body) = harness
        .post("/timer/start", json!({ "mode": "countdown" }))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["timer"]["status"], "running");
    assert_eq!(body["timer"]["state"]["targetTime"], T0 + 300_000);

    harness.clock.advance(Duration::from_secs(90));
    let body = harness.get("/timer").await;
    assert_eq!(body["displaySeconds"], 210);
    assert_eq!(body["mode"], "countdown");
}

#[tokio::test]
async fn non_positive_minutes_are_bad_requests() {
    let harness = Harness::new();

    for minutes in [0, -5] {
        let (status, _) = harness.post("/timer/add", json!({ "minutes": minutes })).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }
    assert_eq!(harness.get("/timer").await["displaySeconds"], 0);
}

#[tokio::test]
async fn redundant_actions_are_ignored() {
    let harness = Harness::new();
    harness.post("/timer/add", json!({ "minutes": 1 })).await;
    harness.post("/timer/start", json!({ "mode": "countup" })).await;
    let started = harness.get("/timer").await["state"].clone();

    harness.clock.advance(Duration::from_secs(2));
    let (status, body) = harness.post("/timer/start", json!({ "mode": "countdown" })).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ignored");
    assert_eq!(body["timer"]["state"], started);

    let (_, body) = harness.post("/timer/add", json!({ "minutes": 3 })).await;
    assert_eq!(body["status"], "ignored");
    assert_eq!(body["timer"]["displaySeconds"], 62);
}

#[tokio::test]
async fn reset_clears_storage() {
    let harness = Harness::new();
    harness.post("/timer/add", json!({ "minutes": 2 })).await;
    harness.post("/timer/start", json!({ "mode": "countdown" })).await;
    assert!(harness.store.load(DEFAULT_STORAGE_KEY).unwrap().is_some());

    let (status, body) = harness.call(Method::POST, "/timer/reset", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["timer"]["status"], "idle");
    assert_eq!(body["timer"]["displaySeconds"], 0);
    assert!(harness.store.load(DEFAULT_STORAGE_KEY).unwrap().is_none());
}

#[tokio::test]
async fn unknown_mode_is_rejected() {
    let harness = Harness::new();
    let (status, _) = harness.post("/timer/start", json!({ "mode": "sideways" })).await;
    assert!(status.is_client_error());
}

#[tokio::test]
async fn voice_command_is_delivered_once() {
    let harness = Harness::new();

    let (status, body) = harness
        .post("/api/timer/set", json!({ "minutes": 5, "auto_start": true, "mode": "down" }))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "status": "success", "minutes": 5 }));

    let pending = harness.get("/api/timer/pending").await;
    assert_eq!(pending["has_command"], true);
    assert_eq!(pending["minutes"], 5);
    assert_eq!(pending["mode"], "down");

    let again = harness.get("/api/timer/pending").await;
    assert_eq!(again, json!({ "has_command": false }));
}

#[tokio::test]
async fn applying_voice_command_runs_timer() {
    let harness = Harness::new();
    harness
        .post("/api/timer/set", json!({ "minutes": 10, "mode": "up" }))
        .await;

    let (status, body) = harness
        .call(Method::POST, "/api/timer/pending/apply", None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "applied");
    assert_eq!(body["timer"]["mode"], "countup");
    assert_eq!(body["timer"]["displaySeconds"], 600);

    let (_, body) = harness
        .call(Method::POST, "/api/timer/pending/apply", None)
        .await;
    assert_eq!(body["status"], "ignored");
}

#[tokio::test]
async fn status_tracks_last_action() {
    let harness = Harness::new();
    harness.post("/timer/add", json!({ "minutes": 1 })).await;

    let status = harness.get("/status").await;
    assert_eq!(status["last_action"], "add");
    assert_eq!(status["port"], 20554);
    assert_eq!(status["timer"]["pendingSeconds"], 60);
}

#[tokio::test]
async fn restart_resumes_from_file_store() {
    let dir = tempfile::tempdir().unwrap();
    let clock = Arc::new(ManualClock::new(T0));

    let first = Harness::with_store(Arc::new(FileStore::new(dir.path())), clock.clone());
    first.post("/timer/add", json!({ "minutes": 1 })).await;
    first.post("/timer/start", json!({ "mode": "countdown" })).await;
    drop(first);

    clock.advance(Duration::from_secs(30));
    let second = Harness::with_store(Arc::new(FileStore::new(dir.path())), clock);
    let body = second.get("/timer").await;
    assert_eq!(body["status"], "running");
    assert_eq!(body["displaySeconds"], 30);
}

#[tokio::test]
async fn invalid_voice_command_keeps_running_timer() {
    let harness = Harness::new();
    harness.post("/timer/add", json!({ "minutes": 10 })).await;
    harness.post("/timer/start", json!({ "mode": "countdown" })).await;
    harness
        .post("/api/timer/set", json!({ "minutes": i64::MAX, "mode": "down" }))
        .await;

    let (status, _) = harness
        .call(Method::POST, "/api/timer/pending/apply", None)
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let body = harness.get("/timer").await;
    assert_eq!(body["status"], "running");
    assert_eq!(body["displaySeconds"], 600);
    assert!(harness.store.load(DEFAULT_STORAGE_KEY).unwrap().is_some());
}
