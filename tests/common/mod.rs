#![allow(dead_code)]

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post, put};
use axum::{Json, Router};
use reqwest::Client;
use serde_json::{json, Value};
use sqlx::SqlitePool;
use uuid::Uuid;

use signalement_sync::config::Config;
use signalement_sync::models::Action;
use signalement_sync::replay::{ReplayError, ReplayHandler};
use signalement_sync::state::SharedState;

// ── Mock REST backend ───────────────────────────────────────────

/// Stand-in for the Signalement REST backend (`/api/auth`).
#[derive(Default)]
pub struct MockBackend {
    /// When set, every auth route answers 503 as a gateway would.
    pub down: AtomicBool,
    pub calls: Mutex<Vec<(String, Value)>>,
}

impl MockBackend {
    pub fn set_down(&self, down: bool) {
        self.down.store(down, Ordering::SeqCst);
    }

    pub fn calls_to(&self, path: &str) -> Vec<Value> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|(p, _)| p == path)
            .map(|(_, body)| body.clone())
            .collect()
    }

    fn record(&self, path: &str, body: Value) -> Option<Response> {
        if self.down.load(Ordering::SeqCst) {
            return Some(
                (StatusCode::SERVICE_UNAVAILABLE, "upstream unavailable").into_response(),
            );
        }
        self.calls.lock().unwrap().push((path.to_string(), body));
        None
    }
}

async fn mock_login(State(mock): State<Arc<MockBackend>>, Json(body): Json<Value>) -> Response {
    if let Some(resp) = mock.record("/login", body.clone()) {
        return resp;
    }
    if body["motDePasse"] == "password123" {
        Json(json!({ "token": "session-token", "email": body["email"] })).into_response()
    } else {
        (
            StatusCode::UNAUTHORIZED,
            Json(json!({ "message": "Identifiants incorrects" })),
        )
            .into_response()
    }
}

async fn mock_inscription(
    State(mock): State<Arc<MockBackend>>,
    Json(body): Json<Value>,
) -> Response {
    if let Some(resp) = mock.record("/inscription", body) {
        return resp;
    }
    (
        StatusCode::CREATED,
        Json(json!({ "success": true, "message": "Utilisateur créé" })),
    )
        .into_response()
}

async fn mock_update_user(
    State(mock): State<Arc<MockBackend>>,
    Path(id): Path<i64>,
    Json(body): Json<Value>,
) -> Response {
    if let Some(resp) = mock.record(&format!("/utilisateur/{id}"), body) {
        return resp;
    }
    Json(json!({ "success": true })).into_response()
}

pub struct TestBackend {
    pub addr: SocketAddr,
    pub mock: Arc<MockBackend>,
}

impl TestBackend {
    pub fn auth_url(&self) -> String {
        format!("http://{}/api/auth", self.addr)
    }

    pub fn health_url(&self) -> String {
        format!("http://{}/health", self.addr)
    }

    /// Answers like `/health`, but only after a noticeable delay.
    pub fn slow_url(&self) -> String {
        format!("http://{}/slow", self.addr)
    }
}

pub async fn spawn_backend() -> TestBackend {
    let mock = Arc::new(MockBackend::default());

    let router = Router::new()
        .route("/health", get(|| async { "ok" }))
        .route(
            "/slow",
            get(|| async {
                tokio::time::sleep(Duration::from_millis(300)).await;
                "ok"
            }),
        )
        .route("/api/auth/login", post(mock_login))
        .route("/api/auth/inscription", post(mock_inscription))
        .route("/api/auth/utilisateur/{id}", put(mock_update_user))
        .with_state(mock.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind mock backend");
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        axum::serve(listener, router).await.expect("Mock backend failed");
    });

    TestBackend { addr, mock }
}

/// An address nothing listens on.
pub async fn closed_addr() -> SocketAddr {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    listener.local_addr().unwrap()
}

// ── Local queue database ────────────────────────────────────────

pub fn temp_db_path() -> PathBuf {
    std::env::temp_dir().join(format!("signalement_test_{}.db", Uuid::now_v7().simple()))
}

pub fn db_url(path: &PathBuf) -> String {
    format!("sqlite://{}", path.display())
}

pub async fn open_db(path: &PathBuf) -> SqlitePool {
    signalement_sync::db::connect(&db_url(path))
        .await
        .expect("Failed to open queue database")
}

pub fn remove_db(path: &PathBuf) {
    let _ = std::fs::remove_file(path);
    for suffix in ["-wal", "-shm"] {
        let mut sidecar = path.clone().into_os_string();
        sidecar.push(suffix);
        let _ = std::fs::remove_file(sidecar);
    }
}

// ── Replay handlers ─────────────────────────────────────────────

/// Records every action it sees and fails on a chosen action type.
#[derive(Default)]
pub struct RecordingHandler {
    pub seen: Mutex<Vec<Action>>,
    pub fail_kind: Mutex<Option<&'static str>>,
    pub fail_email: Mutex<Option<String>>,
    /// Time spent in each replay before answering.
    pub delay: Option<Duration>,
}

impl RecordingHandler {
    pub fn failing_on(kind: &'static str) -> Self {
        let handler = Self::default();
        *handler.fail_kind.lock().unwrap() = Some(kind);
        handler
    }

    pub fn failing_for_email(email: &str) -> Self {
        let handler = Self::default();
        *handler.fail_email.lock().unwrap() = Some(email.to_string());
        handler
    }

    pub fn slow(delay: Duration) -> Self {
        Self {
            delay: Some(delay),
            ..Self::default()
        }
    }

    pub fn heal(&self) {
        *self.fail_kind.lock().unwrap() = None;
        *self.fail_email.lock().unwrap() = None;
    }

    pub fn seen_kinds(&self) -> Vec<&'static str> {
        self.seen.lock().unwrap().iter().map(|a| a.kind()).collect()
    }

    pub fn seen_emails(&self) -> Vec<String> {
        self.seen
            .lock()
            .unwrap()
            .iter()
            .filter_map(|a| match a {
                Action::Login { email, .. } => Some(email.clone()),
                Action::Register { user_data, .. } => Some(user_data.email.clone()),
                Action::UpdateProfile { .. } => None,
            })
            .collect()
    }
}

#[async_trait]
impl ReplayHandler for RecordingHandler {
    async fn replay(&self, action: &Action) -> Result<(), ReplayError> {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        self.seen.lock().unwrap().push(action.clone());

        if *self.fail_kind.lock().unwrap() == Some(action.kind()) {
            return Err(ReplayError::from(format!("{} rejected", action.kind())));
        }

        let fail_email = self.fail_email.lock().unwrap().clone();
        if let (Some(target), Action::Login { email, .. }) = (fail_email, action) {
            if *email == target {
                return Err(ReplayError::from("login rejected"));
            }
        }

        Ok(())
    }
}

/// Never finishes within any reasonable replay timeout.
pub struct StallingHandler;

#[async_trait]
impl ReplayHandler for StallingHandler {
    async fn replay(&self, _action: &Action) -> Result<(), ReplayError> {
        tokio::time::sleep(Duration::from_secs(60)).await;
        Ok(())
    }
}

pub fn login(email: &str, timestamp: i64) -> Action {
    Action::Login {
        email: email.to_string(),
        timestamp,
    }
}

// ── Running agent ───────────────────────────────────────────────

/// A running sync agent with a dedicated queue database.
pub struct TestApp {
    pub addr: SocketAddr,
    pub client: Client,
    pub state: SharedState,
    pub db_path: PathBuf,
}

impl TestApp {
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    pub async fn go_online(&self) {
        assert!(
            self.state.connectivity.set_link(true).await,
            "probe should reach the mock backend"
        );
    }

    pub async fn go_offline(&self) {
        assert!(!self.state.connectivity.set_link(false).await);
    }

    pub async fn get(&self, path: &str) -> (Value, StatusCode) {
        let resp = self
            .client
            .get(self.url(path))
            .send()
            .await
            .expect("get request failed");
        let status = resp.status();
        let body: Value = resp.json().await.unwrap_or(json!(null));
        (body, status)
    }

    pub async fn post(&self, path: &str, body: &Value) -> (Value, StatusCode) {
        let resp = self
            .client
            .post(self.url(path))
            .json(body)
            .send()
            .await
            .expect("post request failed");
        let status = resp.status();
        let body: Value = resp.json().await.unwrap_or(json!(null));
        (body, status)
    }

    pub async fn put(&self, path: &str, token: Option<&str>, body: &Value) -> (Value, StatusCode) {
        let mut req = self.client.put(self.url(path)).json(body);
        if let Some(token) = token {
            req = req.bearer_auth(token);
        }
        let resp = req.send().await.expect("put request failed");
        let status = resp.status();
        let body: Value = resp.json().await.unwrap_or(json!(null));
        (body, status)
    }

    pub async fn delete(&self, path: &str) -> (Value, StatusCode) {
        let resp = self
            .client
            .delete(self.url(path))
            .send()
            .await
            .expect("delete request failed");
        let status = resp.status();
        let body: Value = resp.json().await.unwrap_or(json!(null));
        (body, status)
    }

    pub async fn queued(&self) -> Vec<Value> {
        let (body, status) = self.get("/api/v1/queue").await;
        assert_eq!(status, StatusCode::OK);
        body.as_array().cloned().unwrap_or_default()
    }
}

/// Spawn the agent against `backend_url`, probing `probe_url`, with a fresh queue database.
pub async fn spawn_app(backend_url: &str, probe_url: &str) -> TestApp {
    let db_path = temp_db_path();
    let pool = open_db(&db_path).await;

    let config = Config {
        database_url: db_url(&db_path),
        backend_url: backend_url.to_string(),
        probe_url: probe_url.to_string(),
        probe_interval: Duration::from_millis(200),
        probe_timeout: Duration::from_millis(500),
        replay_timeout: Duration::from_secs(5),
        host: "127.0.0.1".parse().unwrap(),
        port: 0,
        log_level: "warn".to_string(),
    };

    let (app, state) = signalement_sync::build_app(pool, config).expect("Failed to build app");

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind to random port");
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("Server failed");
    });

    TestApp {
        addr,
        client: Client::builder().no_proxy().build().unwrap(),
        state,
        db_path,
    }
}

pub async fn cleanup(app: TestApp) {
    app.state.queue.pool().close().await;
    remove_db(&app.db_path);
}
