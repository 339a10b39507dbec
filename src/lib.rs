pub mod auth;
pub mod backend;
pub mod config;
pub mod connectivity;
pub mod db;
pub mod dispatch;
pub mod error;
pub mod models;
pub mod queue;
pub mod replay;
pub mod routes;
pub mod state;
pub mod worker;

use std::sync::Arc;

use axum::Router;
use sqlx::SqlitePool;
use tower_http::trace::TraceLayer;

use crate::backend::BackendClient;
use crate::config::Config;
use crate::connectivity::Connectivity;
use crate::dispatch::Dispatcher;
use crate::queue::OfflineQueue;
use crate::replay::backend::BackendReplayer;
use crate::state::{AppState, SharedState};

/// Wire the shared state and the HTTP router.
///
/// Background tasks (prober and sync worker) are started by the caller.
pub fn build_app(pool: SqlitePool, config: Config) -> Result<(Router, SharedState), String> {
    let backend = BackendClient::new(&config.backend_url, config.replay_timeout)?;
    let connectivity = Arc::new(Connectivity::new(
        &config.probe_url,
        config.probe_interval,
        config.probe_timeout,
    )?);
    let queue = Arc::new(OfflineQueue::new(pool, config.replay_timeout));
    let dispatcher = Dispatcher::new(backend.clone(), queue.clone(), connectivity.clone());

    let state: SharedState = Arc::new(AppState {
        config,
        queue,
        connectivity,
        dispatcher,
        replayer: Arc::new(BackendReplayer::new(backend)),
    });

    let app = Router::new()
        .merge(routes::api_routes())
        .route("/health", axum::routing::get(health))
        .layer(TraceLayer::new_for_http())
        .with_state(state.clone());

    Ok((app, state))
}

async fn health() -> &'static str {
    "ok"
}
