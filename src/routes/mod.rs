pub mod auth;
pub mod connectivity;
pub mod queue;

use axum::routing::{delete, get, post, put};
use axum::Router;

use crate::state::SharedState;

pub fn api_routes() -> Router<SharedState> {
    Router::new()
        // Connectivity
        .route("/api/v1/connectivity", get(connectivity::status))
        .route("/api/v1/connectivity/link", put(connectivity::set_link))
        // Auth (connectivity-gated)
        .route("/api/v1/auth/login", post(auth::login))
        .route("/api/v1/auth/register", post(auth::register))
        .route("/api/v1/auth/users/{id}", put(auth::update_profile))
        // Offline queue
        .route("/api/v1/queue", get(queue::list).delete(queue::clear))
        .route("/api/v1/queue/drain", post(queue::drain))
        .route("/api/v1/queue/{id}", delete(queue::remove))
}
