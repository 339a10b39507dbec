use axum::extract::State;
use axum::Json;
use serde::Deserialize;
use serde_json::json;

use crate::state::SharedState;

#[derive(Deserialize)]
pub struct SetLink {
    pub up: bool,
}

pub async fn status(State(state): State<SharedState>) -> Json<serde_json::Value> {
    Json(json!({
        "online": state.connectivity.is_online(),
        "link_up": state.connectivity.link_up(),
    }))
}

pub async fn set_link(
    State(state): State<SharedState>,
    Json(req): Json<SetLink>,
) -> Json<serde_json::Value> {
    let online = state.connectivity.set_link(req.up).await;
    Json(json!({
        "online": online,
        "link_up": req.up,
    }))
}
