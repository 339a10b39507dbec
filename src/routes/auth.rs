use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Deserialize;
use serde_json::json;

use crate::auth::BearerToken;
use crate::dispatch::Dispatched;
use crate::error::AppError;
use crate::models::{ProfileUpdate, RegistrationForm};
use crate::state::SharedState;

#[derive(Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

pub async fn login(
    State(state): State<SharedState>,
    Json(req): Json<LoginRequest>,
) -> Result<Response, AppError> {
    if req.email.trim().is_empty() || req.password.is_empty() {
        return Err(AppError::BadRequest("email and password are required".to_string()));
    }

    let outcome = state.dispatcher.login(req.email.trim(), &req.password).await?;
    Ok(dispatched(outcome))
}

pub async fn register(
    State(state): State<SharedState>,
    Json(form): Json<RegistrationForm>,
) -> Result<Response, AppError> {
    form.validate().map_err(AppError::BadRequest)?;

    let outcome = state.dispatcher.register(form).await?;
    Ok(dispatched(outcome))
}

pub async fn update_profile(
    State(state): State<SharedState>,
    BearerToken(token): BearerToken,
    Path(user_id): Path<i64>,
    Json(profile): Json<ProfileUpdate>,
) -> Result<Response, AppError> {
    if profile.is_empty() {
        return Err(AppError::BadRequest("Nothing to update".to_string()));
    }

    let outcome = state
        .dispatcher
        .update_profile(user_id, &token, profile)
        .await?;
    Ok(dispatched(outcome))
}

fn dispatched(outcome: Dispatched) -> Response {
    match outcome {
        Dispatched::Completed(response) => (
            StatusCode::OK,
            Json(json!({
                "status": "completed",
                "source": "backend",
                "response": response,
            })),
        )
            .into_response(),
        Dispatched::Queued(record) => (
            StatusCode::ACCEPTED,
            Json(json!({
                "status": "queued",
                "queued": record,
            })),
        )
            .into_response(),
    }
}
