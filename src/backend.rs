use std::time::Duration;

use reqwest::StatusCode;
use serde_json::{json, Value};

use crate::models::{ProfileUpdate, RegistrationForm};

#[derive(Debug)]
pub enum BackendError {
    /// The backend could not be reached (transport failure or gateway error).
    Unreachable(String),
    /// The backend answered and refused the request.
    Rejected { status: u16, message: String },
    InvalidResponse(String),
}

impl BackendError {
    pub fn is_connectivity(&self) -> bool {
        matches!(self, BackendError::Unreachable(_))
    }
}

impl std::fmt::Display for BackendError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BackendError::Unreachable(msg) => write!(f, "Backend unreachable: {msg}"),
            BackendError::Rejected { status, message } => {
                write!(f, "Backend rejected request ({status}): {message}")
            }
            BackendError::InvalidResponse(msg) => write!(f, "Invalid backend response: {msg}"),
        }
    }
}

impl std::error::Error for BackendError {}

impl From<reqwest::Error> for BackendError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            BackendError::InvalidResponse(err.to_string())
        } else {
            BackendError::Unreachable(err.to_string())
        }
    }
}

/// Client for the REST authentication backend (`.../api/auth`).
///
/// Built once at start-up and shared through the application state.
#[derive(Clone)]
pub struct BackendClient {
    client: reqwest::Client,
    base_url: String,
}

impl BackendClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, String> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| format!("Failed to build backend client: {e}"))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub async fn login(&self, email: &str, password: &str) -> Result<Value, BackendError> {
        let resp = self
            .client
            .post(format!("{}/login", self.base_url))
            .json(&json!({ "email": email, "motDePasse": password }))
            .send()
            .await?;
        read_json(resp).await
    }

    pub async fn register(&self, form: &RegistrationForm) -> Result<Value, BackendError> {
        let mut body = json!({
            "nom": &form.nom,
            "prenom": &form.prenom,
            "email": &form.email,
            "motDePasse": &form.password,
        });
        if let Some(type_id) = form.id_type_utilisateur {
            body["idTypeUtilisateur"] = json!(type_id);
        }

        let resp = self
            .client
            .post(format!("{}/inscription", self.base_url))
            .json(&body)
            .send()
            .await?;
        read_json(resp).await
    }

    pub async fn update_profile(
        &self,
        user_id: i64,
        token: &str,
        profile: &ProfileUpdate,
    ) -> Result<Value, BackendError> {
        let resp = self
            .client
            .put(format!("{}/utilisateur/{user_id}", self.base_url))
            .bearer_auth(token)
            .json(profile)
            .send()
            .await?;
        read_json(resp).await
    }
}

async fn read_json(resp: reqwest::Response) -> Result<Value, BackendError> {
    let status = resp.status();
    let text = resp.text().await?;

    if status.is_success() {
        if text.trim().is_empty() {
            return Ok(Value::Null);
        }
        return serde_json::from_str(&text)
            .map_err(|e| BackendError::InvalidResponse(e.to_string()));
    }

    if matches!(
        status,
        StatusCode::BAD_GATEWAY | StatusCode::SERVICE_UNAVAILABLE | StatusCode::GATEWAY_TIMEOUT
    ) {
        return Err(BackendError::Unreachable(format!("gateway returned {status}")));
    }

    Err(BackendError::Rejected {
        status: status.as_u16(),
        message: error_message(&text).unwrap_or_else(|| status.to_string()),
    })
}

/// Pull a human readable message out of the backend's error bodies
/// (`{ "message": .. }` or `{ "error": .. }`).
fn error_message(body: &str) -> Option<String> {
    let value: Value = serde_json::from_str(body).ok()?;
    value
        .get("message")
        .or_else(|| value.get("error"))
        .and_then(|m| m.as_str())
        .map(str::to_string)
}
