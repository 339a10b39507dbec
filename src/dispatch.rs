use std::future::Future;
use std::sync::Arc;

use chrono::Utc;
use serde_json::Value;

use crate::backend::{BackendClient, BackendError};
use crate::connectivity::Connectivity;
use crate::models::{Action, ProfileUpdate, QueuedAction, RegistrationForm};
use crate::queue::OfflineQueue;

#[derive(Debug)]
pub enum Dispatched {
    Completed(Value),
    Queued(QueuedAction),
}

#[derive(Debug)]
pub enum DispatchError {
    Backend(BackendError),
    Storage(sqlx::Error),
}

impl std::fmt::Display for DispatchError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DispatchError::Backend(err) => write!(f, "{err}"),
            DispatchError::Storage(err) => write!(f, "Queue storage error: {err}"),
        }
    }
}

impl From<sqlx::Error> for DispatchError {
    fn from(err: sqlx::Error) -> Self {
        DispatchError::Storage(err)
    }
}

/// Sends user operations to the backend when it is reachable and falls back
/// to the offline queue when it is not.
#[derive(Clone)]
pub struct Dispatcher {
    backend: BackendClient,
    queue: Arc<OfflineQueue>,
    connectivity: Arc<Connectivity>,
}

impl Dispatcher {
    pub fn new(
        backend: BackendClient,
        queue: Arc<OfflineQueue>,
        connectivity: Arc<Connectivity>,
    ) -> Self {
        Self {
            backend,
            queue,
            connectivity,
        }
    }

    pub async fn login(&self, email: &str, password: &str) -> Result<Dispatched, DispatchError> {
        // The password is never persisted; only the attempt is recorded.
        let action = Action::Login {
            email: email.to_string(),
            timestamp: now_millis(),
        };
        self.attempt(action, self.backend.login(email, password)).await
    }

    pub async fn register(&self, form: RegistrationForm) -> Result<Dispatched, DispatchError> {
        let call = self.backend.register(&form);
        let action = Action::Register {
            user_data: form.clone(),
            timestamp: now_millis(),
        };
        self.attempt(action, call).await
    }

    pub async fn update_profile(
        &self,
        user_id: i64,
        token: &str,
        profile: ProfileUpdate,
    ) -> Result<Dispatched, DispatchError> {
        let call = self.backend.update_profile(user_id, token, &profile);
        let action = Action::UpdateProfile {
            user_id,
            token: token.to_string(),
            profile: profile.clone(),
            timestamp: now_millis(),
        };
        self.attempt(action, call).await
    }

    /// `call` is only polled when the connectivity signal is online.
    async fn attempt<F>(&self, action: Action, call: F) -> Result<Dispatched, DispatchError>
    where
        F: Future<Output = Result<Value, BackendError>>,
    {
        if self.connectivity.is_online() {
            match call.await {
                Ok(response) => return Ok(Dispatched::Completed(response)),
                Err(e) if e.is_connectivity() => {
                    tracing::warn!("{} failed, deferring: {e}", action.kind());
                }
                Err(e) => return Err(DispatchError::Backend(e)),
            }
        } else {
            tracing::debug!("Offline, deferring {}", action.kind());
        }

        let record = self.queue.enqueue(&action).await?;
        Ok(Dispatched::Queued(record))
    }
}

fn now_millis() -> i64 {
    Utc::now().timestamp_millis()
}
