use async_trait::async_trait;

use super::{ReplayError, ReplayHandler};
use crate::backend::BackendClient;
use crate::models::Action;

/// Replays queued actions against the REST backend.
pub struct BackendReplayer {
    backend: BackendClient,
}

impl BackendReplayer {
    pub fn new(backend: BackendClient) -> Self {
        Self { backend }
    }
}

#[async_trait]
impl ReplayHandler for BackendReplayer {
    async fn replay(&self, action: &Action) -> Result<(), ReplayError> {
        match action {
            // Logins are ephemeral: the session they would have opened is long gone.
            Action::Login { email, .. } => {
                tracing::debug!("Dropping deferred login for {email}");
                Ok(())
            }
            Action::Register { user_data, .. } => {
                self.backend
                    .register(user_data)
                    .await
                    .map_err(|e| ReplayError::from(format!("Registration replay failed: {e}")))?;
                tracing::info!("Replayed registration for {}", user_data.email);
                Ok(())
            }
            Action::UpdateProfile {
                user_id,
                token,
                profile,
                ..
            } => {
                self.backend
                    .update_profile(*user_id, token, profile)
                    .await
                    .map_err(|e| ReplayError::from(format!("Profile update replay failed: {e}")))?;
                tracing::info!("Replayed profile update for user {user_id}");
                Ok(())
            }
        }
    }
}
