pub mod backend;

use async_trait::async_trait;

use crate::models::Action;

#[derive(Debug)]
pub struct ReplayError {
    pub message: String,
}

impl std::fmt::Display for ReplayError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for ReplayError {}

impl From<String> for ReplayError {
    fn from(s: String) -> Self {
        ReplayError { message: s }
    }
}

impl From<&str> for ReplayError {
    fn from(s: &str) -> Self {
        ReplayError {
            message: s.to_string(),
        }
    }
}

/// Performs the side effect a queued action stands for.
#[async_trait]
pub trait ReplayHandler: Send + Sync {
    async fn replay(&self, action: &Action) -> Result<(), ReplayError>;
}
