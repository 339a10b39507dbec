use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use crate::error::AppError;

/// Session token forwarded from the `Authorization: Bearer` header.
///
/// The agent does not validate it; the backend does when the action is sent.
#[derive(Debug, Clone)]
pub struct BearerToken(pub String);

impl<S> FromRequestParts<S> for BearerToken
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get("authorization")
            .ok_or_else(|| AppError::Unauthorized("Missing authorization header".to_string()))?;

        let value = header
            .to_str()
            .map_err(|_| AppError::Unauthorized("Invalid authorization header".to_string()))?;

        value
            .strip_prefix("Bearer ")
            .map(str::trim)
            .filter(|token| !token.is_empty())
            .map(|token| BearerToken(token.to_string()))
            .ok_or_else(|| AppError::Unauthorized("Expected a Bearer token".to_string()))
    }
}
