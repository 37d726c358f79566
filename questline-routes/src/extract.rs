use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts},
};
use tracing::debug;

use questline_core::AppState;
use questline_core::auth::Identity;
use questline_utils::parse::parse_bearer_token;

use crate::error::AppError;

/// The verified learner behind the request's bearer token.
pub struct AuthUser(pub Identity);

#[async_trait]
impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let token = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(parse_bearer_token)
            .ok_or(AppError::Unauthorized)?;

        let identity = state.auth.verify(token).map_err(|err| {
            debug!(%err, "Rejected bearer token.");
            AppError::Unauthorized
        })?;

        Ok(AuthUser(identity))
    }
}
