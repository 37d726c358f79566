use axum::{
    Json,
    extract::rejection::{JsonRejection, PathRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;
use tracing::error;

use questline_core::profiles::ProfileUpdateError;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("unauthorized")]
    Unauthorized,

    #[error("{0} not found")]
    NotFound(String),

    #[error("{0}")]
    BadRequest(String),

    #[error("profile was modified concurrently, retry the request")]
    Conflict,

    #[error(transparent)]
    Internal(#[from] questline_core::Error),
}

impl From<ProfileUpdateError> for AppError {
    fn from(err: ProfileUpdateError) -> Self {
        match err {
            ProfileUpdateError::Conflict => AppError::Conflict,
            ProfileUpdateError::Store(err) => AppError::Internal(err),
        }
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::BadRequest(rejection.body_text())
    }
}

impl From<PathRejection> for AppError {
    fn from(_: PathRejection) -> Self {
        AppError::NotFound("route".to_owned())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match &self {
            AppError::Unauthorized => return StatusCode::UNAUTHORIZED.into_response(),
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Conflict => StatusCode::CONFLICT,
            AppError::Internal(err) => {
                error!(?err, "request failed");
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        let message = match self {
            AppError::Internal(_) => "internal error".to_owned(),
            other => other.to_string(),
        };

        (status, Json(json!({ "error": message }))).into_response()
    }
}
