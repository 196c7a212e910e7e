use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use crate::sync::SyncError;

/// Failures that escape a page flow and become an HTTP status.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error(transparent)]
    Sync(#[from] SyncError),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let AppError::Sync(e) = &self;
        let (status, message) = match e {
            e if e.is_not_found() => (StatusCode::NOT_FOUND, e.to_string()),
            SyncError::Validation(e) => (StatusCode::BAD_REQUEST, e.to_string()),
            SyncError::Gateway(_) => {
                tracing::warn!("Remote API error: {}", e);
                (StatusCode::BAD_GATEWAY, e.user_message())
            }
            _ => {
                tracing::error!("Sync error: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
        };

        (status, message).into_response()
    }
}

pub type AppResult<T> = Result<T, AppError>;
