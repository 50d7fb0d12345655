use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

use crate::models::ride_form::RideFormError;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("config error: {0}")]
    Config(String),
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
    #[error("unsupported rides document version {0}")]
    UnsupportedStoreVersion(u64),
    #[error("malformed rides document: {0}")]
    MalformedStore(String),
    #[error(transparent)]
    InvalidRide(#[from] RideFormError),
    #[error(transparent)]
    Other(#[from] anyhow::Error),
    #[error("not found")]
    NotFound,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match self {
            AppError::Config(_)
            | AppError::Io(_)
            | AppError::Json(_)
            | AppError::UnsupportedStoreVersion(_)
            | AppError::MalformedStore(_)
            | AppError::Other(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::InvalidRide(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound => StatusCode::NOT_FOUND,
        };

        (status, self.to_string()).into_response()
    }
}

impl AppError {
    /// True when the persisted document could not be understood, as opposed
    /// to the storage itself failing.
    pub fn is_corrupt_store(&self) -> bool {
        matches!(
            self,
            AppError::Json(_) | AppError::UnsupportedStoreVersion(_) | AppError::MalformedStore(_)
        )
    }
}
