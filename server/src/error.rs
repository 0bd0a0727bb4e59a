//! Request-level errors and their HTTP mapping.
//!
//! Client mistakes become 400 with a short plain-text reason, a missing
//! record on get becomes 404, and anything the database reports becomes 500
//! carrying the driver's own message.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;
use tracing::{error, warn};

use crate::model::ValidationError;
use crate::store::StoreError;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Invalid todo ID")]
    InvalidId(#[source] std::num::ParseIntError),

    #[error("Invalid request payload")]
    InvalidPayload(#[source] serde_json::Error),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("Todo not found")]
    NotFound,

    #[error("{0}")]
    Storage(#[source] sqlx::Error),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::InvalidId(_) | AppError::InvalidPayload(_) | AppError::Validation(_) => {
                StatusCode::BAD_REQUEST
            }
            AppError::NotFound => StatusCode::NOT_FOUND,
            AppError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound(_) => AppError::NotFound,
            StoreError::Database(e) => AppError::Storage(e),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!(status = status.as_u16(), error = ?self, "request failed");
        } else {
            warn!(status = status.as_u16(), error = ?self, "request rejected");
        }
        (status, self.to_string()).into_response()
    }
}
