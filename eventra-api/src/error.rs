use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use eventra_core::reservation::ReservationError;

#[derive(Debug)]
pub enum AppError {
    AuthenticationError(String),
    AuthorizationError(String),
    ValidationError(String),
    NotFoundError(String),
    ConflictError(String),
    InternalServerError(String),
    Anyhow(anyhow::Error),
}

impl AppError {
    /// Booking failures map onto transport statuses here; the
    /// reservation core itself knows nothing about HTTP.
    pub fn from_reservation(err: ReservationError) -> Self {
        match err {
            ReservationError::EventNotFound => AppError::NotFoundError(err.to_string()),
            ReservationError::BookingClosed
            | ReservationError::InsufficientSeats { .. }
            | ReservationError::SoldOut
            | ReservationError::InvalidQuantity => AppError::ValidationError(err.to_string()),
            ReservationError::ConcurrentConflict => AppError::ConflictError(err.to_string()),
            ReservationError::Storage(inner) => AppError::InternalServerError(inner.to_string()),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            AppError::AuthenticationError(msg) => (StatusCode::UNAUTHORIZED, msg),
            AppError::AuthorizationError(msg) => (StatusCode::FORBIDDEN, msg),
            AppError::ValidationError(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::NotFoundError(msg) => (StatusCode::NOT_FOUND, msg),
            AppError::ConflictError(msg) => (StatusCode::CONFLICT, msg),
            AppError::InternalServerError(msg) => {
                tracing::error!("Internal Server Error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal Server Error".to_string(),
                )
            }
            AppError::Anyhow(err) => {
                tracing::error!("Internal Server Error: {}", err);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal Server Error".to_string(),
                )
            }
        };

        let body = Json(json!({
            "error": error_message,
        }));

        (status, body).into_response()
    }
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        Self::Anyhow(err)
    }
}

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        if eventra_store::is_unique_violation(&err) {
            AppError::ConflictError("Record already exists.".to_string())
        } else {
            AppError::InternalServerError(err.to_string())
        }
    }
}
