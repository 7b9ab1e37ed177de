//! Error responses.
//!
//! Every failure leaves the API as `{"error": CODE, "message": text}` with the
//! domain error's status code. Conflicts and ticket rejections also carry a
//! machine-readable `details` object.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use fleetrent_core::RentalError;
use fleetrent_shared::AppError;
use serde_json::{Value, json};
use tracing::error;

/// Failure of a request handler.
#[derive(Debug)]
pub enum ApiError {
    /// A catalog operation refused the request.
    Rental(RentalError),
    /// An infrastructure failure.
    App(AppError),
}

impl From<RentalError> for ApiError {
    fn from(err: RentalError) -> Self {
        Self::Rental(err)
    }
}

impl From<AppError> for ApiError {
    fn from(err: AppError) -> Self {
        Self::App(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code, message, details) = match &self {
            Self::Rental(e) => {
                let details = match e {
                    RentalError::Conflict(conflict) => serde_json::to_value(conflict).ok(),
                    RentalError::TicketRejected(rejection) => serde_json::to_value(rejection).ok(),
                    _ => None,
                };
                (e.status_code(), e.error_code(), e.to_string(), details)
            }
            Self::App(e) => (e.status_code(), e.error_code(), e.to_string(), None),
        };

        let status = StatusCode::from_u16(status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        let message = if status.is_server_error() {
            error!(error = %message, "Request failed");
            "An error occurred".to_string()
        } else {
            message
        };

        let mut body = json!({
            "error": code,
            "message": message,
        });
        if let (Some(details), Value::Object(map)) = (details, &mut body) {
            map.insert("details".to_string(), details);
        }

        (status, Json(body)).into_response()
    }
}
