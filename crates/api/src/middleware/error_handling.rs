//! # Error Handling Middleware
//!
//! Maps domain errors to HTTP status codes and a JSON body of the form
//! `{"error": "<message>"}`. Business messages are sent unchanged so clients
//! can show them to the user as-is.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use tracing::error;
use ulendo_core::errors::TicketError;

/// Application error wrapper that provides HTTP status code mapping
///
/// # Example
///
/// ```
/// use axum::Json;
/// use ulendo_api::middleware::error_handling::AppError;
/// use ulendo_core::errors::TicketError;
///
/// async fn handler(found: bool) -> Result<Json<&'static str>, AppError> {
///     if !found {
///         return Err(AppError(TicketError::NotFound("Schedule not found".into())));
///     }
///     Ok(Json("ok"))
/// }
/// # fn main() {}
/// ```
#[derive(Debug)]
pub struct AppError(pub TicketError);

impl AppError {
    pub fn status(&self) -> StatusCode {
        match &self.0 {
            TicketError::NotFound(_) => StatusCode::NOT_FOUND,
            TicketError::Validation(_) => StatusCode::BAD_REQUEST,
            TicketError::Conflict(_) => StatusCode::CONFLICT,
            TicketError::Authentication(_) => StatusCode::UNAUTHORIZED,
            TicketError::Authorization(_) => StatusCode::FORBIDDEN,
            TicketError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
            TicketError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();

        // Storage and internal failures are logged in full, shown generically
        let message = if status.is_server_error() {
            error!(error = %self.0, "request failed");
            "Internal server error".to_string()
        } else {
            self.0.to_string()
        };

        (status, Json(json!({ "error": message }))).into_response()
    }
}

/// Allows `?` on `TicketResult` inside handlers.
impl From<TicketError> for AppError {
    fn from(err: TicketError) -> Self {
        AppError(err)
    }
}

/// Storage errors surface as `TicketError::Database`.
impl From<eyre::Report> for AppError {
    fn from(err: eyre::Report) -> Self {
        AppError(TicketError::Database(err))
    }
}

/// Maps a TicketError to an HTTP response
pub fn map_error(err: TicketError) -> Response {
    AppError(err).into_response()
}
