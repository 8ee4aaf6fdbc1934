use axum::{BoxError, Json, http::StatusCode};
use serde_json::{Value, json};

/// Registration, login, logout and whoami
pub mod auth;
/// Seat booking, listing, cancellation and QR tickets
pub mod booking;
/// Conductor ticket validation
pub mod scan;
/// Schedule search, creation and seat availability
pub mod schedule;

/// Converts failures of the timeout layer into JSON errors.
pub async fn handle_timeout(err: BoxError) -> (StatusCode, Json<Value>) {
    if err.is::<tower::timeout::error::Elapsed>() {
        (
            StatusCode::REQUEST_TIMEOUT,
            Json(json!({ "error": "Request timed out" })),
        )
    } else {
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "error": "Internal server error" })),
        )
    }
}
