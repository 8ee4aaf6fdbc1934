use axum::{
    Router,
    routing::{get, post},
};
use std::sync::Arc;

use crate::{ApiState, handlers};

pub fn routes() -> Router<Arc<ApiState>> {
    Router::new()
        .route("/bookings/book", post(handlers::booking::create_booking))
        .route("/bookings/get", get(handlers::booking::get_bookings))
        .route(
            "/bookings/cancel/:id",
            post(handlers::booking::cancel_booking),
        )
        .route("/bookings/qr-code/:id", get(handlers::booking::get_qr_code))
        .route("/bookings/scan-qr", post(handlers::scan::scan_qr))
}
