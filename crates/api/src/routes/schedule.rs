use axum::{
    Router,
    routing::{get, post},
};
use std::sync::Arc;

use crate::{ApiState, handlers};

pub fn routes() -> Router<Arc<ApiState>> {
    Router::new()
        .route(
            "/search/schedules",
            get(handlers::schedule::search_schedules),
        )
        .route("/schedules", post(handlers::schedule::create_schedule))
        .route(
            "/schedules/:id/booked-seats",
            get(handlers::schedule::get_booked_seats),
        )
}
