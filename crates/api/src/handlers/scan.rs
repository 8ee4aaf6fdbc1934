use std::sync::Arc;

use axum::extract::State;
use chrono::Utc;
use tracing::{info, warn};
use ulendo_core::{
    errors::TicketError,
    models::{
        booking::{BookingStatus, QrStatus},
        scan::{ScanFailure, ScanRequest, ScanResponse},
    },
    ticket::reference_from_scan,
};

use crate::{
    ApiState,
    middleware::{auth::CurrentUser, error_handling::AppError, extract::Json},
};

fn rejected(reason: ScanFailure, message: impl Into<String>) -> Json<ScanResponse> {
    let response = ScanResponse::rejected(reason, message);
    warn!(?reason, message = %response.message, "ticket rejected");
    Json(response)
}

/// Validates a scanned ticket for boarding `bus_id`.
///
/// Business rejections are answered with `200` and `success: false`.
#[axum::debug_handler(state = Arc<ApiState>)]
pub async fn scan_qr(
    State(state): State<Arc<ApiState>>,
    current: CurrentUser,
    Json(payload): Json<ScanRequest>,
) -> Result<Json<ScanResponse>, AppError> {
    current.ensure(|role| role.can_scan(), "validate tickets")?;

    let bus_id = payload.bus_id.trim();
    if bus_id.is_empty() {
        return Err(TicketError::Validation("Bus is required".to_string()).into());
    }

    let Some(reference) = reference_from_scan(&payload.qr_reference) else {
        return Ok(rejected(ScanFailure::InvalidFormat, "Invalid QR code format"));
    };

    let Some(db_booking) = state
        .store
        .get_booking_by_reference(reference.clone())
        .await?
    else {
        return Ok(rejected(ScanFailure::NotFound, "Ticket not found"));
    };

    match (db_booking.status()?, db_booking.qr_status()?) {
        (BookingStatus::Cancelled, _) => {
            return Ok(rejected(ScanFailure::Cancelled, "Ticket has been cancelled"));
        }
        (BookingStatus::Pending, _) => {
            return Ok(rejected(
                ScanFailure::NotConfirmed,
                "Ticket has not been confirmed",
            ));
        }
        (BookingStatus::Completed, _) | (BookingStatus::Confirmed, QrStatus::Used) => {
            return Ok(rejected(ScanFailure::AlreadyUsed, "Ticket already used"));
        }
        (BookingStatus::Confirmed, QrStatus::Unused) => {}
    }

    let schedule = state
        .store
        .get_schedule_by_id(db_booking.schedule_id)
        .await?
        .ok_or_else(|| TicketError::NotFound("Schedule not found".to_string()))?
        .to_schedule();

    if !schedule.bus_id.eq_ignore_ascii_case(bus_id) {
        return Ok(rejected(
            ScanFailure::WrongBus,
            format!("Ticket is for bus {}, not {}", schedule.bus_id, bus_id),
        ));
    }

    if !state.store.mark_boarded(db_booking.id, Utc::now()).await? {
        return Ok(rejected(ScanFailure::AlreadyUsed, "Ticket already used"));
    }

    info!(
        reference = %reference,
        bus_id = %schedule.bus_id,
        conductor = %current.user.id,
        "ticket validated"
    );
    Ok(Json(ScanResponse::validated(
        db_booking.passenger_name,
        db_booking.seat_number.max(0) as u32,
        schedule.route_label(),
        schedule.departure_time,
    )))
}
