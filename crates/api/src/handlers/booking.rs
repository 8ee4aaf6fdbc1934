//! # Booking Handlers
//!
//! Seat booking, the caller's booking list, cancellation and the PNG ticket.
//! Seat availability is checked here for a friendly message, but the store
//! has the final word: a booking that loses the race for a seat comes back as
//! `None` and is reported as a conflict.

use std::{collections::HashMap, sync::Arc};

use axum::{
    extract::State,
    http::{StatusCode, header},
    response::IntoResponse,
};
use chrono::Utc;
use tracing::{info, warn};
use ulendo_core::{
    errors::{TicketError, TicketResult},
    models::{
        booking::{
            Booking, BookingStatus, BookingsResponse, CancelBookingResponse, CreateBookingRequest,
        },
        schedule::Schedule,
    },
    policy,
    reference::generate_booking_reference,
    seat_map::{SeatMap, seat_taken},
    ticket::TicketPayload,
};
use ulendo_db::models::{BookingInsert, DbBooking, NewBooking};
use uuid::Uuid;

use crate::{
    ApiState,
    middleware::{
        auth::CurrentUser,
        error_handling::AppError,
        extract::{Json, Path},
    },
};

/// Fresh references drawn when a generated one is already issued.
const REFERENCE_ATTEMPTS: usize = 3;

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

async fn schedule_for(state: &ApiState, schedule_id: Uuid) -> Result<Schedule, AppError> {
    let schedule = state
        .store
        .get_schedule_by_id(schedule_id)
        .await?
        .ok_or_else(|| TicketError::NotFound("Schedule not found".to_string()))?;
    Ok(schedule.to_schedule())
}

async fn owned_booking(
    state: &ApiState,
    current: &CurrentUser,
    booking_id: Uuid,
    action: &str,
) -> Result<Booking, AppError> {
    let db_booking = state
        .store
        .get_booking_by_id(booking_id)
        .await?
        .ok_or_else(|| TicketError::NotFound("Booking not found".to_string()))?;

    if db_booking.user_id != current.user.id && !current.role().sees_all_bookings() {
        return Err(TicketError::Authorization(format!(
            "You can only {} your own bookings",
            action
        ))
        .into());
    }

    let schedule = schedule_for(state, db_booking.schedule_id).await?;
    Ok(db_booking.into_booking(schedule)?)
}

fn ensure_open_for_booking(schedule: &Schedule) -> TicketResult<()> {
    if schedule.departure_time <= Utc::now() {
        return Err(TicketError::Validation(
            "Schedule is closed for booking".to_string(),
        ));
    }
    Ok(())
}

#[axum::debug_handler(state = Arc<ApiState>)]
pub async fn create_booking(
    State(state): State<Arc<ApiState>>,
    current: CurrentUser,
    Json(payload): Json<CreateBookingRequest>,
) -> Result<(StatusCode, Json<Booking>), AppError> {
    current.ensure(|role| role.can_book(), "book seats")?;

    let schedule = schedule_for(&state, payload.schedule_id).await?;
    ensure_open_for_booking(&schedule)?;

    let booked = state.store.get_booked_seats(schedule.id).await?;
    SeatMap::new(schedule.seating_capacity, booked).ensure_bookable(payload.seat_number)?;

    let mut new_booking = NewBooking {
        booking_reference: generate_booking_reference(),
        schedule_id: schedule.id,
        user_id: current.user.id,
        seat_number: payload.seat_number,
        status: BookingStatus::Confirmed,
        passenger_name: non_empty(payload.passenger_name)
            .unwrap_or_else(|| current.user.full_name.clone()),
        passenger_phone: non_empty(payload.passenger_phone).or(current.user.phone.clone()),
        passenger_email: non_empty(payload.passenger_email)
            .unwrap_or_else(|| current.user.email.clone()),
    };

    let mut attempts = 0;
    let db_booking = loop {
        attempts += 1;
        match state.store.create_booking(new_booking.clone()).await? {
            BookingInsert::Created(db_booking) => break db_booking,
            BookingInsert::SeatTaken => {
                warn!(
                    schedule_id = %schedule.id,
                    seat = payload.seat_number,
                    "seat taken by a concurrent booking"
                );
                return Err(seat_taken(payload.seat_number).into());
            }
            BookingInsert::ReferenceTaken if attempts < REFERENCE_ATTEMPTS => {
                warn!(reference = %new_booking.booking_reference, "booking reference collision");
                new_booking.booking_reference = generate_booking_reference();
            }
            BookingInsert::ReferenceTaken => {
                return Err(eyre::eyre!(
                    "no unused booking reference after {} attempts",
                    attempts
                )
                .into());
            }
        }
    };

    info!(
        booking_id = %db_booking.id,
        reference = %db_booking.booking_reference,
        seat = db_booking.seat_number,
        "booked seat"
    );

    // Reload so the seat count includes this booking
    let schedule = schedule_for(&state, schedule.id).await?;
    Ok((StatusCode::CREATED, Json(db_booking.into_booking(schedule)?)))
}

#[axum::debug_handler(state = Arc<ApiState>)]
pub async fn get_bookings(
    State(state): State<Arc<ApiState>>,
    current: CurrentUser,
) -> Result<Json<BookingsResponse>, AppError> {
    let db_bookings: Vec<DbBooking> = state.store.get_bookings_by_user(current.user.id).await?;

    let mut schedules: HashMap<Uuid, Schedule> = HashMap::new();
    let mut bookings = Vec::with_capacity(db_bookings.len());
    for db_booking in db_bookings {
        let schedule = match schedules.get(&db_booking.schedule_id) {
            Some(schedule) => schedule.clone(),
            None => {
                let schedule = schedule_for(&state, db_booking.schedule_id).await?;
                schedules.insert(schedule.id, schedule.clone());
                schedule
            }
        };
        bookings.push(db_booking.into_booking(schedule)?);
    }

    Ok(Json(BookingsResponse { bookings }))
}

#[axum::debug_handler(state = Arc<ApiState>)]
pub async fn cancel_booking(
    State(state): State<Arc<ApiState>>,
    current: CurrentUser,
    Path(id): Path<Uuid>,
) -> Result<Json<CancelBookingResponse>, AppError> {
    let booking = owned_booking(&state, &current, id, "cancel").await?;
    if booking.status == BookingStatus::Cancelled {
        return Err(TicketError::Validation("Booking is already cancelled".to_string()).into());
    }

    let next = booking.status.transition(BookingStatus::Cancelled)?;
    policy::ensure_cancellable(booking.schedule.departure_time, Utc::now())?;

    if !state
        .store
        .update_booking_status(id, booking.status, next)
        .await?
    {
        warn!(booking_id = %id, "booking changed during cancellation");
        return Err(TicketError::Conflict(
            "Booking was updated by another request, please refresh".to_string(),
        )
        .into());
    }

    info!(booking_id = %id, reference = %booking.booking_reference, "cancelled booking");
    Ok(Json(CancelBookingResponse {
        message: "Booking cancelled successfully".to_string(),
        status: next,
    }))
}

#[axum::debug_handler(state = Arc<ApiState>)]
pub async fn get_qr_code(
    State(state): State<Arc<ApiState>>,
    current: CurrentUser,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let booking = owned_booking(&state, &current, id, "view tickets for").await?;
    if booking.status != BookingStatus::Confirmed {
        return Err(TicketError::Validation(format!(
            "Booking is {} and has no valid ticket",
            booking.status
        ))
        .into());
    }

    let png = TicketPayload::from_booking(&booking).render_png()?;
    Ok(([(header::CONTENT_TYPE, "image/png")], png))
}
