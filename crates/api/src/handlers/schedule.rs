use axum::{extract::State, http::StatusCode};
use chrono::{NaiveDate, Utc};
use std::sync::Arc;
use tracing::info;
use ulendo_core::{
    errors::{TicketError, TicketResult},
    models::schedule::{
        BookedSeatsResponse, CreateScheduleRequest, Schedule, SearchQuery, SearchResponse,
    },
    seat_map::MAX_SEATING_CAPACITY,
};
use ulendo_db::models::{NewSchedule, ScheduleFilter};
use uuid::Uuid;

use crate::{
    ApiState,
    middleware::{
        auth::CurrentUser,
        error_handling::AppError,
        extract::{Json, Path, Query},
    },
};

fn search_filter(query: &SearchQuery) -> TicketResult<ScheduleFilter> {
    let origin = query.origin.trim();
    let destination = query.destination.trim();
    if origin.is_empty() || destination.is_empty() {
        return Err(TicketError::Validation(
            "Origin and destination are required".to_string(),
        ));
    }

    let date = match query.date.as_deref().map(str::trim) {
        Some(date) if !date.is_empty() => Some(
            NaiveDate::parse_from_str(date, "%Y-%m-%d").map_err(|_| {
                TicketError::Validation("Invalid date format. Use YYYY-MM-DD".to_string())
            })?,
        ),
        _ => None,
    };

    Ok(ScheduleFilter {
        origin: origin.to_string(),
        destination: destination.to_string(),
        date,
        min_price: query.min_price,
        max_price: query.max_price,
        departing_after: Utc::now(),
    })
}

fn validate_new_schedule(payload: &CreateScheduleRequest) -> TicketResult<()> {
    if payload.origin.trim().is_empty() || payload.destination.trim().is_empty() {
        return Err(TicketError::Validation(
            "Origin and destination are required".to_string(),
        ));
    }
    if payload.bus_id.trim().is_empty() {
        return Err(TicketError::Validation("Bus is required".to_string()));
    }
    if payload.arrival_time <= payload.departure_time {
        return Err(TicketError::Validation(
            "Arrival time must be after departure time".to_string(),
        ));
    }
    if payload.seating_capacity == 0 {
        return Err(TicketError::Validation(
            "Seating capacity must be at least 1".to_string(),
        ));
    }
    if payload.seating_capacity > MAX_SEATING_CAPACITY {
        return Err(TicketError::Validation(format!(
            "Seating capacity cannot exceed {}",
            MAX_SEATING_CAPACITY
        )));
    }
    if !payload.price.is_finite() || payload.price < 0.0 {
        return Err(TicketError::Validation(
            "Price must be zero or more".to_string(),
        ));
    }
    Ok(())
}

#[axum::debug_handler(state = Arc<ApiState>)]
pub async fn search_schedules(
    State(state): State<Arc<ApiState>>,
    Query(query): Query<SearchQuery>,
) -> Result<Json<SearchResponse>, AppError> {
    let filter = search_filter(&query)?;

    let schedules: Vec<Schedule> = state
        .store
        .search_schedules(filter)
        .await?
        .iter()
        .map(|schedule| schedule.to_schedule())
        .collect();

    Ok(Json(SearchResponse {
        count: schedules.len(),
        schedules,
    }))
}

#[axum::debug_handler(state = Arc<ApiState>)]
pub async fn get_booked_seats(
    State(state): State<Arc<ApiState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<BookedSeatsResponse>, AppError> {
    let schedule = state
        .store
        .get_schedule_by_id(id)
        .await?
        .ok_or_else(|| TicketError::NotFound("Schedule not found".to_string()))?;

    let booked_seats = state.store.get_booked_seats(id).await?;

    Ok(Json(BookedSeatsResponse {
        schedule_id: id,
        seating_capacity: schedule.seating_capacity.max(0) as u32,
        booked_seats,
    }))
}

#[axum::debug_handler(state = Arc<ApiState>)]
pub async fn create_schedule(
    State(state): State<Arc<ApiState>>,
    current: CurrentUser,
    Json(payload): Json<CreateScheduleRequest>,
) -> Result<(StatusCode, Json<Schedule>), AppError> {
    current.ensure(|role| role.can_manage_schedules(), "create schedules")?;
    validate_new_schedule(&payload)?;

    let db_schedule = state
        .store
        .create_schedule(NewSchedule {
            origin: payload.origin.trim().to_string(),
            destination: payload.destination.trim().to_string(),
            departure_time: payload.departure_time,
            arrival_time: payload.arrival_time,
            price: payload.price,
            seating_capacity: payload.seating_capacity,
            bus_id: payload.bus_id.trim().to_string(),
            company_name: payload.company_name.trim().to_string(),
            created_by: current.user.id,
        })
        .await?;

    info!(schedule_id = %db_schedule.id, bus_id = %db_schedule.bus_id, "created schedule");
    Ok((StatusCode::CREATED, Json(db_schedule.to_schedule())))
}
