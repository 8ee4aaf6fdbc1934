use std::sync::{Arc, Mutex};

use axum::http::{StatusCode, header::AUTHORIZATION};
use chrono::{Duration, Utc};
use pretty_assertions::assert_eq;
use serde_json::{Value, json};
use ulendo_core::{
    models::{
        booking::{Booking, BookingStatus, BookingsResponse, CancelBookingResponse},
        schedule::BookedSeatsResponse,
        user::Role,
    },
    reference::is_booking_reference,
};
use ulendo_db::{
    mock::MockStore,
    models::{BookingInsert, DbBooking, DbSchedule, DbSession, DbUser, NewBooking},
};
use uuid::Uuid;

use crate::test_utils::{TestContext, bearer, server_over};

#[tokio::test]
async fn booking_a_free_seat_returns_a_confirmed_ticket() {
    let ctx = TestContext::new();
    let (company, _) = ctx.sign_in(Role::Company).await;
    let (passenger, token) = ctx.sign_in(Role::Passenger).await;
    let schedule = ctx
        .schedule_departing_in(company.id, Duration::days(2), 32, "MBC-202")
        .await;
    ctx.occupy(schedule.id, company.id, &[1, 5, 12, 18, 24]).await;

    let response = ctx
        .server
        .post("/api/bookings/book")
        .add_header(AUTHORIZATION, bearer(&token))
        .json(&json!({ "schedule_id": schedule.id, "seat_number": 7 }))
        .await;

    assert_eq!(response.status_code(), StatusCode::CREATED);
    let booking: Booking = response.json();
    assert_eq!(booking.seat_number, 7);
    assert_eq!(booking.status, BookingStatus::Confirmed);
    assert!(is_booking_reference(&booking.booking_reference));
    assert_eq!(booking.passenger_name, passenger.full_name);
    assert_eq!(booking.passenger_email, passenger.email);
    assert_eq!(booking.schedule.available_seats, 32 - 6);

    let seats: BookedSeatsResponse = ctx
        .server
        .get(&format!("/api/schedules/{}/booked-seats", schedule.id))
        .await
        .json();
    assert_eq!(seats.booked_seats, vec![1, 5, 7, 12, 18, 24]);
    assert_eq!(seats.seating_capacity, 32);
}

#[tokio::test]
async fn booked_seat_is_a_conflict() {
    let ctx = TestContext::new();
    let (company, _) = ctx.sign_in(Role::Company).await;
    let (_, token) = ctx.sign_in(Role::Passenger).await;
    let schedule = ctx
        .schedule_departing_in(company.id, Duration::days(2), 32, "MBC-202")
        .await;
    ctx.occupy(schedule.id, company.id, &[5]).await;

    let response = ctx
        .server
        .post("/api/bookings/book")
        .add_header(AUTHORIZATION, bearer(&token))
        .json(&json!({ "schedule_id": schedule.id, "seat_number": 5 }))
        .await;

    assert_eq!(response.status_code(), StatusCode::CONFLICT);
    assert_eq!(
        response.json::<Value>()["error"],
        "Seat 5 is already booked"
    );
}

#[tokio::test]
async fn seat_outside_the_bus_is_rejected() {
    let ctx = TestContext::new();
    let (company, _) = ctx.sign_in(Role::Company).await;
    let (_, token) = ctx.sign_in(Role::Passenger).await;
    let schedule = ctx
        .schedule_departing_in(company.id, Duration::days(2), 32, "MBC-202")
        .await;

    let response = ctx
        .server
        .post("/api/bookings/book")
        .add_header(AUTHORIZATION, bearer(&token))
        .json(&json!({ "schedule_id": schedule.id, "seat_number": 33 }))
        .await;

    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
    assert_eq!(
        response.json::<Value>()["error"],
        "Seat 33 does not exist on this bus (capacity 32)"
    );
}

#[tokio::test]
async fn departed_or_unknown_schedules_cannot_be_booked() {
    let ctx = TestContext::new();
    let (company, _) = ctx.sign_in(Role::Company).await;
    let (_, token) = ctx.sign_in(Role::Passenger).await;
    let departed = ctx
        .schedule_departing_in(company.id, Duration::hours(-1), 32, "MBC-202")
        .await;

    let closed = ctx
        .server
        .post("/api/bookings/book")
        .add_header(AUTHORIZATION, bearer(&token))
        .json(&json!({ "schedule_id": departed.id, "seat_number": 3 }))
        .await;
    assert_eq!(closed.status_code(), StatusCode::BAD_REQUEST);
    assert_eq!(
        closed.json::<Value>()["error"],
        "Schedule is closed for booking"
    );

    let missing = ctx
        .server
        .post("/api/bookings/book")
        .add_header(AUTHORIZATION, bearer(&token))
        .json(&json!({ "schedule_id": Uuid::new_v4(), "seat_number": 3 }))
        .await;
    assert_eq!(missing.status_code(), StatusCode::NOT_FOUND);
    assert_eq!(missing.json::<Value>()["error"], "Schedule not found");
}

#[tokio::test]
async fn only_passengers_book_seats() {
    let ctx = TestContext::new();
    let (company, token) = ctx.sign_in(Role::Company).await;
    let schedule = ctx
        .schedule_departing_in(company.id, Duration::days(2), 32, "MBC-202")
        .await;

    let forbidden = ctx
        .server
        .post("/api/bookings/book")
        .add_header(AUTHORIZATION, bearer(&token))
        .json(&json!({ "schedule_id": schedule.id, "seat_number": 3 }))
        .await;
    assert_eq!(forbidden.status_code(), StatusCode::FORBIDDEN);

    let anonymous = ctx
        .server
        .post("/api/bookings/book")
        .json(&json!({ "schedule_id": schedule.id, "seat_number": 3 }))
        .await;
    assert_eq!(anonymous.status_code(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn cancellation_respects_the_24_hour_window() {
    let ctx = TestContext::new();
    let (company, _) = ctx.sign_in(Role::Company).await;
    let (_, token) = ctx.sign_in(Role::Passenger).await;
    let soon = ctx
        .schedule_departing_in(company.id, Duration::hours(5), 32, "MBC-101")
        .await;
    let later = ctx
        .schedule_departing_in(company.id, Duration::days(3), 32, "MBC-202")
        .await;

    let mut booked = Vec::new();
    for schedule in [&soon, &later] {
        let booking: Booking = ctx
            .server
            .post("/api/bookings/book")
            .add_header(AUTHORIZATION, bearer(&token))
            .json(&json!({ "schedule_id": schedule.id, "seat_number": 4 }))
            .await
            .json();
        booked.push(booking);
    }

    let refused = ctx
        .server
        .post(&format!("/api/bookings/cancel/{}", booked[0].id))
        .add_header(AUTHORIZATION, bearer(&token))
        .await;
    assert_eq!(refused.status_code(), StatusCode::BAD_REQUEST);
    assert_eq!(
        refused.json::<Value>()["error"],
        "Bookings can only be cancelled up to 24 hours before departure"
    );

    let accepted = ctx
        .server
        .post(&format!("/api/bookings/cancel/{}", booked[1].id))
        .add_header(AUTHORIZATION, bearer(&token))
        .await;
    assert_eq!(accepted.status_code(), StatusCode::OK);
    let body: CancelBookingResponse = accepted.json();
    assert_eq!(body.status, BookingStatus::Cancelled);

    let seats: BookedSeatsResponse = ctx
        .server
        .get(&format!("/api/schedules/{}/booked-seats", later.id))
        .await
        .json();
    assert!(seats.booked_seats.is_empty());
}

#[tokio::test]
async fn passengers_only_see_and_cancel_their_own_bookings() {
    let ctx = TestContext::new();
    let (company, _) = ctx.sign_in(Role::Company).await;
    let (_, owner_token) = ctx.sign_in(Role::Passenger).await;
    let (_, other_token) = ctx.sign_in(Role::Passenger).await;
    let schedule = ctx
        .schedule_departing_in(company.id, Duration::days(3), 32, "MBC-202")
        .await;

    let booking: Booking = ctx
        .server
        .post("/api/bookings/book")
        .add_header(AUTHORIZATION, bearer(&owner_token))
        .json(&json!({ "schedule_id": schedule.id, "seat_number": 10 }))
        .await
        .json();

    let mine: BookingsResponse = ctx
        .server
        .get("/api/bookings/get")
        .add_header(AUTHORIZATION, bearer(&owner_token))
        .await
        .json();
    let theirs: BookingsResponse = ctx
        .server
        .get("/api/bookings/get")
        .add_header(AUTHORIZATION, bearer(&other_token))
        .await
        .json();
    assert_eq!(mine.bookings.len(), 1);
    assert_eq!(mine.bookings[0].id, booking.id);
    assert!(theirs.bookings.is_empty());

    let response = ctx
        .server
        .post(&format!("/api/bookings/cancel/{}", booking.id))
        .add_header(AUTHORIZATION, bearer(&other_token))
        .await;
    assert_eq!(response.status_code(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn qr_code_is_a_png_for_confirmed_bookings_only() {
    let ctx = TestContext::new();
    let (company, _) = ctx.sign_in(Role::Company).await;
    let (_, token) = ctx.sign_in(Role::Passenger).await;
    let schedule = ctx
        .schedule_departing_in(company.id, Duration::days(3), 32, "MBC-202")
        .await;
    let booking: Booking = ctx
        .server
        .post("/api/bookings/book")
        .add_header(AUTHORIZATION, bearer(&token))
        .json(&json!({ "schedule_id": schedule.id, "seat_number": 2 }))
        .await
        .json();

    let png = ctx
        .server
        .get(&format!("/api/bookings/qr-code/{}", booking.id))
        .add_header(AUTHORIZATION, bearer(&token))
        .await;
    assert_eq!(png.status_code(), StatusCode::OK);
    assert_eq!(png.header("content-type"), "image/png");
    assert!(png.as_bytes().starts_with(b"\x89PNG"));

    let cancelled = ctx
        .server
        .post(&format!("/api/bookings/cancel/{}", booking.id))
        .add_header(AUTHORIZATION, bearer(&token))
        .await;
    assert_eq!(cancelled.status_code(), StatusCode::OK);

    let refused = ctx
        .server
        .get(&format!("/api/bookings/qr-code/{}", booking.id))
        .add_header(AUTHORIZATION, bearer(&token))
        .await;
    assert_eq!(refused.status_code(), StatusCode::BAD_REQUEST);
}

/// Mock store with a signed-in passenger and an open 32-seat schedule.
fn store_with_open_schedule() -> MockStore {
    let passenger = DbUser {
        id: Uuid::new_v4(),
        email: "mphatso@example.mw".to_string(),
        full_name: "Mphatso Phiri".to_string(),
        phone: None,
        role: "passenger".to_string(),
        password_hash: "unused".to_string(),
        created_at: Utc::now(),
    };
    let departure = Utc::now() + Duration::days(1);
    let schedule = DbSchedule {
        id: Uuid::new_v4(),
        origin: "Mzuzu".to_string(),
        destination: "Lilongwe".to_string(),
        departure_time: departure,
        arrival_time: departure + Duration::hours(5),
        price: 18000.0,
        seating_capacity: 32,
        available_seats: 32,
        bus_id: "AXA-7".to_string(),
        company_name: "AXA Coaches".to_string(),
        created_by: Uuid::new_v4(),
        created_at: Utc::now(),
    };

    let mut store = MockStore::new();
    let user_id = passenger.id;
    store.expect_get_session().returning(move |token| {
        Ok(Some(DbSession {
            token,
            user_id,
            created_at: Utc::now(),
            expires_at: Utc::now() + Duration::hours(1),
        }))
    });
    store
        .expect_get_user_by_id()
        .returning(move |_| Ok(Some(passenger.clone())));
    store
        .expect_get_schedule_by_id()
        .returning(move |_| Ok(Some(schedule.clone())));
    store.expect_get_booked_seats().returning(|_| Ok(vec![]));
    store
}

fn stored(new: NewBooking) -> DbBooking {
    DbBooking {
        id: Uuid::new_v4(),
        booking_reference: new.booking_reference,
        schedule_id: new.schedule_id,
        user_id: new.user_id,
        seat_number: new.seat_number as i32,
        status: new.status.as_str().to_string(),
        qr_status: "unused".to_string(),
        passenger_name: new.passenger_name,
        passenger_phone: new.passenger_phone,
        passenger_email: new.passenger_email,
        created_at: Utc::now(),
        boarded_at: None,
    }
}

#[tokio::test]
async fn losing_the_race_for_a_seat_is_a_conflict() {
    let mut store = store_with_open_schedule();
    // The seat looked free when checked, but another request took it first
    store
        .expect_create_booking()
        .times(1)
        .returning(|_| Ok(BookingInsert::SeatTaken));

    let server = server_over(Arc::new(store));
    let response = server
        .post("/api/bookings/book")
        .add_header(AUTHORIZATION, bearer("any-token"))
        .json(&json!({ "schedule_id": Uuid::new_v4(), "seat_number": 7 }))
        .await;

    assert_eq!(response.status_code(), StatusCode::CONFLICT);
    assert_eq!(
        response.json::<Value>()["error"],
        "Seat 7 is already booked"
    );
}

#[tokio::test]
async fn a_reference_collision_is_retried_with_a_fresh_reference() {
    let mut store = store_with_open_schedule();
    let tried = Arc::new(Mutex::new(Vec::new()));
    let seen = tried.clone();
    store
        .expect_create_booking()
        .times(2)
        .returning(move |new| {
            let mut seen = seen.lock().unwrap();
            seen.push(new.booking_reference.clone());
            if seen.len() == 1 {
                Ok(BookingInsert::ReferenceTaken)
            } else {
                Ok(BookingInsert::Created(stored(new)))
            }
        });

    let server = server_over(Arc::new(store));
    let response = server
        .post("/api/bookings/book")
        .add_header(AUTHORIZATION, bearer("any-token"))
        .json(&json!({ "schedule_id": Uuid::new_v4(), "seat_number": 7 }))
        .await;

    assert_eq!(response.status_code(), StatusCode::CREATED);
    let booking: Booking = response.json();
    let tried = tried.lock().unwrap();
    assert_eq!(tried.len(), 2);
    assert_eq!(booking.booking_reference, tried[1]);
    assert!(is_booking_reference(&booking.booking_reference));
}

#[tokio::test]
async fn repeated_reference_collisions_fail_without_leaking_details() {
    let mut store = store_with_open_schedule();
    store
        .expect_create_booking()
        .times(3)
        .returning(|_| Ok(BookingInsert::ReferenceTaken));

    let server = server_over(Arc::new(store));
    let response = server
        .post("/api/bookings/book")
        .add_header(AUTHORIZATION, bearer("any-token"))
        .json(&json!({ "schedule_id": Uuid::new_v4(), "seat_number": 7 }))
        .await;

    assert_eq!(response.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(response.json::<Value>()["error"], "Internal server error");
}
