use axum::http::{StatusCode, header::AUTHORIZATION};
use chrono::Duration;
use pretty_assertions::assert_eq;
use rstest::rstest;
use serde_json::json;
use ulendo_core::{
    models::{
        booking::{Booking, BookingStatus},
        scan::{ScanFailure, ScanResponse},
        user::Role,
    },
    ticket::TicketPayload,
};
use ulendo_db::{TicketStore, models::NewBooking};

use crate::test_utils::{TestContext, bearer};

struct Boarding {
    ctx: TestContext,
    conductor_token: String,
    passenger_token: String,
    booking: Booking,
}

async fn booked_trip() -> Boarding {
    let ctx = TestContext::new();
    let (company, _) = ctx.sign_in(Role::Company).await;
    let (_, conductor_token) = ctx.sign_in(Role::Conductor).await;
    let (_, passenger_token) = ctx.sign_in(Role::Passenger).await;
    let schedule = ctx
        .schedule_departing_in(company.id, Duration::days(3), 32, "MBC-202")
        .await;

    let booking: Booking = ctx
        .server
        .post("/api/bookings/book")
        .add_header(AUTHORIZATION, bearer(&passenger_token))
        .json(&json!({ "schedule_id": schedule.id, "seat_number": 7 }))
        .await
        .json();

    Boarding {
        ctx,
        conductor_token,
        passenger_token,
        booking,
    }
}

async fn scan(boarding: &Boarding, qr: &str, bus_id: &str) -> ScanResponse {
    let response = boarding
        .ctx
        .server
        .post("/api/bookings/scan-qr")
        .add_header(AUTHORIZATION, bearer(&boarding.conductor_token))
        .json(&json!({ "qr_reference": qr, "bus_id": bus_id }))
        .await;
    assert_eq!(response.status_code(), StatusCode::OK);
    response.json()
}

#[tokio::test]
async fn a_ticket_boards_exactly_once() {
    let boarding = booked_trip().await;
    let reference = boarding.booking.booking_reference.clone();

    let first = scan(&boarding, &reference, "MBC-202").await;
    assert!(first.success);
    assert_eq!(first.message, "Ticket validated");
    assert_eq!(first.seat_number, Some(7));
    assert_eq!(first.route.as_deref(), Some("Lilongwe → Blantyre"));

    let second = scan(&boarding, &reference, "MBC-202").await;
    assert!(!second.success);
    assert_eq!(second.reason, Some(ScanFailure::AlreadyUsed));
    assert_eq!(second.message, "Ticket already used");
}

#[tokio::test]
async fn the_full_qr_payload_is_accepted() {
    let boarding = booked_trip().await;
    let payload = TicketPayload::from_booking(&boarding.booking)
        .to_json()
        .unwrap();

    let result = scan(&boarding, &payload, "mbc-202").await;

    assert!(result.success);
    assert_eq!(
        result.passenger_name.as_deref(),
        Some(boarding.booking.passenger_name.as_str())
    );
}

#[rstest]
#[case::garbage("hello conductor", ScanFailure::InvalidFormat, "Invalid QR code format")]
#[case::unknown("UTK-ZZZZ9999", ScanFailure::NotFound, "Ticket not found")]
#[tokio::test]
async fn unreadable_or_unknown_references_are_rejected(
    #[case] qr: &str,
    #[case] reason: ScanFailure,
    #[case] message: &str,
) {
    let boarding = booked_trip().await;

    let result = scan(&boarding, qr, "MBC-202").await;

    assert!(!result.success);
    assert_eq!(result.reason, Some(reason));
    assert_eq!(result.message, message);
}

#[tokio::test]
async fn tickets_for_another_bus_are_rejected_without_being_used() {
    let boarding = booked_trip().await;
    let reference = boarding.booking.booking_reference.clone();

    let wrong = scan(&boarding, &reference, "AXA-7").await;
    assert_eq!(wrong.reason, Some(ScanFailure::WrongBus));
    assert_eq!(wrong.message, "Ticket is for bus MBC-202, not AXA-7");

    let right = scan(&boarding, &reference, "MBC-202").await;
    assert!(right.success);
}

#[tokio::test]
async fn cancelled_tickets_are_rejected() {
    let boarding = booked_trip().await;
    let cancelled = boarding
        .ctx
        .server
        .post(&format!("/api/bookings/cancel/{}", boarding.booking.id))
        .add_header(AUTHORIZATION, bearer(&boarding.passenger_token))
        .await;
    assert_eq!(cancelled.status_code(), StatusCode::OK);

    let result = scan(&boarding, &boarding.booking.booking_reference, "MBC-202").await;

    assert_eq!(result.reason, Some(ScanFailure::Cancelled));
    assert_eq!(result.message, "Ticket has been cancelled");
}

#[tokio::test]
async fn pending_tickets_are_not_yet_valid() {
    let boarding = booked_trip().await;
    let pending = boarding
        .ctx
        .store
        .create_booking(NewBooking {
            booking_reference: "UTK-PEND0001".to_string(),
            schedule_id: boarding.booking.schedule.id,
            user_id: boarding.booking.id,
            seat_number: 8,
            status: BookingStatus::Pending,
            passenger_name: "Pending Passenger".to_string(),
            passenger_phone: None,
            passenger_email: "pending@ulendo.test".to_string(),
        })
        .await
        .unwrap()
        .created()
        .unwrap();

    let result = scan(&boarding, &pending.booking_reference, "MBC-202").await;

    assert_eq!(result.reason, Some(ScanFailure::NotConfirmed));
    assert_eq!(result.message, "Ticket has not been confirmed");
}

#[tokio::test]
async fn passengers_cannot_scan() {
    let boarding = booked_trip().await;

    let response = boarding
        .ctx
        .server
        .post("/api/bookings/scan-qr")
        .add_header(AUTHORIZATION, bearer(&boarding.passenger_token))
        .json(&json!({
            "qr_reference": boarding.booking.booking_reference,
            "bus_id": "MBC-202",
        }))
        .await;

    assert_eq!(response.status_code(), StatusCode::FORBIDDEN);
}
