use axum::http::{StatusCode, header::AUTHORIZATION};
use chrono::{Duration, Utc};
use pretty_assertions::assert_eq;
use rstest::rstest;
use serde_json::{Value, json};
use ulendo_core::models::{
    schedule::{Schedule, SearchResponse},
    user::Role,
};
use uuid::Uuid;

use crate::test_utils::{TestContext, bearer};

#[tokio::test]
async fn search_returns_future_trips_with_seats_in_departure_order() {
    let ctx = TestContext::new();
    let (company, _) = ctx.sign_in(Role::Company).await;
    let later = ctx
        .schedule_departing_in(company.id, Duration::days(4), 32, "MBC-404")
        .await;
    let sooner = ctx
        .schedule_departing_in(company.id, Duration::days(1), 32, "MBC-101")
        .await;
    ctx.schedule_departing_in(company.id, Duration::hours(-3), 32, "MBC-000")
        .await;
    let full = ctx
        .schedule_departing_in(company.id, Duration::days(2), 2, "MBC-222")
        .await;
    ctx.occupy(full.id, company.id, &[1, 2]).await;

    let response = ctx
        .server
        .get("/api/search/schedules")
        .add_query_param("origin", "lilongwe")
        .add_query_param("destination", "blan")
        .await;

    assert_eq!(response.status_code(), StatusCode::OK);
    let body: SearchResponse = response.json();
    let ids: Vec<Uuid> = body.schedules.iter().map(|s| s.id).collect();
    assert_eq!(ids, vec![sooner.id, later.id]);
    assert_eq!(body.count, 2);
}

#[tokio::test]
async fn search_narrows_by_date_and_price() {
    let ctx = TestContext::new();
    let (company, _) = ctx.sign_in(Role::Company).await;
    let target = ctx
        .schedule_departing_in(company.id, Duration::days(5), 32, "MBC-505")
        .await;
    ctx.schedule_departing_in(company.id, Duration::days(6), 32, "MBC-606")
        .await;
    let date = target.departure_time.format("%Y-%m-%d").to_string();

    let body: SearchResponse = ctx
        .server
        .get("/api/search/schedules")
        .add_query_param("origin", "Lilongwe")
        .add_query_param("destination", "Blantyre")
        .add_query_param("date", &date)
        .add_query_param("max_price", "20000")
        .await
        .json();
    assert_eq!(body.count, 1);
    assert_eq!(body.schedules[0].id, target.id);

    let none: SearchResponse = ctx
        .server
        .get("/api/search/schedules")
        .add_query_param("origin", "Lilongwe")
        .add_query_param("destination", "Blantyre")
        .add_query_param("min_price", "20000")
        .await
        .json();
    assert_eq!(none.count, 0);
}

#[rstest]
#[case::no_destination("origin=Lilongwe", "Origin and destination are required")]
#[case::blank_origin(
    "origin=%20&destination=Blantyre",
    "Origin and destination are required"
)]
#[case::bad_date(
    "origin=Lilongwe&destination=Blantyre&date=18-10-2026",
    "Invalid date format. Use YYYY-MM-DD"
)]
#[tokio::test]
async fn search_rejects_incomplete_queries(#[case] query: &str, #[case] message: &str) {
    let ctx = TestContext::new();

    let response = ctx
        .server
        .get(&format!("/api/search/schedules?{}", query))
        .await;

    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
    assert_eq!(response.json::<Value>()["error"], message);
}

#[tokio::test]
async fn booked_seats_of_unknown_schedule_is_not_found() {
    let ctx = TestContext::new();

    let response = ctx
        .server
        .get(&format!("/api/schedules/{}/booked-seats", Uuid::new_v4()))
        .await;

    assert_eq!(response.status_code(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn companies_publish_schedules() {
    let ctx = TestContext::new();
    let (_, company_token) = ctx.sign_in(Role::Company).await;
    let (_, passenger_token) = ctx.sign_in(Role::Passenger).await;
    let departure = Utc::now() + Duration::days(7);
    let body = json!({
        "origin": "Zomba",
        "destination": "Mangochi",
        "departure_time": departure,
        "arrival_time": departure + Duration::hours(3),
        "price": 9000.0,
        "seating_capacity": 40,
        "bus_id": "SUP-11",
        "company_name": "Super Sink",
    });

    let created = ctx
        .server
        .post("/api/schedules")
        .add_header(AUTHORIZATION, bearer(&company_token))
        .json(&body)
        .await;
    assert_eq!(created.status_code(), StatusCode::CREATED);
    let schedule: Schedule = created.json();
    assert_eq!(schedule.available_seats, 40);
    assert_eq!(schedule.route_label(), "Zomba → Mangochi");

    let forbidden = ctx
        .server
        .post("/api/schedules")
        .add_header(AUTHORIZATION, bearer(&passenger_token))
        .json(&body)
        .await;
    assert_eq!(forbidden.status_code(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn schedules_must_arrive_after_they_depart() {
    let ctx = TestContext::new();
    let (_, token) = ctx.sign_in(Role::Admin).await;
    let departure = Utc::now() + Duration::days(7);

    let response = ctx
        .server
        .post("/api/schedules")
        .add_header(AUTHORIZATION, bearer(&token))
        .json(&json!({
            "origin": "Zomba",
            "destination": "Mangochi",
            "departure_time": departure,
            "arrival_time": departure - Duration::hours(1),
            "price": 9000.0,
            "seating_capacity": 40,
            "bus_id": "SUP-11",
            "company_name": "Super Sink",
        }))
        .await;

    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
    assert_eq!(
        response.json::<Value>()["error"],
        "Arrival time must be after departure time"
    );
}

#[rstest]
#[case::empty_bus(0, "Seating capacity must be at least 1")]
#[case::oversized_bus(121, "Seating capacity cannot exceed 120")]
#[case::wraps_as_i32(4_294_967_295, "Seating capacity cannot exceed 120")]
#[tokio::test]
async fn seating_capacity_must_fit_a_bus(#[case] capacity: u32, #[case] message: &str) {
    let ctx = TestContext::new();
    let (_, token) = ctx.sign_in(Role::Company).await;
    let departure = Utc::now() + Duration::days(7);

    let response = ctx
        .server
        .post("/api/schedules")
        .add_header(AUTHORIZATION, bearer(&token))
        .json(&json!({
            "origin": "Zomba",
            "destination": "Mangochi",
            "departure_time": departure,
            "arrival_time": departure + Duration::hours(3),
            "price": 9000.0,
            "seating_capacity": capacity,
            "bus_id": "SUP-11",
            "company_name": "Super Sink",
        }))
        .await;

    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
    assert_eq!(response.json::<Value>()["error"], message);
}
