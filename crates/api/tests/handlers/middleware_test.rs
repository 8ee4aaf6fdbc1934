use axum::http::{StatusCode, header::AUTHORIZATION};
use pretty_assertions::assert_eq;
use rstest::rstest;
use serde_json::{Value, json};
use ulendo_api::{
    config::ApiConfig,
    middleware::{auth, error_handling::map_error},
};
use ulendo_core::{errors::TicketError, models::user::Role};
use uuid::Uuid;

use crate::test_utils::{TestContext, bearer};

#[rstest]
#[case::not_found(TicketError::NotFound("Schedule not found".into()), StatusCode::NOT_FOUND)]
#[case::validation(TicketError::Validation("Invalid input".into()), StatusCode::BAD_REQUEST)]
#[case::conflict(TicketError::Conflict("Seat 3 is already booked".into()), StatusCode::CONFLICT)]
#[case::authentication(
    TicketError::Authentication("Authentication required".into()),
    StatusCode::UNAUTHORIZED
)]
#[case::authorization(TicketError::Authorization("Not allowed".into()), StatusCode::FORBIDDEN)]
#[case::database(
    TicketError::Database(eyre::eyre!("connection reset")),
    StatusCode::INTERNAL_SERVER_ERROR
)]
#[case::internal(
    TicketError::Internal(Box::new(std::io::Error::other("disk full"))),
    StatusCode::INTERNAL_SERVER_ERROR
)]
fn errors_map_to_status_codes(#[case] error: TicketError, #[case] status: StatusCode) {
    let response = map_error(error);

    assert_eq!(response.status(), status);
}

#[test]
fn hashed_passwords_verify() {
    let hashed = auth::hash_password("test_password").unwrap();

    assert_ne!(hashed, "test_password");
    assert!(hashed.starts_with("$argon2"));
    assert!(auth::verify_password("test_password", &hashed).unwrap());
    assert!(!auth::verify_password("wrong_password", &hashed).unwrap());
}

#[test]
fn malformed_stored_hash_is_an_error() {
    assert!(auth::verify_password("anything", "not-a-phc-string").is_err());
}

#[test]
fn config_defaults_apply_without_environment() {
    let config = ApiConfig::from_lookup(|_| None).unwrap();

    assert_eq!(config.server_addr(), "0.0.0.0:3000");
    assert_eq!(config.database_url, None);
    assert_eq!(config.request_timeout, 30);
    assert_eq!(config.session_ttl_hours, 168);
    assert_eq!(config.log_level, tracing::Level::INFO);
}

#[test]
fn config_reads_overrides() {
    let config = ApiConfig::from_lookup(|key| match key {
        "API_HOST" => Some("127.0.0.1".to_string()),
        "API_PORT" => Some("8088".to_string()),
        "DATABASE_URL" => Some("postgres://ulendo@localhost/ulendo".to_string()),
        "LOG_LEVEL" => Some("DEBUG".to_string()),
        "API_CORS_ORIGINS" => Some("http://a.test, http://b.test,".to_string()),
        _ => None,
    })
    .unwrap();

    assert_eq!(config.server_addr(), "127.0.0.1:8088");
    assert_eq!(config.log_level, tracing::Level::DEBUG);
    assert_eq!(
        config.cors_origins,
        Some(vec!["http://a.test".to_string(), "http://b.test".to_string()])
    );
    assert!(config.database_url.is_some());
}

#[test]
fn config_rejects_a_bad_port() {
    assert!(ApiConfig::from_lookup(|key| (key == "API_PORT").then(|| "ninety".to_string())).is_err());
}

#[rstest]
#[case::path_is_not_a_uuid("/api/schedules/not-a-uuid/booked-seats")]
#[case::price_is_not_a_number("/api/search/schedules?origin=Zomba&destination=Blantyre&min_price=cheap")]
#[tokio::test]
async fn malformed_urls_are_answered_in_json(#[case] uri: &str) {
    let ctx = TestContext::new();

    let response = ctx.server.get(uri).await;

    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
    let body = response.json::<Value>();
    assert!(body["error"].as_str().is_some_and(|message| !message.is_empty()));
}

#[tokio::test]
async fn malformed_bodies_are_answered_in_json() {
    let ctx = TestContext::new();
    let (_, token) = ctx.sign_in(Role::Passenger).await;

    let response = ctx
        .server
        .post("/api/bookings/book")
        .add_header(AUTHORIZATION, bearer(&token))
        .json(&json!({ "schedule_id": Uuid::new_v4() }))
        .await;

    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
    let body = response.json::<Value>();
    assert!(
        body["error"]
            .as_str()
            .is_some_and(|message| message.contains("seat_number"))
    );
}
