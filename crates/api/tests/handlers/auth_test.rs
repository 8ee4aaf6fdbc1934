use axum::http::{StatusCode, header::AUTHORIZATION};
use chrono::{Duration, Utc};
use fake::{
    Fake,
    faker::{internet::en::SafeEmail, name::en::Name},
};
use pretty_assertions::assert_eq;
use serde_json::{Value, json};
use ulendo_api::middleware::auth::generate_session_token;
use ulendo_core::models::user::{AuthResponse, Role, User};
use ulendo_db::TicketStore;

use crate::test_utils::{PASSWORD, TestContext, bearer};

#[tokio::test]
async fn passengers_register_and_are_signed_in() {
    let ctx = TestContext::new();
    let email: String = SafeEmail().fake();
    let name: String = Name().fake();

    let response = ctx
        .server
        .post("/api/auth/register")
        .json(&json!({
            "email": email.to_uppercase(),
            "password": PASSWORD,
            "full_name": name,
            "role": "passenger",
        }))
        .await;

    assert_eq!(response.status_code(), StatusCode::CREATED);
    let auth: AuthResponse = response.json();
    assert_eq!(auth.user.email, email.to_lowercase());
    assert_eq!(auth.user.role, Role::Passenger);

    let me: User = ctx
        .server
        .get("/api/auth/whoami")
        .add_header(AUTHORIZATION, bearer(&auth.token))
        .await
        .json();
    assert_eq!(me, auth.user);
}

#[tokio::test]
async fn staff_roles_cannot_self_register() {
    let ctx = TestContext::new();

    for role in ["admin", "conductor", "accounts_manager"] {
        let response = ctx
            .server
            .post("/api/auth/register")
            .json(&json!({
                "email": format!("{}@ulendo.test", role),
                "password": PASSWORD,
                "full_name": "Staff Member",
                "role": role,
            }))
            .await;

        assert_eq!(response.status_code(), StatusCode::BAD_REQUEST, "{}", role);
    }
}

#[tokio::test]
async fn duplicate_emails_are_a_conflict() {
    let ctx = TestContext::new();
    let (existing, _) = ctx.sign_in(Role::Passenger).await;

    let response = ctx
        .server
        .post("/api/auth/register")
        .json(&json!({
            "email": existing.email,
            "password": PASSWORD,
            "full_name": "Someone Else",
            "role": "company",
        }))
        .await;

    assert_eq!(response.status_code(), StatusCode::CONFLICT);
    assert_eq!(
        response.json::<Value>()["error"],
        "An account with this email already exists"
    );
}

#[tokio::test]
async fn login_checks_the_password() {
    let ctx = TestContext::new();
    let (user, _) = ctx.sign_in(Role::Conductor).await;

    let wrong = ctx
        .server
        .post("/api/auth/login")
        .json(&json!({ "email": user.email, "password": "not-the-password" }))
        .await;
    assert_eq!(wrong.status_code(), StatusCode::UNAUTHORIZED);
    assert_eq!(wrong.json::<Value>()["error"], "Invalid email or password");

    let right = ctx
        .server
        .post("/api/auth/login")
        .json(&json!({ "email": user.email, "password": PASSWORD }))
        .await;
    assert_eq!(right.status_code(), StatusCode::OK);
    let auth: AuthResponse = right.json();
    assert_eq!(auth.user.role, Role::Conductor);
}

#[tokio::test]
async fn logout_ends_the_session() {
    let ctx = TestContext::new();
    let (_, token) = ctx.sign_in(Role::Passenger).await;

    let logout = ctx
        .server
        .post("/api/auth/logout")
        .add_header(AUTHORIZATION, bearer(&token))
        .await;
    assert_eq!(logout.status_code(), StatusCode::OK);

    let whoami = ctx
        .server
        .get("/api/auth/whoami")
        .add_header(AUTHORIZATION, bearer(&token))
        .await;
    assert_eq!(whoami.status_code(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn expired_sessions_are_rejected() {
    let ctx = TestContext::new();
    let (user, _) = ctx.sign_in(Role::Passenger).await;
    let token = generate_session_token();
    ctx.store
        .create_session(user.id, token.clone(), Utc::now() - Duration::minutes(1))
        .await
        .unwrap();

    let response = ctx
        .server
        .get("/api/auth/whoami")
        .add_header(AUTHORIZATION, bearer(&token))
        .await;

    assert_eq!(response.status_code(), StatusCode::UNAUTHORIZED);
    assert_eq!(
        response.json::<Value>()["error"],
        "Session expired or invalid"
    );
}

#[tokio::test]
async fn health_and_version_are_public() {
    let ctx = TestContext::new();

    let health = ctx.server.get("/api/health").await;
    let health = health.json::<Value>();
    assert_eq!(health["status"], "ok");
    assert!(health["server_time"].is_string());

    let version = ctx.server.get("/api/version").await;
    assert_eq!(version.json::<Value>()["name"], "ulendo-api");
}
