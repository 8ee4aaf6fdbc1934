use std::sync::Arc;

use axum::{extract::State, http::StatusCode};
use chrono::Utc;
use tracing::{info, warn};
use ulendo_core::{
    errors::{TicketError, TicketResult},
    models::user::{AuthResponse, LoginRequest, MessageResponse, RegisterRequest, User},
};
use ulendo_db::models::NewUser;

use crate::{
    ApiState,
    middleware::{
        auth::{self, CurrentUser},
        error_handling::AppError,
        extract::Json,
    },
};

const MIN_PASSWORD_LEN: usize = 8;

fn validate_registration(payload: &RegisterRequest) -> TicketResult<()> {
    if !payload.role.is_self_registrable() {
        return Err(TicketError::Validation(
            "Registration is only open to passengers and bus companies".to_string(),
        ));
    }
    if payload.full_name.trim().is_empty() {
        return Err(TicketError::Validation("Full name is required".to_string()));
    }
    let email = payload.email.trim();
    if email.is_empty() || !email.contains('@') {
        return Err(TicketError::Validation(
            "A valid email address is required".to_string(),
        ));
    }
    if payload.password.chars().count() < MIN_PASSWORD_LEN {
        return Err(TicketError::Validation(format!(
            "Password must be at least {} characters",
            MIN_PASSWORD_LEN
        )));
    }
    Ok(())
}

async fn issue_session(state: &ApiState, user: User) -> Result<AuthResponse, AppError> {
    let token = auth::generate_session_token();
    let expires_at = Utc::now() + state.session_ttl;
    state
        .store
        .create_session(user.id, token.clone(), expires_at)
        .await?;

    Ok(AuthResponse { token, user })
}

#[axum::debug_handler(state = Arc<ApiState>)]
pub async fn register(
    State(state): State<Arc<ApiState>>,
    Json(payload): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<AuthResponse>), AppError> {
    validate_registration(&payload)?;

    let password_hash = auth::hash_password(&payload.password)?;
    let created = state
        .store
        .create_user(NewUser {
            email: payload.email.trim().to_lowercase(),
            full_name: payload.full_name.trim().to_string(),
            phone: payload.phone.filter(|phone| !phone.trim().is_empty()),
            role: payload.role,
            password_hash,
        })
        .await?
        .ok_or_else(|| {
            TicketError::Conflict("An account with this email already exists".to_string())
        })?;

    let user = created.to_user()?;
    info!(user_id = %user.id, role = %user.role, "registered account");

    let response = issue_session(&state, user).await?;
    Ok((StatusCode::CREATED, Json(response)))
}

#[axum::debug_handler(state = Arc<ApiState>)]
pub async fn login(
    State(state): State<Arc<ApiState>>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<AuthResponse>, AppError> {
    let invalid = || TicketError::Authentication("Invalid email or password".to_string());

    let db_user = state
        .store
        .get_user_by_email(payload.email.trim().to_lowercase())
        .await?
        .ok_or_else(invalid)?;

    if !auth::verify_password(&payload.password, &db_user.password_hash)? {
        warn!(user_id = %db_user.id, "failed login");
        return Err(invalid().into());
    }

    let response = issue_session(&state, db_user.to_user()?).await?;
    Ok(Json(response))
}

#[axum::debug_handler(state = Arc<ApiState>)]
pub async fn logout(
    State(state): State<Arc<ApiState>>,
    current: CurrentUser,
) -> Result<Json<MessageResponse>, AppError> {
    state.store.delete_session(current.token).await?;

    Ok(Json(MessageResponse {
        message: "Logged out".to_string(),
    }))
}

#[axum::debug_handler(state = Arc<ApiState>)]
pub async fn whoami(current: CurrentUser) -> Json<User> {
    Json(current.user)
}
