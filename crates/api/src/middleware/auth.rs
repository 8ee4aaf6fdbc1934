//! # Authentication Module
//!
//! Password hashing with Argon2, opaque session tokens and the
//! [`CurrentUser`] extractor that resolves `Authorization: Bearer <token>`
//! into the signed-in user.

use std::sync::Arc;

use argon2::{
    Argon2, PasswordHash, PasswordHasher, PasswordVerifier,
    password_hash::{SaltString, rand_core::OsRng},
};
use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts},
};
use chrono::Utc;
use eyre::Result;
use rand::{Rng, distributions::Alphanumeric};
use tracing::debug;
use ulendo_core::{
    errors::{TicketError, TicketResult},
    models::user::{Role, User},
};

use crate::{ApiState, middleware::error_handling::AppError};

const TOKEN_LEN: usize = 48;

/// Hashes a password using the Argon2 algorithm
///
/// Returns the password in PHC string format (algorithm, parameters, salt
/// and hash in one string), with a fresh random salt per call.
///
/// # Example
///
/// ```rust
/// let hashed = ulendo_api::middleware::auth::hash_password("user_password").unwrap();
/// assert!(hashed.starts_with("$argon2"));
/// ```
pub fn hash_password(password: &str) -> Result<String> {
    // Generate a fresh, random salt
    let salt = SaltString::generate(&mut OsRng);

    let password_hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| eyre::eyre!("Error hashing password: {}", e))?
        .to_string();

    Ok(password_hash)
}

/// Checks a plain password against a stored PHC hash.
///
/// A malformed stored hash is reported as an error, a wrong password as
/// `Ok(false)`.
pub fn verify_password(password: &str, password_hash: &str) -> Result<bool> {
    let parsed = PasswordHash::new(password_hash)
        .map_err(|e| eyre::eyre!("Stored password hash is invalid: {}", e))?;

    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok())
}

/// Random alphanumeric bearer token.
pub fn generate_session_token() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(TOKEN_LEN)
        .map(char::from)
        .collect()
}

/// Pulls the token out of an `Authorization: Bearer <token>` header value.
pub fn bearer_token(header: &str) -> Option<&str> {
    let (scheme, token) = header.trim().split_once(' ')?;
    let token = token.trim();
    (scheme.eq_ignore_ascii_case("bearer") && !token.is_empty()).then_some(token)
}

/// The user behind the request's session token.
#[derive(Debug, Clone)]
pub struct CurrentUser {
    pub user: User,
    pub token: String,
}

impl CurrentUser {
    pub fn role(&self) -> Role {
        self.user.role
    }

    /// Fails with 403 unless `permitted` holds for the caller's role.
    pub fn ensure(&self, permitted: fn(&Role) -> bool, action: &str) -> TicketResult<()> {
        if permitted(&self.user.role) {
            Ok(())
        } else {
            Err(TicketError::Authorization(format!(
                "Your role ({}) is not allowed to {}",
                self.user.role, action
            )))
        }
    }
}

#[async_trait]
impl FromRequestParts<Arc<ApiState>> for CurrentUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<ApiState>,
    ) -> Result<Self, Self::Rejection> {
        let token = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(bearer_token)
            .ok_or_else(|| TicketError::Authentication("Authentication required".to_string()))?
            .to_string();

        let session = state
            .store
            .get_session(token.clone())
            .await?
            .filter(|session| session.expires_at > Utc::now())
            .ok_or_else(|| {
                debug!("rejected unknown or expired session");
                TicketError::Authentication("Session expired or invalid".to_string())
            })?;

        let user = state
            .store
            .get_user_by_id(session.user_id)
            .await?
            .ok_or_else(|| TicketError::Authentication("Session expired or invalid".to_string()))?
            .to_user()?;

        Ok(CurrentUser { user, token })
    }
}
