use crate::models::DbSession;
use chrono::{DateTime, Utc};
use eyre::Result;
use sqlx::{Pool, Postgres};
use uuid::Uuid;

pub async fn create_session(
    pool: &Pool<Postgres>,
    user_id: Uuid,
    token: &str,
    expires_at: DateTime<Utc>,
) -> Result<DbSession> {
    let now = Utc::now();

    // Logins sweep out sessions that can no longer authenticate
    let swept = sqlx::query("DELETE FROM sessions WHERE expires_at <= $1")
        .bind(now)
        .execute(pool)
        .await?;
    tracing::debug!("Removed {} expired sessions", swept.rows_affected());

    let session = sqlx::query_as::<_, DbSession>(
        r#"
        INSERT INTO sessions (token, user_id, created_at, expires_at)
        VALUES ($1, $2, $3, $4)
        RETURNING token, user_id, created_at, expires_at
        "#,
    )
    .bind(token)
    .bind(user_id)
    .bind(now)
    .bind(expires_at)
    .fetch_one(pool)
    .await?;

    Ok(session)
}

pub async fn get_session(pool: &Pool<Postgres>, token: &str) -> Result<Option<DbSession>> {
    let session = sqlx::query_as::<_, DbSession>(
        r#"
        SELECT token, user_id, created_at, expires_at
        FROM sessions
        WHERE token = $1
        "#,
    )
    .bind(token)
    .fetch_optional(pool)
    .await?;

    Ok(session)
}

pub async fn delete_session(pool: &Pool<Postgres>, token: &str) -> Result<()> {
    sqlx::query(
        r#"
        DELETE FROM sessions
        WHERE token = $1
        "#,
    )
    .bind(token)
    .execute(pool)
    .await?;

    Ok(())
}
