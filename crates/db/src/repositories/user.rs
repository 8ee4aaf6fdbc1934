use crate::models::{DbUser, NewUser};
use chrono::Utc;
use eyre::Result;
use sqlx::{Pool, Postgres};
use uuid::Uuid;

/// Inserts a user; `None` when the email is already registered.
pub async fn create_user(pool: &Pool<Postgres>, new_user: &NewUser) -> Result<Option<DbUser>> {
    let id = Uuid::new_v4();
    let now = Utc::now();

    tracing::debug!("Creating user: id={}, role={}", id, new_user.role);

    let user = sqlx::query_as::<_, DbUser>(
        r#"
        INSERT INTO users (id, email, full_name, phone, role, password_hash, created_at)
        VALUES ($1, LOWER($2), $3, $4, $5, $6, $7)
        ON CONFLICT (email) DO NOTHING
        RETURNING id, email, full_name, phone, role, password_hash, created_at
        "#,
    )
    .bind(id)
    .bind(&new_user.email)
    .bind(&new_user.full_name)
    .bind(&new_user.phone)
    .bind(new_user.role.as_str())
    .bind(&new_user.password_hash)
    .bind(now)
    .fetch_optional(pool)
    .await?;

    Ok(user)
}

pub async fn get_user_by_email(pool: &Pool<Postgres>, email: &str) -> Result<Option<DbUser>> {
    let user = sqlx::query_as::<_, DbUser>(
        r#"
        SELECT id, email, full_name, phone, role, password_hash, created_at
        FROM users
        WHERE email = LOWER($1)
        "#,
    )
    .bind(email)
    .fetch_optional(pool)
    .await?;

    Ok(user)
}

pub async fn get_user_by_id(pool: &Pool<Postgres>, id: Uuid) -> Result<Option<DbUser>> {
    let user = sqlx::query_as::<_, DbUser>(
        r#"
        SELECT id, email, full_name, phone, role, password_hash, created_at
        FROM users
        WHERE id = $1
        "#,
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;

    Ok(user)
}
