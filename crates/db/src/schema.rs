use eyre::Result;
use sqlx::{Pool, Postgres};
use tracing::info;

/// Name of the partial unique index that keeps one active booking per seat.
pub const ACTIVE_SEAT_INDEX: &str = "uq_bookings_active_seat";

/// Name of the unique constraint on booking references.
pub const BOOKING_REFERENCE_KEY: &str = "uq_bookings_reference";

pub async fn initialize_database(pool: &Pool<Postgres>) -> Result<()> {
    info!("Initializing database schema...");

    // Create users table
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS users (
            id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
            email VARCHAR(255) NOT NULL UNIQUE,
            full_name VARCHAR(255) NOT NULL,
            phone VARCHAR(50) NULL,
            role VARCHAR(32) NOT NULL,
            password_hash VARCHAR(255) NOT NULL,
            created_at TIMESTAMP WITH TIME ZONE NOT NULL DEFAULT NOW()
        );
        "#,
    )
    .execute(pool)
    .await?;

    // Create sessions table
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS sessions (
            token VARCHAR(128) PRIMARY KEY,
            user_id UUID NOT NULL REFERENCES users(id) ON DELETE CASCADE,
            created_at TIMESTAMP WITH TIME ZONE NOT NULL DEFAULT NOW(),
            expires_at TIMESTAMP WITH TIME ZONE NOT NULL
        );
        "#,
    )
    .execute(pool)
    .await?;

    // Create schedules table
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS schedules (
            id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
            origin VARCHAR(120) NOT NULL,
            destination VARCHAR(120) NOT NULL,
            departure_time TIMESTAMP WITH TIME ZONE NOT NULL,
            arrival_time TIMESTAMP WITH TIME ZONE NOT NULL,
            price DOUBLE PRECISION NOT NULL,
            seating_capacity INTEGER NOT NULL,
            bus_id VARCHAR(64) NOT NULL,
            company_name VARCHAR(255) NOT NULL,
            created_by UUID NOT NULL REFERENCES users(id),
            created_at TIMESTAMP WITH TIME ZONE NOT NULL DEFAULT NOW(),
            CONSTRAINT valid_trip CHECK (arrival_time > departure_time),
            CONSTRAINT valid_capacity CHECK (seating_capacity > 0)
        );
        "#,
    )
    .execute(pool)
    .await?;

    // Create bookings table
    sqlx::query(&format!(
        r#"
        CREATE TABLE IF NOT EXISTS bookings (
            id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
            booking_reference VARCHAR(32) NOT NULL,
            schedule_id UUID NOT NULL REFERENCES schedules(id),
            user_id UUID NOT NULL REFERENCES users(id),
            seat_number INTEGER NOT NULL,
            status VARCHAR(20) NOT NULL DEFAULT 'pending',
            qr_status VARCHAR(20) NOT NULL DEFAULT 'unused',
            passenger_name VARCHAR(255) NOT NULL,
            passenger_phone VARCHAR(50) NULL,
            passenger_email VARCHAR(255) NOT NULL,
            created_at TIMESTAMP WITH TIME ZONE NOT NULL DEFAULT NOW(),
            boarded_at TIMESTAMP WITH TIME ZONE NULL,
            CONSTRAINT valid_seat CHECK (seat_number > 0),
            CONSTRAINT {} UNIQUE (booking_reference)
        );
        "#,
        BOOKING_REFERENCE_KEY
    ))
    .execute(pool)
    .await?;

    // One pending or confirmed booking per seat
    sqlx::query(&format!(
        r#"
        CREATE UNIQUE INDEX IF NOT EXISTS {}
            ON bookings(schedule_id, seat_number)
            WHERE status IN ('pending', 'confirmed');
        "#,
        ACTIVE_SEAT_INDEX
    ))
    .execute(pool)
    .await?;

    // Create indexes
    for statement in [
        "CREATE INDEX IF NOT EXISTS idx_sessions_user_id ON sessions(user_id)",
        "CREATE INDEX IF NOT EXISTS idx_schedules_departure_time ON schedules(departure_time)",
        "CREATE INDEX IF NOT EXISTS idx_bookings_schedule_id ON bookings(schedule_id)",
        "CREATE INDEX IF NOT EXISTS idx_bookings_user_id ON bookings(user_id)",
    ] {
        sqlx::query(statement).execute(pool).await?;
    }

    info!("Database schema initialized successfully.");
    Ok(())
}
