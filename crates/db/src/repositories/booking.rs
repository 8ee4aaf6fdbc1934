use crate::models::{BookingInsert, DbBooking, NewBooking};
use crate::schema::{ACTIVE_SEAT_INDEX, BOOKING_REFERENCE_KEY};
use chrono::{DateTime, Utc};
use eyre::{Result, WrapErr};
use sqlx::{Pool, Postgres};
use ulendo_core::models::booking::BookingStatus;
use uuid::Uuid;

const BOOKING_COLUMNS: &str = r#"
    id, booking_reference, schedule_id, user_id, seat_number, status, qr_status,
    passenger_name, passenger_phone, passenger_email, created_at, boarded_at
"#;

/// Inserts a booking, reporting seat and reference conflicts as outcomes.
pub async fn create_booking(pool: &Pool<Postgres>, new: &NewBooking) -> Result<BookingInsert> {
    let id = Uuid::new_v4();
    let now = Utc::now();
    let seat_number =
        i32::try_from(new.seat_number).wrap_err("seat number does not fit the bookings table")?;

    tracing::debug!(
        "Creating booking: id={}, schedule={}, seat={}",
        id, new.schedule_id, new.seat_number
    );

    let result = sqlx::query_as::<_, DbBooking>(&format!(
        r#"
        INSERT INTO bookings (
            id, booking_reference, schedule_id, user_id, seat_number, status, qr_status,
            passenger_name, passenger_phone, passenger_email, created_at
        )
        VALUES ($1, $2, $3, $4, $5, $6, 'unused', $7, $8, $9, $10)
        RETURNING {}
        "#,
        BOOKING_COLUMNS
    ))
    .bind(id)
    .bind(&new.booking_reference)
    .bind(new.schedule_id)
    .bind(new.user_id)
    .bind(seat_number)
    .bind(new.status.as_str())
    .bind(&new.passenger_name)
    .bind(&new.passenger_phone)
    .bind(&new.passenger_email)
    .bind(now)
    .fetch_one(pool)
    .await;

    match result {
        Ok(booking) => Ok(BookingInsert::Created(booking)),
        Err(sqlx::Error::Database(db_err)) if db_err.constraint() == Some(ACTIVE_SEAT_INDEX) => {
            tracing::debug!(
                "Seat already held: schedule={}, seat={}",
                new.schedule_id, new.seat_number
            );
            Ok(BookingInsert::SeatTaken)
        }
        Err(sqlx::Error::Database(db_err))
            if db_err.constraint() == Some(BOOKING_REFERENCE_KEY) =>
        {
            tracing::debug!("Booking reference already issued: {}", new.booking_reference);
            Ok(BookingInsert::ReferenceTaken)
        }
        Err(err) => Err(err.into()),
    }
}

pub async fn get_booking_by_id(pool: &Pool<Postgres>, id: Uuid) -> Result<Option<DbBooking>> {
    let booking = sqlx::query_as::<_, DbBooking>(&format!(
        "SELECT {} FROM bookings WHERE id = $1",
        BOOKING_COLUMNS
    ))
    .bind(id)
    .fetch_optional(pool)
    .await?;

    Ok(booking)
}

pub async fn get_booking_by_reference(
    pool: &Pool<Postgres>,
    reference: &str,
) -> Result<Option<DbBooking>> {
    let booking = sqlx::query_as::<_, DbBooking>(&format!(
        "SELECT {} FROM bookings WHERE booking_reference = $1",
        BOOKING_COLUMNS
    ))
    .bind(reference)
    .fetch_optional(pool)
    .await?;

    Ok(booking)
}

pub async fn get_bookings_by_user(pool: &Pool<Postgres>, user_id: Uuid) -> Result<Vec<DbBooking>> {
    let bookings = sqlx::query_as::<_, DbBooking>(&format!(
        "SELECT {} FROM bookings WHERE user_id = $1 ORDER BY created_at DESC",
        BOOKING_COLUMNS
    ))
    .bind(user_id)
    .fetch_all(pool)
    .await?;

    Ok(bookings)
}

pub async fn get_booked_seats(pool: &Pool<Postgres>, schedule_id: Uuid) -> Result<Vec<i32>> {
    let seats = sqlx::query_scalar::<_, i32>(
        r#"
        SELECT seat_number
        FROM bookings
        WHERE schedule_id = $1 AND status IN ('pending', 'confirmed')
        ORDER BY seat_number ASC
        "#,
    )
    .bind(schedule_id)
    .fetch_all(pool)
    .await?;

    Ok(seats)
}

/// Moves a booking from `from` to `to`; `false` if it was no longer in `from`.
pub async fn update_booking_status(
    pool: &Pool<Postgres>,
    id: Uuid,
    from: BookingStatus,
    to: BookingStatus,
) -> Result<bool> {
    let result = sqlx::query(
        r#"
        UPDATE bookings
        SET status = $3
        WHERE id = $1 AND status = $2
        "#,
    )
    .bind(id)
    .bind(from.as_str())
    .bind(to.as_str())
    .execute(pool)
    .await?;

    Ok(result.rows_affected() == 1)
}

/// Redeems the QR reference; `false` if it had already been used.
pub async fn mark_boarded(pool: &Pool<Postgres>, id: Uuid, at: DateTime<Utc>) -> Result<bool> {
    let result = sqlx::query(
        r#"
        UPDATE bookings
        SET qr_status = 'used', boarded_at = $2
        WHERE id = $1 AND status = 'confirmed' AND qr_status = 'unused'
        "#,
    )
    .bind(id)
    .bind(at)
    .execute(pool)
    .await?;

    Ok(result.rows_affected() == 1)
}
