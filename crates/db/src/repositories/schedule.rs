use crate::models::{DbSchedule, NewSchedule, ScheduleFilter};
use chrono::Utc;
use eyre::{Result, WrapErr};
use sqlx::{Pool, Postgres};
use uuid::Uuid;

/// Schedule columns with the seat count derived from active bookings.
const SCHEDULE_COLUMNS: &str = r#"
    s.id, s.origin, s.destination, s.departure_time, s.arrival_time, s.price,
    s.seating_capacity,
    (s.seating_capacity - (
        SELECT COUNT(*) FROM bookings b
        WHERE b.schedule_id = s.id AND b.status IN ('pending', 'confirmed')
    ))::INTEGER AS available_seats,
    s.bus_id, s.company_name, s.created_by, s.created_at
"#;

/// `%value%` for `ILIKE ... ESCAPE '\'`, with wildcards in `value` taken literally.
fn contains_pattern(value: &str) -> String {
    let mut pattern = String::with_capacity(value.len() + 2);
    pattern.push('%');
    for ch in value.chars() {
        if matches!(ch, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(ch);
    }
    pattern.push('%');
    pattern
}

pub async fn create_schedule(pool: &Pool<Postgres>, new: &NewSchedule) -> Result<DbSchedule> {
    let id = Uuid::new_v4();
    let now = Utc::now();
    let capacity = i32::try_from(new.seating_capacity)
        .wrap_err("seating capacity does not fit the schedules table")?;

    tracing::debug!(
        "Creating schedule: id={}, route={} -> {}, bus={}",
        id, new.origin, new.destination, new.bus_id
    );

    let schedule = sqlx::query_as::<_, DbSchedule>(
        r#"
        INSERT INTO schedules (
            id, origin, destination, departure_time, arrival_time, price,
            seating_capacity, bus_id, company_name, created_by, created_at
        )
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
        RETURNING id, origin, destination, departure_time, arrival_time, price,
            seating_capacity, seating_capacity AS available_seats,
            bus_id, company_name, created_by, created_at
        "#,
    )
    .bind(id)
    .bind(&new.origin)
    .bind(&new.destination)
    .bind(new.departure_time)
    .bind(new.arrival_time)
    .bind(new.price)
    .bind(capacity)
    .bind(&new.bus_id)
    .bind(&new.company_name)
    .bind(new.created_by)
    .bind(now)
    .fetch_one(pool)
    .await?;

    Ok(schedule)
}

pub async fn get_schedule_by_id(pool: &Pool<Postgres>, id: Uuid) -> Result<Option<DbSchedule>> {
    tracing::debug!("Getting schedule by id: {}", id);

    let schedule = sqlx::query_as::<_, DbSchedule>(&format!(
        "SELECT {} FROM schedules s WHERE s.id = $1",
        SCHEDULE_COLUMNS
    ))
    .bind(id)
    .fetch_optional(pool)
    .await?;

    Ok(schedule)
}

pub async fn search_schedules(
    pool: &Pool<Postgres>,
    filter: &ScheduleFilter,
) -> Result<Vec<DbSchedule>> {
    tracing::debug!(
        "Searching schedules: origin={}, destination={}, date={:?}",
        filter.origin, filter.destination, filter.date
    );

    let schedules = sqlx::query_as::<_, DbSchedule>(&format!(
        r#"
        SELECT {} FROM schedules s
        WHERE s.origin ILIKE $1 ESCAPE '\'
          AND s.destination ILIKE $2 ESCAPE '\'
          AND s.departure_time > $3
          AND ($4::DATE IS NULL OR (s.departure_time AT TIME ZONE 'UTC')::DATE = $4)
          AND ($5::DOUBLE PRECISION IS NULL OR s.price >= $5)
          AND ($6::DOUBLE PRECISION IS NULL OR s.price <= $6)
        ORDER BY s.departure_time ASC
        "#,
        SCHEDULE_COLUMNS
    ))
    .bind(contains_pattern(&filter.origin))
    .bind(contains_pattern(&filter.destination))
    .bind(filter.departing_after)
    .bind(filter.date)
    .bind(filter.min_price)
    .bind(filter.max_price)
    .fetch_all(pool)
    .await?;

    // Sold-out trips are not offered
    Ok(schedules
        .into_iter()
        .filter(|schedule| schedule.available_seats > 0)
        .collect())
}
