//! The persistence seam used by the API.
//!
//! [`TicketStore`] owns the two booking invariants: at most one active
//! booking per `(schedule, seat)` and single use of a QR reference. Both
//! implementations report a lost race as a value (`SeatTaken`, `Ok(false)`)
//! rather than an error so handlers can turn it into a business message.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use eyre::Result;
use ulendo_core::models::booking::BookingStatus;
use uuid::Uuid;

use crate::models::{
    BookingInsert, DbBooking, DbSchedule, DbSession, DbUser, NewBooking, NewSchedule, NewUser,
    ScheduleFilter,
};
use crate::{DbPool, repositories};

#[async_trait]
pub trait TicketStore: Send + Sync {
    /// `None` when the email is already registered.
    async fn create_user(&self, new_user: NewUser) -> Result<Option<DbUser>>;
    async fn get_user_by_email(&self, email: String) -> Result<Option<DbUser>>;
    async fn get_user_by_id(&self, id: Uuid) -> Result<Option<DbUser>>;

    async fn create_session(
        &self,
        user_id: Uuid,
        token: String,
        expires_at: DateTime<Utc>,
    ) -> Result<DbSession>;
    async fn get_session(&self, token: String) -> Result<Option<DbSession>>;
    async fn delete_session(&self, token: String) -> Result<()>;

    async fn create_schedule(&self, new_schedule: NewSchedule) -> Result<DbSchedule>;
    async fn get_schedule_by_id(&self, id: Uuid) -> Result<Option<DbSchedule>>;
    /// Future departures with at least one free seat, earliest first.
    async fn search_schedules(&self, filter: ScheduleFilter) -> Result<Vec<DbSchedule>>;
    /// Seats held by pending or confirmed bookings, ascending.
    async fn get_booked_seats(&self, schedule_id: Uuid) -> Result<Vec<u32>>;

    /// Inserts unless the seat is held or the reference is already issued.
    async fn create_booking(&self, new_booking: NewBooking) -> Result<BookingInsert>;
    async fn get_booking_by_id(&self, id: Uuid) -> Result<Option<DbBooking>>;
    async fn get_booking_by_reference(&self, reference: String) -> Result<Option<DbBooking>>;
    /// Newest first.
    async fn get_bookings_by_user(&self, user_id: Uuid) -> Result<Vec<DbBooking>>;
    /// Compare-and-set on the status column.
    async fn update_booking_status(
        &self,
        id: Uuid,
        from: BookingStatus,
        to: BookingStatus,
    ) -> Result<bool>;
    /// Marks a confirmed, unused ticket as used; `false` if it was not.
    async fn mark_boarded(&self, id: Uuid, at: DateTime<Utc>) -> Result<bool>;
}

/// PostgreSQL-backed store.
#[derive(Clone)]
pub struct PgStore {
    pool: DbPool,
}

impl PgStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &DbPool {
        &self.pool
    }
}

#[async_trait]
impl TicketStore for PgStore {
    async fn create_user(&self, new_user: NewUser) -> Result<Option<DbUser>> {
        repositories::user::create_user(&self.pool, &new_user).await
    }

    async fn get_user_by_email(&self, email: String) -> Result<Option<DbUser>> {
        repositories::user::get_user_by_email(&self.pool, &email).await
    }

    async fn get_user_by_id(&self, id: Uuid) -> Result<Option<DbUser>> {
        repositories::user::get_user_by_id(&self.pool, id).await
    }

    async fn create_session(
        &self,
        user_id: Uuid,
        token: String,
        expires_at: DateTime<Utc>,
    ) -> Result<DbSession> {
        repositories::session::create_session(&self.pool, user_id, &token, expires_at).await
    }

    async fn get_session(&self, token: String) -> Result<Option<DbSession>> {
        repositories::session::get_session(&self.pool, &token).await
    }

    async fn delete_session(&self, token: String) -> Result<()> {
        repositories::session::delete_session(&self.pool, &token).await
    }

    async fn create_schedule(&self, new_schedule: NewSchedule) -> Result<DbSchedule> {
        repositories::schedule::create_schedule(&self.pool, &new_schedule).await
    }

    async fn get_schedule_by_id(&self, id: Uuid) -> Result<Option<DbSchedule>> {
        repositories::schedule::get_schedule_by_id(&self.pool, id).await
    }

    async fn search_schedules(&self, filter: ScheduleFilter) -> Result<Vec<DbSchedule>> {
        repositories::schedule::search_schedules(&self.pool, &filter).await
    }

    async fn get_booked_seats(&self, schedule_id: Uuid) -> Result<Vec<u32>> {
        let seats = repositories::booking::get_booked_seats(&self.pool, schedule_id).await?;
        Ok(seats.into_iter().map(|seat| seat.max(0) as u32).collect())
    }

    async fn create_booking(&self, new_booking: NewBooking) -> Result<BookingInsert> {
        repositories::booking::create_booking(&self.pool, &new_booking).await
    }

    async fn get_booking_by_id(&self, id: Uuid) -> Result<Option<DbBooking>> {
        repositories::booking::get_booking_by_id(&self.pool, id).await
    }

    async fn get_booking_by_reference(&self, reference: String) -> Result<Option<DbBooking>> {
        repositories::booking::get_booking_by_reference(&self.pool, &reference).await
    }

    async fn get_bookings_by_user(&self, user_id: Uuid) -> Result<Vec<DbBooking>> {
        repositories::booking::get_bookings_by_user(&self.pool, user_id).await
    }

    async fn update_booking_status(
        &self,
        id: Uuid,
        from: BookingStatus,
        to: BookingStatus,
    ) -> Result<bool> {
        repositories::booking::update_booking_status(&self.pool, id, from, to).await
    }

    async fn mark_boarded(&self, id: Uuid, at: DateTime<Utc>) -> Result<bool> {
        repositories::booking::mark_boarded(&self.pool, id, at).await
    }
}
