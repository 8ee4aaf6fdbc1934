//! In-process [`TicketStore`] used for development and tests.
//!
//! Every write takes the single lock, so the seat and single-use checks are
//! atomic with the writes they guard.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use eyre::{Result, WrapErr};
use tokio::sync::RwLock;
use ulendo_core::models::booking::{BookingStatus, QrStatus};
use uuid::Uuid;

use crate::models::{
    BookingInsert, DbBooking, DbSchedule, DbSession, DbUser, NewBooking, NewSchedule, NewUser,
    ScheduleFilter,
};
use crate::store::TicketStore;

#[derive(Default)]
struct Tables {
    users: HashMap<Uuid, DbUser>,
    sessions: HashMap<String, DbSession>,
    schedules: HashMap<Uuid, DbSchedule>,
    bookings: HashMap<Uuid, DbBooking>,
}

impl Tables {
    fn is_active(booking: &DbBooking) -> bool {
        booking
            .status
            .parse::<BookingStatus>()
            .map(|status| status.is_active())
            .unwrap_or(false)
    }

    fn booked_seats(&self, schedule_id: Uuid) -> Vec<u32> {
        let mut seats: Vec<u32> = self
            .bookings
            .values()
            .filter(|b| b.schedule_id == schedule_id && Self::is_active(b))
            .map(|b| b.seat_number.max(0) as u32)
            .collect();
        seats.sort_unstable();
        seats
    }

    /// Copy of the schedule with its live seat count.
    fn schedule_view(&self, schedule: &DbSchedule) -> DbSchedule {
        let mut view = schedule.clone();
        view.available_seats = schedule.seating_capacity - self.booked_seats(schedule.id).len() as i32;
        view
    }
}

#[derive(Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl TicketStore for MemoryStore {
    async fn create_user(&self, new_user: NewUser) -> Result<Option<DbUser>> {
        let mut tables = self.tables.write().await;
        let email = new_user.email.to_lowercase();
        if tables.users.values().any(|u| u.email == email) {
            return Ok(None);
        }

        let user = DbUser {
            id: Uuid::new_v4(),
            email,
            full_name: new_user.full_name,
            phone: new_user.phone,
            role: new_user.role.as_str().to_string(),
            password_hash: new_user.password_hash,
            created_at: Utc::now(),
        };
        tables.users.insert(user.id, user.clone());
        Ok(Some(user))
    }

    async fn get_user_by_email(&self, email: String) -> Result<Option<DbUser>> {
        let tables = self.tables.read().await;
        let email = email.to_lowercase();
        Ok(tables.users.values().find(|u| u.email == email).cloned())
    }

    async fn get_user_by_id(&self, id: Uuid) -> Result<Option<DbUser>> {
        Ok(self.tables.read().await.users.get(&id).cloned())
    }

    async fn create_session(
        &self,
        user_id: Uuid,
        token: String,
        expires_at: DateTime<Utc>,
    ) -> Result<DbSession> {
        let now = Utc::now();
        let session = DbSession {
            token: token.clone(),
            user_id,
            created_at: now,
            expires_at,
        };
        let mut tables = self.tables.write().await;
        // Logins sweep out sessions that can no longer authenticate
        tables.sessions.retain(|_, existing| existing.expires_at > now);
        tables.sessions.insert(token, session.clone());
        Ok(session)
    }

    async fn get_session(&self, token: String) -> Result<Option<DbSession>> {
        Ok(self.tables.read().await.sessions.get(&token).cloned())
    }

    async fn delete_session(&self, token: String) -> Result<()> {
        self.tables.write().await.sessions.remove(&token);
        Ok(())
    }

    async fn create_schedule(&self, new_schedule: NewSchedule) -> Result<DbSchedule> {
        let capacity = i32::try_from(new_schedule.seating_capacity)
            .wrap_err("seating capacity does not fit the schedules table")?;
        let schedule = DbSchedule {
            id: Uuid::new_v4(),
            origin: new_schedule.origin,
            destination: new_schedule.destination,
            departure_time: new_schedule.departure_time,
            arrival_time: new_schedule.arrival_time,
            price: new_schedule.price,
            seating_capacity: capacity,
            available_seats: capacity,
            bus_id: new_schedule.bus_id,
            company_name: new_schedule.company_name,
            created_by: new_schedule.created_by,
            created_at: Utc::now(),
        };
        self.tables
            .write()
            .await
            .schedules
            .insert(schedule.id, schedule.clone());
        Ok(schedule)
    }

    async fn get_schedule_by_id(&self, id: Uuid) -> Result<Option<DbSchedule>> {
        let tables = self.tables.read().await;
        Ok(tables.schedules.get(&id).map(|s| tables.schedule_view(s)))
    }

    async fn search_schedules(&self, filter: ScheduleFilter) -> Result<Vec<DbSchedule>> {
        let tables = self.tables.read().await;
        let origin = filter.origin.to_lowercase();
        let destination = filter.destination.to_lowercase();

        let mut schedules: Vec<DbSchedule> = tables
            .schedules
            .values()
            .filter(|s| s.origin.to_lowercase().contains(&origin))
            .filter(|s| s.destination.to_lowercase().contains(&destination))
            .filter(|s| s.departure_time > filter.departing_after)
            .filter(|s| filter.date.is_none_or(|date| s.departure_time.date_naive() == date))
            .filter(|s| filter.min_price.is_none_or(|min| s.price >= min))
            .filter(|s| filter.max_price.is_none_or(|max| s.price <= max))
            .map(|s| tables.schedule_view(s))
            .filter(|s| s.available_seats > 0)
            .collect();
        schedules.sort_by_key(|s| s.departure_time);
        Ok(schedules)
    }

    async fn get_booked_seats(&self, schedule_id: Uuid) -> Result<Vec<u32>> {
        Ok(self.tables.read().await.booked_seats(schedule_id))
    }

    async fn create_booking(&self, new_booking: NewBooking) -> Result<BookingInsert> {
        let seat_number = i32::try_from(new_booking.seat_number)
            .wrap_err("seat number does not fit the bookings table")?;
        let mut tables = self.tables.write().await;
        if tables.booked_seats(new_booking.schedule_id).contains(&new_booking.seat_number) {
            return Ok(BookingInsert::SeatTaken);
        }
        if tables
            .bookings
            .values()
            .any(|b| b.booking_reference == new_booking.booking_reference)
        {
            return Ok(BookingInsert::ReferenceTaken);
        }

        let booking = DbBooking {
            id: Uuid::new_v4(),
            booking_reference: new_booking.booking_reference,
            schedule_id: new_booking.schedule_id,
            user_id: new_booking.user_id,
            seat_number,
            status: new_booking.status.as_str().to_string(),
            qr_status: QrStatus::Unused.as_str().to_string(),
            passenger_name: new_booking.passenger_name,
            passenger_phone: new_booking.passenger_phone,
            passenger_email: new_booking.passenger_email,
            created_at: Utc::now(),
            boarded_at: None,
        };
        tables.bookings.insert(booking.id, booking.clone());
        Ok(BookingInsert::Created(booking))
    }

    async fn get_booking_by_id(&self, id: Uuid) -> Result<Option<DbBooking>> {
        Ok(self.tables.read().await.bookings.get(&id).cloned())
    }

    async fn get_booking_by_reference(&self, reference: String) -> Result<Option<DbBooking>> {
        let tables = self.tables.read().await;
        Ok(tables
            .bookings
            .values()
            .find(|b| b.booking_reference == reference)
            .cloned())
    }

    async fn get_bookings_by_user(&self, user_id: Uuid) -> Result<Vec<DbBooking>> {
        let tables = self.tables.read().await;
        let mut bookings: Vec<DbBooking> = tables
            .bookings
            .values()
            .filter(|b| b.user_id == user_id)
            .cloned()
            .collect();
        bookings.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(bookings)
    }

    async fn update_booking_status(
        &self,
        id: Uuid,
        from: BookingStatus,
        to: BookingStatus,
    ) -> Result<bool> {
        let mut tables = self.tables.write().await;
        match tables.bookings.get_mut(&id) {
            Some(booking) if booking.status == from.as_str() => {
                booking.status = to.as_str().to_string();
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn mark_boarded(&self, id: Uuid, at: DateTime<Utc>) -> Result<bool> {
        let mut tables = self.tables.write().await;
        match tables.bookings.get_mut(&id) {
            Some(booking)
                if booking.status == BookingStatus::Confirmed.as_str()
                    && booking.qr_status == QrStatus::Unused.as_str() =>
            {
                booking.qr_status = QrStatus::Used.as_str().to_string();
                booking.boarded_at = Some(at);
                Ok(true)
            }
            _ => Ok(false),
        }
    }
}
