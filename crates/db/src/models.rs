use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use ulendo_core::{
    errors::TicketResult,
    models::{
        booking::{Booking, BookingStatus, QrStatus},
        schedule::Schedule,
        user::{Role, User},
    },
};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DbUser {
    pub id: Uuid,
    pub email: String,
    pub full_name: String,
    pub phone: Option<String>,
    pub role: String,
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

impl DbUser {
    pub fn role(&self) -> TicketResult<Role> {
        self.role.parse()
    }

    pub fn to_user(&self) -> TicketResult<User> {
        Ok(User {
            id: self.id,
            email: self.email.clone(),
            full_name: self.full_name.clone(),
            role: self.role()?,
            phone: self.phone.clone(),
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DbSession {
    pub token: String,
    pub user_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

/// Schedule row plus the seat count derived from active bookings.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DbSchedule {
    pub id: Uuid,
    pub origin: String,
    pub destination: String,
    pub departure_time: DateTime<Utc>,
    pub arrival_time: DateTime<Utc>,
    pub price: f64,
    pub seating_capacity: i32,
    pub available_seats: i32,
    pub bus_id: String,
    pub company_name: String,
    pub created_by: Uuid,
    pub created_at: DateTime<Utc>,
}

impl DbSchedule {
    pub fn to_schedule(&self) -> Schedule {
        Schedule {
            id: self.id,
            origin: self.origin.clone(),
            destination: self.destination.clone(),
            departure_time: self.departure_time,
            arrival_time: self.arrival_time,
            price: self.price,
            seating_capacity: self.seating_capacity.max(0) as u32,
            available_seats: self.available_seats.max(0) as u32,
            bus_id: self.bus_id.clone(),
            company_name: self.company_name.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DbBooking {
    pub id: Uuid,
    pub booking_reference: String,
    pub schedule_id: Uuid,
    pub user_id: Uuid,
    pub seat_number: i32,
    pub status: String,
    pub qr_status: String,
    pub passenger_name: String,
    pub passenger_phone: Option<String>,
    pub passenger_email: String,
    pub created_at: DateTime<Utc>,
    pub boarded_at: Option<DateTime<Utc>>,
}

impl DbBooking {
    pub fn status(&self) -> TicketResult<BookingStatus> {
        self.status.parse()
    }

    pub fn qr_status(&self) -> TicketResult<QrStatus> {
        self.qr_status.parse()
    }

    pub fn into_booking(self, schedule: Schedule) -> TicketResult<Booking> {
        let status = self.status()?;
        let qr_status = self.qr_status()?;
        Ok(Booking {
            id: self.id,
            booking_reference: self.booking_reference,
            seat_number: self.seat_number.max(0) as u32,
            status,
            qr_status,
            created_at: self.created_at,
            boarded_at: self.boarded_at,
            passenger_name: self.passenger_name,
            passenger_phone: self.passenger_phone,
            passenger_email: self.passenger_email,
            schedule,
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewUser {
    pub email: String,
    pub full_name: String,
    pub phone: Option<String>,
    pub role: Role,
    pub password_hash: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewSchedule {
    pub origin: String,
    pub destination: String,
    pub departure_time: DateTime<Utc>,
    pub arrival_time: DateTime<Utc>,
    pub price: f64,
    pub seating_capacity: u32,
    pub bus_id: String,
    pub company_name: String,
    pub created_by: Uuid,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewBooking {
    pub booking_reference: String,
    pub schedule_id: Uuid,
    pub user_id: Uuid,
    pub seat_number: u32,
    pub status: BookingStatus,
    pub passenger_name: String,
    pub passenger_phone: Option<String>,
    pub passenger_email: String,
}

/// Outcome of inserting a booking.
#[derive(Debug, Clone)]
pub enum BookingInsert {
    Created(DbBooking),
    /// Another active booking holds the seat
    SeatTaken,
    /// The booking reference belongs to an existing booking
    ReferenceTaken,
}

impl BookingInsert {
    pub fn created(self) -> Option<DbBooking> {
        match self {
            BookingInsert::Created(booking) => Some(booking),
            BookingInsert::SeatTaken | BookingInsert::ReferenceTaken => None,
        }
    }
}

/// Search criteria; text fields match case-insensitively anywhere.
#[derive(Debug, Clone, PartialEq)]
pub struct ScheduleFilter {
    pub origin: String,
    pub destination: String,
    pub date: Option<NaiveDate>,
    pub min_price: Option<f64>,
    pub max_price: Option<f64>,
    pub departing_after: DateTime<Utc>,
}
