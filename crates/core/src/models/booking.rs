use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::TicketError;
use crate::models::schedule::Schedule;

/// Lifecycle of a booking as reported by the server.
///
/// ```text
/// pending -> confirmed | cancelled
/// confirmed -> cancelled | completed
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BookingStatus {
    Pending,
    Confirmed,
    Cancelled,
    Completed,
}

impl BookingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            BookingStatus::Pending => "pending",
            BookingStatus::Confirmed => "confirmed",
            BookingStatus::Cancelled => "cancelled",
            BookingStatus::Completed => "completed",
        }
    }

    /// Whether a booking in this status holds its seat.
    pub fn is_active(&self) -> bool {
        matches!(self, BookingStatus::Pending | BookingStatus::Confirmed)
    }

    pub fn can_transition_to(&self, next: BookingStatus) -> bool {
        matches!(
            (self, next),
            (BookingStatus::Pending, BookingStatus::Confirmed)
                | (BookingStatus::Pending, BookingStatus::Cancelled)
                | (BookingStatus::Confirmed, BookingStatus::Cancelled)
                | (BookingStatus::Confirmed, BookingStatus::Completed)
        )
    }

    /// Returns the next status or a validation error naming both ends.
    pub fn transition(self, next: BookingStatus) -> Result<BookingStatus, TicketError> {
        if self.can_transition_to(next) {
            Ok(next)
        } else {
            Err(TicketError::Validation(format!(
                "Booking is already {} and cannot become {}",
                self, next
            )))
        }
    }
}

impl fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BookingStatus {
    type Err = TicketError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pending" => Ok(BookingStatus::Pending),
            "confirmed" => Ok(BookingStatus::Confirmed),
            "cancelled" => Ok(BookingStatus::Cancelled),
            "completed" => Ok(BookingStatus::Completed),
            other => Err(TicketError::Validation(format!(
                "Unknown booking status: {}",
                other
            ))),
        }
    }
}

/// Whether a booking's QR reference has been redeemed at boarding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QrStatus {
    Unused,
    Used,
}

impl QrStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            QrStatus::Unused => "unused",
            QrStatus::Used => "used",
        }
    }
}

impl FromStr for QrStatus {
    type Err = TicketError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "unused" => Ok(QrStatus::Unused),
            "used" => Ok(QrStatus::Used),
            other => Err(TicketError::Validation(format!("Unknown QR status: {}", other))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Booking {
    pub id: Uuid,
    pub booking_reference: String,
    pub seat_number: u32,
    pub status: BookingStatus,
    pub qr_status: QrStatus,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub boarded_at: Option<DateTime<Utc>>,
    pub passenger_name: String,
    #[serde(default)]
    pub passenger_phone: Option<String>,
    pub passenger_email: String,
    pub schedule: Schedule,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateBookingRequest {
    pub schedule_id: Uuid,
    pub seat_number: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub passenger_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub passenger_phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub passenger_email: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookingsResponse {
    pub bookings: Vec<Booking>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CancelBookingResponse {
    pub message: String,
    pub status: BookingStatus,
}
