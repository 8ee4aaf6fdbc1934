//! Passenger cancellation rules.
//!
//! The same check runs in the client before a request is sent and in the
//! server before the status changes, so both report the same message.

use chrono::{DateTime, Duration, Utc};

use crate::errors::{TicketError, TicketResult};

/// Minimum notice before departure for a passenger cancellation.
pub const CANCELLATION_WINDOW_HOURS: i64 = 24;

pub const CANCELLATION_CLOSED_MESSAGE: &str =
    "Bookings can only be cancelled up to 24 hours before departure";

/// `true` when at least [`CANCELLATION_WINDOW_HOURS`] remain before departure.
pub fn can_cancel(departure_time: DateTime<Utc>, now: DateTime<Utc>) -> bool {
    departure_time - now >= Duration::hours(CANCELLATION_WINDOW_HOURS)
}

pub fn ensure_cancellable(departure_time: DateTime<Utc>, now: DateTime<Utc>) -> TicketResult<()> {
    if can_cancel(departure_time, now) {
        Ok(())
    } else {
        Err(TicketError::Validation(CANCELLATION_CLOSED_MESSAGE.to_string()))
    }
}
