//! Passenger booking: pick a seat on a schedule, submit, and cancel later.
//!
//! Local checks mirror the server's rules so the user gets the same message
//! without a round-trip; the server still decides.

use chrono::Utc;
use tracing::info;
use ulendo_core::models::booking::{
    Booking, BookingStatus, CancelBookingResponse, CreateBookingRequest,
};
use ulendo_core::models::schedule::Schedule;
use ulendo_core::policy;

use crate::client::ApiClient;
use crate::error::{ClientError, ClientResult};
use crate::seat_picker::SeatPicker;

/// Optional contact details; the server falls back to the account profile.
#[derive(Debug, Clone, Default)]
pub struct PassengerDetails {
    pub name: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
}

#[derive(Debug, Clone)]
pub struct BookingFlow {
    schedule: Schedule,
    picker: SeatPicker,
    passenger: PassengerDetails,
}

impl BookingFlow {
    pub fn new(schedule: Schedule, picker: SeatPicker) -> Self {
        Self {
            schedule,
            picker,
            passenger: PassengerDetails::default(),
        }
    }

    /// Fetches the booked seats for `schedule` and opens the picker.
    pub async fn start(client: &ApiClient, schedule: Schedule) -> ClientResult<Self> {
        let booked = client.booked_seats(schedule.id).await?;
        Ok(Self::new(schedule, SeatPicker::from_response(&booked)))
    }

    pub fn schedule(&self) -> &Schedule {
        &self.schedule
    }

    pub fn picker(&self) -> &SeatPicker {
        &self.picker
    }

    pub fn picker_mut(&mut self) -> &mut SeatPicker {
        &mut self.picker
    }

    pub fn set_passenger(&mut self, passenger: PassengerDetails) {
        self.passenger = passenger;
    }

    pub fn request(&self) -> ClientResult<CreateBookingRequest> {
        let seat_number = self.picker.require_selection()?;
        Ok(CreateBookingRequest {
            schedule_id: self.schedule.id,
            seat_number,
            passenger_name: self.passenger.name.clone(),
            passenger_phone: self.passenger.phone.clone(),
            passenger_email: self.passenger.email.clone(),
        })
    }

    /// Sends the booking once; a conflict or closure is returned unmodified.
    pub async fn submit(&self, client: &ApiClient) -> ClientResult<Booking> {
        let request = self.request()?;
        let booking = client.book(&request).await?;
        info!(reference = %booking.booking_reference, seat = booking.seat_number, "booked");
        Ok(booking)
    }
}

/// Checks the cancellation rules that can be decided locally.
pub fn ensure_cancellable(booking: &Booking) -> ClientResult<()> {
    match booking.status {
        BookingStatus::Cancelled => {
            return Err(ClientError::Policy("Booking is already cancelled".to_string()));
        }
        BookingStatus::Completed => {
            return Err(ClientError::Policy(
                "Completed trips cannot be cancelled".to_string(),
            ));
        }
        BookingStatus::Pending | BookingStatus::Confirmed => {}
    }

    if !policy::can_cancel(booking.schedule.departure_time, Utc::now()) {
        return Err(ClientError::Policy(
            policy::CANCELLATION_CLOSED_MESSAGE.to_string(),
        ));
    }
    Ok(())
}

pub async fn cancel(client: &ApiClient, booking: &Booking) -> ClientResult<CancelBookingResponse> {
    ensure_cancellable(booking)?;
    client.cancel_booking(booking.id).await
}
