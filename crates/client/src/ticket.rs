use ulendo_core::models::booking::{Booking, BookingStatus};
use ulendo_core::ticket::TicketPayload;

use crate::error::{ClientError, ClientResult};

/// Printable forms of a confirmed booking's ticket.
#[derive(Debug, Clone)]
pub struct Ticket {
    payload: TicketPayload,
    booking: Booking,
}

impl Ticket {
    pub fn for_booking(booking: &Booking) -> ClientResult<Self> {
        if booking.status != BookingStatus::Confirmed {
            return Err(ClientError::Policy(format!(
                "Only confirmed bookings have a ticket (this one is {})",
                booking.status
            )));
        }
        Ok(Self {
            payload: TicketPayload::from_booking(booking),
            booking: booking.clone(),
        })
    }

    pub fn payload(&self) -> &TicketPayload {
        &self.payload
    }

    pub fn svg(&self) -> ClientResult<String> {
        self.payload.render_svg().map_err(render_error)
    }

    pub fn png(&self) -> ClientResult<Vec<u8>> {
        self.payload.render_png().map_err(render_error)
    }

    pub fn terminal(&self) -> ClientResult<String> {
        self.payload.render_terminal().map_err(render_error)
    }

    pub fn summary(&self) -> String {
        let schedule = &self.booking.schedule;
        let mut lines = vec![
            format!("Ticket     {}", self.payload.reference),
            format!("Passenger  {}", self.payload.passenger),
            format!("Route      {}", self.payload.route),
            format!(
                "Departure  {}",
                schedule.departure_time.format("%Y-%m-%d %H:%M UTC")
            ),
            format!("Seat       {}", self.payload.seat),
            format!("Bus        {} ({})", schedule.bus_id, schedule.company_name),
            format!("Fare       MWK {:.2}", schedule.price),
        ];
        if let Some(boarded) = self.booking.boarded_at {
            lines.push(format!("Boarded    {}", boarded.format("%Y-%m-%d %H:%M UTC")));
        }
        lines.join("\n")
    }
}

fn render_error(err: ulendo_core::errors::TicketError) -> ClientError {
    ClientError::Policy(err.to_string())
}
