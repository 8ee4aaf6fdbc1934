//! Seat availability for one schedule.
//!
//! Seats are numbered `1..=capacity`. The booked set always comes from the
//! server; numbers outside the bus are dropped rather than rendered.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::errors::{TicketError, TicketResult};

/// Largest bus a schedule may be published for.
pub const MAX_SEATING_CAPACITY: u32 = 120;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SeatState {
    Available,
    Booked,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Seat {
    pub number: u32,
    pub state: SeatState,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeatMap {
    capacity: u32,
    booked: BTreeSet<u32>,
}

impl SeatMap {
    pub fn new(capacity: u32, booked: impl IntoIterator<Item = u32>) -> Self {
        let booked = booked
            .into_iter()
            .filter(|seat| (1..=capacity).contains(seat))
            .collect();
        Self { capacity, booked }
    }

    pub fn capacity(&self) -> u32 {
        self.capacity
    }

    pub fn contains(&self, seat: u32) -> bool {
        (1..=self.capacity).contains(&seat)
    }

    pub fn is_booked(&self, seat: u32) -> bool {
        self.booked.contains(&seat)
    }

    pub fn is_available(&self, seat: u32) -> bool {
        self.contains(seat) && !self.is_booked(seat)
    }

    pub fn booked(&self) -> impl Iterator<Item = u32> + '_ {
        self.booked.iter().copied()
    }

    pub fn available_count(&self) -> u32 {
        self.capacity - self.booked.len() as u32
    }

    pub fn seats(&self) -> Vec<Seat> {
        (1..=self.capacity)
            .map(|number| Seat {
                number,
                state: if self.is_booked(number) {
                    SeatState::Booked
                } else {
                    SeatState::Available
                },
            })
            .collect()
    }

    /// Range check used before a booking is written.
    pub fn ensure_in_range(&self, seat: u32) -> TicketResult<()> {
        if self.contains(seat) {
            Ok(())
        } else {
            Err(TicketError::Validation(format!(
                "Seat {} does not exist on this bus (capacity {})",
                seat, self.capacity
            )))
        }
    }

    /// Range and availability check; a taken seat is a conflict.
    pub fn ensure_bookable(&self, seat: u32) -> TicketResult<()> {
        self.ensure_in_range(seat)?;
        if self.is_booked(seat) {
            return Err(seat_taken(seat));
        }
        Ok(())
    }
}

pub fn seat_taken(seat: u32) -> TicketError {
    TicketError::Conflict(format!("Seat {} is already booked", seat))
}
