//! Local seat selection over a schedule's booked seats.

use std::fmt::Write;

use ulendo_core::models::schedule::BookedSeatsResponse;
use ulendo_core::seat_map::{Seat, SeatMap, SeatState};

use crate::error::{ClientError, ClientResult};

const SEATS_PER_ROW: u32 = 4;

#[derive(Debug, Clone, PartialEq)]
pub struct SeatPicker {
    map: SeatMap,
    selected: Option<u32>,
}

impl SeatPicker {
    pub fn new(capacity: u32, booked: impl IntoIterator<Item = u32>) -> Self {
        Self {
            map: SeatMap::new(capacity, booked),
            selected: None,
        }
    }

    pub fn from_response(response: &BookedSeatsResponse) -> Self {
        Self::new(response.seating_capacity, response.booked_seats.iter().copied())
    }

    pub fn map(&self) -> &SeatMap {
        &self.map
    }

    pub fn seats(&self) -> Vec<Seat> {
        self.map.seats()
    }

    pub fn selected(&self) -> Option<u32> {
        self.selected
    }

    /// Selects `seat`, replacing any previous choice. Picking the selected
    /// seat again clears the selection.
    pub fn select(&mut self, seat: u32) -> ClientResult<Option<u32>> {
        if self.selected == Some(seat) {
            self.selected = None;
            return Ok(None);
        }

        self.map
            .ensure_bookable(seat)
            .map_err(|err| ClientError::Selection(err.to_string()))?;
        self.selected = Some(seat);
        Ok(self.selected)
    }

    pub fn clear(&mut self) {
        self.selected = None;
    }

    /// Seat being submitted, or the local "select a seat" error.
    pub fn require_selection(&self) -> ClientResult<u32> {
        self.selected
            .ok_or_else(|| ClientError::Selection("Please select a seat".to_string()))
    }

    /// Text grid, two seats either side of the aisle. Booked seats show as
    /// `XX` and the selection as `**`.
    pub fn render(&self) -> String {
        let mut out = String::new();
        for seat in self.seats() {
            let position = (seat.number - 1) % SEATS_PER_ROW;
            if position == SEATS_PER_ROW / 2 {
                out.push_str("   ");
            } else if position != 0 {
                out.push(' ');
            }

            let label = match (seat.state, self.selected == Some(seat.number)) {
                (_, true) => "**".to_string(),
                (SeatState::Booked, false) => "XX".to_string(),
                (SeatState::Available, false) => format!("{:>2}", seat.number),
            };
            let _ = write!(out, "[{}]", label);

            if position == SEATS_PER_ROW - 1 {
                out.push('\n');
            }
        }
        if !out.ends_with('\n') {
            out.push('\n');
        }
        out
    }
}
