use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A single timed bus trip offered for booking.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Schedule {
    pub id: Uuid,
    pub origin: String,
    pub destination: String,
    pub departure_time: DateTime<Utc>,
    pub arrival_time: DateTime<Utc>,
    pub price: f64,
    pub seating_capacity: u32,
    pub available_seats: u32,
    pub bus_id: String,
    pub company_name: String,
}

impl Schedule {
    /// Route label as printed on tickets, e.g. `Lilongwe → Blantyre`.
    pub fn route_label(&self) -> String {
        route_label(&self.origin, &self.destination)
    }
}

pub fn route_label(origin: &str, destination: &str) -> String {
    format!("{} → {}", origin, destination)
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateScheduleRequest {
    pub origin: String,
    pub destination: String,
    pub departure_time: DateTime<Utc>,
    pub arrival_time: DateTime<Utc>,
    pub price: f64,
    pub seating_capacity: u32,
    pub bus_id: String,
    pub company_name: String,
}

/// Query string of `GET /api/search/schedules`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SearchQuery {
    #[serde(default)]
    pub origin: String,
    #[serde(default)]
    pub destination: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_price: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_price: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResponse {
    pub count: usize,
    pub schedules: Vec<Schedule>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BookedSeatsResponse {
    pub schedule_id: Uuid,
    pub seating_capacity: u32,
    pub booked_seats: Vec<u32>,
}
