use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanRequest {
    pub qr_reference: String,
    pub bus_id: String,
}

/// Why a conductor scan did not validate a ticket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScanFailure {
    InvalidFormat,
    NotFound,
    Cancelled,
    NotConfirmed,
    WrongBus,
    AlreadyUsed,
}

/// Result of `POST /api/bookings/scan-qr`.
///
/// Business rejections are carried in-band with `success: false` so the
/// conductor sees the server's message as-is.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScanResponse {
    pub success: bool,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<ScanFailure>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub passenger_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seat_number: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub route: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub departure_time: Option<DateTime<Utc>>,
}

impl ScanResponse {
    pub fn validated(
        passenger_name: String,
        seat_number: u32,
        route: String,
        departure_time: DateTime<Utc>,
    ) -> Self {
        Self {
            success: true,
            message: "Ticket validated".to_string(),
            reason: None,
            passenger_name: Some(passenger_name),
            seat_number: Some(seat_number),
            route: Some(route),
            departure_time: Some(departure_time),
        }
    }

    pub fn rejected(reason: ScanFailure, message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
            reason: Some(reason),
            passenger_name: None,
            seat_number: None,
            route: None,
            departure_time: None,
        }
    }
}
