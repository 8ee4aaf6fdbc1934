//! Ticket payload carried inside the QR code and its renderings.

use std::io::Cursor;

use chrono::{DateTime, Utc};
use image::{DynamicImage, ImageFormat, Luma};
use qrcode::render::{svg, unicode};
use qrcode::{EcLevel, QrCode};
use serde::{Deserialize, Serialize};

use crate::errors::{TicketError, TicketResult};
use crate::models::booking::Booking;
use crate::reference;

/// Smallest edge, in pixels, of the PNG rendering.
pub const PNG_MIN_SIZE: u32 = 290;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TicketPayload {
    pub reference: String,
    pub passenger: String,
    pub route: String,
    pub seat: u32,
    pub date: DateTime<Utc>,
}

impl TicketPayload {
    pub fn from_booking(booking: &Booking) -> Self {
        Self {
            reference: booking.booking_reference.clone(),
            passenger: booking.passenger_name.clone(),
            route: booking.schedule.route_label(),
            seat: booking.seat_number,
            date: booking.schedule.departure_time,
        }
    }

    pub fn to_json(&self) -> TicketResult<String> {
        serde_json::to_string(self).map_err(|e| TicketError::Internal(Box::new(e)))
    }

    fn qr_code(&self) -> TicketResult<QrCode> {
        QrCode::with_error_correction_level(self.to_json()?.as_bytes(), EcLevel::H)
            .map_err(|e| TicketError::Validation(format!("Unable to encode ticket: {}", e)))
    }

    pub fn render_png(&self) -> TicketResult<Vec<u8>> {
        let image = self
            .qr_code()?
            .render::<Luma<u8>>()
            .min_dimensions(PNG_MIN_SIZE, PNG_MIN_SIZE)
            .build();

        let mut bytes = Vec::new();
        DynamicImage::ImageLuma8(image)
            .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
            .map_err(|e| TicketError::Internal(Box::new(e)))?;
        Ok(bytes)
    }

    pub fn render_svg(&self) -> TicketResult<String> {
        Ok(self
            .qr_code()?
            .render::<svg::Color>()
            .min_dimensions(200, 200)
            .build())
    }

    /// Half-block rendering for terminals with a dark background.
    pub fn render_terminal(&self) -> TicketResult<String> {
        Ok(self
            .qr_code()?
            .render::<unicode::Dense1x2>()
            .dark_color(unicode::Dense1x2::Light)
            .light_color(unicode::Dense1x2::Dark)
            .build())
    }
}

/// Resolves scanned or typed text to a booking reference.
///
/// Accepts either a JSON [`TicketPayload`] or the bare reference.
pub fn reference_from_scan(scanned: &str) -> Option<String> {
    let scanned = scanned.trim();
    if scanned.starts_with('{') {
        let payload: TicketPayload = serde_json::from_str(scanned).ok()?;
        return reference::normalize(&payload.reference);
    }
    reference::normalize(scanned)
}
