//! Conductor ticket validation.
//!
//! Typed input and text decoded from a QR image both go through
//! [`reference_from_scan`]; unreadable input is still sent so the server's
//! own rejection reaches the conductor.

use tracing::{debug, info};
use ulendo_core::models::scan::{ScanRequest, ScanResponse};
use ulendo_core::ticket::reference_from_scan;

use crate::client::ApiClient;
use crate::error::{ClientError, ClientResult};

/// Reads the first QR code found in a PNG or JPEG image.
pub fn decode_qr(image_bytes: &[u8]) -> ClientResult<String> {
    let image = image::load_from_memory(image_bytes)
        .map_err(|err| ClientError::QrDecode(format!("Unable to read image: {}", err)))?
        .to_luma8();

    let mut prepared = rqrr::PreparedImage::prepare_from_greyscale(
        image.width() as usize,
        image.height() as usize,
        |x, y| image.get_pixel(x as u32, y as u32).0[0],
    );

    let grids = prepared.detect_grids();
    debug!(grids = grids.len(), "scanned image");
    let grid = grids
        .first()
        .ok_or_else(|| ClientError::QrDecode("No QR code found in image".to_string()))?;

    let (_, content) = grid
        .decode()
        .map_err(|err| ClientError::QrDecode(format!("QR code could not be read: {}", err)))?;
    Ok(content)
}

/// Validates tickets for one bus.
#[derive(Debug, Clone, Default)]
pub struct Scanner {
    bus_id: Option<String>,
}

impl Scanner {
    pub fn new(bus_id: Option<String>) -> Self {
        Self { bus_id }
    }

    pub fn select_bus(&mut self, bus_id: impl Into<String>) {
        self.bus_id = Some(bus_id.into());
    }

    pub fn bus_id(&self) -> Option<&str> {
        self.bus_id.as_deref()
    }

    fn selected_bus(&self) -> ClientResult<&str> {
        self.bus_id
            .as_deref()
            .map(str::trim)
            .filter(|bus| !bus.is_empty())
            .ok_or_else(|| ClientError::Selection("Please select a bus first".to_string()))
    }

    /// Builds the scan request, enforcing the local preconditions.
    pub fn request(&self, input: &str) -> ClientResult<ScanRequest> {
        let bus_id = self.selected_bus()?;

        let input = input.trim();
        if input.is_empty() {
            return Err(ClientError::Selection(
                "Please enter or scan QR code".to_string(),
            ));
        }

        Ok(ScanRequest {
            qr_reference: reference_from_scan(input).unwrap_or_else(|| input.to_string()),
            bus_id: bus_id.to_string(),
        })
    }

    pub async fn validate(&self, client: &ApiClient, input: &str) -> ClientResult<ScanResponse> {
        let request = self.request(input)?;
        let response = client.scan(&request).await?;
        info!(success = response.success, message = %response.message, "scan result");
        Ok(response)
    }

    pub async fn validate_image(
        &self,
        client: &ApiClient,
        image_bytes: &[u8],
    ) -> ClientResult<ScanResponse> {
        self.selected_bus()?;
        let text = decode_qr(image_bytes)?;
        self.validate(client, &text).await
    }
}
