//! HTTP client for the booking service.
//!
//! Every call is a single request with no retries. Non-2xx answers become
//! [`ClientError::Api`] carrying the server's message unchanged.

use reqwest::{RequestBuilder, Response, StatusCode};
use serde::{Deserialize, de::DeserializeOwned};
use serde_json::Value;
use tracing::debug;
use ulendo_core::models::{
    booking::{Booking, BookingsResponse, CancelBookingResponse, CreateBookingRequest},
    scan::{ScanRequest, ScanResponse},
    schedule::{BookedSeatsResponse, CreateScheduleRequest, Schedule, SearchQuery, SearchResponse},
    user::{AuthResponse, LoginRequest, MessageResponse, RegisterRequest, User},
};
use uuid::Uuid;

use crate::error::{ClientError, ClientResult};
use crate::session::Session;

/// Search results arrive either wrapped with a count or as a bare list.
#[derive(Deserialize)]
#[serde(untagged)]
enum SearchPayload {
    Wrapped(SearchResponse),
    Bare(Vec<Schedule>),
}

#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    session: Option<Session>,
}

impl ApiClient {
    /// `base_url` is the API root, e.g. `http://localhost:3000/api`.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            session: None,
        }
    }

    pub fn with_session(mut self, session: Option<Session>) -> Self {
        self.session = session;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    pub fn current_user(&self) -> Option<&User> {
        self.session.as_ref().map(|session| &session.user)
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn authed(&self, request: RequestBuilder) -> ClientResult<RequestBuilder> {
        let session = self.session.as_ref().ok_or(ClientError::NotSignedIn)?;
        Ok(request.bearer_auth(&session.token))
    }

    async fn send(&self, request: RequestBuilder) -> ClientResult<Response> {
        let response = request.send().await?;
        let status = response.status();
        debug!(status = status.as_u16(), url = %response.url(), "response");

        if status.is_success() {
            Ok(response)
        } else {
            let body = response.text().await.unwrap_or_default();
            Err(api_error(status, &body))
        }
    }

    async fn send_json<T: DeserializeOwned>(&self, request: RequestBuilder) -> ClientResult<T> {
        let body = self.send(request).await?.text().await?;
        serde_json::from_str(&body).map_err(|err| ClientError::Decode(err.to_string()))
    }

    // Schedules

    pub async fn search_schedules(&self, query: &SearchQuery) -> ClientResult<Vec<Schedule>> {
        let request = self.http.get(self.url("/search/schedules")).query(query);
        Ok(match self.send_json(request).await? {
            SearchPayload::Wrapped(response) => response.schedules,
            SearchPayload::Bare(schedules) => schedules,
        })
    }

    pub async fn booked_seats(&self, schedule_id: Uuid) -> ClientResult<BookedSeatsResponse> {
        let request = self
            .http
            .get(self.url(&format!("/schedules/{}/booked-seats", schedule_id)));
        self.send_json(request).await
    }

    pub async fn create_schedule(&self, payload: &CreateScheduleRequest) -> ClientResult<Schedule> {
        let request = self.authed(self.http.post(self.url("/schedules")).json(payload))?;
        self.send_json(request).await
    }

    // Bookings

    pub async fn book(&self, payload: &CreateBookingRequest) -> ClientResult<Booking> {
        let request = self.authed(self.http.post(self.url("/bookings/book")).json(payload))?;
        self.send_json(request).await
    }

    pub async fn bookings(&self) -> ClientResult<Vec<Booking>> {
        let request = self.authed(self.http.get(self.url("/bookings/get")))?;
        let response: BookingsResponse = self.send_json(request).await?;
        Ok(response.bookings)
    }

    pub async fn cancel_booking(&self, booking_id: Uuid) -> ClientResult<CancelBookingResponse> {
        let request = self.authed(
            self.http
                .post(self.url(&format!("/bookings/cancel/{}", booking_id))),
        )?;
        self.send_json(request).await
    }

    /// PNG bytes of the ticket QR code.
    pub async fn ticket_png(&self, booking_id: Uuid) -> ClientResult<Vec<u8>> {
        let request = self.authed(
            self.http
                .get(self.url(&format!("/bookings/qr-code/{}", booking_id))),
        )?;
        let bytes = self.send(request).await?.bytes().await?;
        Ok(bytes.to_vec())
    }

    pub async fn scan(&self, payload: &ScanRequest) -> ClientResult<ScanResponse> {
        let request = self.authed(self.http.post(self.url("/bookings/scan-qr")).json(payload))?;
        self.send_json(request).await
    }

    // Accounts

    /// Registers and adopts the new session.
    pub async fn register(&mut self, payload: &RegisterRequest) -> ClientResult<Session> {
        let request = self.http.post(self.url("/auth/register")).json(payload);
        let auth: AuthResponse = self.send_json(request).await?;
        Ok(self.adopt(auth))
    }

    /// Signs in and adopts the new session.
    pub async fn login(&mut self, email: &str, password: &str) -> ClientResult<Session> {
        let payload = LoginRequest {
            email: email.to_string(),
            password: password.to_string(),
        };
        let request = self.http.post(self.url("/auth/login")).json(&payload);
        let auth: AuthResponse = self.send_json(request).await?;
        Ok(self.adopt(auth))
    }

    /// Ends the session on the server and forgets it locally.
    pub async fn logout(&mut self) -> ClientResult<MessageResponse> {
        let request = self.authed(self.http.post(self.url("/auth/logout")))?;
        let response = self.send_json(request).await;
        self.session = None;
        response
    }

    pub async fn whoami(&self) -> ClientResult<User> {
        let request = self.authed(self.http.get(self.url("/auth/whoami")))?;
        self.send_json(request).await
    }

    fn adopt(&mut self, auth: AuthResponse) -> Session {
        let session = Session::from(auth);
        self.session = Some(session.clone());
        session
    }
}

/// Builds the user-facing error for a failed response.
///
/// Prefers the `error` or `message` field of a JSON body, then the raw body,
/// then the status text.
pub fn api_error(status: StatusCode, body: &str) -> ClientError {
    let from_json = serde_json::from_str::<Value>(body).ok().and_then(|value| {
        ["error", "message"]
            .iter()
            .find_map(|key| value.get(key).and_then(Value::as_str).map(str::to_string))
    });

    let message = from_json
        .or_else(|| {
            let body = body.trim();
            (!body.is_empty()).then(|| body.to_string())
        })
        .unwrap_or_else(|| {
            status
                .canonical_reason()
                .unwrap_or("Request failed")
                .to_string()
        });

    ClientError::Api {
        status: status.as_u16(),
        message,
    }
}
