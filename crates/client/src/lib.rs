//! # Ulendo Client
//!
//! Everything a front end needs to talk to the booking service: the HTTP
//! client, the persisted session, seat selection, booking and cancellation,
//! ticket rendering, QR scanning for conductors and per-role dashboards.

pub mod booking_flow;
pub mod client;
pub mod config;
pub mod dashboard;
pub mod error;
pub mod scanner;
pub mod seat_picker;
pub mod session;
pub mod ticket;

pub use client::ApiClient;
pub use error::{ClientError, ClientResult};
pub use session::{Session, SessionStore};
