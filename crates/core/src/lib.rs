//! # Ulendo Core
//!
//! Domain types shared by the booking server and its clients: schedules,
//! bookings and their status machine, user roles, the seat map, booking
//! references, the cancellation policy and the ticket payload encoded into
//! QR codes.

/// Error types shared across crates
pub mod errors;
/// Wire and domain models
pub mod models;
/// Cancellation window rules
pub mod policy;
/// Booking reference generation and parsing
pub mod reference;
/// Seat availability for a single schedule
pub mod seat_map;
/// Ticket payload and QR rendering
pub mod ticket;
