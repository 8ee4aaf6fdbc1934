/// Login, registration and session endpoints
pub mod auth;
/// Booking, ticket and scan endpoints
pub mod booking;
/// Liveness and version endpoints
pub mod health;
/// Schedule search, seat availability and creation endpoints
pub mod schedule;
