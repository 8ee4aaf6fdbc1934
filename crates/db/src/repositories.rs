pub mod booking;
pub mod schedule;
pub mod session;
pub mod user;
