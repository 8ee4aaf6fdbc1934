pub mod booking;
pub mod scan;
pub mod schedule;
pub mod user;
