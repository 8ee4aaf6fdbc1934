/// Password hashing, session tokens and the authenticated-user extractor
pub mod auth;
/// Domain error to HTTP response mapping
pub mod error_handling;
/// Body, path and query extractors that reject with JSON errors
pub mod extract;
