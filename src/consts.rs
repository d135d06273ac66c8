//! Global constants for the sanitizer and its demo server.

pub const HTTP_PORT: u16 = 8080; // Default port of the demo server.
pub const MAX_BODY_BYTES: usize = 1024 * 1024; // Largest request body the binder will buffer.
pub const DEFAULT_URL_PROTOCOL: &str = "http"; // Protocol added to bare URLs.
pub const MAX_FLOAT_PRECISION: usize = 100; // Highest digit count accepted by `float`.
