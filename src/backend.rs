//! HTTP boundary: the request extractor, the demo handlers and their router.
pub mod handlers;
pub mod inputs;
pub mod router;
