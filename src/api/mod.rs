//! HTTP API.

pub mod handlers;
pub mod rest;

pub use handlers::{ApiState, TranslateRequest, TranslateResponse};
pub use rest::create_router;
