//! HTTP REST API interfaces
//!
//! - `modules`: correlation, metrics, health and user handlers
//! - `error`: failure taxonomy → status code and JSON body
//! - `router`: API router with Swagger documentation

pub mod error;
pub mod modules;
pub mod router;

pub use error::ApiError;
pub use router::create_api_router;
