//! # Users Service
//!
//! HTTP CRUD service for a single User resource backed by a relational store.
//!
//! ## Architecture
//!
//! - **domain**: User entity, write payload, repository port and errors
//! - **shared**: payload validation and shutdown coordination
//! - **infrastructure**: SeaORM storage, in-memory storage, structured logging
//! - **interfaces**: REST API (correlation middleware, handlers, router)
//! - **server**: process lifecycle

pub mod config;
pub mod domain;
pub mod infrastructure;
pub mod interfaces;
pub mod server;
pub mod shared;

pub use config::{default_config_path, AppConfig};

// Re-export database types for easy access
pub use infrastructure::{init_database, DatabaseConfig, UserRepository};

// Re-export API router
pub use interfaces::http::create_api_router;
