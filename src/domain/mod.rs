//! Domain layer
//!
//! Contains the User entity, its input payload, the repository port
//! consumed by the HTTP handlers, and domain-level errors.

pub mod error;
pub mod user;

pub use error::{DomainError, DomainResult};
pub use user::{User, UserPayload, UserRepositoryInterface};
