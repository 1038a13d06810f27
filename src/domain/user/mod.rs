//! User aggregate
//!
//! Contains the User entity, the write payload, and repository interface.

pub mod model;
pub mod repository;

pub use model::{User, UserPayload};
pub use repository::UserRepositoryInterface;
