//! Infrastructure layer - external concerns

pub mod database;
pub mod logging;
pub mod storage;

pub use database::{init_database, DatabaseConfig, UserRepository};
pub use logging::{LogHandle, LoggingConfig};
pub use storage::InMemoryUserRepository;
