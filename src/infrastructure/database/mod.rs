pub mod entities;
pub mod migrator;
pub mod repositories;

pub use repositories::UserRepository;

use sea_orm::{ConnectOptions, Database, DatabaseConnection};
use tracing::info;
use url::Url;

/// Database configuration
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    /// Database URL (e.g., "sqlite://./users.db?mode=rwc")
    pub url: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: "sqlite://./users.db?mode=rwc".to_string(),
        }
    }
}

impl DatabaseConfig {
    /// The URL with its password masked, safe to log.
    pub fn redacted_url(&self) -> String {
        redact_url(&self.url)
    }
}

fn redact_url(raw: &str) -> String {
    match Url::parse(raw) {
        Ok(url) if url.password().is_none() => raw.to_string(),
        Ok(mut url) => {
            // Only fails for URLs without a host, which carry no password
            let _ = url.set_password(Some("***"));
            url.to_string()
        }
        Err(_) => "<unparseable database url>".to_string(),
    }
}

/// Initialize database connection
pub async fn init_database(config: &DatabaseConfig) -> Result<DatabaseConnection, sea_orm::DbErr> {
    info!("Connecting to database: {}", config.redacted_url());
    let mut opts = ConnectOptions::new(config.url.clone());
    opts.sqlx_logging(false);
    // Each pooled connection to an in-memory SQLite database is a separate database
    if config.url.contains(":memory:") {
        opts.max_connections(1);
    }
    let db = Database::connect(opts).await?;
    info!("Database connected successfully");
    Ok(db)
}
