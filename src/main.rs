//! Users Service: CLI server
//!
//! ```sh
//! # Run with default config (~/.config/users-service/config.toml)
//! users-service
//!
//! # Custom config path and port
//! users-service --config /etc/users-service/config.toml --port 8081
//!
//! # Validate config without starting
//! users-service --check
//! ```

use std::path::PathBuf;

use clap::Parser;
use tracing::{error, info};

use users_service::config::AppConfig;
use users_service::infrastructure::logging;
use users_service::server::{ServerHandle, ServerOptions};

/// HTTP CRUD service for user records.
#[derive(Parser, Debug)]
#[command(name = "users-service", version, about = "HTTP CRUD service for user records")]
struct Cli {
    /// Path to the configuration file (TOML).
    #[arg(short, long, env = "USERS_CONFIG")]
    config: Option<PathBuf>,

    /// Override the REST API listen port.
    #[arg(long)]
    port: Option<u16>,

    /// Override the log level (trace, debug, info, warn, error).
    #[arg(short, long)]
    log_level: Option<String>,

    /// Validate the configuration file and exit without starting the server.
    #[arg(long)]
    check: bool,

    /// Skip database migrations on startup.
    #[arg(long)]
    no_migrate: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // ── Load configuration ─────────────────────────────────────
    let config_path = cli
        .config
        .unwrap_or_else(users_service::default_config_path);

    let (mut config, load_error) = match AppConfig::load(&config_path) {
        Ok(cfg) => (cfg, None),
        Err(e) => (AppConfig::default(), Some(e)),
    };

    if let Some(ref level) = cli.log_level {
        config.logging.level = level.clone();
    }
    if let Some(port) = cli.port {
        config.server.port = port;
    }

    // ── Logging ────────────────────────────────────────────────
    let log_handle = logging::init(&config.logging);
    match load_error {
        None => info!("Configuration loaded from {}", config_path.display()),
        Some(e) => error!("Failed to load config: {}. Using defaults.", e),
    }

    // ── Config validation mode ─────────────────────────────────
    if cli.check {
        info!(
            config_file = %config_path.display(),
            api_address = %config.server.address(),
            database = %config.database_config().redacted_url(),
            log_level = %config.logging.level,
            "Configuration is valid"
        );
        log_handle.shutdown();
        return Ok(());
    }

    // ── Start server ───────────────────────────────────────────
    let handle = match ServerHandle::start(ServerOptions {
        config,
        auto_migrate: !cli.no_migrate,
    })
    .await
    {
        Ok(handle) => handle,
        Err(e) => {
            error!("Startup failed: {}", e);
            log_handle.shutdown();
            return Err(e);
        }
    };

    handle.install_signal_handler();
    info!("🚀 Press Ctrl+C to shutdown gracefully.");

    handle.shutdown_signal().wait().await;
    handle.wait().await;

    log_handle.shutdown();
    Ok(())
}
