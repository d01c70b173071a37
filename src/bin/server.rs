//! docshare server
//!
//! Serves the document editor over HTTP. Users are registered with the
//! `docshare user add` command; the server itself has no sign-up page.
//!
//! # Configuration
//!
//! Read from `--config <path>`, else `DOCSHARE_CONFIG` (default:
//! ~/.config/docshare/config.yaml), with environment overrides:
//! - `DOCSHARE_DATABASE_PATH`: SQLite database file
//! - `DOCSHARE_PORT`: Port to listen on (default: 8080)
//! - `DOCSHARE_SESSION_TTL_MINUTES`: Login session lifetime (default: 1440)
//! - `DOCSHARE_SECURE_COOKIES`: Mark the session cookie `Secure`
//!
//! # Config File Format
//!
//! ```yaml
//! database_path: /var/lib/docshare/docshare.db
//! port: 8080
//! session_ttl_minutes: 1440
//! secure_cookies: true
//! ```

use clap::Parser;
use std::net::SocketAddr;
use std::path::PathBuf;
use tokio::signal;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use docshare::config::Config;
use docshare::db::Store;
use docshare::server::{router, AppState};

#[derive(Parser)]
#[command(name = "docshare-server")]
#[command(version)]
#[command(about = "Serve the docshare document editor over HTTP", long_about = None)]
struct Args {
    /// Path to config file
    #[arg(long, short)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "docshare=info,docshare_server=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    if let Err(e) = run(args.config).await {
        tracing::error!("{}", e);
        std::process::exit(1);
    }
}

async fn run(config_path: Option<PathBuf>) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load(config_path)?;

    match &config.config_file {
        Some(path) => tracing::info!("Config file: {}", path.display()),
        None => tracing::info!("No config file found, using defaults"),
    }
    tracing::info!("Database: {}", config.database_path.value.display());
    tracing::info!(
        "Session lifetime: {} minute(s)",
        config.session_ttl_minutes.value
    );

    let store = Store::open(&config.database_path.value).await?;
    let state = AppState::from_config(store, &config);
    let app = router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port.value));
    tracing::info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}

/// Wait for Ctrl-C or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => tracing::info!("Received Ctrl+C, shutting down"),
        _ = terminate => tracing::info!("Received SIGTERM, shutting down"),
    }
}
