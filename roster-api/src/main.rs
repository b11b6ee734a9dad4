//! roster-api - Club roster service
//!
//! Serves the student roster over REST and pushes the full ordered roster to
//! SSE subscribers after every successful create, update or delete.

use anyhow::{Context, Result};
use clap::Parser;
use roster_api::{build_router, cors_layer, AppState, BroadcastCoordinator};
use roster_common::config::{ConfigOverrides, ServerConfig};
use roster_common::db::init_database;
use std::path::PathBuf;
use tokio::signal;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Command-line arguments for roster-api
#[derive(Parser, Debug)]
#[command(name = "roster-api")]
#[command(about = "Club roster service with live roster push")]
#[command(version)]
struct Args {
    /// TOML config file
    #[arg(short, long, env = "ROSTER_CONFIG")]
    config: Option<PathBuf>,

    /// Address to bind
    #[arg(long, env = "ROSTER_HOST")]
    host: Option<String>,

    /// Port to listen on
    #[arg(short, long, env = "ROSTER_PORT")]
    port: Option<u16>,

    /// SQLite database file
    #[arg(short, long, env = "ROSTER_DATABASE")]
    database: Option<PathBuf>,

    /// Email accepted by the admin login
    #[arg(long, env = "ROSTER_ADMIN_EMAIL")]
    admin_email: Option<String>,

    /// Allowed browser origin ("*" for any)
    #[arg(long, env = "ROSTER_CORS_ORIGIN")]
    cors_origin: Option<String>,
}

impl From<Args> for ConfigOverrides {
    fn from(args: Args) -> Self {
        Self {
            config_path: args.config,
            host: args.host,
            port: args.port,
            database_path: args.database,
            admin_email: args.admin_email,
            cors_origin: args.cors_origin,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Resolved before tracing so the TOML log level can seed the filter
    let config = ServerConfig::resolve(&args.into()).context("Failed to load configuration")?;

    let default_filter = format!(
        "roster_api={level},roster_common={level},tower_http={level}",
        level = config.log_level
    );
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!(
        "Starting club roster (roster-api) v{} [{}] built {} ({})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE")
    );

    match &config.config_file {
        Some(path) => info!("Loaded configuration from {}", path.display()),
        None => warn!("No config file found, using defaults"),
    }
    info!("Database path: {}", config.database_path.display());

    let db = init_database(&config.database_path)
        .await
        .with_context(|| format!("Failed to open database {}", config.database_path.display()))?;

    let coordinator = BroadcastCoordinator::new(db.clone(), config.broadcast_capacity);
    let state = AppState::new(db.clone(), coordinator.clone(), config.admin_email.clone());
    let cors = cors_layer(config.cors_origin.as_deref()).context("Invalid CORS configuration")?;
    let app = build_router(state, cors);

    let addr = config.bind_addr();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;
    info!("roster-api listening on http://{}", addr);
    info!("Health check: http://{}/health", addr);

    // SSE streams never end on their own, so the coordinator must close them
    // before graceful shutdown can finish
    let shutdown_coordinator = coordinator.clone();
    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            shutdown_signal().await;
            shutdown_coordinator.shutdown().await;
        })
        .await
        .context("Server error")?;

    coordinator.shutdown().await;
    db.close().await;

    info!("Server shutdown complete");
    Ok(())
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!("Failed to install Ctrl+C handler: {}", e);
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
                warn!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, shutting down");
        },
        _ = terminate => {
            info!("Received terminate signal, shutting down");
        },
    }
}
