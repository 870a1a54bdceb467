//! aih-server - AIH billing authorization tracker
//!
//! Serves the record lifecycle, glosa tracking, catalogs and reporting over
//! a REST API backed by a single SQLite file.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tokio::signal;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{error, info};

use aih_common::config::{AppConfig, TomlConfig};
use aih_common::db::init_database;
use aih_server::{build_router, AppState};

/// Command-line arguments for aih-server
#[derive(Parser, Debug)]
#[command(name = "aih-server")]
#[command(about = "AIH billing authorization tracker")]
#[command(version)]
struct Args {
    /// Folder holding aih.db
    #[arg(short, long, env = "AIH_DATA_FOLDER")]
    data_folder: Option<PathBuf>,

    /// Listen address, e.g. 0.0.0.0:5000
    #[arg(short, long, env = "AIH_BIND")]
    bind: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    // Build identification first, before any database work
    info!("Starting aih-server v{}", env!("CARGO_PKG_VERSION"));

    let args = Args::parse();
    let config = AppConfig::resolve(args.data_folder, args.bind, TomlConfig::load_or_default());

    let db_path = config.database_path();
    info!("Database path: {}", db_path.display());

    let pool = init_database(&db_path)
        .await
        .with_context(|| format!("Failed to open database {}", db_path.display()))?;
    info!("✓ Database ready");

    let state = AppState::from_config(pool, &config);
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let listener = tokio::net::TcpListener::bind(&config.bind_addr)
        .await
        .with_context(|| format!("Failed to bind to {}", config.bind_addr))?;
    info!("aih-server listening on http://{}", config.bind_addr);
    info!("Health check: http://{}/health", config.bind_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received Ctrl+C, shutting down"),
        _ = terminate => info!("Received terminate signal, shutting down"),
    }
}
