//! Social Network API Server
//!
//! Serves the users/posts/follows REST API and, optionally, the static
//! frontend. Uses SQLite (embedded) for storage.

use anyhow::{Context, Result};
use clap::Parser;
use std::net::SocketAddr;
use tokio::signal;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use social_server::config::{Cli, ServerConfig};
use social_server::storage::Database;
use social_server::{router, AppState};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let config = match ServerConfig::load(&cli) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("[FATAL] Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };

    // RUST_LOG wins over the configured filter
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.log_filter));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    info!(
        "Starting Social Network API v{}",
        env!("CARGO_PKG_VERSION")
    );

    if let Err(e) = run_server(config).await {
        error!("Server failed: {:#}", e);
        std::process::exit(1);
    }
}

async fn run_server(config: ServerConfig) -> Result<()> {
    info!(
        "Config loaded: bind={}, db={}",
        config.bind_address, config.database_path
    );

    let db = Database::open(&config.database_path)
        .await
        .context("Failed to initialize database")?;

    if config.seed_sample_data && db.seed_sample_data().await.context("Failed to seed database")? {
        info!("Empty database populated with sample data");
    }

    if let Some(dir) = &config.static_dir {
        info!("Static files directory: {}", dir.display());
    }

    let app = router(AppState::new(db), config.static_dir.clone());

    let addr: SocketAddr = config
        .bind_address
        .parse()
        .context("Failed to parse bind address")?;

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .context("Failed to bind to address")?;

    info!("Server listening on http://{}", addr);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server shut down");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
        info!("Received Ctrl+C, shutting down");
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
                info!("Received terminate signal, shutting down");
            }
            Err(e) => {
                error!("Failed to install signal handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
