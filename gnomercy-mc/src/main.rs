//! Gnomercy Module Catalog (gnomercy-mc) - Main entry point
//!
//! Serves the scenario module catalog: filtered listings, module details,
//! transactional review aggregation, live SSE updates, cover image
//! uploads, and AI review summaries.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tokio::signal;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use gnomercy_common::config::{self, TomlConfig};
use gnomercy_common::db::init_database;
use gnomercy_common::events::EventBus;

use gnomercy_mc::services::identity::{
    HttpIdentityProvider, IdentityProvider, UnconfiguredIdentityProvider,
};
use gnomercy_mc::services::media::MediaStore;
use gnomercy_mc::{build_router, seed, AppState};

/// Command-line arguments for gnomercy-mc
#[derive(Parser, Debug)]
#[command(name = "gnomercy-mc")]
#[command(about = "Module catalog microservice for Gnomercy")]
#[command(version)]
struct Args {
    /// Port to listen on
    #[arg(short, long, default_value = "5730", env = "GNOMERCY_MC_PORT")]
    port: u16,

    /// Root folder for the database and stored images
    #[arg(short, long, env = "GNOMERCY_ROOT_FOLDER")]
    root_folder: Option<PathBuf>,

    /// Identity service base URL (falls back to env, then TOML config)
    #[arg(long)]
    identity_url: Option<String>,

    /// Seed sample modules on startup when the catalog is empty
    #[arg(long)]
    seed: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "gnomercy_mc=info,gnomercy_common=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = Args::parse();

    info!("Starting Gnomercy Module Catalog on port {}", args.port);
    info!(
        "Version: {} ({} {})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP")
    );

    // Load TOML config, the lowest configuration tier
    let toml_config = TomlConfig::load().context("Failed to load TOML config")?;

    // Resolve the root folder and prepare its layout
    let root_folder = config::resolve_root_folder(args.root_folder.as_deref(), &toml_config);
    let db_path = config::database_path(&root_folder);
    let images_path = config::images_path(&root_folder);
    info!("Database: {}", db_path.display());
    info!("Images: {}", images_path.display());

    let db = init_database(&db_path)
        .await
        .context("Failed to initialize database")?;
    info!("Database connection established");

    tokio::fs::create_dir_all(&images_path)
        .await
        .context("Failed to create images directory")?;
    let media = MediaStore::new(images_path);

    let bus = EventBus::new(100);
    info!("Event bus initialized");

    let identity: Arc<dyn IdentityProvider> =
        match gnomercy_mc::config::resolve_identity_url(args.identity_url.as_deref(), &toml_config)
        {
            Some(url) => Arc::new(HttpIdentityProvider::new(url)?),
            None => Arc::new(UnconfiguredIdentityProvider),
        };

    let state = AppState::new(db, bus, media, identity, toml_config);

    if args.seed {
        let seeded = seed::seed_if_empty(&state.db, &state.bus)
            .await
            .context("Failed to seed sample catalog")?;
        if seeded > 0 {
            info!("Seeded {} sample modules", seeded);
        }
    }

    let app = build_router(state);

    let addr = SocketAddr::from(([127, 0, 0, 1], args.port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .context("Failed to bind to address")?;
    info!("Listening on http://{}", addr);
    info!("Health check: http://{}/health", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server shutdown complete");
    Ok(())
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, shutting down");
        }
        _ = terminate => {
            info!("Received terminate signal, shutting down");
        }
    }
}
