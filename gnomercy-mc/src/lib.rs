//! gnomercy-mc library interface
//!
//! Exposes the application state and router for the binary and for
//! integration tests.

pub mod api;
pub mod catalog;
pub mod config;
pub mod error;
pub mod seed;
pub mod services;

pub use crate::error::{ApiError, ApiResult};

use axum::extract::DefaultBodyLimit;
use axum::routing::get;
use axum::Router;
use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use std::sync::Arc;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use gnomercy_common::config::TomlConfig;
use gnomercy_common::events::EventBus;

use crate::catalog::watch::CatalogWatcher;
use crate::services::identity::IdentityProvider;
use crate::services::media::MediaStore;

/// Maximum request body size, sized for cover image uploads
const MAX_BODY_BYTES: usize = 8 * 1024 * 1024;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool
    pub db: SqlitePool,
    /// Event bus for catalog change notification
    pub bus: EventBus,
    /// Filesystem image store
    pub media: MediaStore,
    /// Identity token verifier
    pub identity: Arc<dyn IdentityProvider>,
    /// TOML config snapshot, the lowest tier of secret resolution
    pub toml_config: TomlConfig,
    /// Service startup timestamp for uptime tracking
    pub startup_time: DateTime<Utc>,
}

impl AppState {
    pub fn new(
        db: SqlitePool,
        bus: EventBus,
        media: MediaStore,
        identity: Arc<dyn IdentityProvider>,
        toml_config: TomlConfig,
    ) -> Self {
        Self {
            db,
            bus,
            media,
            identity,
            toml_config,
            startup_time: Utc::now(),
        }
    }

    /// Continuous-read spawner bound to this state's database and bus
    pub fn watcher(&self) -> CatalogWatcher {
        CatalogWatcher::new(self.db.clone(), self.bus.clone())
    }
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    let images = ServeDir::new(state.media.root());

    Router::new()
        .merge(api::module_routes())
        .merge(api::review_routes())
        .merge(api::image_routes())
        .merge(api::summary_routes())
        .merge(api::auth_routes())
        .merge(api::seed_routes())
        .merge(api::health_routes())
        .route("/api/modules/events", get(api::sse::listing_events))
        .route("/api/modules/:id/events", get(api::sse::module_events))
        .route(
            "/api/modules/:id/reviews/events",
            get(api::sse::review_events),
        )
        .nest_service("/images", images)
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
