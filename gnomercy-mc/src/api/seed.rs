//! Sample data seeding endpoint

use axum::{extract::State, routing::post, Json, Router};
use serde::{Deserialize, Serialize};
use tracing::info;

use gnomercy_common::db::settings;

use crate::error::{ApiError, ApiResult};
use crate::seed;
use crate::AppState;

const MAX_SEED_COUNT: i64 = 100;

/// POST /api/seed request
#[derive(Debug, Default, Deserialize)]
pub struct SeedRequest {
    #[serde(default)]
    pub count: Option<i64>,
}

/// POST /api/seed response
#[derive(Debug, Serialize)]
pub struct SeedResponse {
    pub status: String,
    pub modules_created: usize,
}

/// POST /api/seed
///
/// Adds random sample modules with review histories. Without a count the
/// configured `seed_module_count` setting applies.
pub async fn seed_sample_catalog(
    State(state): State<AppState>,
    request: Option<Json<SeedRequest>>,
) -> ApiResult<Json<SeedResponse>> {
    let requested = request.and_then(|Json(r)| r.count);
    let count = match requested {
        Some(n) if (1..=MAX_SEED_COUNT).contains(&n) => n as usize,
        Some(n) => {
            return Err(ApiError::BadRequest(format!(
                "Seed count must be between 1 and {MAX_SEED_COUNT}, got {n}"
            )))
        }
        None => {
            settings::get_setting_i64(&state.db, "seed_module_count", seed::DEFAULT_MODULE_COUNT)
                .await? as usize
        }
    };

    let modules = seed::seed_catalog(&state.db, &state.bus, count).await?;
    info!(count = modules.len(), "Sample catalog seeded via API");

    Ok(Json(SeedResponse {
        status: "seeded".to_string(),
        modules_created: modules.len(),
    }))
}

/// Build seeding routes
pub fn seed_routes() -> Router<AppState> {
    Router::new().route("/api/seed", post(seed_sample_catalog))
}
