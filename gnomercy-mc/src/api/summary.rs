//! AI review summary endpoint
//!
//! Summarization is best-effort. The endpoint answers 200 with a null
//! summary and an error string whenever the summarizer is unconfigured or
//! fails, so a catalog page never breaks on a collaborator outage. Only a
//! missing module is a real error.

use axum::{
    extract::{Path, State},
    routing::get,
    Json, Router,
};
use serde::Serialize;
use tracing::warn;

use gnomercy_common::db::settings;

use crate::api::parse_module_id;
use crate::catalog::store;
use crate::config;
use crate::error::{ApiError, ApiResult};
use crate::services::summarizer::{SummarizerClient, DEFAULT_BASE_URL, DEFAULT_MODEL};
use crate::AppState;

const SUMMARY_ERROR: &str = "Error summarizing reviews.";

/// GET /api/modules/:id/summary response
#[derive(Debug, Serialize)]
pub struct SummaryResponse {
    pub summary: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

fn unavailable() -> Json<SummaryResponse> {
    Json(SummaryResponse {
        summary: None,
        error: Some(SUMMARY_ERROR.to_string()),
    })
}

/// GET /api/modules/:id/summary
pub async fn module_summary(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<SummaryResponse>> {
    let module_id = parse_module_id(&id)?;

    if store::get_module(&state.db, module_id).await?.is_none() {
        return Err(ApiError::NotFound(format!("Module {module_id} not found")));
    }

    let reviews = store::list_reviews(&state.db, module_id).await?;
    let texts: Vec<String> = reviews.into_iter().map(|r| r.text).collect();

    let api_key = match config::resolve_gemini_api_key(&state.db, &state.toml_config).await {
        Ok(key) => key,
        Err(e) => {
            warn!(module_id = %module_id, error = %e, "Summary unavailable");
            return Ok(unavailable());
        }
    };

    let model = settings::get_setting(&state.db, "gemini_model")
        .await?
        .unwrap_or_else(|| DEFAULT_MODEL.to_string());
    let base_url = settings::get_setting(&state.db, "gemini_base_url")
        .await?
        .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());

    let client = match SummarizerClient::with_base_url(base_url, api_key, model) {
        Ok(client) => client,
        Err(e) => {
            warn!(module_id = %module_id, error = %e, "Summarizer client unavailable");
            return Ok(unavailable());
        }
    };

    match client.summarize_reviews(&texts).await {
        Ok(summary) => Ok(Json(SummaryResponse {
            summary: Some(summary),
            error: None,
        })),
        Err(e) => {
            warn!(module_id = %module_id, error = %e, "Review summarization failed");
            Ok(unavailable())
        }
    }
}

/// Build summary routes
pub fn summary_routes() -> Router<AppState> {
    Router::new().route("/api/modules/:id/summary", get(module_summary))
}
