//! Module catalog endpoints

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use gnomercy_common::db::models::{Module, NewModule};

use crate::api::parse_module_id;
use crate::catalog::filter::ListingFilter;
use crate::catalog::store;
use crate::error::{ApiError, ApiResult};
use crate::AppState;

/// GET /api/modules
///
/// One-shot listing read. The full matching set comes back in one
/// response, filtered and ordered per the query parameters.
pub async fn list_modules(
    State(state): State<AppState>,
    Query(filter): Query<ListingFilter>,
) -> ApiResult<Json<Vec<Module>>> {
    tracing::debug!(?filter, "Listing modules");

    let compiled = filter.compile();
    let modules = store::list_modules(&state.db, &compiled).await?;
    Ok(Json(modules))
}

/// POST /api/modules
pub async fn create_module(
    State(state): State<AppState>,
    Json(new): Json<NewModule>,
) -> ApiResult<(StatusCode, Json<Module>)> {
    let module = store::create_module(&state.db, &state.bus, &new).await?;
    Ok((StatusCode::CREATED, Json(module)))
}

/// GET /api/modules/:id
pub async fn get_module(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<Module>> {
    let module_id = parse_module_id(&id)?;

    match store::get_module(&state.db, module_id).await? {
        Some(module) => Ok(Json(module)),
        None => Err(ApiError::NotFound(format!("Module {module_id} not found"))),
    }
}

/// Build module catalog routes
pub fn module_routes() -> Router<AppState> {
    Router::new()
        .route("/api/modules", get(list_modules).post(create_module))
        .route("/api/modules/:id", get(get_module))
}
