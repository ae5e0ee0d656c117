//! Review endpoints

use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};

use gnomercy_common::db::models::{NewReview, Review};

use crate::api::{auth, parse_module_id};
use crate::catalog::reviews::{self, RatingStats};
use crate::catalog::store;
use crate::error::{ApiError, ApiResult};
use crate::AppState;

const ANONYMOUS_USER: &str = "Anonymous";

/// POST /api/modules/:id/reviews request
///
/// The attributed user comes from the session when one is present; the
/// body's `user_id` is only a fallback for anonymous deployments.
#[derive(Debug, Deserialize)]
pub struct SubmitReviewRequest {
    pub rating: i64,
    pub text: String,
    #[serde(default)]
    pub user_id: Option<String>,
}

/// POST /api/modules/:id/reviews response
#[derive(Debug, Serialize)]
pub struct SubmitReviewResponse {
    pub review: Review,
    pub stats: RatingStats,
}

/// GET /api/modules/:id/reviews
///
/// Reviews for one module, most recent first. A module without reviews
/// reads as an empty list.
pub async fn list_reviews(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<Vec<Review>>> {
    let module_id = parse_module_id(&id)?;
    let reviews = store::list_reviews(&state.db, module_id).await?;
    Ok(Json(reviews))
}

/// POST /api/modules/:id/reviews
pub async fn submit_review(
    State(state): State<AppState>,
    Path(id): Path<String>,
    headers: HeaderMap,
    request: Option<Json<SubmitReviewRequest>>,
) -> ApiResult<(StatusCode, Json<SubmitReviewResponse>)> {
    let module_id = parse_module_id(&id)?;
    let Some(Json(request)) = request else {
        return Err(ApiError::BadRequest(
            "A valid review has not been provided.".to_string(),
        ));
    };

    let session = auth::session_from_headers(&state, &headers).await?;
    let user_id = session
        .map(|s| s.display_name)
        .or(request.user_id)
        .filter(|u| !u.trim().is_empty())
        .unwrap_or_else(|| ANONYMOUS_USER.to_string());

    let new = NewReview {
        rating: request.rating,
        text: request.text,
        user_id,
    };
    let (review, stats) = reviews::add_review(&state.db, &state.bus, module_id, &new).await?;
    Ok((StatusCode::CREATED, Json(SubmitReviewResponse { review, stats })))
}

/// Build review routes
pub fn review_routes() -> Router<AppState> {
    Router::new().route(
        "/api/modules/:id/reviews",
        get(list_reviews).post(submit_review),
    )
}
