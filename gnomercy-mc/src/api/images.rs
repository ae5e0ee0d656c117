//! Module cover image upload

use axum::{
    extract::{Multipart, Path, State},
    routing::post,
    Json, Router,
};
use serde::Serialize;
use tracing::info;

use gnomercy_common::db::settings;

use crate::api::parse_module_id;
use crate::catalog::store;
use crate::error::{ApiError, ApiResult};
use crate::AppState;

const IMAGE_FIELD: &str = "image";
const DEFAULT_IMAGE_MAX_BYTES: i64 = 5_242_880;

/// POST /api/modules/:id/image response
#[derive(Debug, Serialize)]
pub struct UploadImageResponse {
    /// Public URL the stored image is served under
    pub photo: String,
}

/// POST /api/modules/:id/image
///
/// Multipart upload. Stores the file, then points the module record at
/// the stored copy's public URL.
pub async fn upload_module_image(
    State(state): State<AppState>,
    Path(id): Path<String>,
    mut multipart: Multipart,
) -> ApiResult<Json<UploadImageResponse>> {
    let module_id = parse_module_id(&id)?;

    // Checked up front so a missing module never leaves an orphaned file
    if store::get_module(&state.db, module_id).await?.is_none() {
        return Err(ApiError::NotFound(format!("Module {module_id} not found")));
    }

    let max_bytes =
        settings::get_setting_i64(&state.db, "image_max_bytes", DEFAULT_IMAGE_MAX_BYTES).await?;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::BadRequest(e.to_string()))?
    {
        if field.name() != Some(IMAGE_FIELD) {
            continue;
        }

        let file_name = field.file_name().map(str::to_string).ok_or_else(|| {
            ApiError::BadRequest("A valid image has not been provided.".to_string())
        })?;
        let bytes = field
            .bytes()
            .await
            .map_err(|e| ApiError::BadRequest(e.to_string()))?;

        if bytes.is_empty() {
            return Err(ApiError::BadRequest(
                "A valid image has not been provided.".to_string(),
            ));
        }
        if bytes.len() as i64 > max_bytes {
            return Err(ApiError::BadRequest(format!(
                "Image exceeds the {max_bytes} byte limit"
            )));
        }

        let photo = state
            .media
            .save_module_image(module_id, &file_name, &bytes)
            .await?;
        store::update_module_photo(&state.db, &state.bus, module_id, &photo).await?;

        info!(module_id = %module_id, photo = %photo, "Module image updated");
        return Ok(Json(UploadImageResponse { photo }));
    }

    Err(ApiError::BadRequest(
        "A valid image has not been provided.".to_string(),
    ))
}

/// Build image upload routes
pub fn image_routes() -> Router<AppState> {
    Router::new().route("/api/modules/:id/image", post(upload_module_image))
}
