//! HTTP API handlers for gnomercy-mc

pub mod auth;
pub mod health;
pub mod images;
pub mod modules;
pub mod reviews;
pub mod seed;
pub mod sse;
pub mod summary;

pub use auth::auth_routes;
pub use health::health_routes;
pub use images::image_routes;
pub use modules::module_routes;
pub use reviews::review_routes;
pub use seed::seed_routes;
pub use summary::summary_routes;

use crate::error::ApiError;
use uuid::Uuid;

/// Parse a module id path segment
pub(crate) fn parse_module_id(id: &str) -> Result<Uuid, ApiError> {
    if id.trim().is_empty() {
        return Err(ApiError::BadRequest(
            "No module ID has been provided.".to_string(),
        ));
    }
    gnomercy_common::uuid_utils::parse(id)
        .map_err(|_| ApiError::BadRequest(format!("Invalid module ID: {id}")))
}
