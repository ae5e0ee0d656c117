//! Session endpoints
//!
//! Sign-in exchanges an identity token for a server-side session. Only a
//! hash of the session token is stored; the token itself lives in the
//! `__session` cookie and is never written to the database or logs.

use axum::{
    extract::State,
    http::{header::SET_COOKIE, HeaderMap},
    response::AppendHeaders,
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use sqlx::Row;
use tracing::info;

use gnomercy_common::db::settings;
use gnomercy_common::{time, uuid_utils};

use crate::error::{ApiError, ApiResult};
use crate::AppState;

const SESSION_COOKIE: &str = "__session";
const DEFAULT_SESSION_TIMEOUT_SECONDS: i64 = 31_536_000;

/// POST /api/auth/session request
#[derive(Debug, Deserialize)]
pub struct SignInRequest {
    pub token: String,
}

/// Session state response
#[derive(Debug, Serialize)]
pub struct SessionResponse {
    pub signed_in: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
}

/// A resolved, unexpired session
#[derive(Debug, Clone)]
pub(crate) struct SessionRecord {
    pub user_id: String,
    pub display_name: String,
}

fn hash_token(token: &str) -> String {
    format!("{:x}", Sha256::digest(token.as_bytes()))
}

/// Extract a cookie value from request headers
fn cookie_value(headers: &HeaderMap, name: &str) -> Option<String> {
    let header = headers.get(axum::http::header::COOKIE)?.to_str().ok()?;
    header.split(';').find_map(|pair| {
        let (key, value) = pair.trim().split_once('=')?;
        (key == name).then(|| value.to_string())
    })
}

/// Resolve the session carried by the request cookie, if any
///
/// Expired sessions are deleted on sight and read as signed-out.
pub(crate) async fn session_from_headers(
    state: &AppState,
    headers: &HeaderMap,
) -> ApiResult<Option<SessionRecord>> {
    let Some(token) = cookie_value(headers, SESSION_COOKIE) else {
        return Ok(None);
    };
    let token_hash = hash_token(&token);

    let row = sqlx::query("SELECT user_id, display_name, expires_at FROM sessions WHERE token_hash = ?")
        .bind(&token_hash)
        .fetch_optional(&state.db)
        .await?;

    let Some(row) = row else {
        return Ok(None);
    };

    let expires_at: chrono::DateTime<chrono::Utc> = row.try_get("expires_at")?;
    if expires_at <= time::now() {
        sqlx::query("DELETE FROM sessions WHERE token_hash = ?")
            .bind(&token_hash)
            .execute(&state.db)
            .await?;
        return Ok(None);
    }

    Ok(Some(SessionRecord {
        user_id: row.try_get("user_id")?,
        display_name: row.try_get("display_name")?,
    }))
}

/// POST /api/auth/session
///
/// Verify an identity token and open a session.
pub async fn sign_in(
    State(state): State<AppState>,
    Json(request): Json<SignInRequest>,
) -> ApiResult<(AppendHeaders<[(axum::http::HeaderName, String); 1]>, Json<SessionResponse>)> {
    if request.token.trim().is_empty() {
        return Err(ApiError::BadRequest("No token has been provided".to_string()));
    }

    let user = state.identity.verify_token(&request.token).await?;
    let display_name = user.display_name.clone().unwrap_or_else(|| user.user_id.clone());

    let timeout_seconds = settings::get_setting_i64(
        &state.db,
        "session_timeout_seconds",
        DEFAULT_SESSION_TIMEOUT_SECONDS,
    )
    .await?;

    let token = uuid_utils::generate().to_string();
    let now = time::now();
    let expires_at = now + chrono::Duration::seconds(timeout_seconds);

    sqlx::query(
        "INSERT INTO sessions (token_hash, user_id, display_name, created_at, expires_at)
         VALUES (?, ?, ?, ?, ?)",
    )
    .bind(hash_token(&token))
    .bind(&user.user_id)
    .bind(&display_name)
    .bind(now)
    .bind(expires_at)
    .execute(&state.db)
    .await?;

    info!(user_id = %user.user_id, "Session opened");

    let cookie = format!(
        "{SESSION_COOKIE}={token}; Path=/; HttpOnly; SameSite=Lax; Max-Age={timeout_seconds}"
    );
    Ok((
        AppendHeaders([(SET_COOKIE, cookie)]),
        Json(SessionResponse {
            signed_in: true,
            user_id: Some(user.user_id),
            display_name: Some(display_name),
        }),
    ))
}

/// GET /api/auth/session
pub async fn current_session(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> ApiResult<Json<SessionResponse>> {
    let session = session_from_headers(&state, &headers).await?;
    Ok(Json(match session {
        Some(session) => SessionResponse {
            signed_in: true,
            user_id: Some(session.user_id),
            display_name: Some(session.display_name),
        },
        None => SessionResponse {
            signed_in: false,
            user_id: None,
            display_name: None,
        },
    }))
}

/// DELETE /api/auth/session
pub async fn sign_out(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> ApiResult<(AppendHeaders<[(axum::http::HeaderName, String); 1]>, Json<SessionResponse>)> {
    if let Some(token) = cookie_value(&headers, SESSION_COOKIE) {
        sqlx::query("DELETE FROM sessions WHERE token_hash = ?")
            .bind(hash_token(&token))
            .execute(&state.db)
            .await?;
        info!("Session closed");
    }

    let cookie = format!("{SESSION_COOKIE}=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0");
    Ok((
        AppendHeaders([(SET_COOKIE, cookie)]),
        Json(SessionResponse {
            signed_in: false,
            user_id: None,
            display_name: None,
        }),
    ))
}

/// Build session routes
pub fn auth_routes() -> Router<AppState> {
    Router::new().route(
        "/api/auth/session",
        get(current_session).post(sign_in).delete(sign_out),
    )
}
