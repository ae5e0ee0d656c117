//! Identity provider integration
//!
//! Sign-in presents an identity token minted by an external provider. The
//! provider verifies the token and returns the subject it belongs to; the
//! session layer then issues its own session token. With no provider
//! configured every token is rejected and the catalog stays usable
//! anonymously.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;
use std::time::Duration;
use thiserror::Error;

const TOKENINFO_PATH: &str = "/v1/tokeninfo";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Identity verification errors
#[derive(Debug, Error)]
pub enum IdentityError {
    #[error("No identity provider is configured")]
    NotConfigured,

    #[error("Network error: {0}")]
    Network(String),

    #[error("Token was rejected by the identity provider")]
    Rejected,

    #[error("Unexpected identity provider response: {0}")]
    Protocol(String),
}

/// A verified identity, as reported by the provider
#[derive(Debug, Clone, Deserialize)]
pub struct VerifiedUser {
    pub user_id: String,
    #[serde(default)]
    pub display_name: Option<String>,
}

/// Verifies externally minted identity tokens
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    async fn verify_token(&self, token: &str) -> Result<VerifiedUser, IdentityError>;
}

/// HTTP identity provider
///
/// Posts the token to `{base_url}/v1/tokeninfo` and expects a JSON body
/// with `user_id` and an optional `display_name` on success.
pub struct HttpIdentityProvider {
    http_client: reqwest::Client,
    base_url: String,
}

impl HttpIdentityProvider {
    pub fn new(base_url: String) -> Result<Self, IdentityError> {
        let http_client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| IdentityError::Network(e.to_string()))?;

        Ok(Self {
            http_client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }
}

#[async_trait]
impl IdentityProvider for HttpIdentityProvider {
    async fn verify_token(&self, token: &str) -> Result<VerifiedUser, IdentityError> {
        let url = format!("{}{}", self.base_url, TOKENINFO_PATH);

        tracing::debug!(url = %url, "Verifying identity token");

        let response = self
            .http_client
            .post(&url)
            .json(&json!({ "token": token }))
            .send()
            .await
            .map_err(|e| IdentityError::Network(e.to_string()))?;

        let status = response.status();

        if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN {
            return Err(IdentityError::Rejected);
        }

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(IdentityError::Protocol(format!("{status}: {body}")));
        }

        let user: VerifiedUser = response
            .json()
            .await
            .map_err(|e| IdentityError::Protocol(e.to_string()))?;

        if user.user_id.is_empty() {
            return Err(IdentityError::Protocol("empty user_id".to_string()));
        }

        tracing::info!(user_id = %user.user_id, "Identity token verified");
        Ok(user)
    }
}

/// Provider used when no identity service is configured
///
/// Every verification fails with [`IdentityError::NotConfigured`].
pub struct UnconfiguredIdentityProvider;

#[async_trait]
impl IdentityProvider for UnconfiguredIdentityProvider {
    async fn verify_token(&self, _token: &str) -> Result<VerifiedUser, IdentityError> {
        Err(IdentityError::NotConfigured)
    }
}
