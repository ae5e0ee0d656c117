//! Configuration resolution for gnomercy-mc
//!
//! Secrets and service endpoints resolve through multiple tiers with
//! Database → ENV → TOML priority. The database settings table is
//! authoritative so a running deployment can be reconfigured without
//! touching files.

use gnomercy_common::config::TomlConfig;
use gnomercy_common::db::settings;
use gnomercy_common::{Error, Result};
use sqlx::SqlitePool;
use tracing::{info, warn};

pub const GEMINI_API_KEY_ENV: &str = "GNOMERCY_GEMINI_API_KEY";
pub const GEMINI_API_KEY_SETTING: &str = "gemini_api_key";
pub const IDENTITY_URL_ENV: &str = "GNOMERCY_IDENTITY_URL";

/// Resolve the Gemini API key from 3-tier configuration
///
/// Priority: Database → ENV → TOML
pub async fn resolve_gemini_api_key(db: &SqlitePool, toml_config: &TomlConfig) -> Result<String> {
    let mut sources = Vec::new();

    let db_key = settings::get_setting(db, GEMINI_API_KEY_SETTING).await?;
    if let Some(key) = &db_key {
        if is_valid_key(key) {
            sources.push("database");
        }
    }

    let env_key = std::env::var(GEMINI_API_KEY_ENV).ok();
    if let Some(key) = &env_key {
        if is_valid_key(key) {
            sources.push("environment");
        }
    }

    let toml_key = toml_config.gemini_api_key.as_ref();
    if let Some(key) = toml_key {
        if is_valid_key(key) {
            sources.push("TOML");
        }
    }

    if sources.len() > 1 {
        warn!(
            "Gemini API key found in multiple sources: {}. Using database (highest priority).",
            sources.join(", ")
        );
    }

    if let Some(key) = db_key {
        if is_valid_key(&key) {
            info!("Gemini API key loaded from database");
            return Ok(key);
        }
    }

    if let Some(key) = env_key {
        if is_valid_key(&key) {
            info!("Gemini API key loaded from environment variable");
            return Ok(key);
        }
    }

    if let Some(key) = toml_key {
        if is_valid_key(key) {
            info!("Gemini API key loaded from TOML config");
            return Ok(key.clone());
        }
    }

    Err(Error::Config(
        "Gemini API key not configured. Please configure using one of:\n\
         1. Database: settings table, key 'gemini_api_key'\n\
         2. Environment: GNOMERCY_GEMINI_API_KEY=your-key-here\n\
         3. TOML config: ~/.config/gnomercy/gnomercy-mc.toml (gemini_api_key = \"your-key\")\n\
         \n\
         Obtain API key at: https://aistudio.google.com/apikey"
            .to_string(),
    ))
}

/// Validate an API key (non-empty, non-whitespace)
pub fn is_valid_key(key: &str) -> bool {
    !key.trim().is_empty()
}

/// Resolve the identity service base URL
///
/// Priority: CLI → ENV → TOML. Absent everywhere means the deployment runs
/// without sign-in.
pub fn resolve_identity_url(cli_arg: Option<&str>, toml_config: &TomlConfig) -> Option<String> {
    if let Some(url) = cli_arg {
        if !url.trim().is_empty() {
            info!(url = %url, "Identity service URL from command line");
            return Some(url.to_string());
        }
    }

    if let Ok(url) = std::env::var(IDENTITY_URL_ENV) {
        if !url.trim().is_empty() {
            info!(url = %url, "Identity service URL from environment variable");
            return Some(url);
        }
    }

    if let Some(url) = &toml_config.identity_url {
        if !url.trim().is_empty() {
            info!(url = %url, "Identity service URL from TOML config");
            return Some(url.clone());
        }
    }

    info!("No identity service configured, sign-in is disabled");
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use gnomercy_common::db::init::init_memory_database;
    use serial_test::serial;

    fn toml_with_key(key: Option<&str>) -> TomlConfig {
        TomlConfig {
            root_folder: None,
            gemini_api_key: key.map(str::to_string),
            identity_url: None,
        }
    }

    #[tokio::test]
    #[serial]
    async fn test_database_key_wins() {
        let pool = init_memory_database().await.unwrap();
        settings::set_setting(&pool, GEMINI_API_KEY_SETTING, "db-key")
            .await
            .unwrap();
        std::env::set_var(GEMINI_API_KEY_ENV, "env-key");

        let key = resolve_gemini_api_key(&pool, &toml_with_key(Some("toml-key")))
            .await
            .unwrap();
        assert_eq!(key, "db-key");

        std::env::remove_var(GEMINI_API_KEY_ENV);
    }

    #[tokio::test]
    #[serial]
    async fn test_env_key_beats_toml() {
        let pool = init_memory_database().await.unwrap();
        std::env::set_var(GEMINI_API_KEY_ENV, "env-key");

        let key = resolve_gemini_api_key(&pool, &toml_with_key(Some("toml-key")))
            .await
            .unwrap();
        assert_eq!(key, "env-key");

        std::env::remove_var(GEMINI_API_KEY_ENV);
    }

    #[tokio::test]
    #[serial]
    async fn test_toml_key_as_fallback() {
        let pool = init_memory_database().await.unwrap();
        std::env::remove_var(GEMINI_API_KEY_ENV);

        let key = resolve_gemini_api_key(&pool, &toml_with_key(Some("toml-key")))
            .await
            .unwrap();
        assert_eq!(key, "toml-key");
    }

    #[tokio::test]
    #[serial]
    async fn test_missing_key_names_every_tier() {
        let pool = init_memory_database().await.unwrap();
        std::env::remove_var(GEMINI_API_KEY_ENV);

        let err = resolve_gemini_api_key(&pool, &toml_with_key(None))
            .await
            .unwrap_err();
        let message = err.to_string();
        assert!(message.contains("GNOMERCY_GEMINI_API_KEY"));
        assert!(message.contains("gemini_api_key"));
    }

    #[test]
    fn test_is_valid_key() {
        assert!(is_valid_key("abc"));
        assert!(!is_valid_key(""));
        assert!(!is_valid_key("   "));
    }

    #[test]
    #[serial]
    fn test_identity_url_priority() {
        std::env::set_var(IDENTITY_URL_ENV, "http://env.example");
        let toml = TomlConfig {
            root_folder: None,
            gemini_api_key: None,
            identity_url: Some("http://toml.example".to_string()),
        };

        assert_eq!(
            resolve_identity_url(Some("http://cli.example"), &toml).as_deref(),
            Some("http://cli.example")
        );
        assert_eq!(
            resolve_identity_url(None, &toml).as_deref(),
            Some("http://env.example")
        );

        std::env::remove_var(IDENTITY_URL_ENV);
        assert_eq!(
            resolve_identity_url(None, &toml).as_deref(),
            Some("http://toml.example")
        );
        assert_eq!(
            resolve_identity_url(Some("  "), &toml_with_key(None)),
            None
        );
    }
}
