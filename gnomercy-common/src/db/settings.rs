//! Settings table access

use crate::error::Result;
use sqlx::SqlitePool;

/// Read a setting value
pub async fn get_setting(pool: &SqlitePool, key: &str) -> Result<Option<String>> {
    let value: Option<Option<String>> =
        sqlx::query_scalar("SELECT value FROM settings WHERE key = ?")
            .bind(key)
            .fetch_optional(pool)
            .await?;
    Ok(value.flatten())
}

/// Read an integer setting, falling back to `default` when absent or malformed
pub async fn get_setting_i64(pool: &SqlitePool, key: &str, default: i64) -> Result<i64> {
    Ok(get_setting(pool, key)
        .await?
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default))
}

/// Write a setting value, replacing any existing one
pub async fn set_setting(pool: &SqlitePool, key: &str, value: &str) -> Result<()> {
    sqlx::query(
        "INSERT INTO settings (key, value) VALUES (?, ?)
         ON CONFLICT(key) DO UPDATE SET value = excluded.value",
    )
    .bind(key)
    .bind(value)
    .execute(pool)
    .await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::init::init_memory_database;

    #[tokio::test]
    async fn test_get_setting_absent_key() {
        let pool = init_memory_database().await.unwrap();
        assert_eq!(get_setting(&pool, "no_such_key").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_set_and_get_round_trip() {
        let pool = init_memory_database().await.unwrap();
        set_setting(&pool, "example", "one").await.unwrap();
        assert_eq!(
            get_setting(&pool, "example").await.unwrap().as_deref(),
            Some("one")
        );

        set_setting(&pool, "example", "two").await.unwrap();
        assert_eq!(
            get_setting(&pool, "example").await.unwrap().as_deref(),
            Some("two")
        );
    }

    #[tokio::test]
    async fn test_get_setting_i64_fallbacks() {
        let pool = init_memory_database().await.unwrap();
        assert_eq!(get_setting_i64(&pool, "missing", 42).await.unwrap(), 42);

        set_setting(&pool, "numeric", "17").await.unwrap();
        assert_eq!(get_setting_i64(&pool, "numeric", 42).await.unwrap(), 17);

        set_setting(&pool, "garbled", "not-a-number").await.unwrap();
        assert_eq!(get_setting_i64(&pool, "garbled", 42).await.unwrap(), 42);
    }

    #[tokio::test]
    async fn test_defaults_seeded_at_init() {
        let pool = init_memory_database().await.unwrap();
        assert_eq!(
            get_setting_i64(&pool, "session_timeout_seconds", 0)
                .await
                .unwrap(),
            31_536_000
        );
        assert_eq!(
            get_setting(&pool, "gemini_model").await.unwrap().as_deref(),
            Some("gemini-2.0-flash")
        );
    }
}
