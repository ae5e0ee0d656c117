//! Database initialization and schema
//!
//! Creates the catalog schema on first run. `CREATE TABLE IF NOT EXISTS`
//! keeps startup idempotent; there is no migration machinery, the schema is
//! the schema.

use crate::error::Result;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions};
use std::path::Path;
use std::time::Duration;
use tracing::info;

/// How long a connection waits on SQLite's write lock before giving up
///
/// Concurrent review submissions serialize on this lock; the timeout is the
/// storage layer's retry mechanism, applied per connection at open.
const BUSY_TIMEOUT: Duration = Duration::from_millis(5000);

/// Initialize the database, creating the file and schema if needed
///
/// WAL mode keeps readers unblocked while an aggregation transaction holds
/// the write lock. Foreign keys are enforced so review rows cannot outlive
/// or precede their module.
pub async fn init_database(db_path: &Path) -> Result<SqlitePool> {
    if let Some(parent) = db_path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            std::fs::create_dir_all(parent)?;
        }
    }

    info!("Initializing database at {}", db_path.display());

    let options = SqliteConnectOptions::new()
        .filename(db_path)
        .create_if_missing(true)
        .journal_mode(SqliteJournalMode::Wal)
        .busy_timeout(BUSY_TIMEOUT)
        .foreign_keys(true);

    let pool = SqlitePoolOptions::new()
        .max_connections(20)
        .min_connections(1)
        .connect_with(options)
        .await?;

    create_schema(&pool).await?;
    seed_default_settings(&pool).await?;

    Ok(pool)
}

/// In-memory database with the full schema, for tests
///
/// A single connection is mandatory: every in-memory connection is its own
/// database, so the pool must never open a second one or recycle the first.
pub async fn init_memory_database() -> Result<SqlitePool> {
    let options = SqliteConnectOptions::new()
        .filename(":memory:")
        .busy_timeout(BUSY_TIMEOUT)
        .foreign_keys(true);

    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .min_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect_with(options)
        .await?;

    create_schema(&pool).await?;
    seed_default_settings(&pool).await?;

    Ok(pool)
}

/// Create all catalog tables and indexes
pub async fn create_schema(pool: &SqlitePool) -> Result<()> {
    create_modules_table(pool).await?;
    create_reviews_table(pool).await?;
    create_sessions_table(pool).await?;
    create_settings_table(pool).await?;
    Ok(())
}

/// Modules: one row per scenario listing, rating statistics denormalized
///
/// The statistics columns are mutated only by the review aggregation
/// transaction; the CHECK constraints reject anything outside the model.
pub async fn create_modules_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS modules (
            module_id TEXT PRIMARY KEY NOT NULL,
            name TEXT NOT NULL,
            genre TEXT NOT NULL CHECK (genre IN (
                'Action', 'Adventure', 'Comedy', 'Fantasy', 'Noir',
                'Horror', 'Romance', 'Scifi', 'Western'
            )),
            players TEXT NOT NULL CHECK (players IN (
                'One', 'Two', 'Three', 'Four',
                'Five', 'Six', 'Seven', 'Eight'
            )),
            difficulty INTEGER NOT NULL CHECK (difficulty BETWEEN 1 AND 5),
            description TEXT NOT NULL DEFAULT '',
            photo TEXT NOT NULL DEFAULT '',
            num_ratings INTEGER NOT NULL DEFAULT 0 CHECK (num_ratings >= 0),
            sum_rating INTEGER NOT NULL DEFAULT 0 CHECK (sum_rating >= 0),
            avg_rating REAL NOT NULL DEFAULT 0.0,
            created_at TIMESTAMP NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_modules_genre ON modules(genre)")
        .execute(pool)
        .await?;
    sqlx::query("CREATE INDEX IF NOT EXISTS idx_modules_players ON modules(players)")
        .execute(pool)
        .await?;
    sqlx::query("CREATE INDEX IF NOT EXISTS idx_modules_difficulty ON modules(difficulty)")
        .execute(pool)
        .await?;
    sqlx::query("CREATE INDEX IF NOT EXISTS idx_modules_avg_rating ON modules(avg_rating DESC)")
        .execute(pool)
        .await?;
    sqlx::query("CREATE INDEX IF NOT EXISTS idx_modules_num_ratings ON modules(num_ratings DESC)")
        .execute(pool)
        .await?;

    Ok(())
}

/// Reviews: immutable child records scoped under one module
pub async fn create_reviews_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS reviews (
            review_id TEXT PRIMARY KEY NOT NULL,
            module_id TEXT NOT NULL REFERENCES modules(module_id) ON DELETE CASCADE,
            rating INTEGER NOT NULL CHECK (rating BETWEEN 1 AND 5),
            text TEXT NOT NULL CHECK (length(text) > 0),
            user_id TEXT NOT NULL,
            created_at TIMESTAMP NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        "CREATE INDEX IF NOT EXISTS idx_reviews_module_created
         ON reviews(module_id, created_at DESC)",
    )
    .execute(pool)
    .await?;

    Ok(())
}

/// Sessions: verified identity-provider tokens mirrored into cookies
///
/// Only the SHA-256 of the cookie token is stored.
pub async fn create_sessions_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS sessions (
            token_hash TEXT PRIMARY KEY NOT NULL,
            user_id TEXT NOT NULL,
            display_name TEXT NOT NULL DEFAULT '',
            created_at TIMESTAMP NOT NULL,
            expires_at TIMESTAMP NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_sessions_expires ON sessions(expires_at)")
        .execute(pool)
        .await?;

    Ok(())
}

/// Settings: key/value runtime configuration
pub async fn create_settings_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS settings (
            key TEXT PRIMARY KEY NOT NULL,
            value TEXT
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

/// Insert a default setting when the key is absent
///
/// A NULL value left behind by an earlier write also resets to the default.
pub async fn ensure_setting(pool: &SqlitePool, key: &str, default: &str) -> Result<()> {
    sqlx::query("INSERT OR IGNORE INTO settings (key, value) VALUES (?, ?)")
        .bind(key)
        .bind(default)
        .execute(pool)
        .await?;

    sqlx::query("UPDATE settings SET value = ? WHERE key = ? AND value IS NULL")
        .bind(default)
        .bind(key)
        .execute(pool)
        .await?;

    Ok(())
}

async fn seed_default_settings(pool: &SqlitePool) -> Result<()> {
    ensure_setting(pool, "session_timeout_seconds", "31536000").await?;
    ensure_setting(pool, "gemini_model", "gemini-2.0-flash").await?;
    ensure_setting(pool, "seed_module_count", "5").await?;
    ensure_setting(pool, "image_max_bytes", "5242880").await?;
    Ok(())
}
