//! One-shot catalog reads and module persistence
//!
//! Every read converts rows into in-memory values (typed enums, UTC
//! timestamps). Writes emit a [`CatalogEvent`] after the statement or
//! transaction commits so continuous readers pick the change up.

use chrono::{DateTime, Utc};
use gnomercy_common::db::models::{Module, NewModule, Review};
use gnomercy_common::error::{Error, Result};
use gnomercy_common::events::{CatalogEvent, EventBus};
use gnomercy_common::{time, uuid_utils};
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};
use tracing::{debug, info};
use uuid::Uuid;

use super::filter::CompiledListing;

const MODULE_COLUMNS: &str = "module_id, name, genre, players, difficulty, description, photo, \
                              num_ratings, sum_rating, avg_rating, created_at";

const REVIEW_COLUMNS: &str = "review_id, module_id, rating, text, user_id, created_at";

/// Execute a compiled listing query, returning the full matching set
///
/// No pagination: every matching module comes back in one response, in
/// query order.
pub async fn list_modules(pool: &SqlitePool, compiled: &CompiledListing) -> Result<Vec<Module>> {
    let sql = format!(
        "SELECT {MODULE_COLUMNS} FROM modules{} ORDER BY {}",
        compiled.where_clause(),
        compiled.order_clause()
    );

    let mut query = sqlx::query(&sql);
    for (_, value) in &compiled.predicates {
        query = query.bind(value);
    }

    let rows = query.fetch_all(pool).await?;
    debug!(matched = rows.len(), "Listing query executed");
    rows.iter().map(module_from_row).collect()
}

/// Fetch a single module by id
pub async fn get_module(pool: &SqlitePool, module_id: Uuid) -> Result<Option<Module>> {
    let sql = format!("SELECT {MODULE_COLUMNS} FROM modules WHERE module_id = ?");
    let row = sqlx::query(&sql)
        .bind(module_id.to_string())
        .fetch_optional(pool)
        .await?;
    row.as_ref().map(module_from_row).transpose()
}

/// Reviews for one module, most recent first
pub async fn list_reviews(pool: &SqlitePool, module_id: Uuid) -> Result<Vec<Review>> {
    let sql = format!(
        "SELECT {REVIEW_COLUMNS} FROM reviews
         WHERE module_id = ?
         ORDER BY created_at DESC, review_id ASC"
    );
    let rows = sqlx::query(&sql)
        .bind(module_id.to_string())
        .fetch_all(pool)
        .await?;
    rows.iter().map(review_from_row).collect()
}

/// Create a module with zero rating statistics
pub async fn create_module(pool: &SqlitePool, bus: &EventBus, new: &NewModule) -> Result<Module> {
    new.validate()?;

    let module_id = uuid_utils::generate();
    let created_at = time::now();

    sqlx::query(
        "INSERT INTO modules (module_id, name, genre, players, difficulty, description, photo,
                              num_ratings, sum_rating, avg_rating, created_at)
         VALUES (?, ?, ?, ?, ?, ?, ?, 0, 0, 0.0, ?)",
    )
    .bind(module_id.to_string())
    .bind(&new.name)
    .bind(new.genre.as_str())
    .bind(new.players.as_str())
    .bind(new.difficulty)
    .bind(&new.description)
    .bind(&new.photo)
    .bind(created_at)
    .execute(pool)
    .await?;

    info!(module_id = %module_id, name = %new.name, "Created module");
    bus.emit_lossy(CatalogEvent::ModuleCreated {
        module_id,
        timestamp: created_at,
    });

    Ok(Module {
        module_id,
        name: new.name.clone(),
        genre: new.genre,
        players: new.players,
        difficulty: new.difficulty,
        description: new.description.clone(),
        photo: new.photo.clone(),
        num_ratings: 0,
        sum_rating: 0,
        avg_rating: 0.0,
        created_at,
    })
}

/// Persist an uploaded cover image URL onto the module record
pub async fn update_module_photo(
    pool: &SqlitePool,
    bus: &EventBus,
    module_id: Uuid,
    photo: &str,
) -> Result<()> {
    let result = sqlx::query("UPDATE modules SET photo = ? WHERE module_id = ?")
        .bind(photo)
        .bind(module_id.to_string())
        .execute(pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(Error::NotFound(format!("Module {module_id} not found")));
    }

    debug!(module_id = %module_id, photo, "Updated module photo");
    bus.emit_lossy(CatalogEvent::ModuleUpdated {
        module_id,
        timestamp: time::now(),
    });
    Ok(())
}

/// Insert a pre-generated module together with its review history
///
/// The seeding path writes historical review timestamps and precomputed
/// statistics directly; the generator keeps the statistics consistent with
/// the reviews, and the single transaction keeps readers from ever seeing
/// them apart.
pub async fn insert_seeded_module(
    pool: &SqlitePool,
    bus: &EventBus,
    module: &Module,
    reviews: &[Review],
) -> Result<()> {
    let mut tx = pool.begin().await?;

    sqlx::query(
        "INSERT INTO modules (module_id, name, genre, players, difficulty, description, photo,
                              num_ratings, sum_rating, avg_rating, created_at)
         VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(module.module_id.to_string())
    .bind(&module.name)
    .bind(module.genre.as_str())
    .bind(module.players.as_str())
    .bind(module.difficulty)
    .bind(&module.description)
    .bind(&module.photo)
    .bind(module.num_ratings)
    .bind(module.sum_rating)
    .bind(module.avg_rating)
    .bind(module.created_at)
    .execute(&mut *tx)
    .await?;

    for review in reviews {
        sqlx::query(
            "INSERT INTO reviews (review_id, module_id, rating, text, user_id, created_at)
             VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(review.review_id.to_string())
        .bind(review.module_id.to_string())
        .bind(review.rating)
        .bind(&review.text)
        .bind(&review.user_id)
        .bind(review.created_at)
        .execute(&mut *tx)
        .await?;
    }

    tx.commit().await?;

    debug!(module_id = %module.module_id, reviews = reviews.len(), "Seeded module");
    bus.emit_lossy(CatalogEvent::ModuleCreated {
        module_id: module.module_id,
        timestamp: time::now(),
    });
    Ok(())
}

fn module_from_row(row: &SqliteRow) -> Result<Module> {
    let module_id: String = row.try_get("module_id")?;
    let genre: String = row.try_get("genre")?;
    let players: String = row.try_get("players")?;
    let created_at: DateTime<Utc> = row.try_get("created_at")?;

    Ok(Module {
        module_id: uuid_utils::parse(&module_id)?,
        name: row.try_get("name")?,
        genre: genre.parse()?,
        players: players.parse()?,
        difficulty: row.try_get("difficulty")?,
        description: row.try_get("description")?,
        photo: row.try_get("photo")?,
        num_ratings: row.try_get("num_ratings")?,
        sum_rating: row.try_get("sum_rating")?,
        avg_rating: row.try_get("avg_rating")?,
        created_at,
    })
}

fn review_from_row(row: &SqliteRow) -> Result<Review> {
    let review_id: String = row.try_get("review_id")?;
    let module_id: String = row.try_get("module_id")?;
    let created_at: DateTime<Utc> = row.try_get("created_at")?;

    Ok(Review {
        review_id: uuid_utils::parse(&review_id)?,
        module_id: uuid_utils::parse(&module_id)?,
        rating: row.try_get("rating")?,
        text: row.try_get("text")?,
        user_id: row.try_get("user_id")?,
        created_at,
    })
}
