//! Review submission and rating aggregation
//!
//! A submitted review and the module's rating statistics change together in
//! one transaction. The statistics update derives the new values from the
//! stored values inside a single UPDATE statement, so concurrent
//! submissions serialize on the row instead of overwriting each other.

use gnomercy_common::db::models::{NewReview, Review};
use gnomercy_common::error::{Error, Result};
use gnomercy_common::events::{CatalogEvent, EventBus};
use gnomercy_common::{time, uuid_utils};
use serde::Serialize;
use sqlx::{Row, SqlitePool};
use tracing::{error, info};
use uuid::Uuid;

/// Rating statistics for one module after an aggregation pass
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RatingStats {
    pub num_ratings: i64,
    pub sum_rating: i64,
    pub avg_rating: f64,
}

/// Validate and record a review, updating the module's statistics
///
/// On any failure the transaction rolls back and the error propagates to
/// the caller after being logged; no partial state is left behind.
pub async fn add_review(
    pool: &SqlitePool,
    bus: &EventBus,
    module_id: Uuid,
    new: &NewReview,
) -> Result<(Review, RatingStats)> {
    new.validate()?;

    match apply(pool, module_id, new).await {
        Ok((review, stats)) => {
            info!(
                module_id = %module_id,
                review_id = %review.review_id,
                rating = review.rating,
                num_ratings = stats.num_ratings,
                "Recorded review"
            );
            bus.emit_lossy(CatalogEvent::ReviewAdded {
                module_id,
                review_id: review.review_id,
                rating: review.rating,
                timestamp: review.created_at,
            });
            Ok((review, stats))
        }
        Err(e) => {
            error!(module_id = %module_id, error = %e, "Review submission failed");
            Err(e)
        }
    }
}

async fn apply(
    pool: &SqlitePool,
    module_id: Uuid,
    new: &NewReview,
) -> Result<(Review, RatingStats)> {
    let review_id = uuid_utils::generate();
    let created_at = time::now();

    let mut tx = pool.begin().await?;

    // Runs first so the transaction takes the write lock before touching
    // anything else. Column references on the right-hand side read the
    // stored row, with absent statistics counting as zero.
    let updated = sqlx::query(
        "UPDATE modules
         SET num_ratings = COALESCE(num_ratings, 0) + 1,
             sum_rating = COALESCE(sum_rating, 0) + ?,
             avg_rating = CAST(COALESCE(sum_rating, 0) + ? AS REAL)
                          / (COALESCE(num_ratings, 0) + 1)
         WHERE module_id = ?",
    )
    .bind(new.rating)
    .bind(new.rating)
    .bind(module_id.to_string())
    .execute(&mut *tx)
    .await?;

    if updated.rows_affected() == 0 {
        tx.rollback().await?;
        return Err(Error::NotFound(format!("Module {module_id} not found")));
    }

    sqlx::query(
        "INSERT INTO reviews (review_id, module_id, rating, text, user_id, created_at)
         VALUES (?, ?, ?, ?, ?, ?)",
    )
    .bind(review_id.to_string())
    .bind(module_id.to_string())
    .bind(new.rating)
    .bind(&new.text)
    .bind(&new.user_id)
    .bind(created_at)
    .execute(&mut *tx)
    .await?;

    let row =
        sqlx::query("SELECT num_ratings, sum_rating, avg_rating FROM modules WHERE module_id = ?")
            .bind(module_id.to_string())
            .fetch_one(&mut *tx)
            .await?;
    let stats = RatingStats {
        num_ratings: row.try_get("num_ratings")?,
        sum_rating: row.try_get("sum_rating")?,
        avg_rating: row.try_get("avg_rating")?,
    };

    tx.commit().await?;

    Ok((
        Review {
            review_id,
            module_id,
            rating: new.rating,
            text: new.text.clone(),
            user_id: new.user_id.clone(),
            created_at,
        },
        stats,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::store;
    use gnomercy_common::db::init::init_memory_database;
    use gnomercy_common::db::models::{Genre, NewModule, Players};

    async fn seeded_module(pool: &SqlitePool, bus: &EventBus) -> Uuid {
        let module = store::create_module(
            pool,
            bus,
            &NewModule {
                name: "Crypt of Whispers".to_string(),
                genre: Genre::Horror,
                players: Players::Four,
                difficulty: 4,
                description: String::new(),
                photo: String::new(),
            },
        )
        .await
        .unwrap();
        module.module_id
    }

    fn review(rating: i64) -> NewReview {
        NewReview {
            rating,
            text: format!("rated {rating}"),
            user_id: "User #1".to_string(),
        }
    }

    #[tokio::test]
    async fn test_first_review_initializes_stats() {
        let pool = init_memory_database().await.unwrap();
        let bus = EventBus::new(16);
        let module_id = seeded_module(&pool, &bus).await;

        let (rec, stats) = add_review(&pool, &bus, module_id, &review(4)).await.unwrap();
        assert_eq!(rec.rating, 4);
        assert_eq!(
            stats,
            RatingStats {
                num_ratings: 1,
                sum_rating: 4,
                avg_rating: 4.0
            }
        );
    }

    #[tokio::test]
    async fn test_running_aggregate() {
        let pool = init_memory_database().await.unwrap();
        let bus = EventBus::new(16);
        let module_id = seeded_module(&pool, &bus).await;

        add_review(&pool, &bus, module_id, &review(3)).await.unwrap();
        let (_, stats) = add_review(&pool, &bus, module_id, &review(4)).await.unwrap();
        assert_eq!(stats.num_ratings, 2);
        assert_eq!(stats.sum_rating, 7);
        assert!((stats.avg_rating - 3.5).abs() < 1e-9);

        let (_, stats) = add_review(&pool, &bus, module_id, &review(4)).await.unwrap();
        assert_eq!(stats.num_ratings, 3);
        assert_eq!(stats.sum_rating, 11);
        assert!((stats.avg_rating - 11.0 / 3.0).abs() < 1e-9);
    }

    #[tokio::test]
    async fn test_missing_module_leaves_no_trace() {
        let pool = init_memory_database().await.unwrap();
        let bus = EventBus::new(16);

        let result = add_review(&pool, &bus, uuid_utils::generate(), &review(5)).await;
        assert!(matches!(result, Err(Error::NotFound(_))));

        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM reviews")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(count, 0);
    }

    #[tokio::test]
    async fn test_invalid_rating_rejected_before_writing() {
        let pool = init_memory_database().await.unwrap();
        let bus = EventBus::new(16);
        let module_id = seeded_module(&pool, &bus).await;

        for rating in [0, 6, -3] {
            let result = add_review(&pool, &bus, module_id, &review(rating)).await;
            assert!(matches!(result, Err(Error::InvalidInput(_))));
        }

        let module = store::get_module(&pool, module_id).await.unwrap().unwrap();
        assert_eq!(module.num_ratings, 0);
        assert_eq!(module.sum_rating, 0);
    }

    #[tokio::test]
    async fn test_empty_text_rejected() {
        let pool = init_memory_database().await.unwrap();
        let bus = EventBus::new(16);
        let module_id = seeded_module(&pool, &bus).await;

        let bad = NewReview {
            rating: 3,
            text: "  ".to_string(),
            user_id: "User #1".to_string(),
        };
        let result = add_review(&pool, &bus, module_id, &bad).await;
        assert!(matches!(result, Err(Error::InvalidInput(_))));
    }

    #[tokio::test]
    async fn test_reviews_listed_newest_first() {
        let pool = init_memory_database().await.unwrap();
        let bus = EventBus::new(16);
        let module_id = seeded_module(&pool, &bus).await;

        add_review(&pool, &bus, module_id, &review(2)).await.unwrap();
        add_review(&pool, &bus, module_id, &review(5)).await.unwrap();

        let reviews = store::list_reviews(&pool, module_id).await.unwrap();
        assert_eq!(reviews.len(), 2);
        assert_eq!(reviews[0].rating, 5);
        assert_eq!(reviews[1].rating, 2);
        assert!(reviews[0].created_at >= reviews[1].created_at);
    }

    #[tokio::test]
    async fn test_emits_review_added_event() {
        let pool = init_memory_database().await.unwrap();
        let bus = EventBus::new(16);
        let module_id = seeded_module(&pool, &bus).await;
        let mut rx = bus.subscribe();

        let (rec, _) = add_review(&pool, &bus, module_id, &review(3)).await.unwrap();

        let event = rx.recv().await.unwrap();
        match event {
            CatalogEvent::ReviewAdded {
                module_id: m,
                review_id,
                rating,
                ..
            } => {
                assert_eq!(m, module_id);
                assert_eq!(review_id, rec.review_id);
                assert_eq!(rating, 3);
            }
            other => panic!("unexpected event {other:?}"),
        }
    }
}
