//! Sample catalog seeding
//!
//! Generates a small random catalog with plausible history: modules created
//! weeks ago, each with up to five reviews submitted some days later.
//! Statistics are computed from the generated reviews before insertion, so
//! a seeded module is indistinguishable from one that accumulated its
//! reviews through the aggregation path.

pub mod data;

use chrono::Duration;
use gnomercy_common::db::models::{Genre, Module, Players, Review};
use gnomercy_common::db::settings;
use gnomercy_common::error::Result;
use gnomercy_common::events::EventBus;
use gnomercy_common::{time, uuid_utils};
use rand::Rng;
use sqlx::SqlitePool;
use tracing::{debug, info};

use crate::catalog::store;

pub const DEFAULT_MODULE_COUNT: i64 = 5;

const MAX_REVIEWS_PER_MODULE: usize = 5;

/// Generate `count` modules with their review histories
///
/// Pure generation, no database access. Module ages fall 20 to 80 days in
/// the past; reviews land 1 to 19 days after their module.
pub fn generate_catalog(count: usize) -> Vec<(Module, Vec<Review>)> {
    let mut rng = rand::thread_rng();
    (0..count).map(|_| generate_module(&mut rng)).collect()
}

fn generate_module(rng: &mut impl Rng) -> (Module, Vec<Review>) {
    let module_id = uuid_utils::generate();
    let genre = Genre::ALL[rng.gen_range(0..Genre::ALL.len())];
    let players = Players::ALL[rng.gen_range(0..Players::ALL.len())];
    let name = data::MODULE_NAMES[rng.gen_range(0..data::MODULE_NAMES.len())];
    let descriptions = data::descriptions_for(genre);
    let description = descriptions[rng.gen_range(0..descriptions.len())];
    let created_at = time::now() - Duration::days(rng.gen_range(20..=80));

    let mut reviews = Vec::new();
    for _ in 0..rng.gen_range(0..=MAX_REVIEWS_PER_MODULE) {
        let (text, rating) = data::REVIEW_POOL[rng.gen_range(0..data::REVIEW_POOL.len())];
        reviews.push(Review {
            review_id: uuid_utils::generate(),
            module_id,
            rating,
            text: text.to_string(),
            user_id: format!("User #{}", rng.gen_range(0..=1000)),
            created_at: created_at + Duration::days(rng.gen_range(1..=19)),
        });
    }

    let num_ratings = reviews.len() as i64;
    let sum_rating: i64 = reviews.iter().map(|r| r.rating).sum();
    let avg_rating = if num_ratings > 0 {
        sum_rating as f64 / num_ratings as f64
    } else {
        0.0
    };

    let module = Module {
        module_id,
        name: name.to_string(),
        genre,
        players,
        difficulty: rng.gen_range(1..=5),
        description: description.to_string(),
        photo: sample_photo_url(genre, rng),
        num_ratings,
        sum_rating,
        avg_rating,
        created_at,
    };
    (module, reviews)
}

/// Pick one of the bundled sample covers for a genre
///
/// Horror has twice the covers of the other genres.
fn sample_photo_url(genre: Genre, rng: &mut impl Rng) -> String {
    let count = match genre {
        Genre::Horror => 12,
        _ => 6,
    };
    let slug = genre.as_str().to_lowercase();
    let index = rng.gen_range(1..=count);
    format!("/images/samples/{slug}/{slug}{index}.png")
}

/// Insert `count` generated modules, one transaction per module
pub async fn seed_catalog(pool: &SqlitePool, bus: &EventBus, count: usize) -> Result<Vec<Module>> {
    let generated = generate_catalog(count);
    let mut modules = Vec::with_capacity(generated.len());

    for (module, reviews) in &generated {
        store::insert_seeded_module(pool, bus, module, reviews).await?;
        debug!(name = %module.name, reviews = reviews.len(), "Seeded sample module");
        modules.push(module.clone());
    }

    info!(count = modules.len(), "Sample catalog seeded");
    Ok(modules)
}

/// Seed the sample catalog when the modules table is empty
///
/// Returns how many modules were inserted, zero when the catalog already
/// has content.
pub async fn seed_if_empty(pool: &SqlitePool, bus: &EventBus) -> Result<usize> {
    let existing: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM modules")
        .fetch_one(pool)
        .await?;
    if existing > 0 {
        debug!(existing, "Catalog already populated, skipping seed");
        return Ok(0);
    }

    let count =
        settings::get_setting_i64(pool, "seed_module_count", DEFAULT_MODULE_COUNT).await? as usize;
    let modules = seed_catalog(pool, bus, count).await?;
    Ok(modules.len())
}
