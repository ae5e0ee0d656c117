//! Catalog entity models
//!
//! `Module` and `Review` mirror the stored rows. The `New*` payload types
//! are the boundary where untrusted input gets validated; everything behind
//! them can trust the ranges.

use crate::error::{Error, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Scenario genres
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Genre {
    Action,
    Adventure,
    Comedy,
    Fantasy,
    Noir,
    Horror,
    Romance,
    Scifi,
    Western,
}

impl Genre {
    pub const ALL: [Genre; 9] = [
        Genre::Action,
        Genre::Adventure,
        Genre::Comedy,
        Genre::Fantasy,
        Genre::Noir,
        Genre::Horror,
        Genre::Romance,
        Genre::Scifi,
        Genre::Western,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Genre::Action => "Action",
            Genre::Adventure => "Adventure",
            Genre::Comedy => "Comedy",
            Genre::Fantasy => "Fantasy",
            Genre::Noir => "Noir",
            Genre::Horror => "Horror",
            Genre::Romance => "Romance",
            Genre::Scifi => "Scifi",
            Genre::Western => "Western",
        }
    }
}

impl std::str::FromStr for Genre {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Genre::ALL
            .into_iter()
            .find(|genre| genre.as_str() == s)
            .ok_or_else(|| Error::InvalidInput(format!("Unknown genre: {s}")))
    }
}

impl std::fmt::Display for Genre {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Player-count labels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Players {
    One,
    Two,
    Three,
    Four,
    Five,
    Six,
    Seven,
    Eight,
}

impl Players {
    pub const ALL: [Players; 8] = [
        Players::One,
        Players::Two,
        Players::Three,
        Players::Four,
        Players::Five,
        Players::Six,
        Players::Seven,
        Players::Eight,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Players::One => "One",
            Players::Two => "Two",
            Players::Three => "Three",
            Players::Four => "Four",
            Players::Five => "Five",
            Players::Six => "Six",
            Players::Seven => "Seven",
            Players::Eight => "Eight",
        }
    }
}

impl std::str::FromStr for Players {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Players::ALL
            .into_iter()
            .find(|players| players.as_str() == s)
            .ok_or_else(|| Error::InvalidInput(format!("Unknown player count: {s}")))
    }
}

impl std::fmt::Display for Players {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A scenario listing with its denormalized rating statistics
///
/// Invariant: `avg_rating == sum_rating / num_ratings` whenever
/// `num_ratings > 0`, and the three statistics fields only ever change
/// together, by one review's contribution, inside one transaction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Module {
    pub module_id: Uuid,
    pub name: String,
    pub genre: Genre,
    pub players: Players,
    pub difficulty: i64,
    pub description: String,
    pub photo: String,
    pub num_ratings: i64,
    pub sum_rating: i64,
    pub avg_rating: f64,
    pub created_at: DateTime<Utc>,
}

/// A user review attached to exactly one module, immutable once written
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Review {
    pub review_id: Uuid,
    pub module_id: Uuid,
    pub rating: i64,
    pub text: String,
    pub user_id: String,
    pub created_at: DateTime<Utc>,
}

/// Candidate review, validated before any write
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewReview {
    pub rating: i64,
    pub text: String,
    pub user_id: String,
}

impl NewReview {
    /// Reject out-of-range ratings and empty text or user ids
    pub fn validate(&self) -> Result<()> {
        if !(1..=5).contains(&self.rating) {
            return Err(Error::InvalidInput(format!(
                "Rating must be between 1 and 5, got {}",
                self.rating
            )));
        }
        if self.text.trim().is_empty() {
            return Err(Error::InvalidInput(
                "Review text must not be empty".to_string(),
            ));
        }
        if self.user_id.trim().is_empty() {
            return Err(Error::InvalidInput(
                "Review user id must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}

/// Module-creation payload
///
/// Genre and players deserialize through their enums, so an unknown value
/// is rejected at the boundary before this type ever exists.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewModule {
    pub name: String,
    pub genre: Genre,
    pub players: Players,
    pub difficulty: i64,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub photo: String,
}

impl NewModule {
    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(Error::InvalidInput(
                "Module name must not be empty".to_string(),
            ));
        }
        if !(1..=5).contains(&self.difficulty) {
            return Err(Error::InvalidInput(format!(
                "Difficulty must be between 1 and 5, got {}",
                self.difficulty
            )));
        }
        Ok(())
    }
}
