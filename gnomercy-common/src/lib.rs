//! # Gnomercy Common Library
//!
//! Shared code for the Gnomercy module catalog:
//! - Database models, initialization, and settings access
//! - Event types (CatalogEvent enum) and the broadcast event bus
//! - Configuration loading
//! - Error types and utility functions

pub mod config;
pub mod db;
pub mod error;
pub mod events;
pub mod time;
pub mod uuid_utils;

pub use error::{Error, Result};
