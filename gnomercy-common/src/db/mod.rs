//! Database access layer

pub mod init;
pub mod models;
pub mod settings;

pub use init::{init_database, init_memory_database};
