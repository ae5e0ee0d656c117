//! Catalog core: filter compilation, one-shot readers, the review
//! aggregation transaction, and continuous (watch) readers.

pub mod filter;
pub mod reviews;
pub mod store;
pub mod watch;
