//! UUID utilities

use crate::error::{Error, Result};
use uuid::Uuid;

/// Generate a new v4 identifier
pub fn generate() -> Uuid {
    Uuid::new_v4()
}

/// Parse an identifier from its string form
pub fn parse(s: &str) -> Result<Uuid> {
    Uuid::parse_str(s).map_err(|e| Error::InvalidInput(format!("Invalid identifier {s:?}: {e}")))
}
