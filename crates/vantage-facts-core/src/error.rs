//! Fact resolution errors

use thiserror::Error;

/// Fact resolution errors
#[derive(Error, Debug)]
pub enum FactError {
    /// Database error
    #[error("database error: {0}")]
    Database(#[from] vantage_db::DbError),

    /// Store state contradicts its own uniqueness guarantees
    #[error("store inconsistent: {0}")]
    StoreInconsistent(&'static str),
}
