//! Database errors

use thiserror::Error;

/// Database errors
#[derive(Error, Debug)]
pub enum DbError {
    /// SQLx error
    #[error("database error: {0}")]
    Sqlx(#[from] sqlx::Error),

    /// Record not found
    #[error("record not found")]
    NotFound,
}

/// Result alias for database operations
pub type DbResult<T> = Result<T, DbError>;

/// Outcome of an insert into a uniquely-keyed collection.
///
/// `Conflict` means the store rejected the row because another writer
/// already holds the unique key. It is the one recoverable store error
/// class: the caller reacts with exactly one re-lookup. Every other
/// failure propagates as [`DbError`].
#[derive(Debug, Clone)]
pub enum InsertOutcome<T> {
    /// The row was inserted
    Inserted(T),
    /// A concurrent writer won the race on the unique key
    Conflict,
}

impl<T> InsertOutcome<T> {
    /// Whether this outcome is a conflict
    pub fn is_conflict(&self) -> bool {
        matches!(self, Self::Conflict)
    }
}

/// Map an insert error, turning a unique-constraint violation into
/// `Ok(Conflict)` and anything else into `Err`.
///
/// Uses the driver's structured error kind (SQLSTATE 23505 on Postgres),
/// never message matching.
pub fn insert_outcome<T>(result: Result<T, sqlx::Error>) -> DbResult<InsertOutcome<T>> {
    match result {
        Ok(row) => Ok(InsertOutcome::Inserted(row)),
        Err(sqlx::Error::Database(db)) if db.is_unique_violation() => {
            tracing::debug!("Insert rejected by unique constraint");
            Ok(InsertOutcome::Conflict)
        }
        Err(e) => Err(e.into()),
    }
}
