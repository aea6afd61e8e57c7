//! Vantage DB - Database abstractions
//!
//! SQLx-based database layer for Vantage services.
//!
//! Inserts on uniquely-keyed collections return a tagged
//! [`InsertOutcome`] instead of an opaque error, so callers can react to
//! a lost create-if-absent race with an explicit branch rather than by
//! inspecting error messages.
//!
//! # Example
//!
//! ```rust,ignore
//! use vantage_db::{create_pool, Repositories};
//!
//! let pool = create_pool("postgres://localhost/vantage").await?;
//! let repos = Repositories::new(pool);
//!
//! let user = repos.users.find_by_subject("sub_123").await?;
//! ```

pub mod error;
pub mod models;
pub mod pg;
pub mod pool;
pub mod repo;

pub use error::{DbError, DbResult, InsertOutcome};
pub use models::*;
pub use pg::Repositories;
pub use pool::{DbPool, create_pool};
pub use repo::*;
