//! Vantage Facts Core - Slot-based fact resolution
//!
//! Reconciles the typed-slot key scheme with the legacy free-text key
//! scheme: one row per `(business, slot)` while tolerating pre-existing
//! untyped rows, which get promoted into a slot instead of duplicated.

pub mod error;
pub mod resolver;

pub use error::FactError;
pub use resolver::{FactResolver, FactUpsert};
