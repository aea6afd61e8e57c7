//! Vantage Types - Shared domain types
//!
//! This crate contains domain types used across Vantage services:
//! - Entity identifiers (users, businesses, facts)
//! - Authenticated identity context
//! - Business lifecycle and fact key types

pub mod auth;
pub mod business;
pub mod fact;
pub mod ids;

pub use auth::*;
pub use business::*;
pub use fact::*;
pub use ids::*;
