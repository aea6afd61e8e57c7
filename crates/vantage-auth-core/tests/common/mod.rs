//! Shared test utilities

// Not every suite uses every helper
#![allow(dead_code)]

pub mod jwks_mock;
pub mod mock_repos;
