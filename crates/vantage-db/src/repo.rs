//! Repository traits
//!
//! Define async repository interfaces for database operations.
//!
//! Uniqueness constraints in the store are the serialization point for
//! the provisioning paths: `insert` returns [`InsertOutcome::Conflict`]
//! when a concurrent writer holds the unique key, and callers perform
//! exactly one re-lookup.

use async_trait::async_trait;
use uuid::Uuid;

use crate::error::{DbResult, InsertOutcome};
use crate::models::*;

/// User repository trait
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Find a user by ID
    async fn find_by_id(&self, id: Uuid) -> DbResult<Option<UserRow>>;

    /// Find a user by external subject ID
    async fn find_by_subject(&self, subject_id: &str) -> DbResult<Option<UserRow>>;

    /// Insert a new user; conflict on `external_subject_id`
    async fn insert(&self, user: CreateUser) -> DbResult<InsertOutcome<UserRow>>;

    /// Update a user's email
    async fn update_email(&self, id: Uuid, email: &str) -> DbResult<()>;
}

/// Create user input
#[derive(Debug, Clone)]
pub struct CreateUser {
    pub id: Uuid,
    pub external_subject_id: String,
    pub email: Option<String>,
}

/// Business repository trait
#[async_trait]
pub trait BusinessRepository: Send + Sync {
    /// Find a business by ID
    async fn find_by_id(&self, id: Uuid) -> DbResult<Option<BusinessRow>>;

    /// Find the active business for a user (oldest-by-creation wins)
    async fn find_active_by_user(&self, user_id: Uuid) -> DbResult<Option<BusinessRow>>;

    /// Insert a new business; conflict when the user already has an
    /// active business
    async fn insert(&self, business: CreateBusiness) -> DbResult<InsertOutcome<BusinessRow>>;

    /// Archive a business (businesses are never deleted)
    async fn archive(&self, id: Uuid) -> DbResult<()>;
}

/// Create business input
#[derive(Debug, Clone)]
pub struct CreateBusiness {
    pub id: Uuid,
    pub user_id: Uuid,
    pub name: String,
}

/// Fact repository trait
#[async_trait]
pub trait FactRepository: Send + Sync {
    /// Find a fact by typed slot key
    async fn find_by_slot(&self, business_id: Uuid, slot_key: &str) -> DbResult<Option<FactRow>>;

    /// Find a fact by legacy free key
    async fn find_by_free_key(&self, business_id: Uuid, free_key: &str)
    -> DbResult<Option<FactRow>>;

    /// List all facts for a business, most recently updated first
    async fn list_for_business(&self, business_id: Uuid) -> DbResult<Vec<FactRow>>;

    /// Insert a new fact; conflict on either unique key
    async fn insert(&self, fact: CreateFact) -> DbResult<InsertOutcome<FactRow>>;

    /// Update a fact in place; `None` fields are left unchanged
    async fn update(&self, id: Uuid, update: UpdateFact) -> DbResult<FactRow>;

    /// Delete facts matching a free key, returning how many were removed
    async fn delete_by_free_key(&self, business_id: Uuid, free_key: &str) -> DbResult<u64>;
}

/// Create fact input
#[derive(Debug, Clone)]
pub struct CreateFact {
    pub id: Uuid,
    pub business_id: Uuid,
    pub slot_key: Option<String>,
    pub free_key: String,
    pub value: String,
    pub source_workflow: Option<String>,
}

/// Partial fact update; `None` leaves the column unchanged
#[derive(Debug, Clone, Default)]
pub struct UpdateFact {
    pub value: Option<String>,
    pub source_workflow: Option<String>,
    pub free_key: Option<String>,
    pub slot_key: Option<String>,
}
