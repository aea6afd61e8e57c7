//! In-memory repositories for testing
//!
//! Enforce the same unique keys as the real schema and can be armed to
//! lose exactly one insert race: the next insert writes a competing row
//! first and reports `Conflict`, simulating a concurrent winner.

use async_trait::async_trait;
use chrono::Utc;
use dashmap::DashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use uuid::Uuid;
use vantage_db::{
    BusinessRepository, BusinessRow, CreateBusiness, CreateUser, DbResult, InsertOutcome,
    UserRepository, UserRow,
};
use vantage_types::BusinessStatus;

/// In-memory user repository
#[derive(Default)]
pub struct MockUserRepository {
    pub users: DashMap<Uuid, UserRow>,
    conflict_once: AtomicBool,
    conflict_without_row: AtomicBool,
}

impl MockUserRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make the next insert lose a simulated race
    pub fn arm_conflict(&self) {
        self.conflict_once.store(true, Ordering::SeqCst);
    }

    /// Make the next insert report a conflict without any winner row
    /// (store inconsistency scenario)
    pub fn arm_conflict_without_row(&self) {
        self.conflict_without_row.store(true, Ordering::SeqCst);
    }

    fn store(&self, user: &CreateUser) -> UserRow {
        let row = UserRow {
            id: user.id,
            external_subject_id: user.external_subject_id.clone(),
            email: user.email.clone(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        self.users.insert(row.id, row.clone());
        row
    }
}

#[async_trait]
impl UserRepository for MockUserRepository {
    async fn find_by_id(&self, id: Uuid) -> DbResult<Option<UserRow>> {
        Ok(self.users.get(&id).map(|r| r.value().clone()))
    }

    async fn find_by_subject(&self, subject_id: &str) -> DbResult<Option<UserRow>> {
        Ok(self
            .users
            .iter()
            .find(|r| r.external_subject_id == subject_id)
            .map(|r| r.value().clone()))
    }

    async fn insert(&self, user: CreateUser) -> DbResult<InsertOutcome<UserRow>> {
        if self.conflict_without_row.swap(false, Ordering::SeqCst) {
            return Ok(InsertOutcome::Conflict);
        }
        if self.conflict_once.swap(false, Ordering::SeqCst) {
            let competitor = CreateUser {
                id: Uuid::new_v4(),
                ..user.clone()
            };
            self.store(&competitor);
            return Ok(InsertOutcome::Conflict);
        }
        if self
            .users
            .iter()
            .any(|r| r.external_subject_id == user.external_subject_id)
        {
            return Ok(InsertOutcome::Conflict);
        }
        Ok(InsertOutcome::Inserted(self.store(&user)))
    }

    async fn update_email(&self, id: Uuid, email: &str) -> DbResult<()> {
        if let Some(mut user) = self.users.get_mut(&id) {
            user.email = Some(email.to_string());
            user.updated_at = Utc::now();
        }
        Ok(())
    }
}

/// In-memory business repository
#[derive(Default)]
pub struct MockBusinessRepository {
    pub businesses: DashMap<Uuid, BusinessRow>,
    conflict_once: AtomicBool,
}

impl MockBusinessRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make the next insert lose a simulated race
    pub fn arm_conflict(&self) {
        self.conflict_once.store(true, Ordering::SeqCst);
    }

    fn store(&self, business: &CreateBusiness) -> BusinessRow {
        let row = BusinessRow {
            id: business.id,
            user_id: business.user_id,
            name: business.name.clone(),
            status: BusinessStatus::Active.as_str().to_string(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        self.businesses.insert(row.id, row.clone());
        row
    }

    fn has_active_for(&self, user_id: Uuid) -> bool {
        self.businesses
            .iter()
            .any(|r| r.user_id == user_id && r.status == BusinessStatus::Active.as_str())
    }
}

#[async_trait]
impl BusinessRepository for MockBusinessRepository {
    async fn find_by_id(&self, id: Uuid) -> DbResult<Option<BusinessRow>> {
        Ok(self.businesses.get(&id).map(|r| r.value().clone()))
    }

    async fn find_active_by_user(&self, user_id: Uuid) -> DbResult<Option<BusinessRow>> {
        let mut active: Vec<BusinessRow> = self
            .businesses
            .iter()
            .filter(|r| r.user_id == user_id && r.status == BusinessStatus::Active.as_str())
            .map(|r| r.value().clone())
            .collect();
        // Oldest-by-creation wins
        active.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(active.into_iter().next())
    }

    async fn insert(&self, business: CreateBusiness) -> DbResult<InsertOutcome<BusinessRow>> {
        if self.conflict_once.swap(false, Ordering::SeqCst) {
            let competitor = CreateBusiness {
                id: Uuid::new_v4(),
                name: "Competitor Business".to_string(),
                ..business
            };
            self.store(&competitor);
            return Ok(InsertOutcome::Conflict);
        }
        if self.has_active_for(business.user_id) {
            return Ok(InsertOutcome::Conflict);
        }
        Ok(InsertOutcome::Inserted(self.store(&business)))
    }

    async fn archive(&self, id: Uuid) -> DbResult<()> {
        if let Some(mut business) = self.businesses.get_mut(&id) {
            business.status = BusinessStatus::Archived.as_str().to_string();
            business.updated_at = Utc::now();
        }
        Ok(())
    }
}
