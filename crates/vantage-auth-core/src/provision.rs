//! Entity provisioning: idempotent get-or-create for users and businesses
//!
//! The "look up, then insert" pattern here is optimistic concurrency:
//! the store's uniqueness constraints are the true serialization point.
//! A lost insert race surfaces as [`InsertOutcome::Conflict`] and is
//! answered with exactly one re-lookup; there is no retry loop.

use std::sync::Arc;
use uuid::Uuid;
use vantage_db::{
    BusinessRepository, BusinessRow, CreateBusiness, CreateUser, InsertOutcome, UserRepository,
    UserRow,
};
use vantage_types::{BusinessId, UserId};

use crate::AuthError;

/// Name given to a business created lazily on first authenticated write
pub const DEFAULT_BUSINESS_NAME: &str = "My Business";

/// Idempotent provisioning of `User` and `Business` rows.
pub struct EntityProvisioner<U: UserRepository, B: BusinessRepository> {
    users: Arc<U>,
    businesses: Arc<B>,
}

impl<U: UserRepository, B: BusinessRepository> EntityProvisioner<U, B> {
    /// Create a provisioner over the two repositories
    pub fn new(users: Arc<U>, businesses: Arc<B>) -> Self {
        Self { users, businesses }
    }

    /// Get or create the user for an external subject id.
    ///
    /// Refreshes a stored email that differs from a newly supplied one.
    /// At most one row is ever created per subject id: a concurrent
    /// creator winning the insert race is handled by one re-lookup.
    pub async fn get_or_create_user(
        &self,
        subject_id: &str,
        email: Option<&str>,
    ) -> Result<UserRow, AuthError> {
        if let Some(user) = self.users.find_by_subject(subject_id).await? {
            return self.refresh_email(user, email).await;
        }

        let create = CreateUser {
            id: Uuid::new_v4(),
            external_subject_id: subject_id.to_string(),
            email: email.map(str::to_string),
        };

        match self.users.insert(create).await? {
            InsertOutcome::Inserted(user) => Ok(user),
            InsertOutcome::Conflict => {
                tracing::debug!(subject_id, "Lost user insert race, re-reading");
                self.users
                    .find_by_subject(subject_id)
                    .await?
                    .ok_or(AuthError::StoreInconsistent(
                        "user missing after unique-key conflict",
                    ))
            }
        }
    }

    async fn refresh_email(
        &self,
        user: UserRow,
        email: Option<&str>,
    ) -> Result<UserRow, AuthError> {
        match email {
            Some(email) if user.email.as_deref() != Some(email) => {
                self.users.update_email(user.id, email).await?;
                Ok(UserRow {
                    email: Some(email.to_string()),
                    ..user
                })
            }
            _ => Ok(user),
        }
    }

    /// Get or create the active business for a user.
    ///
    /// The oldest active business wins if duplicates ever exist; a lost
    /// insert race (the partial unique index on active businesses) is
    /// handled by one re-lookup.
    pub async fn get_or_create_active_business(
        &self,
        user_id: UserId,
    ) -> Result<BusinessRow, AuthError> {
        if let Some(business) = self.businesses.find_active_by_user(user_id.0).await? {
            return Ok(business);
        }

        let create = CreateBusiness {
            id: Uuid::new_v4(),
            user_id: user_id.0,
            name: DEFAULT_BUSINESS_NAME.to_string(),
        };

        match self.businesses.insert(create).await? {
            InsertOutcome::Inserted(business) => Ok(business),
            InsertOutcome::Conflict => {
                tracing::debug!(%user_id, "Lost business insert race, re-reading");
                self.businesses
                    .find_active_by_user(user_id.0)
                    .await?
                    .ok_or(AuthError::StoreInconsistent(
                        "active business missing after unique-key conflict",
                    ))
            }
        }
    }

    /// Archive a business. Businesses are never deleted.
    pub async fn archive_business(&self, business_id: BusinessId) -> Result<(), AuthError> {
        self.businesses.archive(business_id.0).await?;
        Ok(())
    }
}

impl<U: UserRepository, B: BusinessRepository> Clone for EntityProvisioner<U, B> {
    fn clone(&self) -> Self {
        Self {
            users: Arc::clone(&self.users),
            businesses: Arc::clone(&self.businesses),
        }
    }
}
