//! PostgreSQL business repository implementation

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;
use vantage_types::BusinessStatus;

use crate::error::{DbResult, InsertOutcome, insert_outcome};
use crate::models::BusinessRow;
use crate::repo::{BusinessRepository, CreateBusiness};

/// PostgreSQL business repository
#[derive(Clone)]
pub struct PgBusinessRepository {
    pool: PgPool,
}

impl PgBusinessRepository {
    /// Create a new business repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl BusinessRepository for PgBusinessRepository {
    async fn find_by_id(&self, id: Uuid) -> DbResult<Option<BusinessRow>> {
        let business = sqlx::query_as::<_, BusinessRow>(
            r#"
            SELECT id, user_id, name, status, created_at, updated_at
            FROM businesses
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(business)
    }

    async fn find_active_by_user(&self, user_id: Uuid) -> DbResult<Option<BusinessRow>> {
        // Oldest-by-creation wins if duplicates ever exist
        let business = sqlx::query_as::<_, BusinessRow>(
            r#"
            SELECT id, user_id, name, status, created_at, updated_at
            FROM businesses
            WHERE user_id = $1 AND status = $2
            ORDER BY created_at ASC
            LIMIT 1
            "#,
        )
        .bind(user_id)
        .bind(BusinessStatus::Active.as_str())
        .fetch_optional(&self.pool)
        .await?;

        Ok(business)
    }

    async fn insert(&self, business: CreateBusiness) -> DbResult<InsertOutcome<BusinessRow>> {
        // The partial unique index on (user_id) WHERE status = 'active'
        // turns a concurrent second create into a Conflict.
        let result = sqlx::query_as::<_, BusinessRow>(
            r#"
            INSERT INTO businesses (id, user_id, name, status)
            VALUES ($1, $2, $3, $4)
            RETURNING id, user_id, name, status, created_at, updated_at
            "#,
        )
        .bind(business.id)
        .bind(business.user_id)
        .bind(&business.name)
        .bind(BusinessStatus::Active.as_str())
        .fetch_one(&self.pool)
        .await;

        insert_outcome(result)
    }

    async fn archive(&self, id: Uuid) -> DbResult<()> {
        sqlx::query("UPDATE businesses SET status = $1, updated_at = now() WHERE id = $2")
            .bind(BusinessStatus::Archived.as_str())
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }
}
