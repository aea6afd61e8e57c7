//! PostgreSQL user repository implementation

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::{DbResult, InsertOutcome, insert_outcome};
use crate::models::UserRow;
use crate::repo::{CreateUser, UserRepository};

/// PostgreSQL user repository
#[derive(Clone)]
pub struct PgUserRepository {
    pool: PgPool,
}

impl PgUserRepository {
    /// Create a new user repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserRepository for PgUserRepository {
    async fn find_by_id(&self, id: Uuid) -> DbResult<Option<UserRow>> {
        let user = sqlx::query_as::<_, UserRow>(
            r#"
            SELECT id, external_subject_id, email, created_at, updated_at
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    async fn find_by_subject(&self, subject_id: &str) -> DbResult<Option<UserRow>> {
        let user = sqlx::query_as::<_, UserRow>(
            r#"
            SELECT id, external_subject_id, email, created_at, updated_at
            FROM users
            WHERE external_subject_id = $1
            "#,
        )
        .bind(subject_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    async fn insert(&self, user: CreateUser) -> DbResult<InsertOutcome<UserRow>> {
        let result = sqlx::query_as::<_, UserRow>(
            r#"
            INSERT INTO users (id, external_subject_id, email)
            VALUES ($1, $2, $3)
            RETURNING id, external_subject_id, email, created_at, updated_at
            "#,
        )
        .bind(user.id)
        .bind(&user.external_subject_id)
        .bind(&user.email)
        .fetch_one(&self.pool)
        .await;

        insert_outcome(result)
    }

    async fn update_email(&self, id: Uuid, email: &str) -> DbResult<()> {
        sqlx::query("UPDATE users SET email = $1, updated_at = now() WHERE id = $2")
            .bind(email)
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }
}
