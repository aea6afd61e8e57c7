//! PostgreSQL fact repository implementation

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::{DbResult, InsertOutcome, insert_outcome};
use crate::models::FactRow;
use crate::repo::{CreateFact, FactRepository, UpdateFact};

const FACT_COLUMNS: &str = "id, business_id, slot_key, free_key, value, source_workflow, updated_at";

/// PostgreSQL fact repository
#[derive(Clone)]
pub struct PgFactRepository {
    pool: PgPool,
}

impl PgFactRepository {
    /// Create a new fact repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl FactRepository for PgFactRepository {
    async fn find_by_slot(&self, business_id: Uuid, slot_key: &str) -> DbResult<Option<FactRow>> {
        let fact = sqlx::query_as::<_, FactRow>(&format!(
            "SELECT {FACT_COLUMNS} FROM facts WHERE business_id = $1 AND slot_key = $2"
        ))
        .bind(business_id)
        .bind(slot_key)
        .fetch_optional(&self.pool)
        .await?;

        Ok(fact)
    }

    async fn find_by_free_key(
        &self,
        business_id: Uuid,
        free_key: &str,
    ) -> DbResult<Option<FactRow>> {
        // Free keys are only unique among slot-less rows; when a slotted
        // row shares the key, the slot-less one is the match
        let fact = sqlx::query_as::<_, FactRow>(&format!(
            r#"
            SELECT {FACT_COLUMNS} FROM facts
            WHERE business_id = $1 AND free_key = $2
            ORDER BY slot_key NULLS FIRST
            LIMIT 1
            "#
        ))
        .bind(business_id)
        .bind(free_key)
        .fetch_optional(&self.pool)
        .await?;

        Ok(fact)
    }

    async fn list_for_business(&self, business_id: Uuid) -> DbResult<Vec<FactRow>> {
        let facts = sqlx::query_as::<_, FactRow>(&format!(
            "SELECT {FACT_COLUMNS} FROM facts WHERE business_id = $1 ORDER BY updated_at DESC"
        ))
        .bind(business_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(facts)
    }

    async fn insert(&self, fact: CreateFact) -> DbResult<InsertOutcome<FactRow>> {
        let result = sqlx::query_as::<_, FactRow>(&format!(
            r#"
            INSERT INTO facts (id, business_id, slot_key, free_key, value, source_workflow)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {FACT_COLUMNS}
            "#
        ))
        .bind(fact.id)
        .bind(fact.business_id)
        .bind(&fact.slot_key)
        .bind(&fact.free_key)
        .bind(&fact.value)
        .bind(&fact.source_workflow)
        .fetch_one(&self.pool)
        .await;

        insert_outcome(result)
    }

    async fn update(&self, id: Uuid, update: UpdateFact) -> DbResult<FactRow> {
        // COALESCE keeps columns the caller did not set
        let fact = sqlx::query_as::<_, FactRow>(&format!(
            r#"
            UPDATE facts
            SET value = COALESCE($1, value),
                source_workflow = COALESCE($2, source_workflow),
                free_key = COALESCE($3, free_key),
                slot_key = COALESCE($4, slot_key),
                updated_at = now()
            WHERE id = $5
            RETURNING {FACT_COLUMNS}
            "#
        ))
        .bind(&update.value)
        .bind(&update.source_workflow)
        .bind(&update.free_key)
        .bind(&update.slot_key)
        .bind(id)
        .fetch_one(&self.pool)
        .await?;

        Ok(fact)
    }

    async fn delete_by_free_key(&self, business_id: Uuid, free_key: &str) -> DbResult<u64> {
        let result = sqlx::query("DELETE FROM facts WHERE business_id = $1 AND free_key = $2")
            .bind(business_id)
            .bind(free_key)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }
}
