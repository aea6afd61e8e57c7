//! Three-tier fact resolution
//!
//! Writes resolve in order: typed slot, then legacy free key, then
//! insert. This keeps at most one row per `(business, slot)` while a
//! client that previously omitted a slot key starts sending one: the
//! legacy row is promoted into the slot instead of duplicated.

use std::sync::Arc;
use uuid::Uuid;
use vantage_db::{CreateFact, FactRepository, FactRow, InsertOutcome, UpdateFact};
use vantage_types::{BusinessId, FactKey};

use crate::FactError;

/// A fact write request
#[derive(Debug, Clone)]
pub struct FactUpsert {
    pub business_id: BusinessId,
    /// Legacy/custom identifier; always present
    pub free_key: String,
    pub value: String,
    pub source_workflow: Option<String>,
    /// Typed slot identifier, when the client knows one
    pub slot_key: Option<String>,
}

/// Slot-based upsert and reads over the fact collection.
pub struct FactResolver<F: FactRepository> {
    facts: Arc<F>,
}

impl<F: FactRepository> FactResolver<F> {
    /// Create a resolver over a fact repository
    pub fn new(facts: Arc<F>) -> Self {
        Self { facts }
    }

    /// Upsert a fact.
    ///
    /// With a slot key: update the slot row if one exists; otherwise
    /// promote a matching legacy row into the slot; otherwise insert a
    /// row carrying both keys. Without a slot key: plain free-key
    /// upsert. An insert losing a unique-key race degrades to one
    /// re-resolve and an in-place update.
    pub async fn upsert(&self, input: FactUpsert) -> Result<FactRow, FactError> {
        if let Some((id, update)) = self.resolve_existing(&input).await? {
            return Ok(self.facts.update(id, update).await?);
        }

        let create = CreateFact {
            id: Uuid::new_v4(),
            business_id: input.business_id.0,
            slot_key: input.slot_key.clone(),
            free_key: input.free_key.clone(),
            value: input.value.clone(),
            source_workflow: input.source_workflow.clone(),
        };

        match self.facts.insert(create).await? {
            InsertOutcome::Inserted(row) => Ok(row),
            InsertOutcome::Conflict => {
                // A concurrent writer created the row first; update it
                tracing::debug!(
                    business_id = %input.business_id,
                    free_key = %input.free_key,
                    "Lost fact insert race, re-resolving"
                );
                let (id, update) = self
                    .resolve_existing(&input)
                    .await?
                    .ok_or(FactError::StoreInconsistent(
                        "fact missing after unique-key conflict",
                    ))?;
                Ok(self.facts.update(id, update).await?)
            }
        }
    }

    /// Find the row this write should land on, paired with the update
    /// that row needs.
    async fn resolve_existing(
        &self,
        input: &FactUpsert,
    ) -> Result<Option<(Uuid, UpdateFact)>, FactError> {
        if let Some(slot_key) = &input.slot_key {
            if let Some(row) = self
                .facts
                .find_by_slot(input.business_id.0, slot_key)
                .await?
            {
                return Ok(Some((
                    row.id,
                    UpdateFact {
                        value: Some(input.value.clone()),
                        source_workflow: input.source_workflow.clone(),
                        free_key: Some(input.free_key.clone()),
                        slot_key: None,
                    },
                )));
            }

            // Legacy row created before slots existed: promote it. A row
            // already owned by another slot is left alone; the free key is
            // only unique among slot-less rows.
            if let Some(row) = self
                .facts
                .find_by_free_key(input.business_id.0, &input.free_key)
                .await?
            {
                if row.slot_key.is_none() {
                    return Ok(Some((
                        row.id,
                        UpdateFact {
                            value: Some(input.value.clone()),
                            source_workflow: input.source_workflow.clone(),
                            free_key: None,
                            slot_key: Some(slot_key.clone()),
                        },
                    )));
                }
            }

            return Ok(None);
        }

        let existing = self
            .facts
            .find_by_free_key(input.business_id.0, &input.free_key)
            .await?;

        Ok(existing.map(|row| {
            (
                row.id,
                UpdateFact {
                    value: Some(input.value.clone()),
                    source_workflow: input.source_workflow.clone(),
                    free_key: None,
                    slot_key: None,
                },
            )
        }))
    }

    /// Read a single fact by key
    pub async fn get(
        &self,
        business_id: BusinessId,
        key: &FactKey,
    ) -> Result<Option<FactRow>, FactError> {
        let row = match key {
            FactKey::Slot(slot_key) => self.facts.find_by_slot(business_id.0, slot_key).await?,
            FactKey::Free(free_key) => self.facts.find_by_free_key(business_id.0, free_key).await?,
        };
        Ok(row)
    }

    /// List all facts for a business, most recently updated first
    pub async fn list(&self, business_id: BusinessId) -> Result<Vec<FactRow>, FactError> {
        Ok(self.facts.list_for_business(business_id.0).await?)
    }

    /// Delete facts by free key. Returns whether any row was removed;
    /// not-found is not an error.
    pub async fn delete_by_free_key(
        &self,
        business_id: BusinessId,
        free_key: &str,
    ) -> Result<bool, FactError> {
        let removed = self
            .facts
            .delete_by_free_key(business_id.0, free_key)
            .await?;
        Ok(removed > 0)
    }
}

impl<F: FactRepository> Clone for FactResolver<F> {
    fn clone(&self) -> Self {
        Self {
            facts: Arc::clone(&self.facts),
        }
    }
}
