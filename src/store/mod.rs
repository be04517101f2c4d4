use thiserror::Error;

use crate::model::{
    Dataset, Directionality, MapId, RelationKind, Relationship, RelationshipId, StakeholderId,
};

mod json;
mod memory;

pub use json::JsonFileStore;
pub use memory::MemoryStore;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("validation failed: {0}")]
    Validation(String),
    #[error("conflict: {0}")]
    Conflict(String),
    #[error("not found: {0}")]
    NotFound(String),
    #[error("store io: {0}")]
    Io(#[from] std::io::Error),
    #[error("store encoding: {0}")]
    Encoding(#[from] serde_json::Error),
}

#[derive(Clone, Debug)]
pub struct RelationshipDraft {
    pub from: StakeholderId,
    pub to: StakeholderId,
    pub kind: RelationKind,
    pub strength: u8,
    pub directionality: Directionality,
    pub notes: Option<String>,
}

/// Field-level patch for an existing relationship; `None` leaves the field
/// untouched, `notes: Some(..)` replaces the notes wholesale.
#[derive(Clone, Debug, Default)]
pub struct RelationshipChanges {
    pub kind: Option<RelationKind>,
    pub strength: Option<u8>,
    pub directionality: Option<Directionality>,
    pub notes: Option<Option<String>>,
}

/// The external data collaborator. Implementations are shared across the UI
/// thread and the persistence workers, so every method takes `&self`.
pub trait MapStore: Send + Sync {
    /// Joined read of one map: active stakeholders with company names,
    /// relationships, and the map's layout entries.
    fn load_dataset(&self, map_id: &MapId) -> Result<Dataset, StoreError>;

    /// Upsert keyed on (map, stakeholder); at most one row per pair.
    fn upsert_layout(
        &self,
        map_id: &MapId,
        stakeholder_id: &StakeholderId,
        x: f32,
        y: f32,
    ) -> Result<(), StoreError>;

    /// All-or-nothing bulk upsert; on failure nothing is committed.
    fn batch_upsert_layouts(
        &self,
        map_id: &MapId,
        entries: &[(StakeholderId, f32, f32)],
    ) -> Result<(), StoreError>;

    /// Soft delete: the stakeholder drops out of every subsequent
    /// `load_dataset`, its layout entries stay behind.
    fn archive_stakeholder(&self, id: &StakeholderId) -> Result<(), StoreError>;

    fn create_relationship(&self, draft: RelationshipDraft) -> Result<Relationship, StoreError>;

    fn update_relationship(
        &self,
        id: &RelationshipId,
        changes: RelationshipChanges,
    ) -> Result<(), StoreError>;

    fn delete_relationship(&self, id: &RelationshipId) -> Result<(), StoreError>;
}

pub(in crate::store) fn validate_draft(draft: &RelationshipDraft) -> Result<(), StoreError> {
    if draft.from == draft.to {
        return Err(StoreError::Validation(
            "a relationship cannot link a stakeholder to itself".to_owned(),
        ));
    }
    if !(1..=5).contains(&draft.strength) {
        return Err(StoreError::Validation(format!(
            "strength must be between 1 and 5, got {}",
            draft.strength
        )));
    }
    Ok(())
}
