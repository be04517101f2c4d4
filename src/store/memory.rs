use std::sync::{Mutex, MutexGuard};

use crate::model::{
    Company, CompanyId, Dataset, MapId, MapRecord, RelationKind, Relationship, RelationshipId,
    Sentiment, Seniority, Stakeholder, StakeholderId, StakeholderStatus,
};

use super::json::{DEFAULT_MAP_ID, Document};
use super::{MapStore, RelationshipChanges, RelationshipDraft, StoreError};

/// Document store with no disk behind it. Backs `--demo` runs and the unit
/// tests that need a collaborator without touching the filesystem.
pub struct MemoryStore {
    inner: Mutex<Document>,
}

impl MemoryStore {
    pub fn new() -> Self {
        let mut document = Document::default();
        document.ensure_default_map();
        Self {
            inner: Mutex::new(document),
        }
    }

    pub fn with_demo_data() -> Self {
        Self {
            inner: Mutex::new(demo_document()),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Document> {
        match self.inner.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MapStore for MemoryStore {
    fn load_dataset(&self, map_id: &MapId) -> Result<Dataset, StoreError> {
        self.lock().dataset(map_id)
    }

    fn upsert_layout(
        &self,
        map_id: &MapId,
        stakeholder_id: &StakeholderId,
        x: f32,
        y: f32,
    ) -> Result<(), StoreError> {
        self.lock().upsert_layout(map_id, stakeholder_id, x, y);
        Ok(())
    }

    fn batch_upsert_layouts(
        &self,
        map_id: &MapId,
        entries: &[(StakeholderId, f32, f32)],
    ) -> Result<(), StoreError> {
        let mut guard = self.lock();
        for (stakeholder_id, x, y) in entries {
            guard.upsert_layout(map_id, stakeholder_id, *x, *y);
        }
        Ok(())
    }

    fn archive_stakeholder(&self, id: &StakeholderId) -> Result<(), StoreError> {
        self.lock().archive_stakeholder(id)
    }

    fn create_relationship(&self, draft: RelationshipDraft) -> Result<Relationship, StoreError> {
        self.lock().create_relationship(draft)
    }

    fn update_relationship(
        &self,
        id: &RelationshipId,
        changes: RelationshipChanges,
    ) -> Result<(), StoreError> {
        self.lock().update_relationship(id, changes)
    }

    fn delete_relationship(&self, id: &RelationshipId) -> Result<(), StoreError> {
        self.lock().delete_relationship(id)
    }
}

fn stakeholder(
    id: &str,
    name: &str,
    company: &str,
    seniority: Option<Seniority>,
    sentiment: Sentiment,
    influence: Option<u8>,
) -> Stakeholder {
    Stakeholder {
        id: StakeholderId::new(id),
        name: name.to_owned(),
        company_id: CompanyId::new(company),
        company_name: String::new(),
        seniority,
        sentiment,
        influence,
        status: StakeholderStatus::Active,
    }
}

fn relationship(
    id: &str,
    from: &str,
    to: &str,
    kind: RelationKind,
    strength: u8,
) -> Relationship {
    Relationship {
        id: RelationshipId::new(id),
        from: StakeholderId::new(from),
        to: StakeholderId::new(to),
        kind,
        strength,
        directionality: Default::default(),
        notes: None,
    }
}

pub(in crate::store) fn demo_document() -> Document {
    Document {
        maps: vec![MapRecord {
            id: MapId::new(DEFAULT_MAP_ID),
            name: "Default map".to_owned(),
        }],
        companies: vec![
            Company {
                id: CompanyId::new("c-northwind"),
                name: "Northwind Logistics".to_owned(),
            },
            Company {
                id: CompanyId::new("c-initrode"),
                name: "Initrode Systems".to_owned(),
            },
            Company {
                id: CompanyId::new("c-globex"),
                name: "Globex Partners".to_owned(),
            },
        ],
        stakeholders: vec![
            stakeholder(
                "s-imogen",
                "Imogen Hart",
                "c-northwind",
                Some(Seniority::CLevel),
                Sentiment::Ally,
                Some(5),
            ),
            stakeholder(
                "s-priya",
                "Priya Raman",
                "c-northwind",
                Some(Seniority::Vp),
                Sentiment::Neutral,
                Some(4),
            ),
            stakeholder(
                "s-callum",
                "Callum Reyes",
                "c-northwind",
                Some(Seniority::Manager),
                Sentiment::Opponent,
                Some(2),
            ),
            stakeholder(
                "s-wren",
                "Wren Okafor",
                "c-northwind",
                Some(Seniority::Ic),
                Sentiment::Unknown,
                None,
            ),
            stakeholder(
                "s-tobias",
                "Tobias Lindqvist",
                "c-initrode",
                Some(Seniority::Director),
                Sentiment::Ally,
                Some(3),
            ),
            stakeholder(
                "s-mei",
                "Mei Nakamura",
                "c-initrode",
                None,
                Sentiment::Neutral,
                Some(3),
            ),
            stakeholder(
                "s-aldo",
                "Aldo Ferreira",
                "c-globex",
                Some(Seniority::Vp),
                Sentiment::Opponent,
                Some(4),
            ),
        ],
        relationships: vec![
            relationship("r-1", "s-priya", "s-imogen", RelationKind::ReportsTo, 4),
            relationship("r-2", "s-callum", "s-priya", RelationKind::ReportsTo, 3),
            relationship("r-3", "s-wren", "s-callum", RelationKind::ReportsTo, 3),
            relationship("r-4", "s-tobias", "s-priya", RelationKind::CollaboratesWith, 3),
            relationship("r-5", "s-mei", "s-tobias", RelationKind::Advises, 2),
            relationship("r-6", "s-aldo", "s-imogen", RelationKind::Blocks, 5),
            relationship("r-7", "s-imogen", "s-tobias", RelationKind::Sponsors, 4),
            relationship("r-8", "s-priya", "s-mei", RelationKind::Influences, 2),
        ],
        layouts: Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn demo_dataset_joins_company_names() {
        let store = MemoryStore::with_demo_data();
        let dataset = store.load_dataset(&MapId::new(DEFAULT_MAP_ID)).unwrap();
        assert_eq!(dataset.stakeholders.len(), 7);
        assert!(
            dataset
                .stakeholders
                .iter()
                .all(|stakeholder| !stakeholder.company_name.is_empty())
        );
    }

    #[test]
    fn unknown_map_is_a_not_found() {
        let store = MemoryStore::new();
        let result = store.load_dataset(&MapId::new("nope"));
        assert!(matches!(result, Err(StoreError::NotFound(_))));
    }
}
