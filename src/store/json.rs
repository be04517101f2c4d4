use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::model::{
    Company, Dataset, LayoutEntry, MapId, MapRecord, Relationship, RelationshipId, Stakeholder,
    StakeholderId, StakeholderStatus,
};

use super::{
    MapStore, RelationshipChanges, RelationshipDraft, StoreError, validate_draft,
};

pub(in crate::store) const DEFAULT_MAP_ID: &str = "default";

/// The whole store document. Small enough to rewrite on every mutation,
/// which also gives batch upserts their all-or-nothing behavior for free.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub(in crate::store) struct Document {
    pub maps: Vec<MapRecord>,
    pub companies: Vec<Company>,
    pub stakeholders: Vec<Stakeholder>,
    pub relationships: Vec<Relationship>,
    pub layouts: Vec<LayoutEntry>,
}

impl Document {
    pub fn ensure_default_map(&mut self) {
        if self.maps.is_empty() {
            self.maps.push(MapRecord {
                id: MapId::new(DEFAULT_MAP_ID),
                name: "Default map".to_owned(),
            });
        }
    }

    pub fn dataset(&self, map_id: &MapId) -> Result<Dataset, StoreError> {
        let map = self
            .maps
            .iter()
            .find(|map| &map.id == map_id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(format!("map {map_id}")))?;

        let stakeholders = self
            .stakeholders
            .iter()
            .filter(|stakeholder| stakeholder.status == StakeholderStatus::Active)
            .map(|stakeholder| {
                let mut joined = stakeholder.clone();
                joined.company_name = self
                    .companies
                    .iter()
                    .find(|company| company.id == joined.company_id)
                    .map(|company| company.name.clone())
                    .unwrap_or_default();
                joined
            })
            .collect();

        let layouts = self
            .layouts
            .iter()
            .filter(|entry| &entry.map_id == map_id)
            .cloned()
            .collect();

        Ok(Dataset {
            map,
            companies: self.companies.clone(),
            stakeholders,
            relationships: self.relationships.clone(),
            layouts,
        })
    }

    pub fn upsert_layout(&mut self, map_id: &MapId, stakeholder_id: &StakeholderId, x: f32, y: f32) {
        let existing = self
            .layouts
            .iter_mut()
            .find(|entry| &entry.map_id == map_id && &entry.stakeholder_id == stakeholder_id);
        match existing {
            Some(entry) => {
                entry.x = x;
                entry.y = y;
            }
            None => self.layouts.push(LayoutEntry {
                map_id: map_id.clone(),
                stakeholder_id: stakeholder_id.clone(),
                x,
                y,
                zoom: None,
            }),
        }
    }

    pub fn archive_stakeholder(&mut self, id: &StakeholderId) -> Result<(), StoreError> {
        let stakeholder = self
            .stakeholders
            .iter_mut()
            .find(|stakeholder| &stakeholder.id == id)
            .ok_or_else(|| StoreError::NotFound(format!("stakeholder {id}")))?;
        stakeholder.status = StakeholderStatus::Archived;
        Ok(())
    }

    pub fn create_relationship(
        &mut self,
        draft: RelationshipDraft,
    ) -> Result<Relationship, StoreError> {
        validate_draft(&draft)?;

        for endpoint in [&draft.from, &draft.to] {
            if !self
                .stakeholders
                .iter()
                .any(|stakeholder| &stakeholder.id == endpoint)
            {
                return Err(StoreError::NotFound(format!("stakeholder {endpoint}")));
            }
        }

        let duplicate = self.relationships.iter().any(|existing| {
            existing.from == draft.from && existing.to == draft.to && existing.kind == draft.kind
        });
        if duplicate {
            return Err(StoreError::Conflict(format!(
                "a {} relationship from {} to {} already exists",
                draft.kind.label(),
                draft.from,
                draft.to
            )));
        }

        let relationship = Relationship {
            id: RelationshipId::new(Uuid::new_v4().to_string()),
            from: draft.from,
            to: draft.to,
            kind: draft.kind,
            strength: draft.strength,
            directionality: draft.directionality,
            notes: draft.notes,
        };
        self.relationships.push(relationship.clone());
        Ok(relationship)
    }

    pub fn update_relationship(
        &mut self,
        id: &RelationshipId,
        changes: RelationshipChanges,
    ) -> Result<(), StoreError> {
        let index = self
            .relationships
            .iter()
            .position(|relationship| &relationship.id == id)
            .ok_or_else(|| StoreError::NotFound(format!("relationship {id}")))?;

        let mut updated = self.relationships[index].clone();
        if let Some(kind) = changes.kind {
            updated.kind = kind;
        }
        if let Some(strength) = changes.strength {
            if !(1..=5).contains(&strength) {
                return Err(StoreError::Validation(format!(
                    "strength must be between 1 and 5, got {strength}"
                )));
            }
            updated.strength = strength;
        }
        if let Some(directionality) = changes.directionality {
            updated.directionality = directionality;
        }
        if let Some(notes) = changes.notes {
            updated.notes = notes;
        }

        let duplicate = self.relationships.iter().enumerate().any(|(i, existing)| {
            i != index
                && existing.from == updated.from
                && existing.to == updated.to
                && existing.kind == updated.kind
        });
        if duplicate {
            return Err(StoreError::Conflict(format!(
                "a {} relationship from {} to {} already exists",
                updated.kind.label(),
                updated.from,
                updated.to
            )));
        }

        self.relationships[index] = updated;
        Ok(())
    }

    pub fn delete_relationship(&mut self, id: &RelationshipId) -> Result<(), StoreError> {
        let before = self.relationships.len();
        self.relationships.retain(|relationship| &relationship.id != id);
        if self.relationships.len() == before {
            return Err(StoreError::NotFound(format!("relationship {id}")));
        }
        Ok(())
    }
}

/// JSON-document store on local disk. Every mutation is applied to a copy
/// of the document, flushed atomically (temp file + rename), and only then
/// committed to memory, so a failed write leaves the prior state standing.
pub struct JsonFileStore {
    path: PathBuf,
    inner: Mutex<Document>,
}

impl JsonFileStore {
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        let mut document = if path.exists() {
            let raw = std::fs::read_to_string(&path)?;
            serde_json::from_str(&raw)?
        } else {
            Document::default()
        };

        let had_default = !document.maps.is_empty();
        document.ensure_default_map();
        if !path.exists() || !had_default {
            persist(&path, &document)?;
        }

        Ok(Self {
            path,
            inner: Mutex::new(document),
        })
    }

    fn lock(&self) -> MutexGuard<'_, Document> {
        match self.inner.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    fn mutate<T>(
        &self,
        op: impl FnOnce(&mut Document) -> Result<T, StoreError>,
    ) -> Result<T, StoreError> {
        let mut guard = self.lock();
        let mut draft = guard.clone();
        let value = op(&mut draft)?;
        persist(&self.path, &draft)?;
        *guard = draft;
        Ok(value)
    }
}

fn persist(path: &Path, document: &Document) -> Result<(), StoreError> {
    let encoded = serde_json::to_vec_pretty(document)?;
    let tmp = path.with_extension("json.tmp");
    std::fs::write(&tmp, &encoded)?;
    std::fs::rename(&tmp, path)?;
    Ok(())
}

impl MapStore for JsonFileStore {
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
        self.mutate(|document| {
            document.upsert_layout(map_id, stakeholder_id, x, y);
            Ok(())
        })
    }

    fn batch_upsert_layouts(
        &self,
        map_id: &MapId,
        entries: &[(StakeholderId, f32, f32)],
    ) -> Result<(), StoreError> {
        self.mutate(|document| {
            for (stakeholder_id, x, y) in entries {
                document.upsert_layout(map_id, stakeholder_id, *x, *y);
            }
            Ok(())
        })
    }

    fn archive_stakeholder(&self, id: &StakeholderId) -> Result<(), StoreError> {
        self.mutate(|document| document.archive_stakeholder(id))
    }

    fn create_relationship(&self, draft: RelationshipDraft) -> Result<Relationship, StoreError> {
        self.mutate(|document| document.create_relationship(draft))
    }

    fn update_relationship(
        &self,
        id: &RelationshipId,
        changes: RelationshipChanges,
    ) -> Result<(), StoreError> {
        self.mutate(|document| document.update_relationship(id, changes))
    }

    fn delete_relationship(&self, id: &RelationshipId) -> Result<(), StoreError> {
        self.mutate(|document| document.delete_relationship(id))
    }
}

#[cfg(test)]
mod tests {
    use crate::model::{RelationKind, Sentiment};

    use super::super::memory::demo_document;
    use super::*;

    fn store_in(dir: &tempfile::TempDir) -> JsonFileStore {
        let path = dir.path().join("relmap-data.json");
        let store = JsonFileStore::open(&path).unwrap();
        *store.inner.lock().unwrap() = demo_document();
        store
    }

    fn default_map() -> MapId {
        MapId::new(DEFAULT_MAP_ID)
    }

    #[test]
    fn open_creates_a_default_map() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("fresh.json");
        let store = JsonFileStore::open(&path).unwrap();
        let dataset = store.load_dataset(&default_map()).unwrap();
        assert_eq!(dataset.map.id, default_map());
        assert!(path.exists());
    }

    #[test]
    fn layout_upsert_is_keyed_on_map_and_stakeholder() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        let map = default_map();
        let stakeholder = StakeholderId::new("s-imogen");

        store.upsert_layout(&map, &stakeholder, 5.0, 5.0).unwrap();
        store.upsert_layout(&map, &stakeholder, -3.0, 12.5).unwrap();

        let dataset = store.load_dataset(&map).unwrap();
        let entries = dataset
            .layouts
            .iter()
            .filter(|entry| entry.stakeholder_id == stakeholder)
            .collect::<Vec<_>>();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].x, -3.0);
        assert_eq!(entries[0].y, 12.5);
    }

    #[test]
    fn batch_upsert_lands_every_entry() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        let map = default_map();
        let entries = vec![
            (StakeholderId::new("s-imogen"), 10.0, 20.0),
            (StakeholderId::new("s-priya"), -40.0, 8.0),
        ];

        store.batch_upsert_layouts(&map, &entries).unwrap();

        let dataset = store.load_dataset(&map).unwrap();
        for (stakeholder_id, x, y) in &entries {
            let entry = dataset
                .layouts
                .iter()
                .find(|entry| &entry.stakeholder_id == stakeholder_id)
                .unwrap();
            assert_eq!((entry.x, entry.y), (*x, *y));
        }
    }

    #[test]
    fn archived_stakeholders_drop_out_of_the_dataset() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        let map = default_map();
        let target = StakeholderId::new("s-imogen");

        store.archive_stakeholder(&target).unwrap();

        let dataset = store.load_dataset(&map).unwrap();
        assert!(dataset.stakeholder(&target).is_none());
    }

    #[test]
    fn self_relationships_are_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        let result = store.create_relationship(RelationshipDraft {
            from: StakeholderId::new("s-imogen"),
            to: StakeholderId::new("s-imogen"),
            kind: RelationKind::PeerOf,
            strength: 3,
            directionality: Default::default(),
            notes: None,
        });
        assert!(matches!(result, Err(StoreError::Validation(_))));
    }

    #[test]
    fn duplicate_triples_are_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        let draft = RelationshipDraft {
            from: StakeholderId::new("s-imogen"),
            to: StakeholderId::new("s-priya"),
            kind: RelationKind::Advises,
            strength: 2,
            directionality: Default::default(),
            notes: None,
        };
        store.create_relationship(draft.clone()).unwrap();
        let result = store.create_relationship(draft);
        assert!(matches!(result, Err(StoreError::Conflict(_))));
    }

    #[test]
    fn documents_survive_a_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("persisted.json");
        let map = default_map();
        {
            let store = JsonFileStore::open(&path).unwrap();
            *store.inner.lock().unwrap() = demo_document();
            store
                .upsert_layout(&map, &StakeholderId::new("s-imogen"), 1.0, 2.0)
                .unwrap();
        }

        let reopened = JsonFileStore::open(&path).unwrap();
        let dataset = reopened.load_dataset(&map).unwrap();
        let entry = dataset
            .layouts
            .iter()
            .find(|entry| entry.stakeholder_id == StakeholderId::new("s-imogen"))
            .unwrap();
        assert_eq!((entry.x, entry.y), (1.0, 2.0));
        assert!(
            dataset
                .stakeholders
                .iter()
                .all(|s| s.sentiment != Sentiment::Unknown || !s.company_name.is_empty())
        );
    }
}
