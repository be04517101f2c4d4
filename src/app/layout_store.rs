use std::collections::{HashMap, HashSet};

use eframe::egui::{Vec2, vec2};

use crate::geometry::{FALLBACK_RING_RADIUS, radial_fallback};
use crate::model::{LayoutEntry, MapId, StakeholderId};

/// In-memory view of one map's layout entries. `resolve` is total: every
/// stakeholder gets a position, persisted or not. Local writes are applied
/// optimistically and never rolled back when the matching upsert fails;
/// the next full reload reconciles any divergence.
pub struct LayoutStore {
    map_id: MapId,
    positions: HashMap<StakeholderId, Vec2>,
    persisted: HashSet<StakeholderId>,
}

impl LayoutStore {
    pub fn from_entries(map_id: MapId, entries: &[LayoutEntry]) -> Self {
        let mut positions = HashMap::with_capacity(entries.len());
        let mut persisted = HashSet::with_capacity(entries.len());
        for entry in entries {
            if entry.map_id != map_id {
                continue;
            }
            positions.insert(entry.stakeholder_id.clone(), vec2(entry.x, entry.y));
            persisted.insert(entry.stakeholder_id.clone());
        }
        Self {
            map_id,
            positions,
            persisted,
        }
    }

    pub fn map_id(&self) -> &MapId {
        &self.map_id
    }

    /// Position for the stakeholder at `index` of `total` in the filtered
    /// list: the stored position if one exists, else the deterministic
    /// radial fallback slot.
    pub fn resolve(&self, id: &StakeholderId, index: usize, total: usize) -> Vec2 {
        self.positions
            .get(id)
            .copied()
            .unwrap_or_else(|| radial_fallback(index, total, FALLBACK_RING_RADIUS))
    }

    pub fn is_persisted(&self, id: &StakeholderId) -> bool {
        self.persisted.contains(id)
    }

    /// Tracks an in-progress drag without touching the persisted set.
    pub fn set_local(&mut self, id: &StakeholderId, position: Vec2) {
        self.positions.insert(id.clone(), position);
    }

    /// Optimistic commit at drag end. The caller hands the returned payload
    /// to the persistence worker; per-stakeholder keying means independent
    /// commits may complete out of order without touching other entries.
    pub fn commit(&mut self, id: &StakeholderId, position: Vec2) -> (MapId, StakeholderId, f32, f32) {
        self.positions.insert(id.clone(), position);
        self.persisted.insert(id.clone());
        (self.map_id.clone(), id.clone(), position.x, position.y)
    }

    #[cfg(test)]
    fn position(&self, id: &StakeholderId) -> Option<Vec2> {
        self.positions.get(id).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(stakeholder: &str, x: f32, y: f32) -> LayoutEntry {
        LayoutEntry {
            map_id: MapId::new("default"),
            stakeholder_id: StakeholderId::new(stakeholder),
            x,
            y,
            zoom: None,
        }
    }

    fn store(entries: &[LayoutEntry]) -> LayoutStore {
        LayoutStore::from_entries(MapId::new("default"), entries)
    }

    #[test]
    fn resolve_is_total_with_and_without_entries() {
        let store = store(&[entry("s-a", 10.0, 20.0)]);
        assert_eq!(store.resolve(&StakeholderId::new("s-a"), 0, 4), vec2(10.0, 20.0));

        let fallback = store.resolve(&StakeholderId::new("s-b"), 1, 4);
        assert!((fallback.length() - FALLBACK_RING_RADIUS).abs() < 0.01);
    }

    #[test]
    fn entries_from_other_maps_are_ignored() {
        let foreign = LayoutEntry {
            map_id: MapId::new("other"),
            ..entry("s-a", 10.0, 20.0)
        };
        let store = store(&[foreign]);
        assert!(!store.is_persisted(&StakeholderId::new("s-a")));
    }

    #[test]
    fn commit_marks_persisted_and_keeps_the_last_write() {
        let mut store = store(&[]);
        let id = StakeholderId::new("s-a");
        assert!(!store.is_persisted(&id));

        store.commit(&id, vec2(5.0, 5.0));
        let (map_id, stakeholder_id, x, y) = store.commit(&id, vec2(-8.0, 3.0));

        assert!(store.is_persisted(&id));
        assert_eq!(store.position(&id), Some(vec2(-8.0, 3.0)));
        assert_eq!(map_id, MapId::new("default"));
        assert_eq!(stakeholder_id, id);
        assert_eq!((x, y), (-8.0, 3.0));
    }

    #[test]
    fn commits_to_one_entry_never_touch_another() {
        let mut store = store(&[entry("s-a", 1.0, 1.0), entry("s-b", 2.0, 2.0)]);
        let a = StakeholderId::new("s-a");
        let b = StakeholderId::new("s-b");

        // Out-of-order completion of independent drags: the entries are
        // keyed per stakeholder, so there is no cross-entry race.
        store.commit(&b, vec2(50.0, 60.0));
        store.commit(&a, vec2(-9.0, -9.0));

        assert_eq!(store.position(&a), Some(vec2(-9.0, -9.0)));
        assert_eq!(store.position(&b), Some(vec2(50.0, 60.0)));
    }

    #[test]
    fn set_local_does_not_mark_persisted() {
        let mut store = store(&[]);
        let id = StakeholderId::new("s-a");
        store.set_local(&id, vec2(7.0, 7.0));
        assert!(!store.is_persisted(&id));
        assert_eq!(store.resolve(&id, 0, 1), vec2(7.0, 7.0));
    }
}
