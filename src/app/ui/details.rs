use eframe::egui::{self, Color32, RichText, Ui};

use crate::model::{Directionality, RelationKind, Relationship, StakeholderId};
use crate::store::{RelationshipChanges, RelationshipDraft};

use super::super::style::sentiment_fill;
use super::super::{JobEffect, RelationshipForm, ViewModel};

impl ViewModel {
    pub(in crate::app) fn draw_details(&mut self, ui: &mut Ui) {
        ui.heading("Stakeholder");
        ui.add_space(4.0);

        let selected = self
            .selected
            .as_ref()
            .and_then(|id| self.dataset.stakeholder(id))
            .cloned();

        let mut pending_tap: Option<StakeholderId> = None;
        let mut archive: Option<StakeholderId> = None;
        let mut edit_relationship: Option<Relationship> = None;

        match selected {
            None => {
                ui.label("Select a stakeholder on the map.");
            }
            Some(stakeholder) => {
                ui.label(RichText::new(&stakeholder.name).strong());
                ui.label(&stakeholder.company_name);
                ui.colored_label(
                    sentiment_fill(stakeholder.sentiment),
                    stakeholder.sentiment.label(),
                );
                if let Some(seniority) = stakeholder.seniority {
                    ui.label(seniority.label());
                }
                if let Some(influence) = stakeholder.influence {
                    ui.label(format!("Influence {influence}/5"));
                }
                if !self.layout.is_persisted(&stakeholder.id) {
                    ui.weak("Position not pinned; drag the node to save one.");
                }

                ui.add_space(4.0);
                ui.horizontal(|ui| {
                    let focus_label = if self.focus_active { "Unfocus" } else { "Focus" };
                    if ui.button(focus_label).clicked() {
                        self.focus_active = !self.focus_active;
                    }
                    if ui.button("Archive").clicked() {
                        archive = Some(stakeholder.id.clone());
                    }
                });

                ui.add_space(6.0);
                ui.label(RichText::new("Relationships").strong());
                for relationship in &self.dataset.relationships {
                    let other = if relationship.from == stakeholder.id {
                        Some((&relationship.to, "\u{2192}"))
                    } else if relationship.to == stakeholder.id {
                        Some((&relationship.from, "\u{2190}"))
                    } else {
                        None
                    };
                    let Some((other_id, arrow)) = other else {
                        continue;
                    };
                    let other_name = self
                        .dataset
                        .stakeholder(other_id)
                        .map(|other| other.name.as_str())
                        .unwrap_or(other_id.as_str());

                    ui.horizontal(|ui| {
                        ui.label(format!("{arrow} {}", relationship.kind.label()));
                        if ui.link(other_name).clicked() {
                            pending_tap = Some(other_id.clone());
                        }
                        if ui.small_button("edit").clicked() {
                            edit_relationship = Some(relationship.clone());
                        }
                    });
                }
            }
        }

        if let Some(id) = archive {
            let target = id.clone();
            self.jobs
                .submit("Archiving stakeholder", JobEffect::Reload, move |store| {
                    store.archive_stakeholder(&target)
                });
            if self.selected.as_ref() == Some(&id) {
                self.selected = None;
                self.focus_active = false;
            }
        }
        if let Some(id) = pending_tap {
            self.apply_tap(Some(id));
        }
        if let Some(relationship) = edit_relationship {
            self.load_relationship_form(&relationship);
        }

        ui.add_space(10.0);
        ui.separator();
        self.draw_relationship_form(ui);
    }

    pub(in crate::app) fn load_relationship_form(&mut self, relationship: &Relationship) {
        self.form = RelationshipForm {
            editing: Some(relationship.id.clone()),
            from: Some(relationship.from.clone()),
            to: Some(relationship.to.clone()),
            kind: relationship.kind,
            strength: relationship.strength,
            directionality: relationship.directionality,
            notes: relationship.notes.clone().unwrap_or_default(),
            error: None,
        };
    }

    fn draw_relationship_form(&mut self, ui: &mut Ui) {
        let editing = self.form.editing.is_some();
        ui.heading(if editing {
            "Edit relationship"
        } else {
            "New relationship"
        });
        ui.add_space(4.0);

        let from_text = self
            .form
            .from
            .as_ref()
            .and_then(|id| self.dataset.stakeholder(id))
            .map(|stakeholder| stakeholder.name.clone())
            .unwrap_or_else(|| "Pick\u{2026}".to_owned());
        let to_text = self
            .form
            .to
            .as_ref()
            .and_then(|id| self.dataset.stakeholder(id))
            .map(|stakeholder| stakeholder.name.clone())
            .unwrap_or_else(|| "Pick\u{2026}".to_owned());

        // Endpoints are immutable once a relationship exists; only the
        // descriptive fields stay editable.
        ui.add_enabled_ui(!editing, |ui| {
            egui::ComboBox::from_label("From")
                .selected_text(from_text)
                .show_ui(ui, |ui| {
                    for stakeholder in &self.dataset.stakeholders {
                        ui.selectable_value(
                            &mut self.form.from,
                            Some(stakeholder.id.clone()),
                            &stakeholder.name,
                        );
                    }
                });
            egui::ComboBox::from_label("To")
                .selected_text(to_text)
                .show_ui(ui, |ui| {
                    for stakeholder in &self.dataset.stakeholders {
                        ui.selectable_value(
                            &mut self.form.to,
                            Some(stakeholder.id.clone()),
                            &stakeholder.name,
                        );
                    }
                });
        });

        egui::ComboBox::from_label("Type")
            .selected_text(self.form.kind.label())
            .show_ui(ui, |ui| {
                for kind in RelationKind::ALL {
                    ui.selectable_value(&mut self.form.kind, kind, kind.label());
                }
            });

        ui.add(egui::Slider::new(&mut self.form.strength, 1..=5).text("Strength"));

        let mut bidirectional = self.form.directionality == Directionality::Bidirectional;
        if ui.checkbox(&mut bidirectional, "Bidirectional").changed() {
            self.form.directionality = if bidirectional {
                Directionality::Bidirectional
            } else {
                Directionality::Directional
            };
        }

        ui.label("Notes");
        ui.text_edit_multiline(&mut self.form.notes);

        if let Some(error) = &self.form.error {
            ui.colored_label(Color32::from_rgb(235, 100, 100), error);
        }

        ui.horizontal(|ui| {
            if ui.button("Save").clicked() {
                self.submit_relationship_form();
            }
            if ui.button("Cancel").clicked() {
                self.form = RelationshipForm::default();
            }
        });
    }

    /// Validates and submits the form. A self-link is rejected right here,
    /// before any store call is made; the form keeps its values so the user
    /// can correct the endpoints.
    pub(in crate::app) fn submit_relationship_form(&mut self) {
        let (Some(from), Some(to)) = (self.form.from.clone(), self.form.to.clone()) else {
            self.form.error = Some("Pick both endpoints first.".to_owned());
            return;
        };
        if self.form.editing.is_none() && from == to {
            self.form.error =
                Some("A relationship cannot link a stakeholder to itself.".to_owned());
            return;
        }

        let notes = {
            let trimmed = self.form.notes.trim();
            (!trimmed.is_empty()).then(|| trimmed.to_owned())
        };

        match self.form.editing.clone() {
            Some(id) => {
                let changes = RelationshipChanges {
                    kind: Some(self.form.kind),
                    strength: Some(self.form.strength),
                    directionality: Some(self.form.directionality),
                    notes: Some(notes),
                };
                self.jobs
                    .submit("Updating relationship", JobEffect::Reload, move |store| {
                        store.update_relationship(&id, changes)
                    });
            }
            None => {
                let draft = RelationshipDraft {
                    from,
                    to,
                    kind: self.form.kind,
                    strength: self.form.strength,
                    directionality: self.form.directionality,
                    notes,
                };
                self.jobs
                    .submit("Creating relationship", JobEffect::Reload, move |store| {
                        store.create_relationship(draft).map(|_| ())
                    });
            }
        }

        self.form = RelationshipForm::default();
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::mpsc::{self, Receiver};
    use std::time::Duration;

    use crate::model::{
        Dataset, Directionality, MapId, MapRecord, RelationKind, Relationship, RelationshipId,
        StakeholderId,
    };
    use crate::store::{
        MapStore, RelationshipChanges, RelationshipDraft, StoreError,
    };

    use super::super::super::{JobEffect, JobOutcome, JobRunner, ViewModel};

    /// Store double that counts every mutating call it receives.
    #[derive(Default)]
    struct CountingStore {
        creates: AtomicUsize,
        updates: AtomicUsize,
        deletes: AtomicUsize,
    }

    impl MapStore for CountingStore {
        fn load_dataset(&self, map_id: &MapId) -> Result<Dataset, StoreError> {
            Ok(Dataset {
                map: MapRecord {
                    id: map_id.clone(),
                    name: "Test map".to_owned(),
                },
                companies: Vec::new(),
                stakeholders: Vec::new(),
                relationships: Vec::new(),
                layouts: Vec::new(),
            })
        }

        fn upsert_layout(
            &self,
            _map_id: &MapId,
            _stakeholder_id: &StakeholderId,
            _x: f32,
            _y: f32,
        ) -> Result<(), StoreError> {
            Ok(())
        }

        fn batch_upsert_layouts(
            &self,
            _map_id: &MapId,
            _entries: &[(StakeholderId, f32, f32)],
        ) -> Result<(), StoreError> {
            Ok(())
        }

        fn archive_stakeholder(&self, _id: &StakeholderId) -> Result<(), StoreError> {
            Ok(())
        }

        fn create_relationship(
            &self,
            draft: RelationshipDraft,
        ) -> Result<Relationship, StoreError> {
            self.creates.fetch_add(1, Ordering::SeqCst);
            Ok(Relationship {
                id: RelationshipId::new("r-created"),
                from: draft.from,
                to: draft.to,
                kind: draft.kind,
                strength: draft.strength,
                directionality: draft.directionality,
                notes: draft.notes,
            })
        }

        fn update_relationship(
            &self,
            _id: &RelationshipId,
            _changes: RelationshipChanges,
        ) -> Result<(), StoreError> {
            self.updates.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }

        fn delete_relationship(&self, _id: &RelationshipId) -> Result<(), StoreError> {
            self.deletes.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    fn model_with(counting: Arc<CountingStore>) -> (ViewModel, Receiver<JobOutcome>) {
        let store: Arc<dyn MapStore> = counting;
        let dataset = store.load_dataset(&MapId::new("default")).unwrap();
        let (tx, rx) = mpsc::channel();
        (ViewModel::new(dataset, JobRunner { store, tx }), rx)
    }

    #[test]
    fn self_link_is_rejected_without_any_store_call() {
        let counting = Arc::new(CountingStore::default());
        let (mut model, _rx) = model_with(Arc::clone(&counting));

        model.form.from = Some(StakeholderId::new("s-1"));
        model.form.to = Some(StakeholderId::new("s-1"));
        model.submit_relationship_form();

        assert!(model.form.error.is_some());
        assert_eq!(counting.creates.load(Ordering::SeqCst), 0);
        assert_eq!(counting.updates.load(Ordering::SeqCst), 0);
        // The entered values stay so the user can correct them.
        assert_eq!(model.form.from, Some(StakeholderId::new("s-1")));
        assert_eq!(model.form.to, Some(StakeholderId::new("s-1")));
    }

    #[test]
    fn missing_endpoints_are_rejected_locally() {
        let counting = Arc::new(CountingStore::default());
        let (mut model, _rx) = model_with(Arc::clone(&counting));

        model.form.from = Some(StakeholderId::new("s-1"));
        model.submit_relationship_form();

        assert!(model.form.error.is_some());
        assert_eq!(counting.creates.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn valid_draft_creates_once_and_requests_a_reload() {
        let counting = Arc::new(CountingStore::default());
        let (mut model, rx) = model_with(Arc::clone(&counting));

        model.form.from = Some(StakeholderId::new("s-1"));
        model.form.to = Some(StakeholderId::new("s-2"));
        model.form.kind = RelationKind::Advises;
        model.form.notes = "  quarterly sync  ".to_owned();
        model.submit_relationship_form();

        let outcome = rx.recv_timeout(Duration::from_secs(5)).unwrap();
        assert_eq!(outcome.result, Ok(JobEffect::Reload));
        assert_eq!(counting.creates.load(Ordering::SeqCst), 1);

        // Form resets after a successful submit.
        assert!(model.form.error.is_none());
        assert_eq!(model.form.from, None);
        assert_eq!(model.form.to, None);
        assert_eq!(model.form.directionality, Directionality::Directional);
    }

    #[test]
    fn editing_goes_through_update_with_endpoints_untouched() {
        let counting = Arc::new(CountingStore::default());
        let (mut model, rx) = model_with(Arc::clone(&counting));

        model.load_relationship_form(&Relationship {
            id: RelationshipId::new("r-1"),
            from: StakeholderId::new("s-1"),
            to: StakeholderId::new("s-2"),
            kind: RelationKind::PeerOf,
            strength: 2,
            directionality: Directionality::Directional,
            notes: None,
        });
        model.form.strength = 5;
        model.submit_relationship_form();

        let outcome = rx.recv_timeout(Duration::from_secs(5)).unwrap();
        assert_eq!(outcome.result, Ok(JobEffect::Reload));
        assert_eq!(counting.updates.load(Ordering::SeqCst), 1);
        assert_eq!(counting.creates.load(Ordering::SeqCst), 0);
    }
}
