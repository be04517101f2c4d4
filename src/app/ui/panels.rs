use std::path::Path;

use eframe::egui::{self, Align, Color32, Context, Layout, Vec2};

use crate::model::Dataset;

use super::super::layout_store::LayoutStore;
use super::super::materialize::MaterializeOptions;
use super::super::{
    JobEffect, JobRunner, MenuTarget, Notice, RelationshipForm, ViewModel, cluster, export,
};

impl ViewModel {
    pub(in crate::app) fn new(dataset: Dataset, jobs: JobRunner) -> Self {
        let layout = LayoutStore::from_entries(dataset.map.id.clone(), &dataset.layouts);
        Self {
            dataset,
            layout,
            jobs,
            options: MaterializeOptions::default(),
            search: String::new(),
            company_filter: None,
            sentiment_filter: None,
            show_hulls: true,
            selected: None,
            focus_active: false,
            context_menu: None,
            drag: None,
            form: RelationshipForm::default(),
            notice: None,
            pan: Vec2::ZERO,
            zoom: 1.0,
            graph_dirty: true,
            graph_cache: None,
            visible_node_count: 0,
            visible_edge_count: 0,
        }
    }

    /// Swaps in freshly loaded data while keeping the camera, filters, and
    /// form intact. References into the old dataset that no longer resolve
    /// are dropped rather than left dangling.
    pub(in crate::app) fn replace_dataset(&mut self, dataset: Dataset) {
        self.layout = LayoutStore::from_entries(dataset.map.id.clone(), &dataset.layouts);

        if let Some(id) = &self.selected
            && dataset.stakeholder(id).is_none()
        {
            self.selected = None;
            self.focus_active = false;
        }
        if let Some(filter) = &self.company_filter
            && !dataset.companies.iter().any(|company| &company.id == filter)
        {
            self.company_filter = None;
        }
        if let Some(menu) = &self.context_menu {
            let stale = match &menu.target {
                MenuTarget::Node(id) => dataset.stakeholder(id).is_none(),
                MenuTarget::Edge(id) => dataset.relationship(id).is_none(),
            };
            if stale {
                self.context_menu = None;
            }
        }
        self.drag = None;

        self.dataset = dataset;
        self.graph_dirty = true;
    }

    pub(in crate::app) fn set_notice(&mut self, text: impl Into<String>, is_error: bool) {
        self.notice = Some(Notice {
            text: text.into(),
            is_error,
        });
    }

    pub(in crate::app) fn show(
        &mut self,
        ctx: &Context,
        export_dir: &Path,
        reload_requested: &mut bool,
        is_loading: bool,
    ) {
        let mut dismiss_notice = false;

        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.heading(self.dataset.map.name.clone());
                ui.separator();

                if ui
                    .add_enabled(!is_loading, egui::Button::new("Reload"))
                    .clicked()
                {
                    *reload_requested = true;
                }
                if is_loading {
                    ui.spinner();
                }

                if ui.button("Cluster by company").clicked() {
                    self.cluster_by_company();
                }
                if ui.button("Export CSV").clicked() {
                    self.export_csv(export_dir);
                }
                if ui.button("Snapshot PNG").clicked() {
                    export::request_snapshot(ctx);
                }

                ui.with_layout(Layout::right_to_left(Align::Center), |ui| {
                    ui.label(format!(
                        "{} stakeholders, {} relationships",
                        self.visible_node_count, self.visible_edge_count
                    ));
                    if let Some(notice) = &self.notice {
                        if ui.small_button("\u{2715}").clicked() {
                            dismiss_notice = true;
                        }
                        let color = if notice.is_error {
                            Color32::from_rgb(235, 100, 100)
                        } else {
                            Color32::from_rgb(120, 200, 140)
                        };
                        ui.colored_label(color, &notice.text);
                    }
                });
            });
        });

        if dismiss_notice {
            self.notice = None;
        }

        egui::SidePanel::left("controls")
            .default_width(230.0)
            .show(ctx, |ui| {
                egui::ScrollArea::vertical().show(ui, |ui| {
                    self.draw_controls(ui);
                });
            });

        egui::SidePanel::right("details")
            .default_width(280.0)
            .show(ctx, |ui| {
                egui::ScrollArea::vertical().show(ui, |ui| {
                    self.draw_details(ui);
                });
            });

        egui::CentralPanel::default().show(ctx, |ui| {
            self.draw_graph(ui);
        });
    }

    /// Deterministic full relayout over every active stakeholder. The
    /// placements go through the atomic batch upsert and the map reloads on
    /// success; nothing moves locally until the store confirms.
    fn cluster_by_company(&mut self) {
        let placements = cluster::cluster_by_company(&self.dataset.stakeholders);
        if placements.is_empty() {
            return;
        }

        let map_id = self.layout.map_id().clone();
        let entries = placements
            .into_iter()
            .map(|(id, position)| (id, position.x, position.y))
            .collect::<Vec<_>>();
        self.jobs
            .submit("Clustering layout", JobEffect::Reload, move |store| {
                store.batch_upsert_layouts(&map_id, &entries)
            });
    }

    fn export_csv(&mut self, export_dir: &Path) {
        if self.graph_dirty {
            self.rebuild_render_graph();
        }
        let result = self
            .graph_cache
            .as_ref()
            .map(|graph| export::write_csv_exports(export_dir, graph));
        match result {
            Some(Ok(_)) => {
                self.set_notice(format!("CSV exported to {}", export_dir.display()), false);
            }
            Some(Err(error)) => {
                tracing::warn!(%error, "csv export failed");
                self.set_notice(format!("Export failed: {error:#}"), true);
            }
            None => {}
        }
    }
}
