use eframe::egui::{self, RichText, Ui, Vec2};

use crate::model::{RelationKind, Seniority, Sentiment};

use super::super::ViewModel;
use super::super::style::{NodeShape, relation_style, seniority_shape, sentiment_fill};

fn shape_name(shape: NodeShape) -> &'static str {
    match shape {
        NodeShape::Hexagon => "hexagon",
        NodeShape::Triangle => "triangle",
        NodeShape::Diamond => "diamond",
        NodeShape::Square => "square",
        NodeShape::Circle => "circle",
        NodeShape::Rounded => "rounded box",
    }
}

impl ViewModel {
    pub(in crate::app) fn draw_controls(&mut self, ui: &mut Ui) {
        ui.heading("Filters");
        ui.add_space(4.0);

        if ui.text_edit_singleline(&mut self.search).changed() {
            self.graph_dirty = true;
        }

        let company_before = self.company_filter.clone();
        let company_text = self
            .company_filter
            .as_ref()
            .and_then(|filter| {
                self.dataset
                    .companies
                    .iter()
                    .find(|company| &company.id == filter)
            })
            .map(|company| company.name.clone())
            .unwrap_or_else(|| "All companies".to_owned());
        egui::ComboBox::from_label("Company")
            .selected_text(company_text)
            .show_ui(ui, |ui| {
                ui.selectable_value(&mut self.company_filter, None, "All companies");
                for company in &self.dataset.companies {
                    ui.selectable_value(
                        &mut self.company_filter,
                        Some(company.id.clone()),
                        &company.name,
                    );
                }
            });
        if self.company_filter != company_before {
            self.graph_dirty = true;
        }

        let sentiment_before = self.sentiment_filter;
        let sentiment_text = self
            .sentiment_filter
            .map(|sentiment| sentiment.label())
            .unwrap_or("All sentiments");
        egui::ComboBox::from_label("Sentiment")
            .selected_text(sentiment_text)
            .show_ui(ui, |ui| {
                ui.selectable_value(&mut self.sentiment_filter, None, "All sentiments");
                for sentiment in Sentiment::ALL {
                    ui.selectable_value(
                        &mut self.sentiment_filter,
                        Some(sentiment),
                        sentiment.label(),
                    );
                }
            });
        if self.sentiment_filter != sentiment_before {
            self.graph_dirty = true;
        }

        ui.add_space(8.0);
        ui.separator();
        ui.heading("Display");
        ui.add_space(4.0);

        ui.checkbox(&mut self.show_hulls, "Company hulls");
        if ui
            .checkbox(
                &mut self.options.suppress_company_rows,
                "Hide company placeholder rows",
            )
            .changed()
        {
            self.graph_dirty = true;
        }

        ui.add_space(4.0);
        if ui.button("Reset view").clicked() {
            self.pan = Vec2::ZERO;
            self.zoom = 1.0;
        }
        if ui.button("Clear selection").clicked() {
            self.selected = None;
            self.focus_active = false;
            self.context_menu = None;
        }

        ui.add_space(8.0);
        ui.separator();

        egui::CollapsingHeader::new("Legend")
            .default_open(true)
            .show(ui, |ui| {
                ui.label(RichText::new("Sentiment").strong());
                for sentiment in Sentiment::ALL {
                    ui.colored_label(sentiment_fill(sentiment), sentiment.label());
                }

                ui.add_space(4.0);
                ui.label(RichText::new("Seniority").strong());
                for seniority in Seniority::ALL {
                    ui.label(format!(
                        "{} \u{2013} {}",
                        seniority.label(),
                        shape_name(seniority_shape(Some(seniority)))
                    ));
                }
                ui.label(format!(
                    "unset \u{2013} {}",
                    shape_name(seniority_shape(None))
                ));

                ui.add_space(4.0);
                ui.label(RichText::new("Relationship").strong());
                for kind in RelationKind::ALL {
                    let style = relation_style(kind);
                    let suffix = if style.dashed { " (dashed)" } else { "" };
                    ui.colored_label(style.color, format!("{}{suffix}", kind.label()));
                }
            });
    }
}
