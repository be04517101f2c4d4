use std::collections::HashMap;

use eframe::egui::{
    self, Align2, Color32, FontId, Pos2, RichText, Sense, Stroke, Ui, Vec2, pos2, vec2,
};

use crate::geometry::convex_hull;
use crate::model::{CompanyId, Directionality, RelationshipId, StakeholderId};
use crate::store::RelationshipChanges;

use super::super::render_utils::{
    blend_color, dim_color, draw_arrow_head, draw_background, draw_edge_line, draw_hull_outline,
    draw_node_shape, with_alpha, world_to_screen,
};
use super::super::{ContextMenu, DragState, JobEffect, MenuTarget, RenderGraph, ViewModel};

const SELECTION_COLOR: Color32 = Color32::from_rgb(245, 206, 93);

impl ViewModel {
    pub(in crate::app) fn draw_graph(&mut self, ui: &mut Ui) {
        if self.graph_dirty {
            self.rebuild_render_graph();
        }

        let (rect, response) = ui.allocate_exact_size(ui.available_size(), Sense::click_and_drag());
        let painter = ui.painter_at(rect);

        draw_background(&painter, rect, self.pan, self.zoom);
        self.handle_graph_zoom(ui, rect, &response);

        if ui.input(|input| input.key_pressed(egui::Key::Escape)) {
            self.context_menu = None;
            self.focus_active = false;
        }

        let pan = self.pan;
        let zoom = self.zoom;
        let mut pending_tap: Option<Option<StakeholderId>> = None;
        let mut pending_menu: Option<ContextMenu> = None;
        let mut close_menu = false;

        {
            let Some(cache) = self.graph_cache.as_mut() else {
                return;
            };

            if cache.nodes.is_empty() {
                painter.text(
                    rect.center(),
                    Align2::CENTER_CENTER,
                    "No stakeholders match the current filters.",
                    FontId::proportional(14.0),
                    Color32::from_gray(180),
                );
            }

            let mut screen_positions = cache
                .nodes
                .iter()
                .map(|node| world_to_screen(rect, pan, zoom, node.world_pos))
                .collect::<Vec<_>>();
            let screen_radii = cache
                .nodes
                .iter()
                .map(|node| (node.radius * zoom.powf(0.55)).clamp(4.0, 52.0))
                .collect::<Vec<_>>();

            let hovered_node = if self.drag.is_some() {
                None
            } else {
                Self::hovered_node_index(ui, &screen_positions, &screen_radii)
            };
            let hovered_edge = if hovered_node.is_none() && self.drag.is_none() {
                Self::hovered_edge_index(ui, cache, &screen_positions)
            } else {
                None
            };

            if response.drag_started_by(egui::PointerButton::Primary)
                && let Some(index) = hovered_node
            {
                self.drag = Some(DragState {
                    id: cache.nodes[index].id.clone(),
                    index,
                    moved: false,
                });
            }

            if let Some(drag) = &mut self.drag
                && response.dragged_by(egui::PointerButton::Primary)
            {
                let delta = response.drag_delta();
                if delta != Vec2::ZERO && drag.index < cache.nodes.len() {
                    drag.moved = true;
                    let node = &mut cache.nodes[drag.index];
                    node.world_pos += delta / zoom;
                    self.layout.set_local(&drag.id, node.world_pos);
                    screen_positions[drag.index] = world_to_screen(rect, pan, zoom, node.world_pos);
                }
            }

            if response.drag_stopped_by(egui::PointerButton::Primary)
                && let Some(drag) = self.drag.take()
                && drag.moved
                && drag.index < cache.nodes.len()
            {
                // Exactly one persist call per completed drag. The local
                // position stays even if the upsert fails; the next full
                // reload reconciles.
                let (map_id, stakeholder_id, x, y) = self
                    .layout
                    .commit(&drag.id, cache.nodes[drag.index].world_pos);
                self.jobs
                    .submit("Saving position", JobEffect::None, move |store| {
                        store.upsert_layout(&map_id, &stakeholder_id, x, y)
                    });
            }

            if response.dragged_by(egui::PointerButton::Middle)
                || (self.drag.is_none() && response.dragged_by(egui::PointerButton::Primary))
            {
                self.pan += response.drag_delta();
            }

            if self.drag.is_some() {
                ui.ctx().request_repaint();
            }

            if response.clicked_by(egui::PointerButton::Primary) {
                if self.context_menu.is_some() {
                    close_menu = true;
                } else {
                    pending_tap = Some(hovered_node.map(|index| cache.nodes[index].id.clone()));
                }
            }

            if response.secondary_clicked()
                && let Some(pointer) = ui.input(|input| input.pointer.interact_pos())
            {
                if let Some(index) = hovered_node {
                    pending_menu = Some(ContextMenu {
                        target: MenuTarget::Node(cache.nodes[index].id.clone()),
                        position: pointer,
                    });
                } else if let Some(index) = hovered_edge {
                    pending_menu = Some(ContextMenu {
                        target: MenuTarget::Edge(cache.edges[index].id.clone()),
                        position: pointer,
                    });
                } else {
                    close_menu = true;
                }
            }

            let focus_mask = if self.focus_active {
                self.selected
                    .as_ref()
                    .and_then(|id| cache.index_by_id.get(id))
                    .map(|&index| cache.neighborhood(index))
            } else {
                None
            };
            let dimming = focus_mask.is_some();

            if self.show_hulls {
                draw_company_hulls(&painter, cache, &screen_positions, &screen_radii, dimming);
            }

            for (index, edge) in cache.edges.iter().enumerate() {
                let from_pos = screen_positions[edge.from];
                let to_pos = screen_positions[edge.to];
                let offset = to_pos - from_pos;
                let length = offset.length();
                if length <= f32::EPSILON {
                    continue;
                }
                let direction = offset / length;
                let start = from_pos + direction * (screen_radii[edge.from] + 2.0);
                let end = to_pos - direction * (screen_radii[edge.to] + 4.0);

                let in_focus = focus_mask
                    .as_ref()
                    .is_none_or(|mask| mask[edge.from] && mask[edge.to]);
                let mut color = edge.color;
                if !in_focus {
                    color = dim_color(color, 0.30);
                }
                if hovered_edge == Some(index) {
                    color = blend_color(color, Color32::WHITE, 0.35);
                }

                let width = (edge.width * zoom.sqrt()).clamp(0.6, 6.5);
                draw_edge_line(&painter, start, end, Stroke::new(width, color), edge.dashed);

                let arrow = (6.0 + width * 1.6).clamp(6.0, 14.0);
                draw_arrow_head(&painter, start, end, arrow, color);
                if edge.bidirectional {
                    draw_arrow_head(&painter, end, start, arrow, color);
                }
            }

            let selected_index = self
                .selected
                .as_ref()
                .and_then(|id| cache.index_by_id.get(id))
                .copied();

            for (index, node) in cache.nodes.iter().enumerate() {
                let position = screen_positions[index];
                let radius = screen_radii[index];
                let in_focus = focus_mask.as_ref().is_none_or(|mask| mask[index]);
                let is_hovered = hovered_node == Some(index);
                let is_selected = selected_index == Some(index);

                let mut fill = node.fill;
                let mut border = node.border;
                if !in_focus {
                    fill = dim_color(fill, 0.35);
                    border = dim_color(border, 0.35);
                }
                if is_hovered {
                    fill = blend_color(fill, Color32::WHITE, 0.18);
                }

                if is_selected {
                    painter.circle_stroke(
                        position,
                        radius + 5.0,
                        Stroke::new(2.0, SELECTION_COLOR),
                    );
                }
                draw_node_shape(
                    &painter,
                    position,
                    radius,
                    node.shape,
                    fill,
                    Stroke::new(2.0, border),
                );

                let show_label =
                    is_selected || is_hovered || (dimming && in_focus) || zoom > 1.1;
                if show_label {
                    let label_color = if in_focus {
                        Color32::from_gray(235)
                    } else {
                        Color32::from_gray(120)
                    };
                    painter.text(
                        position + vec2(radius + 6.0, 0.0),
                        Align2::LEFT_CENTER,
                        &node.label,
                        FontId::proportional(12.0),
                        label_color,
                    );
                }
            }

            if hovered_node.is_some() || hovered_edge.is_some() {
                ui.output_mut(|output| {
                    output.cursor_icon = egui::CursorIcon::PointingHand;
                });
            }

            // Hover details are an overlay only; they never touch the
            // interaction state.
            if let Some(index) = hovered_node {
                let node = &cache.nodes[index];
                let seniority = node
                    .seniority
                    .map(|s| format!("  |  {}", s.label()))
                    .unwrap_or_default();
                let influence = node
                    .influence
                    .map(|score| format!("  |  influence {score}"))
                    .unwrap_or_default();
                painter.text(
                    rect.left_top() + vec2(10.0, 10.0),
                    Align2::LEFT_TOP,
                    format!(
                        "{}  |  {}  |  {}{seniority}{influence}",
                        node.label,
                        node.company_name,
                        node.sentiment.label()
                    ),
                    FontId::proportional(13.0),
                    Color32::from_gray(240),
                );
            } else if let Some(index) = hovered_edge {
                let edge = &cache.edges[index];
                let notes = edge
                    .notes
                    .as_deref()
                    .map(|notes| format!("  |  {notes}"))
                    .unwrap_or_default();
                painter.text(
                    rect.left_top() + vec2(10.0, 10.0),
                    Align2::LEFT_TOP,
                    format!(
                        "{} \u{2192} {}  |  {}  |  strength {}{notes}",
                        cache.nodes[edge.from].label,
                        cache.nodes[edge.to].label,
                        edge.kind.label(),
                        edge.strength
                    ),
                    FontId::proportional(13.0),
                    Color32::from_gray(240),
                );
            }
        }

        if close_menu {
            self.context_menu = None;
        }
        if let Some(menu) = pending_menu {
            self.context_menu = Some(menu);
        }
        if let Some(tap) = pending_tap {
            self.apply_tap(tap);
        }

        self.draw_context_menu(ui);
    }

    fn draw_context_menu(&mut self, ui: &mut Ui) {
        let Some(menu) = &self.context_menu else {
            return;
        };
        let target = menu.target.clone();
        let position = menu.position;
        let mut close = false;

        egui::Area::new(egui::Id::new("graph_context_menu"))
            .fixed_pos(position)
            .order(egui::Order::Foreground)
            .show(ui.ctx(), |ui| {
                egui::Frame::popup(ui.style()).show(ui, |ui| {
                    ui.set_min_width(190.0);
                    close = match &target {
                        MenuTarget::Node(id) => self.node_menu(ui, id),
                        MenuTarget::Edge(id) => self.edge_menu(ui, id),
                    };
                });
            });

        if close {
            self.context_menu = None;
        }
    }

    fn node_menu(&mut self, ui: &mut Ui, id: &StakeholderId) -> bool {
        let name = self
            .dataset
            .stakeholder(id)
            .map(|stakeholder| stakeholder.name.clone())
            .unwrap_or_else(|| id.to_string());
        ui.label(RichText::new(name).strong());
        ui.separator();

        let focused_here = self.focus_active && self.selected.as_ref() == Some(id);
        let focus_label = if focused_here {
            "Clear focus"
        } else {
            "Focus neighborhood"
        };
        if ui.button(focus_label).clicked() {
            if focused_here {
                self.focus_active = false;
            } else {
                self.selected = Some(id.clone());
                self.focus_active = true;
            }
            return true;
        }

        if ui.button("Start relationship from here").clicked() {
            self.form.editing = None;
            self.form.from = Some(id.clone());
            self.form.error = None;
            return true;
        }
        if ui.button("Point relationship at here").clicked() {
            self.form.editing = None;
            self.form.to = Some(id.clone());
            self.form.error = None;
            return true;
        }

        ui.separator();
        if ui.button("Archive stakeholder").clicked() {
            let target = id.clone();
            self.jobs
                .submit("Archiving stakeholder", JobEffect::Reload, move |store| {
                    store.archive_stakeholder(&target)
                });
            if self.selected.as_ref() == Some(id) {
                self.selected = None;
                self.focus_active = false;
            }
            return true;
        }
        false
    }

    fn edge_menu(&mut self, ui: &mut Ui, id: &RelationshipId) -> bool {
        let Some(relationship) = self.dataset.relationship(id).cloned() else {
            ui.label("Relationship no longer exists.");
            return false;
        };
        ui.label(RichText::new(relationship.kind.label()).strong());
        ui.separator();

        if ui.button("Edit in panel").clicked() {
            self.load_relationship_form(&relationship);
            return true;
        }

        let flip_label = match relationship.directionality {
            Directionality::Directional => "Make bidirectional",
            Directionality::Bidirectional => "Make directional",
        };
        if ui.button(flip_label).clicked() {
            let flipped = match relationship.directionality {
                Directionality::Directional => Directionality::Bidirectional,
                Directionality::Bidirectional => Directionality::Directional,
            };
            let target = id.clone();
            self.jobs
                .submit("Updating relationship", JobEffect::Reload, move |store| {
                    store.update_relationship(
                        &target,
                        RelationshipChanges {
                            directionality: Some(flipped),
                            ..Default::default()
                        },
                    )
                });
            return true;
        }

        ui.separator();
        if ui.button("Delete relationship").clicked() {
            let target = id.clone();
            self.jobs
                .submit("Deleting relationship", JobEffect::Reload, move |store| {
                    store.delete_relationship(&target)
                });
            return true;
        }
        false
    }
}

/// Outlines each company grouping with the padded convex hull of its
/// members' on-screen positions. Hulls of fewer than three members are
/// not drawable and are skipped.
fn draw_company_hulls(
    painter: &egui::Painter,
    cache: &RenderGraph,
    screen_positions: &[Pos2],
    screen_radii: &[f32],
    dimming: bool,
) {
    let mut order: Vec<&CompanyId> = Vec::new();
    let mut groups: HashMap<&CompanyId, Vec<usize>> = HashMap::new();
    for (index, node) in cache.nodes.iter().enumerate() {
        groups
            .entry(&node.company_id)
            .or_insert_with(|| {
                order.push(&node.company_id);
                Vec::new()
            })
            .push(index);
    }

    for company in order {
        let members = &groups[company];
        if members.len() < 3 {
            continue;
        }

        let padding = members
            .iter()
            .map(|&index| screen_radii[index])
            .fold(0.0f32, f32::max)
            + 14.0;
        let points = members
            .iter()
            .map(|&index| screen_positions[index].to_vec2())
            .collect::<Vec<_>>();
        let hull = convex_hull(&points, padding);
        if hull.len() < 3 {
            continue;
        }

        let hull_points = hull.iter().map(|v| pos2(v.x, v.y)).collect::<Vec<_>>();
        let color = cache.nodes[members[0]].border;
        let (fill_alpha, stroke_alpha) = if dimming { (8, 50) } else { (22, 140) };
        draw_hull_outline(
            painter,
            &hull_points,
            with_alpha(color, fill_alpha),
            Stroke::new(1.2, with_alpha(color, stroke_alpha)),
        );

        if let Some(top) = hull_points
            .iter()
            .min_by(|a, b| a.y.total_cmp(&b.y))
            .copied()
        {
            painter.text(
                top + vec2(0.0, -6.0),
                Align2::CENTER_BOTTOM,
                &cache.nodes[members[0]].company_name,
                FontId::proportional(11.0),
                with_alpha(Color32::from_gray(220), if dimming { 90 } else { 200 }),
            );
        }
    }
}
