use eframe::egui::{self, Pos2, Rect, Ui};

use crate::model::StakeholderId;

use super::super::render_utils::{dist_point_segment, screen_to_world};
use super::super::{RenderGraph, ViewModel};

const EDGE_HOVER_DISTANCE: f32 = 6.0;

impl ViewModel {
    pub(in crate::app) fn handle_graph_zoom(
        &mut self,
        ui: &Ui,
        rect: Rect,
        response: &egui::Response,
    ) {
        if !response.hovered() {
            return;
        }

        let scroll = ui.input(|input| input.raw_scroll_delta.y);
        if scroll.abs() <= f32::EPSILON {
            return;
        }

        let pointer = ui
            .input(|input| input.pointer.hover_pos())
            .unwrap_or_else(|| rect.center());
        let world_before = screen_to_world(rect, self.pan, self.zoom, pointer);

        let zoom_factor = (1.0 + (scroll * 0.0018)).clamp(0.85, 1.15);
        self.zoom = (self.zoom * zoom_factor).clamp(0.15, 5.0);
        self.pan = pointer - rect.center() - (world_before * self.zoom);
    }

    pub(in crate::app) fn hovered_node_index(
        ui: &Ui,
        screen_positions: &[Pos2],
        screen_radii: &[f32],
    ) -> Option<usize> {
        let pointer = ui.input(|input| input.pointer.hover_pos())?;
        (0..screen_positions.len())
            .filter_map(|index| {
                let distance = screen_positions[index].distance(pointer);
                (distance <= screen_radii[index]).then_some((index, distance))
            })
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(index, _)| index)
    }

    /// Nearest edge under the pointer, only consulted when no node is.
    pub(in crate::app) fn hovered_edge_index(
        ui: &Ui,
        cache: &RenderGraph,
        screen_positions: &[Pos2],
    ) -> Option<usize> {
        let pointer = ui.input(|input| input.pointer.hover_pos())?;
        cache
            .edges
            .iter()
            .enumerate()
            .filter_map(|(index, edge)| {
                let distance = dist_point_segment(
                    pointer,
                    screen_positions[edge.from],
                    screen_positions[edge.to],
                );
                (distance <= EDGE_HOVER_DISTANCE).then_some((index, distance))
            })
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(index, _)| index)
    }

    /// Primary-tap semantics: empty canvas clears selection and focus;
    /// a new node selects and focuses its neighborhood; the same node
    /// toggles focus dimming while staying selected.
    pub(in crate::app) fn apply_tap(&mut self, tapped: Option<StakeholderId>) {
        match tapped {
            None => {
                self.selected = None;
                self.focus_active = false;
            }
            Some(id) => {
                if self.selected.as_ref() == Some(&id) {
                    self.focus_active = !self.focus_active;
                } else {
                    self.selected = Some(id);
                    self.focus_active = true;
                }
            }
        }
        self.context_menu = None;
    }
}

#[cfg(test)]
mod tests {
    use crate::model::StakeholderId;

    use super::super::build::tests::demo_model;

    #[test]
    fn tapping_a_node_selects_and_focuses_it() {
        let mut model = demo_model();
        let id = StakeholderId::new("s-imogen");

        model.apply_tap(Some(id.clone()));
        assert_eq!(model.selected, Some(id));
        assert!(model.focus_active);
    }

    #[test]
    fn double_tap_toggles_focus_back_to_the_pre_focus_state() {
        let mut model = demo_model();
        let id = StakeholderId::new("s-imogen");
        let selected_before = model.selected.clone();
        let focus_before = model.focus_active;

        model.apply_tap(Some(id.clone()));
        model.apply_tap(Some(id.clone()));

        // Selection sticks, dimming is exactly where it started.
        assert_eq!(model.selected, Some(id));
        assert_eq!(model.focus_active, focus_before);
        assert_ne!(model.selected, selected_before);
    }

    #[test]
    fn tapping_a_different_node_moves_the_focus() {
        let mut model = demo_model();
        model.apply_tap(Some(StakeholderId::new("s-imogen")));
        model.apply_tap(Some(StakeholderId::new("s-priya")));
        assert_eq!(model.selected, Some(StakeholderId::new("s-priya")));
        assert!(model.focus_active);
    }

    #[test]
    fn tapping_empty_canvas_clears_everything() {
        let mut model = demo_model();
        model.apply_tap(Some(StakeholderId::new("s-imogen")));
        model.apply_tap(None);
        assert_eq!(model.selected, None);
        assert!(!model.focus_active);
    }
}
