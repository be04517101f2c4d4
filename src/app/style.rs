use eframe::egui::Color32;

use crate::model::{RelationKind, Seniority, Sentiment};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NodeShape {
    Hexagon,
    Triangle,
    Diamond,
    Square,
    Circle,
    Rounded,
}

pub fn sentiment_fill(sentiment: Sentiment) -> Color32 {
    match sentiment {
        Sentiment::Ally => Color32::from_rgb(84, 170, 110),
        Sentiment::Neutral => Color32::from_rgb(96, 118, 148),
        Sentiment::Opponent => Color32::from_rgb(196, 86, 82),
        Sentiment::Unknown => Color32::from_rgb(122, 122, 126),
    }
}

pub fn seniority_shape(seniority: Option<Seniority>) -> NodeShape {
    match seniority {
        Some(Seniority::CLevel) => NodeShape::Hexagon,
        Some(Seniority::Vp) => NodeShape::Triangle,
        Some(Seniority::Director) => NodeShape::Diamond,
        Some(Seniority::Manager) => NodeShape::Square,
        Some(Seniority::Ic) => NodeShape::Circle,
        None => NodeShape::Rounded,
    }
}

/// Border colors assigned to companies in first-seen order. Colors wrap
/// once more companies than palette entries appear in one render.
pub const COMPANY_PALETTE: [Color32; 10] = [
    Color32::from_rgb(106, 198, 255),
    Color32::from_rgb(246, 206, 104),
    Color32::from_rgb(197, 134, 255),
    Color32::from_rgb(118, 222, 180),
    Color32::from_rgb(255, 150, 120),
    Color32::from_rgb(160, 196, 96),
    Color32::from_rgb(240, 132, 190),
    Color32::from_rgb(130, 150, 255),
    Color32::from_rgb(222, 188, 140),
    Color32::from_rgb(110, 210, 222),
];

pub fn company_border(first_seen_index: usize) -> Color32 {
    COMPANY_PALETTE[first_seen_index % COMPANY_PALETTE.len()]
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EdgeStyle {
    pub color: Color32,
    pub dashed: bool,
}

pub fn relation_style(kind: RelationKind) -> EdgeStyle {
    let (color, dashed) = match kind {
        RelationKind::ReportsTo => (Color32::from_rgb(150, 160, 176), false),
        RelationKind::PeerOf => (Color32::from_rgb(112, 146, 190), true),
        RelationKind::Influences => (Color32::from_rgb(197, 134, 255), false),
        RelationKind::CollaboratesWith => (Color32::from_rgb(118, 222, 180), false),
        RelationKind::Advises => (Color32::from_rgb(246, 206, 104), true),
        RelationKind::Blocks => (Color32::from_rgb(214, 92, 88), false),
        RelationKind::Sponsors => (Color32::from_rgb(110, 210, 222), false),
        RelationKind::GatekeeperFor => (Color32::from_rgb(240, 132, 190), true),
    };
    EdgeStyle { color, dashed }
}

/// Monotonic strength-to-width mapping for edges.
pub fn strength_width(strength: u8) -> f32 {
    0.8 + strength.clamp(1, 5) as f32 * 0.7
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strength_width_is_monotonic() {
        let widths = (1..=5).map(strength_width).collect::<Vec<_>>();
        for pair in widths.windows(2) {
            assert!(pair[0] < pair[1]);
        }
    }

    #[test]
    fn companies_within_palette_size_get_distinct_borders() {
        let mut seen = Vec::new();
        for index in 0..COMPANY_PALETTE.len() {
            let color = company_border(index);
            assert!(!seen.contains(&color));
            seen.push(color);
        }
        // Beyond the palette, colors wrap.
        assert_eq!(company_border(COMPANY_PALETTE.len()), company_border(0));
    }

    #[test]
    fn every_seniority_maps_to_a_distinct_shape() {
        let mut shapes = crate::model::Seniority::ALL
            .iter()
            .map(|&seniority| seniority_shape(Some(seniority)))
            .collect::<Vec<_>>();
        shapes.push(seniority_shape(None));
        for i in 0..shapes.len() {
            for j in (i + 1)..shapes.len() {
                assert_ne!(shapes[i], shapes[j]);
            }
        }
    }

    #[test]
    fn sentiment_palette_is_four_way_distinct() {
        let fills = Sentiment::ALL.map(sentiment_fill);
        for i in 0..fills.len() {
            for j in (i + 1)..fills.len() {
                assert_ne!(fills[i], fills[j]);
            }
        }
    }
}
