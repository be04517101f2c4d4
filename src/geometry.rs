use std::f32::consts::TAU;

use eframe::egui::{Vec2, vec2};

/// Ring radius used when a stakeholder has no persisted layout entry.
pub const FALLBACK_RING_RADIUS: f32 = 320.0;

pub const MIN_NODE_RADIUS: f32 = 10.0;
pub const MAX_NODE_RADIUS: f32 = 26.0;

/// Convex hull via the monotone chain, expanded outward from the centroid
/// by `padding` along each vertex's radial direction.
///
/// Inputs of fewer than three points are returned unchanged; callers must
/// treat hulls of fewer than three points as not drawable.
pub fn convex_hull(points: &[Vec2], padding: f32) -> Vec<Vec2> {
    if points.len() < 3 {
        return points.to_vec();
    }

    let mut sorted = points.to_vec();
    sorted.sort_by(|a, b| a.x.total_cmp(&b.x).then(a.y.total_cmp(&b.y)));
    sorted.dedup_by(|a, b| a.x == b.x && a.y == b.y);
    if sorted.len() < 3 {
        return expand_from_centroid(sorted, padding);
    }

    fn cross(o: Vec2, a: Vec2, b: Vec2) -> f32 {
        (a.x - o.x) * (b.y - o.y) - (a.y - o.y) * (b.x - o.x)
    }

    let mut lower: Vec<Vec2> = Vec::with_capacity(sorted.len());
    for &point in &sorted {
        while lower.len() >= 2
            && cross(lower[lower.len() - 2], lower[lower.len() - 1], point) <= 0.0
        {
            lower.pop();
        }
        lower.push(point);
    }

    let mut upper: Vec<Vec2> = Vec::with_capacity(sorted.len());
    for &point in sorted.iter().rev() {
        while upper.len() >= 2
            && cross(upper[upper.len() - 2], upper[upper.len() - 1], point) <= 0.0
        {
            upper.pop();
        }
        upper.push(point);
    }

    lower.pop();
    upper.pop();
    lower.extend(upper);

    expand_from_centroid(lower, padding)
}

fn expand_from_centroid(hull: Vec<Vec2>, padding: f32) -> Vec<Vec2> {
    if padding == 0.0 || hull.is_empty() {
        return hull;
    }

    let centroid = hull.iter().copied().fold(Vec2::ZERO, |sum, p| sum + p) / hull.len() as f32;
    hull.into_iter()
        .map(|vertex| {
            let direction = vertex - centroid;
            if direction.length_sq() <= f32::EPSILON {
                vertex
            } else {
                vertex + direction.normalized() * padding
            }
        })
        .collect()
}

/// Linear influence-to-size mapping: score 1 gives the minimum radius,
/// score 5 the maximum. A missing score counts as score 2.
pub fn influence_radius(score: Option<u8>) -> f32 {
    let score = score.unwrap_or(2).clamp(1, 5);
    let t = (score - 1) as f32 / 4.0;
    MIN_NODE_RADIUS + t * (MAX_NODE_RADIUS - MIN_NODE_RADIUS)
}

/// Deterministic fallback placement: slot `index` of `total` on a circle.
pub fn radial_fallback(index: usize, total: usize, radius: f32) -> Vec2 {
    let total = total.max(1);
    let angle = (index as f32 / total as f32) * TAU;
    vec2(angle.cos(), angle.sin()) * radius
}
