use eframe::egui::{Color32, Painter, Pos2, Rect, Shape, Stroke, StrokeKind, Vec2, vec2};

use super::style::NodeShape;

pub(super) fn blend_color(base: Color32, overlay: Color32, amount: f32) -> Color32 {
    let amount = amount.clamp(0.0, 1.0);
    let inverse = 1.0 - amount;

    Color32::from_rgba_unmultiplied(
        ((base.r() as f32 * inverse) + (overlay.r() as f32 * amount)) as u8,
        ((base.g() as f32 * inverse) + (overlay.g() as f32 * amount)) as u8,
        ((base.b() as f32 * inverse) + (overlay.b() as f32 * amount)) as u8,
        ((base.a() as f32 * inverse) + (overlay.a() as f32 * amount)) as u8,
    )
}

pub(super) fn dim_color(color: Color32, factor: f32) -> Color32 {
    let factor = factor.clamp(0.0, 1.0);
    Color32::from_rgba_unmultiplied(
        (color.r() as f32 * factor) as u8,
        (color.g() as f32 * factor) as u8,
        (color.b() as f32 * factor) as u8,
        (color.a() as f32 * (0.40 + (factor * 0.60))) as u8,
    )
}

pub(super) fn with_alpha(color: Color32, alpha: u8) -> Color32 {
    Color32::from_rgba_unmultiplied(color.r(), color.g(), color.b(), alpha)
}

pub(super) fn draw_background(painter: &Painter, rect: Rect, pan: Vec2, zoom: f32) {
    painter.rect_filled(rect, 0.0, Color32::from_rgb(21, 24, 31));

    let step = (64.0 * zoom.clamp(0.5, 1.6)).max(22.0);
    let origin = rect.center() + pan;
    let grid_stroke = Stroke::new(1.0, Color32::from_rgba_unmultiplied(58, 66, 78, 60));

    let mut x = origin.x.rem_euclid(step);
    while x < rect.right() {
        painter.line_segment(
            [Pos2::new(x, rect.top()), Pos2::new(x, rect.bottom())],
            grid_stroke,
        );
        x += step;
    }

    let mut y = origin.y.rem_euclid(step);
    while y < rect.bottom() {
        painter.line_segment(
            [Pos2::new(rect.left(), y), Pos2::new(rect.right(), y)],
            grid_stroke,
        );
        y += step;
    }
}

pub(super) fn world_to_screen(rect: Rect, pan: Vec2, zoom: f32, world: Vec2) -> Pos2 {
    rect.center() + pan + world * zoom
}

pub(super) fn screen_to_world(rect: Rect, pan: Vec2, zoom: f32, screen: Pos2) -> Vec2 {
    (screen - rect.center() - pan) / zoom
}

pub(super) fn dist_point_segment(point: Pos2, a: Pos2, b: Pos2) -> f32 {
    let ab = b - a;
    let length_sq = ab.length_sq();
    if length_sq <= f32::EPSILON {
        return (point - a).length();
    }
    let t = ((point - a).dot(ab) / length_sq).clamp(0.0, 1.0);
    (point - (a + ab * t)).length()
}

fn regular_polygon(center: Pos2, radius: f32, sides: usize, start_angle: f32) -> Vec<Pos2> {
    (0..sides)
        .map(|i| {
            let angle = start_angle + (i as f32 / sides as f32) * std::f32::consts::TAU;
            center + vec2(angle.cos(), angle.sin()) * radius
        })
        .collect()
}

pub(super) fn draw_node_shape(
    painter: &Painter,
    center: Pos2,
    radius: f32,
    shape: NodeShape,
    fill: Color32,
    border: Stroke,
) {
    match shape {
        NodeShape::Circle => {
            painter.circle_filled(center, radius, fill);
            painter.circle_stroke(center, radius, border);
        }
        NodeShape::Rounded => {
            let rect = Rect::from_center_size(center, vec2(radius * 2.0, radius * 2.0));
            painter.rect_filled(rect, radius * 0.4, fill);
            painter.rect_stroke(rect, radius * 0.4, border, StrokeKind::Middle);
        }
        NodeShape::Square => {
            let half = radius * 0.88;
            let rect = Rect::from_center_size(center, vec2(half * 2.0, half * 2.0));
            painter.rect_filled(rect, 0.0, fill);
            painter.rect_stroke(rect, 0.0, border, StrokeKind::Middle);
        }
        NodeShape::Diamond => {
            let points = regular_polygon(center, radius * 1.08, 4, -std::f32::consts::FRAC_PI_2);
            painter.add(Shape::convex_polygon(points, fill, border));
        }
        NodeShape::Triangle => {
            let points = regular_polygon(center, radius * 1.12, 3, -std::f32::consts::FRAC_PI_2);
            painter.add(Shape::convex_polygon(points, fill, border));
        }
        NodeShape::Hexagon => {
            let points = regular_polygon(center, radius * 1.05, 6, -std::f32::consts::FRAC_PI_2);
            painter.add(Shape::convex_polygon(points, fill, border));
        }
    }
}

pub(super) fn draw_edge_line(
    painter: &Painter,
    start: Pos2,
    end: Pos2,
    stroke: Stroke,
    dashed: bool,
) {
    if dashed {
        painter.extend(Shape::dashed_line(&[start, end], stroke, 7.0, 5.0));
    } else {
        painter.line_segment([start, end], stroke);
    }
}

/// Arrowhead sitting at `tip`, pointing along `start -> tip`.
pub(super) fn draw_arrow_head(painter: &Painter, start: Pos2, tip: Pos2, size: f32, color: Color32) {
    let direction = tip - start;
    if direction.length_sq() <= f32::EPSILON {
        return;
    }
    let direction = direction.normalized();
    let normal = vec2(-direction.y, direction.x);
    let base = tip - direction * size;
    let points = vec![
        tip,
        base + normal * (size * 0.55),
        base - normal * (size * 0.55),
    ];
    painter.add(Shape::convex_polygon(points, color, Stroke::NONE));
}

pub(super) fn draw_hull_outline(
    painter: &Painter,
    hull: &[Pos2],
    fill: Color32,
    stroke: Stroke,
) {
    if hull.len() < 3 {
        return;
    }
    painter.add(Shape::convex_polygon(hull.to_vec(), fill, Stroke::NONE));
    for i in 0..hull.len() {
        let a = hull[i];
        let b = hull[(i + 1) % hull.len()];
        painter.extend(Shape::dashed_line(&[a, b], stroke, 6.0, 6.0));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn point_segment_distance_handles_interior_and_endpoints() {
        let a = Pos2::new(0.0, 0.0);
        let b = Pos2::new(10.0, 0.0);
        assert!((dist_point_segment(Pos2::new(5.0, 3.0), a, b) - 3.0).abs() < 1e-5);
        assert!((dist_point_segment(Pos2::new(-4.0, 0.0), a, b) - 4.0).abs() < 1e-5);
        assert!((dist_point_segment(Pos2::new(13.0, 4.0), a, b) - 5.0).abs() < 1e-5);
    }

    #[test]
    fn screen_world_round_trip() {
        let rect = Rect::from_min_size(Pos2::ZERO, vec2(800.0, 600.0));
        let pan = vec2(14.0, -6.0);
        let zoom = 1.7;
        let world = vec2(120.0, -48.0);
        let back = screen_to_world(rect, pan, zoom, world_to_screen(rect, pan, zoom, world));
        assert!((back - world).length() < 1e-3);
    }
}
