//! Hit testing of pointer positions against polygon vertices and edges.

use bevy::prelude::*;

use super::input::ViewportProjector;
use super::polygon::{Polygon, PolygonId};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HitTarget {
    Vertex(usize),
    /// Edge from point `i` to point `i + 1` (wrapping on closed polygons)
    Edge(usize),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Hit {
    pub polygon: PolygonId,
    pub target: HitTarget,
    pub distance: f32,
}

/// Distance from a point to a segment, projecting onto the segment and clamping.
pub fn distance_to_segment(point: Vec3, seg_start: Vec3, seg_end: Vec3) -> f32 {
    let seg = seg_end - seg_start;
    let len_sq = seg.length_squared();

    if len_sq < f32::EPSILON {
        // Segment is essentially a point
        return point.distance(seg_start);
    }

    let t = ((point - seg_start).dot(seg) / len_sq).clamp(0.0, 1.0);
    point.distance(seg_start + seg * t)
}

/// Find the vertex or edge nearest to `point`.
///
/// Any vertex within `vertex_threshold` beats every edge, however close the
/// edge is. Edges are only considered when no vertex qualifies. Equal
/// distances keep the first match in polygon order, then point order.
pub fn find_nearest(
    point: Vec3,
    polygons: &[Polygon],
    vertex_threshold: f32,
    edge_threshold: f32,
) -> Option<Hit> {
    let mut best: Option<Hit> = None;

    for polygon in polygons {
        for (index, vertex) in polygon.points.iter().enumerate() {
            let distance = vertex.distance(point);
            if distance < vertex_threshold && best.is_none_or(|b| distance < b.distance) {
                best = Some(Hit {
                    polygon: polygon.id,
                    target: HitTarget::Vertex(index),
                    distance,
                });
            }
        }
    }

    if best.is_some() {
        return best;
    }

    for polygon in polygons {
        for (index, start, end) in polygon.edges() {
            let distance = distance_to_segment(point, start, end);
            if distance < edge_threshold && best.is_none_or(|b| distance < b.distance) {
                best = Some(Hit {
                    polygon: polygon.id,
                    target: HitTarget::Edge(index),
                    distance,
                });
            }
        }
    }

    best
}

/// Whether the cursor is within `threshold_px` screen pixels of a world point.
///
/// World-space distance depends on zoom, so gestures that should feel the same
/// at every zoom level compare in pixels instead.
pub fn is_cursor_near_point(
    cursor: Vec2,
    point: Vec3,
    projector: &impl ViewportProjector,
    threshold_px: f32,
) -> bool {
    projector
        .world_to_screen(point)
        .is_some_and(|screen| screen.distance(cursor) <= threshold_px)
}

#[cfg(test)]
mod tests {
    use super::super::pool::Drawables;
    use super::*;

    struct ScaledProjector {
        pixels_per_unit: f32,
    }

    impl ViewportProjector for ScaledProjector {
        fn screen_to_world(&self, screen: Vec2) -> Option<Vec3> {
            Some((screen / self.pixels_per_unit).extend(0.0))
        }

        fn world_to_screen(&self, world: Vec3) -> Option<Vec2> {
            Some(world.truncate() * self.pixels_per_unit)
        }
    }

    fn polygon(id: PolygonId, points: &[Vec3], closed: bool, drawables: &mut Drawables) -> Polygon {
        Polygon::from_points(id, "a", points.to_vec(), closed, drawables)
    }

    #[test]
    fn test_distance_to_segment_clamps() {
        let a = Vec3::ZERO;
        let b = Vec3::X;
        assert!((distance_to_segment(Vec3::new(0.5, 1.0, 0.0), a, b) - 1.0).abs() < 1e-6);
        assert!((distance_to_segment(Vec3::new(2.0, 0.0, 0.0), a, b) - 1.0).abs() < 1e-6);
        assert!((distance_to_segment(Vec3::new(-3.0, 4.0, 0.0), a, b) - 5.0).abs() < 1e-6);
        assert!((distance_to_segment(Vec3::Y, a, a) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_vertex_beats_closer_edge() {
        let mut drawables = Drawables::unpooled();
        // First polygon: an edge passing 0.03 below the query, vertices far away
        let edge_poly = polygon(
            1,
            &[Vec3::new(-5.0, -0.03, 0.0), Vec3::new(5.0, -0.03, 0.0), Vec3::new(0.0, -5.0, 0.0)],
            true,
            &mut drawables,
        );
        // Second polygon: a vertex 0.05 away
        let vertex_poly = polygon(
            2,
            &[Vec3::new(0.05, 0.0, 0.0), Vec3::new(0.05, 5.0, 0.0), Vec3::new(3.0, 5.0, 0.0)],
            true,
            &mut drawables,
        );
        let polygons = vec![edge_poly, vertex_poly];

        let hit = find_nearest(Vec3::ZERO, &polygons, 0.1, 0.1).unwrap();
        assert_eq!(hit.polygon, 2);
        assert_eq!(hit.target, HitTarget::Vertex(0));
        assert!((hit.distance - 0.05).abs() < 1e-6);
    }

    #[test]
    fn test_vertex_wins_over_edge_at_similar_distance() {
        let mut drawables = Drawables::unpooled();
        let square = polygon(
            1,
            &[
                Vec3::new(0.05, 0.0, 0.0),
                Vec3::new(5.0, 0.0, 0.0),
                Vec3::new(5.0, 5.0, 0.0),
            ],
            true,
            &mut drawables,
        );
        let other = polygon(
            2,
            &[Vec3::new(-5.0, 0.08, 0.0), Vec3::new(5.0, 0.08, 0.0), Vec3::new(0.0, 4.0, 0.0)],
            true,
            &mut drawables,
        );
        let polygons = vec![other, square];
        let hit = find_nearest(Vec3::new(0.0, 0.0, 0.0), &polygons, 0.1, 0.1).unwrap();
        assert_eq!(hit.target, HitTarget::Vertex(0));
        assert_eq!(hit.polygon, 1);
    }

    #[test]
    fn test_edge_hit_when_no_vertex_in_range() {
        let mut drawables = Drawables::unpooled();
        let polygons = vec![polygon(
            1,
            &[Vec3::ZERO, Vec3::new(10.0, 0.0, 0.0), Vec3::new(10.0, 10.0, 0.0)],
            true,
            &mut drawables,
        )];
        let hit = find_nearest(Vec3::new(5.0, 0.2, 0.0), &polygons, 0.5, 0.3).unwrap();
        assert_eq!(hit.target, HitTarget::Edge(0));
    }

    #[test]
    fn test_open_polygon_does_not_wrap() {
        let mut drawables = Drawables::unpooled();
        let points = [Vec3::ZERO, Vec3::new(10.0, 0.0, 0.0), Vec3::new(10.0, 10.0, 0.0)];
        let open = vec![polygon(1, &points, false, &mut drawables)];
        let closed = vec![polygon(2, &points, true, &mut drawables)];
        // Midpoint of the closing diagonal
        let query = Vec3::new(5.0, 5.0, 0.0);
        assert!(find_nearest(query, &open, 0.5, 0.3).is_none());
        assert_eq!(
            find_nearest(query, &closed, 0.5, 0.3).map(|h| h.target),
            Some(HitTarget::Edge(2))
        );
    }

    #[test]
    fn test_thresholds_are_strict() {
        let mut drawables = Drawables::unpooled();
        let polygons = vec![polygon(
            1,
            &[Vec3::ZERO, Vec3::new(10.0, 0.0, 0.0), Vec3::new(10.0, 10.0, 0.0)],
            true,
            &mut drawables,
        )];
        assert!(find_nearest(Vec3::new(-1.0, 0.0, 0.0), &polygons, 1.0, 0.5).is_none());
    }

    #[test]
    fn test_ties_keep_first_polygon() {
        let mut drawables = Drawables::unpooled();
        let points = [Vec3::ZERO, Vec3::new(10.0, 0.0, 0.0), Vec3::new(10.0, 10.0, 0.0)];
        let polygons = vec![
            polygon(7, &points, true, &mut drawables),
            polygon(8, &points, true, &mut drawables),
        ];
        let hit = find_nearest(Vec3::new(0.1, 0.0, 0.0), &polygons, 0.5, 0.5).unwrap();
        assert_eq!(hit.polygon, 7);
    }

    #[test]
    fn test_cursor_near_point_in_pixels() {
        let near = ScaledProjector { pixels_per_unit: 10.0 };
        let far = ScaledProjector { pixels_per_unit: 1000.0 };
        let point = Vec3::new(1.0, 1.0, 0.0);
        // Same world offset, different zoom
        assert!(is_cursor_near_point(Vec2::new(10.5, 10.0), point, &near, 8.0));
        assert!(!is_cursor_near_point(Vec2::new(1050.0, 1000.0), point, &far, 8.0));
    }
}
