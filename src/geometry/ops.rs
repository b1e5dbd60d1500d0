//! Region operations over polygon sets: boolean ops, inward offset, and
//! rectangle containment
//!
//! Boolean operations delegate to `geo`; everything that runs inside the
//! placement scan loop is hand-written and allocation free.

use super::polygon::{
    contains, edges, open_ring, point_segment_distance, segments_intersect, Shape,
};
use super::rect::OrientedRect;
use crate::core::types::{Vec2, EPSILON};
use geo::{BooleanOps, Contains};
use geo_types::MultiPolygon;

/// Pieces smaller than this (m²) are dropped from boolean results
const SLIVER_AREA: f64 = 1e-3;

/// Sides of the polygon standing in for a disk at reflex corners
const CORNER_SEGMENTS: usize = 16;

/// Inset applied to a rectangle before the exact containment test, so
/// boundary contact within rounding error still counts as inside
const CONTAIN_TOLERANCE: f64 = 1e-6;

fn to_multi(shapes: &[Shape]) -> MultiPolygon<f64> {
    MultiPolygon::new(shapes.iter().map(Shape::to_geo).collect())
}

fn from_multi(multi: &MultiPolygon<f64>) -> Vec<Shape> {
    multi
        .0
        .iter()
        .map(Shape::from_geo)
        .filter(|shape| shape.exterior.len() >= 3 && shape.area() > SLIVER_AREA)
        .collect()
}

pub fn total_area(shapes: &[Shape]) -> f64 {
    shapes.iter().map(Shape::area).sum()
}

pub fn union(a: &[Shape], b: &[Shape]) -> Vec<Shape> {
    if a.is_empty() {
        return b.to_vec();
    }
    if b.is_empty() {
        return a.to_vec();
    }
    from_multi(&to_multi(a).union(&to_multi(b)))
}

pub fn difference(a: &[Shape], b: &[Shape]) -> Vec<Shape> {
    if a.is_empty() || b.is_empty() {
        return a.to_vec();
    }
    from_multi(&to_multi(a).difference(&to_multi(b)))
}

pub fn intersection(a: &[Shape], b: &[Shape]) -> Vec<Shape> {
    if a.is_empty() || b.is_empty() {
        return Vec::new();
    }
    from_multi(&to_multi(a).intersection(&to_multi(b)))
}

/// Union a list of shapes pairwise into disjoint pieces
pub fn union_all(shapes: &[Shape]) -> Vec<Shape> {
    shapes
        .iter()
        .fold(Vec::new(), |acc, shape| union(&acc, std::slice::from_ref(shape)))
}

/// Shrink a polygon set by `distance` on every boundary
///
/// Erodes by subtracting a band around every ring: one rectangle per edge
/// and one circumscribed polygon per vertex, so the band never undercuts
/// the true offset. Returns an empty set when the region collapses.
pub fn offset_inward(shapes: &[Shape], distance: f64) -> Vec<Shape> {
    if distance <= EPSILON {
        return shapes.to_vec();
    }

    let mut band = Vec::new();
    for shape in shapes {
        for ring in shape.rings() {
            for (a, b) in edges(ring) {
                let dir = (b - a).normalize();
                if dir.length() == 0.0 {
                    continue;
                }
                let n = dir.perp().scale(distance);
                band.push(Shape::new(vec![a - n, b - n, b + n, a + n]));
            }
            for &vertex in open_ring(ring) {
                band.push(corner_polygon(vertex, distance));
            }
        }
    }

    let band = union_all(&band);
    difference(shapes, &band)
}

fn corner_polygon(center: Vec2, radius: f64) -> Shape {
    let step = std::f64::consts::TAU / CORNER_SEGMENTS as f64;
    let r = radius / (step / 2.0).cos();
    let points = (0..CORNER_SEGMENTS)
        .map(|i| {
            let angle = step * i as f64;
            Vec2::new(center.x + r * angle.cos(), center.y + r * angle.sin())
        })
        .collect();
    Shape::new(points)
}

/// True if the rectangle lies entirely inside one shape of the set
///
/// Boundary contact is allowed. Cheap corner, crossing and vertex tests
/// reject most rectangles; survivors are confirmed with `geo`'s exact
/// polygon containment, which also catches rings that only touch the
/// rectangle's boundary at their vertices.
pub fn shapes_contain_rect(shapes: &[Shape], rect: &OrientedRect) -> bool {
    let corners = rect.corners();
    shapes
        .iter()
        .any(|shape| shape_contains_corners(shape, rect, &corners))
}

fn shape_contains_corners(shape: &Shape, rect: &OrientedRect, corners: &[Vec2; 4]) -> bool {
    let (min, max) = shape.bounds();
    let inside_bounds = corners.iter().all(|c| {
        c.x >= min.x - EPSILON
            && c.x <= max.x + EPSILON
            && c.y >= min.y - EPSILON
            && c.y <= max.y + EPSILON
    });
    if !inside_bounds {
        return false;
    }

    if !corners.iter().all(|&c| contains(&shape.exterior, c))
        || !contains(&shape.exterior, rect.center)
    {
        return false;
    }

    for ring in shape.rings() {
        for (a, b) in edges(ring) {
            if rect.strictly_contains(a) {
                return false;
            }
            for i in 0..4 {
                if segments_intersect(corners[i], corners[(i + 1) % 4], a, b) {
                    return false;
                }
            }
        }
    }

    for hole in &shape.holes {
        let swallowed = corners.iter().chain(std::iter::once(&rect.center)).any(|&c| {
            contains(hole, c)
                && !edges(hole).any(|(a, b)| point_segment_distance(c, a, b) <= EPSILON)
        });
        if swallowed {
            return false;
        }
    }

    let inset = rect.expanded(-CONTAIN_TOLERANCE);
    shape.to_geo().contains(&inset.to_shape().to_geo())
}

/// Distance from `p` to the nearest ring edge of the set
pub fn distance_to_boundary(shapes: &[Shape], p: Vec2) -> f64 {
    shapes
        .iter()
        .flat_map(|shape| shape.rings())
        .flat_map(edges)
        .map(|(a, b)| point_segment_distance(p, a, b))
        .fold(f64::INFINITY, f64::min)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rect_shape(x0: f64, y0: f64, x1: f64, y1: f64) -> Shape {
        Shape::new(vec![
            Vec2::new(x0, y0),
            Vec2::new(x1, y0),
            Vec2::new(x1, y1),
            Vec2::new(x0, y1),
        ])
    }

    #[test]
    fn test_offset_square_shrinks_by_distance() {
        let shapes = vec![rect_shape(0.0, 0.0, 100.0, 100.0)];
        let eroded = offset_inward(&shapes, 5.0);
        assert!((total_area(&eroded) - 90.0 * 90.0).abs() < 1.0);
    }

    #[test]
    fn test_offset_collapses_to_empty() {
        let shapes = vec![rect_shape(0.0, 0.0, 10.0, 4.0)];
        assert!(offset_inward(&shapes, 2.5).is_empty());
    }

    #[test]
    fn test_difference_creates_hole() {
        let outer = vec![rect_shape(0.0, 0.0, 100.0, 100.0)];
        let lake = vec![rect_shape(40.0, 40.0, 60.0, 60.0)];
        let result = difference(&outer, &lake);
        assert!((total_area(&result) - 9600.0).abs() < 1e-6);
    }

    #[test]
    fn test_rect_containment_respects_holes() {
        let outer = vec![rect_shape(0.0, 0.0, 100.0, 100.0)];
        let region = difference(&outer, &[rect_shape(40.0, 40.0, 60.0, 60.0)]);

        let clear = OrientedRect::from_corner(Vec2::new(0.0, 0.0), 30.0, 30.0, 0.0);
        assert!(shapes_contain_rect(&region, &clear));

        let over_lake = OrientedRect::from_corner(Vec2::new(30.0, 30.0), 40.0, 40.0, 0.0);
        assert!(!shapes_contain_rect(&region, &over_lake));

        let outside = OrientedRect::from_corner(Vec2::new(80.0, 0.0), 30.0, 10.0, 0.0);
        assert!(!shapes_contain_rect(&region, &outside));
    }

    #[test]
    fn test_rect_containment_in_concave_region() {
        // L-shaped region: the notch must reject a rectangle spanning it
        let l_shape = vec![Shape::new(vec![
            Vec2::new(0.0, 0.0),
            Vec2::new(100.0, 0.0),
            Vec2::new(100.0, 40.0),
            Vec2::new(40.0, 40.0),
            Vec2::new(40.0, 100.0),
            Vec2::new(0.0, 100.0),
        ])];
        let spanning = OrientedRect::from_corner(Vec2::new(10.0, 10.0), 60.0, 60.0, 0.0);
        assert!(!shapes_contain_rect(&l_shape, &spanning));
        let arm = OrientedRect::from_corner(Vec2::new(0.0, 0.0), 100.0, 40.0, 0.0);
        assert!(shapes_contain_rect(&l_shape, &arm));
    }

    #[test]
    fn test_hole_touching_rect_boundary_is_not_contained() {
        // The hole spans the rectangle top to bottom with every vertex on
        // its boundary
        let outer = vec![rect_shape(0.0, 0.0, 100.0, 100.0)];
        let region = difference(&outer, &[rect_shape(23.0, 20.0, 27.0, 40.0)]);
        let rect = OrientedRect::from_corner(Vec2::new(20.0, 20.0), 20.0, 20.0, 0.0);
        assert!(!shapes_contain_rect(&region, &rect));

        let beside = OrientedRect::from_corner(Vec2::new(27.0, 20.0), 20.0, 20.0, 0.0);
        assert!(shapes_contain_rect(&region, &beside));
    }

    #[test]
    fn test_notch_with_vertices_on_rect_boundary_is_not_contained() {
        let notched = vec![Shape::new(vec![
            Vec2::new(0.0, 0.0),
            Vec2::new(50.0, 0.0),
            Vec2::new(50.0, 40.0),
            Vec2::new(30.0, 40.0),
            Vec2::new(30.0, 20.0),
            Vec2::new(25.0, 20.0),
            Vec2::new(25.0, 40.0),
            Vec2::new(0.0, 40.0),
        ])];
        let across = OrientedRect::from_corner(Vec2::new(20.0, 20.0), 20.0, 20.0, 0.0);
        assert!(!shapes_contain_rect(&notched, &across));
        let below = OrientedRect::from_corner(Vec2::new(20.0, 0.0), 20.0, 20.0, 0.0);
        assert!(shapes_contain_rect(&notched, &below));
    }

    #[test]
    fn test_distance_to_boundary() {
        let shapes = vec![rect_shape(0.0, 0.0, 10.0, 10.0)];
        assert!((distance_to_boundary(&shapes, Vec2::new(3.0, 5.0)) - 3.0).abs() < 1e-9);
    }
}
