//! Oriented rectangles: overlap and clearance under arbitrary rotation
//!
//! Overlap uses the separating axis theorem. Two rectangles that only share
//! an edge or a corner do not overlap.

use super::polygon::{point_segment_distance, segments_intersect, Shape};
use crate::core::types::{Vec2, EPSILON};
use serde::{Deserialize, Serialize};

pub type Corners = [Vec2; 4];

/// Rectangle with its length axis at `angle_deg` counter-clockwise from east
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OrientedRect {
    pub center: Vec2,
    pub length: f64,
    pub width: f64,
    pub angle_deg: f64,
}

impl OrientedRect {
    pub fn new(center: Vec2, length: f64, width: f64, angle_deg: f64) -> Self {
        Self {
            center,
            length,
            width,
            angle_deg,
        }
    }

    /// Build from the corner with the lowest local coordinates
    pub fn from_corner(corner: Vec2, length: f64, width: f64, angle_deg: f64) -> Self {
        let u = Vec2::from_angle(angle_deg);
        let v = u.perp();
        let center = corner + u.scale(length / 2.0) + v.scale(width / 2.0);
        Self::new(center, length, width, angle_deg)
    }

    /// Unit vectors along the length and width axes
    pub fn axes(&self) -> (Vec2, Vec2) {
        let u = Vec2::from_angle(self.angle_deg);
        (u, u.perp())
    }

    /// Corners in counter-clockwise order
    pub fn corners(&self) -> Corners {
        let (u, v) = self.axes();
        let hu = u.scale(self.length / 2.0);
        let hv = v.scale(self.width / 2.0);
        [
            self.center - hu - hv,
            self.center + hu - hv,
            self.center + hu + hv,
            self.center - hu + hv,
        ]
    }

    pub fn area(&self) -> f64 {
        self.length * self.width
    }

    pub fn perimeter(&self) -> f64 {
        2.0 * (self.length + self.width)
    }

    /// Grow by `margin` on every side
    pub fn expanded(&self, margin: f64) -> Self {
        Self {
            center: self.center,
            length: self.length + 2.0 * margin,
            width: self.width + 2.0 * margin,
            angle_deg: self.angle_deg,
        }
    }

    /// True if `p` lies strictly inside, at least `EPSILON` from every edge
    pub fn strictly_contains(&self, p: Vec2) -> bool {
        let (u, v) = self.axes();
        let d = p - self.center;
        d.dot(&u).abs() < self.length / 2.0 - EPSILON && d.dot(&v).abs() < self.width / 2.0 - EPSILON
    }

    /// True if the interiors overlap
    pub fn intersects(&self, other: &OrientedRect) -> bool {
        let a = self.corners();
        let b = other.corners();
        let (au, av) = self.axes();
        let (bu, bv) = other.axes();
        for axis in [au, av, bu, bv] {
            let (min_a, max_a) = project(&a, axis);
            let (min_b, max_b) = project(&b, axis);
            if max_a <= min_b + EPSILON || max_b <= min_a + EPSILON {
                return false;
            }
        }
        true
    }

    /// Gap between the two rectangles; 0 when they overlap or touch
    pub fn minimum_separation(&self, other: &OrientedRect) -> f64 {
        if self.intersects(other) {
            return 0.0;
        }

        let a = self.corners();
        let b = other.corners();
        for i in 0..4 {
            for j in 0..4 {
                if segments_intersect(a[i], a[(i + 1) % 4], b[j], b[(j + 1) % 4]) {
                    return 0.0;
                }
            }
        }

        let mut min_dist = f64::INFINITY;
        for (corners, edges_of) in [(&a, &b), (&b, &a)] {
            for &corner in corners.iter() {
                for i in 0..4 {
                    let d = point_segment_distance(corner, edges_of[i], edges_of[(i + 1) % 4]);
                    min_dist = min_dist.min(d);
                }
            }
        }
        min_dist
    }

    pub fn to_shape(&self) -> Shape {
        Shape::new(self.corners().to_vec())
    }
}

fn project(corners: &Corners, axis: Vec2) -> (f64, f64) {
    let mut lo = f64::INFINITY;
    let mut hi = f64::NEG_INFINITY;
    for c in corners {
        let dot = c.dot(&axis);
        lo = lo.min(dot);
        hi = hi.max(dot);
    }
    (lo, hi)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_corner_constructor_places_center() {
        let rect = OrientedRect::from_corner(Vec2::new(0.0, 0.0), 16.0, 8.0, 0.0);
        assert!((rect.center.x - 8.0).abs() < 1e-9);
        assert!((rect.center.y - 4.0).abs() < 1e-9);
    }

    #[test]
    fn test_touching_rects_do_not_intersect() {
        let a = OrientedRect::new(Vec2::new(0.0, 0.0), 10.0, 10.0, 0.0);
        let b = OrientedRect::new(Vec2::new(10.0, 0.0), 10.0, 10.0, 0.0);
        assert!(!a.intersects(&b));
        assert_eq!(a.minimum_separation(&b), 0.0);
    }

    #[test]
    fn test_rotated_overlap_detected() {
        let a = OrientedRect::new(Vec2::new(0.0, 0.0), 10.0, 2.0, 0.0);
        let b = OrientedRect::new(Vec2::new(0.0, 0.0), 10.0, 2.0, 90.0);
        assert!(a.intersects(&b));
    }

    #[test]
    fn test_diamond_near_corner_separated() {
        // A 45 degree square whose corner points at another square's corner
        let a = OrientedRect::new(Vec2::new(0.0, 0.0), 2.0, 2.0, 0.0);
        let b = OrientedRect::new(Vec2::new(3.0, 3.0), 2.0, 2.0, 45.0);
        assert!(!a.intersects(&b));
        assert!(a.minimum_separation(&b) > 0.0);
    }

    #[test]
    fn test_separation_of_parallel_rects() {
        let a = OrientedRect::new(Vec2::new(0.0, 0.0), 10.0, 4.0, 0.0);
        let b = OrientedRect::new(Vec2::new(16.0, 0.0), 10.0, 4.0, 0.0);
        assert!((a.minimum_separation(&b) - 6.0).abs() < 1e-9);
        assert!(!a.expanded(2.9).intersects(&b.expanded(2.9)));
        assert!(a.expanded(3.1).intersects(&b.expanded(3.1)));
    }
}
